//! Conversion between address families.

use crate::{
    af::{Ipv4, Ipv6},
    error::IncompatibleAddressError,
    segment::Segment,
};

use super::Address;

/// Strategy deciding when values of one family have an equivalent in the
/// other.
pub trait FamilyConverter {
    /// `None` when `addr` has no IPv6 equivalent under this converter.
    fn to_ipv6(&self, addr: &Address<Ipv4>) -> Option<Address<Ipv6>>;
    /// `None` when `addr` has no IPv4 equivalent under this converter.
    fn to_ipv4(&self, addr: &Address<Ipv6>) -> Option<Address<Ipv4>>;
}

/// The default converter: IPv4 values map to `::ffff:a.b.c.d` and only
/// IPv4-mapped IPv6 values convert back.
#[derive(Clone, Copy, Debug, Default)]
pub struct MappedConverter;

impl FamilyConverter for MappedConverter {
    fn to_ipv6(&self, addr: &Address<Ipv4>) -> Option<Address<Ipv6>> {
        addr.to_ipv4_mapped().ok()
    }

    fn to_ipv4(&self, addr: &Address<Ipv6>) -> Option<Address<Ipv4>> {
        if !addr.is_ipv4_mapped() {
            return None;
        }
        let segs = addr.section().segments();
        let mut v4_segments = Vec::with_capacity(4);
        for seg in &segs[6..8] {
            let (high, low) = split_segment(seg)?;
            v4_segments.push(high);
            v4_segments.push(low);
        }
        Address::from_section_zoneless(crate::section::Section::raw(
            v4_segments,
            0,
            addr.prefix_len().map(|p| p.saturating_sub(96)),
            addr.section().prefix_configuration(),
        ))
        .ok()
    }
}

/// Combine a pair of IPv4 segments into one IPv6 segment.
///
/// A pair of intervals combines exactly when the high half is single-valued
/// or the low half covers its full range.
pub(crate) fn combine_segments(
    high: &Segment<Ipv4>,
    low: &Segment<Ipv4>,
) -> Result<Segment<Ipv6>, IncompatibleAddressError> {
    if high.is_multiple() && !low.is_full_range() {
        return Err(IncompatibleAddressError::NonSequentialRange);
    }
    Ok(Segment::ranged_unchecked(
        (high.lower() << 8) | low.lower(),
        (high.upper() << 8) | low.upper(),
        None,
    ))
}

/// Split one IPv6 segment into a pair of IPv4 segments, where the interval
/// is representable as a product of byte intervals.
pub(crate) fn split_segment(seg: &Segment<Ipv6>) -> Option<(Segment<Ipv4>, Segment<Ipv4>)> {
    let (hi_lo, hi_up) = (seg.lower() >> 8, seg.upper() >> 8);
    let (lo_lo, lo_up) = (seg.lower() & 0xff, seg.upper() & 0xff);
    if hi_lo == hi_up {
        Some((
            Segment::ranged_unchecked(hi_lo, hi_up, None),
            Segment::ranged_unchecked(lo_lo, lo_up, None),
        ))
    } else if lo_lo == 0 && lo_up == 0xff {
        Some((
            Segment::ranged_unchecked(hi_lo, hi_up, None),
            Segment::ranged_unchecked(0, 0xff, None),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_single_values() {
        let high = Segment::new(1).unwrap();
        let low = Segment::new(2).unwrap();
        let combined = combine_segments(&high, &low).unwrap();
        assert_eq!(combined.value(), Some(0x0102));
    }

    #[test]
    fn combine_ranged_low() {
        let high = Segment::new(1).unwrap();
        let low = Segment::ranged(0, 3, None).unwrap();
        let combined = combine_segments(&high, &low).unwrap();
        assert_eq!((combined.lower(), combined.upper()), (0x0100, 0x0103));
    }

    #[test]
    fn combine_ranged_high_needs_full_low() {
        let high = Segment::ranged(1, 2, None).unwrap();
        let partial = Segment::ranged(0, 3, None).unwrap();
        assert!(combine_segments(&high, &partial).is_err());
        let full = Segment::full();
        let combined = combine_segments(&high, &full).unwrap();
        assert_eq!((combined.lower(), combined.upper()), (0x0100, 0x02ff));
    }

    #[test]
    fn split_round_trip() {
        let seg = Segment::new(0x0102).unwrap();
        let (high, low) = split_segment(&seg).unwrap();
        assert_eq!(high.value(), Some(1));
        assert_eq!(low.value(), Some(2));
    }

    #[test]
    fn split_cross_byte_range() {
        let seg = Segment::ranged(0x0100, 0x02ff, None).unwrap();
        let (high, low) = split_segment(&seg).unwrap();
        assert_eq!((high.lower(), high.upper()), (1, 2));
        assert!(low.is_full_range());
        assert!(split_segment(&Segment::ranged(0x0100, 0x02fe, None).unwrap()).is_none());
    }
}
