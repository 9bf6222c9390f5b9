use core::fmt;

use crate::{
    af::Afi,
    error::{AddressValueError, IncompatibleAddressError},
    mask::{mask_range, or_range},
};

#[allow(clippy::wildcard_imports)]
mod private {
    use super::*;
    use core::marker::PhantomData;

    /// One atom of an address: a single value or an inclusive value range,
    /// with an optional per-segment prefix length.
    #[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
    pub struct Segment<A: Afi> {
        lower: u32,
        upper: u32,
        prefix: Option<u8>,
        _family: PhantomData<A>,
    }

    impl<A: Afi> Segment<A> {
        /// Construct a single-valued segment.
        ///
        /// # Errors
        ///
        /// Fails if `value` exceeds the family's segment maximum.
        pub fn new(value: u32) -> Result<Self, AddressValueError> {
            Self::ranged(value, value, None)
        }

        /// Construct a segment covering `[lower..upper]`.
        ///
        /// # Errors
        ///
        /// Fails if either bound exceeds the segment maximum, the bounds are
        /// reversed, or `prefix` exceeds the segment bit width.
        pub fn ranged(lower: u32, upper: u32, prefix: Option<u8>) -> Result<Self, AddressValueError> {
            if lower > A::MAX_SEGMENT || upper > A::MAX_SEGMENT {
                return Err(AddressValueError::SegmentValue);
            }
            if lower > upper {
                return Err(AddressValueError::ReversedRange);
            }
            if let Some(p) = prefix {
                if p > A::SEGMENT_BITS {
                    return Err(AddressValueError::SegmentPrefix);
                }
            }
            Ok(Self {
                lower,
                upper,
                prefix,
                _family: PhantomData,
            })
        }

        /// Construction path for values already validated by the caller.
        pub(crate) fn ranged_unchecked(lower: u32, upper: u32, prefix: Option<u8>) -> Self {
            debug_assert!(lower <= upper && upper <= A::MAX_SEGMENT);
            debug_assert!(prefix.map_or(true, |p| p <= A::SEGMENT_BITS));
            Self {
                lower,
                upper,
                prefix,
                _family: PhantomData,
            }
        }

        pub const fn lower(&self) -> u32 {
            self.lower
        }

        pub const fn upper(&self) -> u32 {
            self.upper
        }

        /// The per-segment prefix length, where the containing section
        /// assigned one.
        pub const fn segment_prefix(&self) -> Option<u8> {
            self.prefix
        }

        pub(crate) fn with_segment_prefix(self, prefix: Option<u8>) -> Self {
            debug_assert!(prefix.map_or(true, |p| p <= A::SEGMENT_BITS));
            Self { prefix, ..self }
        }
    }
}

pub use self::private::Segment;

impl<A: Afi> Segment<A> {
    /// The full-range segment `[0..max]`.
    #[must_use]
    pub fn full() -> Self {
        Self::ranged_unchecked(0, A::MAX_SEGMENT, None)
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::ranged_unchecked(0, 0, None)
    }

    /// `true` when the segment covers more than one value.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.lower() < self.upper()
    }

    #[must_use]
    pub fn is_full_range(&self) -> bool {
        self.lower() == 0 && self.upper() == A::MAX_SEGMENT
    }

    /// The single value, when there is exactly one.
    #[must_use]
    pub fn value(&self) -> Option<u32> {
        (!self.is_multiple()).then(|| self.lower())
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        u64::from(self.upper() - self.lower()) + 1
    }

    #[must_use]
    pub fn matches(&self, value: u32) -> bool {
        self.lower() <= value && value <= self.upper()
    }

    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.lower() <= other.lower() && other.upper() <= self.upper()
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.lower() <= other.upper() && other.lower() <= self.upper()
    }

    /// Intersection of the two value intervals; `None` when disjoint. The
    /// result carries no segment prefix.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let lower = self.lower().max(other.lower());
        let upper = self.upper().min(other.upper());
        (lower <= upper).then(|| Self::ranged_unchecked(lower, upper, None))
    }

    /// The network mask of a prefix of `p` bits within this segment.
    #[must_use]
    pub fn network_mask(p: u8) -> u32 {
        debug_assert!(p <= A::SEGMENT_BITS);
        (!0u32 ^ Self::host_mask(p)) & A::MAX_SEGMENT
    }

    /// The host mask complementing a prefix of `p` bits.
    #[must_use]
    pub fn host_mask(p: u8) -> u32 {
        debug_assert!(p <= A::SEGMENT_BITS);
        if p >= A::SEGMENT_BITS {
            0
        } else {
            (1u32 << (A::SEGMENT_BITS - p)) - 1
        }
    }

    /// Whether the interval is a union of aligned blocks of host size
    /// `2^(bits - p)`, i.e. the lower bound starts a block and the upper
    /// bound ends one.
    #[must_use]
    pub fn is_prefix_block(&self, p: u8) -> bool {
        let hm = Self::host_mask(p);
        self.lower() & hm == 0 && self.upper() & hm == hm
    }

    /// Whether the interval is exactly one aligned block of host size
    /// `2^(bits - p)`.
    #[must_use]
    pub fn is_single_prefix_block(&self, p: u8) -> bool {
        self.is_prefix_block(p) && (self.lower() ^ self.upper()) & Self::network_mask(p) == 0
    }

    /// Round the interval outward to prefix-block boundaries at `p` bits.
    #[must_use]
    pub fn to_prefix_block(&self, p: u8) -> Self {
        let hm = Self::host_mask(p);
        Self::ranged_unchecked(self.lower() & !hm, self.upper() | hm, self.segment_prefix())
    }

    /// Pointwise AND with `mask`.
    ///
    /// # Errors
    ///
    /// Fails when the masked image of a ranged segment is not a contiguous
    /// interval.
    pub fn mask(&self, mask: u32) -> Result<Self, IncompatibleAddressError> {
        let r = mask_range(u64::from(self.lower()), u64::from(self.upper()), u64::from(mask));
        if r.sequential {
            Ok(Self::ranged_unchecked(r.lower as u32, r.upper as u32, None))
        } else {
            Err(IncompatibleAddressError::NonSequentialMask)
        }
    }

    /// Pointwise OR with `mask`, the dual of [`mask`][Self::mask].
    ///
    /// # Errors
    ///
    /// Fails when the resulting image of a ranged segment is not contiguous.
    pub fn bitwise_or(&self, mask: u32) -> Result<Self, IncompatibleAddressError> {
        let r = or_range(u64::from(self.lower()), u64::from(self.upper()), u64::from(mask));
        if r.sequential {
            Ok(Self::ranged_unchecked(r.lower as u32, r.upper as u32, None))
        } else {
            Err(IncompatibleAddressError::NonSequentialMask)
        }
    }

    /// Reverse the bit order of the segment value.
    ///
    /// # Errors
    ///
    /// Fails on a ranged segment unless the range is symmetric under the
    /// reversal, which for segment intervals means the full range.
    pub fn reverse_bits(&self) -> Result<Self, IncompatibleAddressError> {
        if self.is_full_range() {
            return Ok(*self);
        }
        match self.value() {
            Some(v) => {
                let reversed = v.reverse_bits() >> (32 - u32::from(A::SEGMENT_BITS));
                Ok(Self::ranged_unchecked(reversed, reversed, None))
            }
            None => Err(IncompatibleAddressError::ReversedBitsRange),
        }
    }

    /// Reverse the bit order within each byte of the segment value.
    ///
    /// # Errors
    ///
    /// Fails on a ranged segment unless the range is the full segment range.
    pub fn reverse_bits_per_byte(&self) -> Result<Self, IncompatibleAddressError> {
        if self.is_full_range() {
            return Ok(*self);
        }
        match self.value() {
            Some(v) => {
                let reversed = if A::SEGMENT_BITS == 8 {
                    u32::from((v as u8).reverse_bits())
                } else {
                    let [hi, lo] = (v as u16).to_be_bytes();
                    u32::from(u16::from_be_bytes([hi.reverse_bits(), lo.reverse_bits()]))
                };
                Ok(Self::ranged_unchecked(reversed, reversed, None))
            }
            None => Err(IncompatibleAddressError::ReversedBitsRange),
        }
    }

    /// Iterate the values of the interval as single-valued segments.
    pub fn iter(&self) -> SegmentIter<A> {
        SegmentIter {
            next: Some(self.lower()),
            upper: self.upper(),
            _family: core::marker::PhantomData,
        }
    }
}

/// Cursor over the values of a segment interval.
#[derive(Clone, Debug)]
pub struct SegmentIter<A: Afi> {
    next: Option<u32>,
    upper: u32,
    // the family only pins the item type
    _family: core::marker::PhantomData<A>,
}

impl<A: Afi> Iterator for SegmentIter<A> {
    type Item = Segment<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.next?;
        self.next = (value < self.upper).then(|| value + 1);
        Some(Segment::ranged_unchecked(value, value, None))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map_or(0, |v| (u64::from(self.upper) - u64::from(v) + 1) as usize);
        (remaining, Some(remaining))
    }
}

impl<A: Afi> ExactSizeIterator for SegmentIter<A> {}

impl<A: Afi> fmt::Display for Segment<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_value = |f: &mut fmt::Formatter<'_>, v: u32| {
            if A::DEFAULT_RADIX == 16 {
                write!(f, "{:x}", v)
            } else {
                write!(f, "{}", v)
            }
        };
        write_value(f, self.lower())?;
        if self.is_multiple() {
            f.write_str("-")?;
            write_value(f, self.upper())?;
        }
        Ok(())
    }
}

impl<A: Afi> fmt::Debug for Segment<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment<{}>({}", A::as_family(), self)?;
        if let Some(p) = self.segment_prefix() {
            write!(f, "/{}", p)?;
        }
        f.write_str(")")
    }
}

#[cfg(any(test, feature = "arbitrary"))]
use proptest::{
    arbitrary::Arbitrary,
    strategy::{BoxedStrategy, Strategy},
};

#[cfg(any(test, feature = "arbitrary"))]
impl<A: Afi> Arbitrary for Segment<A> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        (0..=A::MAX_SEGMENT, 0..=A::MAX_SEGMENT)
            .prop_map(|(a, b)| {
                Self::ranged_unchecked(a.min(b), a.max(b), None)
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ipv4, Ipv6};

    #[test]
    fn value_bounds_enforced() {
        assert!(Segment::<Ipv4>::new(255).is_ok());
        assert_eq!(
            Segment::<Ipv4>::new(256),
            Err(AddressValueError::SegmentValue)
        );
        assert!(Segment::<Ipv6>::new(0xffff).is_ok());
        assert_eq!(
            Segment::<Ipv6>::new(0x1_0000),
            Err(AddressValueError::SegmentValue)
        );
    }

    #[test]
    fn reversed_bounds_rejected() {
        assert_eq!(
            Segment::<Ipv4>::ranged(2, 1, None),
            Err(AddressValueError::ReversedRange)
        );
    }

    #[test]
    fn prefix_bounds_enforced() {
        assert!(Segment::<Ipv4>::ranged(0, 0, Some(8)).is_ok());
        assert_eq!(
            Segment::<Ipv4>::ranged(0, 0, Some(9)),
            Err(AddressValueError::SegmentPrefix)
        );
    }

    #[test]
    fn containment() {
        let outer = Segment::<Ipv4>::ranged(10, 20, None).unwrap();
        let inner = Segment::<Ipv4>::ranged(12, 18, None).unwrap();
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn intersect_disjoint() {
        let a = Segment::<Ipv4>::ranged(0, 4, None).unwrap();
        let b = Segment::<Ipv4>::ranged(5, 9, None).unwrap();
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn intersect_overlapping() {
        let a = Segment::<Ipv4>::ranged(0, 6, None).unwrap();
        let b = Segment::<Ipv4>::ranged(4, 9, None).unwrap();
        let i = a.intersect(&b).unwrap();
        assert_eq!((i.lower(), i.upper()), (4, 6));
    }

    #[test]
    fn prefix_block_tests() {
        let block = Segment::<Ipv4>::ranged(16, 31, None).unwrap();
        assert!(block.is_prefix_block(4));
        assert!(block.is_single_prefix_block(4));
        let double = Segment::<Ipv4>::ranged(16, 47, None).unwrap();
        assert!(double.is_prefix_block(4));
        assert!(!double.is_single_prefix_block(4));
        let offset = Segment::<Ipv4>::ranged(17, 32, None).unwrap();
        assert!(!offset.is_prefix_block(4));
    }

    #[test]
    fn mask_sequential() {
        let seg = Segment::<Ipv4>::ranged(0, 255, None).unwrap();
        let masked = seg.mask(0x03).unwrap();
        assert_eq!((masked.lower(), masked.upper()), (0, 3));
    }

    #[test]
    fn mask_non_sequential() {
        let seg = Segment::<Ipv4>::ranged(0, 3, None).unwrap();
        assert_eq!(
            seg.mask(0x02),
            Err(IncompatibleAddressError::NonSequentialMask)
        );
    }

    #[test]
    fn bitwise_or_high_bits() {
        let seg = Segment::<Ipv4>::ranged(0, 15, None).unwrap();
        let ored = seg.bitwise_or(0xf0).unwrap();
        assert_eq!((ored.lower(), ored.upper()), (0xf0, 0xff));
    }

    #[test]
    fn reverse_single_value() {
        let seg = Segment::<Ipv4>::new(1).unwrap();
        assert_eq!(seg.reverse_bits().unwrap().value(), Some(0x80));
        let seg = Segment::<Ipv6>::new(1).unwrap();
        assert_eq!(seg.reverse_bits().unwrap().value(), Some(0x8000));
    }

    #[test]
    fn reverse_per_byte_v6() {
        let seg = Segment::<Ipv6>::new(0x0180).unwrap();
        assert_eq!(seg.reverse_bits_per_byte().unwrap().value(), Some(0x8001));
    }

    #[test]
    fn reverse_range_rejected() {
        let seg = Segment::<Ipv4>::ranged(1, 2, None).unwrap();
        assert_eq!(
            seg.reverse_bits(),
            Err(IncompatibleAddressError::ReversedBitsRange)
        );
        assert!(Segment::<Ipv4>::full().reverse_bits().is_ok());
    }

    #[test]
    fn iterate_values() {
        let seg = Segment::<Ipv4>::ranged(253, 255, None).unwrap();
        let values: Vec<u32> = seg.iter().map(|s| s.value().unwrap()).collect();
        assert_eq!(values, vec![253, 254, 255]);
    }
}
