use core::cmp::Ordering;
use core::str::FromStr;

use crate::{
    af::{Afi, Ipv4, Ipv6},
    error::{
        AddressValueError, Error, IncompatibleAddressError, PrefixLengthError, StringErrorKind,
    },
    num::AddressCount,
    parser::{IPAddressString, ParseOptions},
    primitive::Value as _,
    section::{Section, SectionIter},
    segment::Segment,
};

pub(crate) mod convert;
pub use self::convert::{FamilyConverter, MappedConverter};

mod zone;
pub use self::zone::Zone;

/// An IP address or subnet of address family `A`: a full-width section
/// plus, for IPv6, an optional scope zone.
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct Address<A: Afi> {
    section: Section<A>,
    zone: Option<Zone>,
}

impl<A: Afi> Address<A> {
    /// Wrap a full-width section.
    ///
    /// # Errors
    ///
    /// Fails when the section is partial.
    pub fn from_section(section: Section<A>) -> Result<Self, AddressValueError> {
        if !section.is_full_width() {
            return Err(AddressValueError::SegmentCount);
        }
        Ok(Self {
            section,
            zone: None,
        })
    }

    pub(crate) fn from_section_zoneless(section: Section<A>) -> Result<Self, AddressValueError> {
        Self::from_section(section)
    }

    /// Construct from per-segment values.
    ///
    /// # Errors
    ///
    /// Fails when the segment count or a prefix length does not fit the
    /// family.
    pub fn from_segments(segments: Vec<Segment<A>>, prefix: Option<u8>) -> Result<Self, Error> {
        let section = Section::new(segments, prefix)?;
        Self::from_section(section).map_err(Error::from)
    }

    /// The single address with the given primitive value.
    #[must_use]
    pub fn from_primitive(value: A::Primitive) -> Self {
        Self {
            section: Section::from_value(value),
            zone: None,
        }
    }

    /// The prefix block `value/p`.
    ///
    /// # Errors
    ///
    /// Fails when `p` exceeds the family bit count.
    pub fn prefix_block_of(value: A::Primitive, p: u8) -> Result<Self, PrefixLengthError> {
        Ok(Self {
            section: Section::prefix_block_of(value, p)?,
            zone: None,
        })
    }

    /// Construct from network-byte-order bytes. Shorter slices are
    /// zero-extended at the high end; longer slices must carry only zero
    /// bytes in the excess.
    ///
    /// # Errors
    ///
    /// Fails when excess leading bytes are non-zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressValueError> {
        let width = usize::from(A::BIT_COUNT) / 8;
        let value = if bytes.len() > width {
            let (extra, rest) = bytes.split_at(bytes.len() - width);
            if extra.iter().any(|&b| b != 0) {
                return Err(AddressValueError::ByteLength);
            }
            rest.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b))
        } else {
            bytes.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b))
        };
        Ok(Self::from_primitive(A::Primitive::from_u128(value)))
    }

    /// As [`from_bytes`][Self::from_bytes], over `bytes[start..end]`.
    ///
    /// # Errors
    ///
    /// Fails when the indices do not select a slice of `bytes`.
    pub fn from_byte_slice(bytes: &[u8], start: usize, end: usize) -> Result<Self, AddressValueError> {
        let slice = bytes
            .get(start..end)
            .ok_or(AddressValueError::ByteLength)?;
        Self::from_bytes(slice)
    }

    /// Network-byte-order bytes of the lowest contained value.
    #[must_use]
    pub fn octets(&self) -> A::Octets {
        self.section.lower_primitive().to_be_bytes()
    }

    #[must_use]
    pub fn section(&self) -> &Section<A> {
        &self.section
    }

    #[must_use]
    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    #[must_use]
    pub fn prefix_len(&self) -> Option<u8> {
        self.section.prefix_len()
    }

    #[must_use]
    pub fn count(&self) -> AddressCount {
        self.section.count()
    }

    #[must_use]
    pub fn prefix_count(&self) -> AddressCount {
        self.section.prefix_count()
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.section.is_multiple()
    }

    #[must_use]
    pub fn is_sequential(&self) -> bool {
        self.section.is_sequential()
    }

    #[must_use]
    pub fn is_prefix_block(&self) -> bool {
        self.section.is_prefix_block()
    }

    #[must_use]
    pub fn is_single_prefix_block(&self) -> bool {
        self.section.is_single_prefix_block()
    }

    #[must_use]
    pub fn lower_primitive(&self) -> A::Primitive {
        self.section.lower_primitive()
    }

    #[must_use]
    pub fn upper_primitive(&self) -> A::Primitive {
        self.section.upper_primitive()
    }

    /// The lowest contained address, zone preserved.
    #[must_use]
    pub fn lower(&self) -> Self {
        Self {
            section: self.section.lower_section(),
            zone: self.zone.clone(),
        }
    }

    #[must_use]
    pub fn upper(&self) -> Self {
        Self {
            section: self.section.upper_section(),
            zone: self.zone.clone(),
        }
    }

    #[must_use]
    pub fn without_prefix(&self) -> Self {
        Self {
            section: self.section.without_prefix(),
            zone: self.zone.clone(),
        }
    }

    fn lift(&self, section: Section<A>) -> Self {
        Self {
            section,
            zone: self.zone.clone(),
        }
    }

    /// Set containment; zones must agree for a zoned operand to be
    /// contained.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.zone == other.zone && self.section.contains(&other.section)
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.zone == other.zone && self.section.overlaps(&other.section)
    }

    #[must_use]
    pub fn prefix_equals(&self, other: &Self) -> bool {
        self.section.prefix_equals(&other.section)
    }

    #[must_use]
    pub fn prefix_contains(&self, other: &Self) -> bool {
        self.section.prefix_contains(&other.section)
    }

    /// Pointwise AND with `mask`.
    ///
    /// # Errors
    ///
    /// As [`Section::mask`].
    pub fn mask(&self, mask: &Self, retain_prefix: bool) -> Result<Self, Error> {
        self.section.mask(&mask.section, retain_prefix).map(|s| self.lift(s))
    }

    /// Mask the network part and attach prefix `p`.
    ///
    /// # Errors
    ///
    /// As [`Section::mask_network`].
    pub fn mask_network(&self, mask: &Self, p: u8) -> Result<Self, Error> {
        self.section.mask_network(&mask.section, p).map(|s| self.lift(s))
    }

    /// Pointwise OR with `mask`.
    ///
    /// # Errors
    ///
    /// As [`Section::bitwise_or`].
    pub fn bitwise_or(&self, mask: &Self, retain_prefix: bool) -> Result<Self, Error> {
        self.section
            .bitwise_or(&mask.section, retain_prefix)
            .map(|s| self.lift(s))
    }

    /// OR the network part and attach prefix `p`.
    ///
    /// # Errors
    ///
    /// As [`Section::bitwise_or_network`].
    pub fn bitwise_or_network(&self, mask: &Self, p: u8) -> Result<Self, Error> {
        self.section
            .bitwise_or_network(&mask.section, p)
            .map(|s| self.lift(s))
    }

    /// Widen to the prefix block at `p`.
    ///
    /// # Errors
    ///
    /// Fails when `p` exceeds the family bit count.
    pub fn to_prefix_block(&self, p: u8) -> Result<Self, PrefixLengthError> {
        self.section.to_prefix_block(p).map(|s| self.lift(s))
    }

    /// The prefix block of the attached prefix, or the address itself when
    /// unprefixed.
    #[must_use]
    pub fn to_prefix_block_of_own(&self) -> Self {
        self.lift(self.section.to_prefix_block_of_own())
    }

    /// Zero the host bits.
    ///
    /// # Errors
    ///
    /// As [`Section::to_zero_host`].
    pub fn to_zero_host(&self) -> Result<Self, IncompatibleAddressError> {
        self.section.to_zero_host().map(|s| self.lift(s))
    }

    /// Set the host bits.
    ///
    /// # Errors
    ///
    /// As [`Section::to_max_host`].
    pub fn to_max_host(&self) -> Result<Self, IncompatibleAddressError> {
        self.section.to_max_host().map(|s| self.lift(s))
    }

    /// The network part of the address, as a partial section.
    #[must_use]
    pub fn network_section(&self, p: u8, with_prefix: bool) -> Section<A> {
        self.section.network_section(p, with_prefix)
    }

    /// The host part of the address, as a partial section.
    #[must_use]
    pub fn host_section(&self, p: u8) -> Section<A> {
        self.section.host_section(p)
    }

    /// Set difference; the zone of `self` carries to every piece.
    ///
    /// # Errors
    ///
    /// As [`Section::subtract`].
    pub fn subtract(&self, other: &Self) -> Result<Vec<Self>, Error> {
        Ok(self
            .section
            .subtract(&other.section)?
            .into_iter()
            .map(|s| self.lift(s))
            .collect())
    }

    /// Minimum CIDR cover of `[lower..upper]`; zones are stripped.
    ///
    /// # Errors
    ///
    /// As [`Section::spanning_prefix_blocks`].
    pub fn spanning_prefix_blocks(lower: &Self, upper: &Self) -> Result<Vec<Self>, Error> {
        Ok(Section::spanning_prefix_blocks(&lower.section, &upper.section)?
            .into_iter()
            .map(|section| Self { section, zone: None })
            .collect())
    }

    /// Minimum sequential cover of `[lower..upper]`; zones are stripped.
    ///
    /// # Errors
    ///
    /// As [`Section::spanning_sequential_blocks`].
    pub fn spanning_sequential_blocks(lower: &Self, upper: &Self) -> Result<Vec<Self>, Error> {
        Ok(
            Section::spanning_sequential_blocks(&lower.section, &upper.section)?
                .into_iter()
                .map(|section| Self { section, zone: None })
                .collect(),
        )
    }

    /// Minimum covering block set of a union of addresses.
    ///
    /// # Errors
    ///
    /// As [`Section::merge_to_prefix_blocks`].
    pub fn merge_to_prefix_blocks(addresses: &[Self]) -> Result<Vec<Self>, Error> {
        let sections: Vec<Section<A>> = addresses.iter().map(|a| a.section.clone()).collect();
        Ok(Section::merge_to_prefix_blocks(&sections)?
            .into_iter()
            .map(|section| Self { section, zone: None })
            .collect())
    }

    /// Step `n` values through the address set.
    ///
    /// # Errors
    ///
    /// As [`Section::increment`].
    pub fn increment(&self, n: i128) -> Result<Self, AddressValueError> {
        self.section.increment(n).map(|s| self.lift(s))
    }

    /// Step the enumeration boundary by `n`.
    ///
    /// # Errors
    ///
    /// As [`Section::increment_boundary`].
    pub fn increment_boundary(&self, n: i128) -> Result<Self, AddressValueError> {
        self.section.increment_boundary(n).map(|s| self.lift(s))
    }

    /// Iterate every contained address.
    #[must_use]
    pub fn iter(&self) -> AddressIter<SectionIter<A>> {
        AddressIter {
            inner: self.section.iter(),
            zone: self.zone.clone(),
        }
    }

    /// Iterate the distinct prefixes.
    #[must_use]
    pub fn prefix_iter(&self) -> AddressIter<crate::section::PrefixIter<A>> {
        AddressIter {
            inner: self.section.prefix_iter(),
            zone: self.zone.clone(),
        }
    }

    /// Iterate whole prefix blocks.
    #[must_use]
    pub fn prefix_block_iter(&self) -> AddressIter<crate::section::PrefixBlockIter<A>> {
        AddressIter {
            inner: self.section.prefix_block_iter(),
            zone: self.zone.clone(),
        }
    }

    /// Iterate the Cartesian product of the first `segment_count` segments.
    #[must_use]
    pub fn block_iter(&self, segment_count: usize) -> AddressIter<crate::section::BlockIter<A>> {
        AddressIter {
            inner: self.section.block_iter(segment_count),
            zone: self.zone.clone(),
        }
    }

    /// Iterate the largest sequential chunks.
    #[must_use]
    pub fn sequential_block_iter(&self) -> AddressIter<crate::section::SequentialBlockIter<A>> {
        AddressIter {
            inner: self.section.sequential_block_iter(),
            zone: self.zone.clone(),
        }
    }

    fn in_range(&self, range: &core::ops::RangeInclusive<A::Primitive>) -> bool {
        range.contains(&self.lower_primitive()) && range.contains(&self.upper_primitive())
    }

    /// Loopback per the family's RFC range (`127.0.0.0/8`, `::1`).
    #[must_use]
    pub fn is_loopback(&self) -> bool {
        self.in_range(&A::Primitive::LOOPBACK_RANGE)
    }

    /// Link-local per RFC 3927 / RFC 4291.
    #[must_use]
    pub fn is_link_local(&self) -> bool {
        self.in_range(&A::Primitive::LINK_LOCAL_RANGE)
    }

    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.in_range(&A::Primitive::MULTICAST_RANGE)
    }

    /// Private per RFC 1918; always false for IPv6.
    #[must_use]
    pub fn is_private(&self) -> bool {
        A::Primitive::PRIVATE_RANGES
            .map_or(false, |ranges| ranges.iter().any(|r| self.in_range(r)))
    }

    /// Unique-local per RFC 4193; always false for IPv4.
    #[must_use]
    pub fn is_unique_local(&self) -> bool {
        A::Primitive::ULA_RANGE
            .as_ref()
            .map_or(false, |r| self.in_range(r))
    }

    #[must_use]
    pub fn is_documentation(&self) -> bool {
        A::Primitive::DOCUMENTATION_RANGES
            .iter()
            .any(|r| self.in_range(r))
    }

    #[must_use]
    pub fn is_benchmarking(&self) -> bool {
        self.in_range(&A::Primitive::BENCHMARK_RANGE)
    }

    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        !self.is_multiple() && self.lower_primitive() == A::Primitive::UNSPECIFIED
    }

    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        A::Primitive::BROADCAST
            .map_or(false, |b| !self.is_multiple() && self.lower_primitive() == b)
    }

    /// Addresses never routed off the local site: loopback, link-local,
    /// RFC 1918 private or unique-local, and the IPv4 "this network" block.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.is_loopback()
            || self.is_link_local()
            || self.is_private()
            || self.is_unique_local()
            || A::Primitive::THISNET_RANGE
                .as_ref()
                .map_or(false, |r| self.in_range(r))
    }
}

impl Address<Ipv4> {
    /// The IPv6 value `::ffff:a.b.c.d`.
    ///
    /// # Errors
    ///
    /// Infallible for single-valued addresses; a ranged address fails when
    /// a byte-pair interval has no 16-bit product form.
    pub fn to_ipv4_mapped(&self) -> Result<Address<Ipv6>, IncompatibleAddressError> {
        let segs = self.section.segments();
        let mut segments = vec![Segment::<Ipv6>::zero(); 5];
        segments.push(Segment::ranged_unchecked(0xffff, 0xffff, None));
        segments.push(convert::combine_segments(&segs[0], &segs[1])?);
        segments.push(convert::combine_segments(&segs[2], &segs[3])?);
        let section = Section::raw(
            segments,
            0,
            self.prefix_len().map(|p| p + 96),
            self.section.prefix_configuration(),
        );
        Ok(Address {
            section,
            zone: None,
        })
    }

    /// Convert with the default IPv4-mapped converter.
    #[must_use]
    pub fn to_ipv6(&self) -> Option<Address<Ipv6>> {
        self.to_ipv6_with(&MappedConverter)
    }

    #[must_use]
    pub fn to_ipv6_with(&self, converter: &impl FamilyConverter) -> Option<Address<Ipv6>> {
        converter.to_ipv6(self)
    }
}

impl Address<Ipv6> {
    /// Attach a scope zone.
    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Drop the scope zone.
    #[must_use]
    pub fn without_zone(mut self) -> Self {
        self.zone = None;
        self
    }

    /// Whether the value lies in `::ffff:0:0/96`.
    #[must_use]
    pub fn is_ipv4_mapped(&self) -> bool {
        let segs = self.section.segments();
        segs[..5].iter().all(|s| s.value() == Some(0)) && segs[5].value() == Some(0xffff)
    }

    /// Convert with the default IPv4-mapped converter.
    #[must_use]
    pub fn to_ipv4(&self) -> Option<Address<Ipv4>> {
        self.to_ipv4_with(&MappedConverter)
    }

    #[must_use]
    pub fn to_ipv4_with(&self, converter: &impl FamilyConverter) -> Option<Address<Ipv4>> {
        converter.to_ipv4(self)
    }
}

/// Adapter lifting a section cursor to addresses, carrying the zone.
#[derive(Clone, Debug)]
pub struct AddressIter<I> {
    inner: I,
    zone: Option<Zone>,
}

impl<A: Afi, I: Iterator<Item = Section<A>>> Iterator for AddressIter<I> {
    type Item = Address<A>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|section| Address {
            section,
            zone: self.zone.clone(),
        })
    }
}

impl<A: Afi> PartialOrd for Address<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: Afi> Ord for Address<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.section.cmp(&other.section).then_with(|| {
            match (self.zone.as_ref(), other.zone.as_ref()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            }
        })
    }
}

impl<A: Afi> FromStr for Address<A> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let options = match A::as_family() {
            crate::af::Family::Ipv4 => ParseOptions::default().allow_ipv6(false),
            crate::af::Family::Ipv6 => ParseOptions::default().allow_ipv4(false),
        };
        let parsed = IPAddressString::with_options(s, options).to_address()?;
        A::from_any_address(parsed).ok_or_else(|| {
            crate::error::AddressStringError::new(StringErrorKind::InvalidCharacter, 0).into()
        })
    }
}

impl From<std::net::Ipv4Addr> for Address<Ipv4> {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Self::from_primitive(addr.into())
    }
}

#[cfg(feature = "ipnet")]
impl From<ipnet::Ipv4Net> for Address<Ipv4> {
    fn from(net: ipnet::Ipv4Net) -> Self {
        Self::prefix_block_of(net.network().into(), net.prefix_len())
            .expect("we trusted `ipnet` to enforce length bounds")
    }
}

#[cfg(feature = "ipnet")]
impl From<ipnet::Ipv6Net> for Address<Ipv6> {
    fn from(net: ipnet::Ipv6Net) -> Self {
        Self::prefix_block_of(net.network().into(), net.prefix_len())
            .expect("we trusted `ipnet` to enforce length bounds")
    }
}

impl From<std::net::Ipv6Addr> for Address<Ipv6> {
    fn from(addr: std::net::Ipv6Addr) -> Self {
        Self::from_primitive(addr.into())
    }
}

impl Address<Ipv4> {
    /// The `std::net` form of a single-valued address.
    #[must_use]
    pub fn to_std(&self) -> Option<std::net::Ipv4Addr> {
        (!self.is_multiple()).then(|| std::net::Ipv4Addr::from(self.lower_primitive()))
    }
}

impl Address<Ipv6> {
    /// The `std::net` form of a single-valued address; the zone is not
    /// representable and is dropped.
    #[must_use]
    pub fn to_std(&self) -> Option<std::net::Ipv6Addr> {
        (!self.is_multiple()).then(|| std::net::Ipv6Addr::from(self.lower_primitive()))
    }
}

#[cfg(any(test, feature = "arbitrary"))]
use proptest::{
    arbitrary::{any, Arbitrary, StrategyFor},
    strategy::{BoxedStrategy, Strategy},
};

#[cfg(any(test, feature = "arbitrary"))]
impl<A: Afi> Arbitrary for Address<A>
where
    A::Primitive: Arbitrary + 'static,
    StrategyFor<A::Primitive>: 'static,
{
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        any::<A::Primitive>().prop_map(Self::from_primitive).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_loopback_is_loopback() {
        assert!("127.0.0.53".parse::<Address<Ipv4>>().unwrap().is_loopback());
    }

    #[test]
    fn ipv6_loopback_is_loopback() {
        assert!("::1".parse::<Address<Ipv6>>().unwrap().is_loopback());
    }

    #[test]
    fn ipv4_private_is_private() {
        assert!("172.18.0.1".parse::<Address<Ipv4>>().unwrap().is_private());
    }

    #[test]
    fn ipv4_unicast_is_not_private() {
        assert!(!"203.0.113.1".parse::<Address<Ipv4>>().unwrap().is_private());
    }

    #[test]
    fn ipv6_ula_is_not_private() {
        assert!(!"fc01::1".parse::<Address<Ipv6>>().unwrap().is_private());
    }

    #[test]
    fn ipv6_ula_is_unique_local() {
        assert!("fc01::1"
            .parse::<Address<Ipv6>>()
            .unwrap()
            .is_unique_local());
    }

    #[test]
    fn ipv4_link_local_is_link_local() {
        assert!("169.254.254.1"
            .parse::<Address<Ipv4>>()
            .unwrap()
            .is_link_local());
    }

    #[test]
    fn ipv6_link_local_is_link_local() {
        assert!("fe80::1".parse::<Address<Ipv6>>().unwrap().is_link_local());
    }

    #[test]
    fn ipv4_multicast_is_multicast() {
        assert!("224.254.0.0"
            .parse::<Address<Ipv4>>()
            .unwrap()
            .is_multicast());
    }

    #[test]
    fn ipv6_multicast_is_multicast() {
        assert!("ff01::1".parse::<Address<Ipv6>>().unwrap().is_multicast());
    }

    #[test]
    fn ipv4_broadcast_is_broadcast() {
        assert!("255.255.255.255"
            .parse::<Address<Ipv4>>()
            .unwrap()
            .is_broadcast());
    }

    #[test]
    fn ipv6_all_ones_is_not_broadcast() {
        assert!(!"ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"
            .parse::<Address<Ipv6>>()
            .unwrap()
            .is_broadcast());
    }

    #[test]
    fn ipv4_private_is_local() {
        assert!("10.0.0.1".parse::<Address<Ipv4>>().unwrap().is_local());
    }

    #[test]
    fn ipv4_thisnet_is_local() {
        assert!("0.1.2.3".parse::<Address<Ipv4>>().unwrap().is_local());
    }

    #[test]
    fn ipv4_global_unicast_is_not_local() {
        assert!(!"1.1.1.1".parse::<Address<Ipv4>>().unwrap().is_local());
    }

    #[test]
    fn ipv6_doc_is_documentation() {
        assert!("2001:db8::1"
            .parse::<Address<Ipv6>>()
            .unwrap()
            .is_documentation());
    }

    #[test]
    fn ipv4_benchmarking() {
        assert!("198.19.0.1"
            .parse::<Address<Ipv4>>()
            .unwrap()
            .is_benchmarking());
    }

    #[test]
    fn unspecified() {
        assert!("0.0.0.0".parse::<Address<Ipv4>>().unwrap().is_unspecified());
        assert!("::".parse::<Address<Ipv6>>().unwrap().is_unspecified());
    }

    #[test]
    fn mapped_conversion_round_trip() {
        let v4: Address<Ipv4> = "1.2.3.4".parse().unwrap();
        let mapped = v4.to_ipv4_mapped().unwrap();
        assert!(mapped.is_ipv4_mapped());
        let back = mapped.to_ipv4().unwrap();
        assert_eq!(back, v4);
    }

    #[test]
    fn unmapped_v6_does_not_convert() {
        let v6: Address<Ipv6> = "2001:db8::1".parse().unwrap();
        assert_eq!(v6.to_ipv4(), None);
    }

    #[test]
    fn byte_round_trip() {
        let v4: Address<Ipv4> = "10.20.30.40".parse().unwrap();
        assert_eq!(Address::from_bytes(&v4.octets()).unwrap(), v4);
    }

    #[test]
    fn short_byte_array_extends_high() {
        let addr = Address::<Ipv4>::from_bytes(&[1, 2]).unwrap();
        assert_eq!(addr.lower_primitive(), 0x0102);
    }

    #[test]
    fn long_byte_array_requires_zero_lead() {
        assert!(Address::<Ipv4>::from_bytes(&[0, 1, 2, 3, 4]).is_ok());
        assert!(Address::<Ipv4>::from_bytes(&[9, 1, 2, 3, 4]).is_err());
    }

    #[test]
    fn byte_slice_selection() {
        let bytes = [0xde, 0xad, 1, 2, 3, 4];
        let addr = Address::<Ipv4>::from_byte_slice(&bytes, 2, 6).unwrap();
        assert_eq!(addr.lower_primitive(), 0x0102_0304);
    }

    #[test]
    fn zones_break_equality() {
        let plain: Address<Ipv6> = "fe80::1".parse().unwrap();
        let zoned = plain.clone().with_zone(Zone::new("eth0").unwrap());
        assert_ne!(plain, zoned);
        assert!(plain < zoned);
    }

    #[test]
    fn zone_survives_masking() {
        let zoned: Address<Ipv6> = "fe80::1".parse::<Address<Ipv6>>().unwrap()
            .with_zone(Zone::new("eth0").unwrap());
        let mask = Address::<Ipv6>::from_primitive(u128::MAX);
        let masked = zoned.mask(&mask, false).unwrap();
        assert_eq!(masked.zone().map(Zone::as_str), Some("eth0"));
    }

    #[test]
    fn ordering_prefers_shorter_prefix() {
        let shorter = Address::<Ipv4>::prefix_block_of(0x0a00_0000, 8).unwrap();
        let longer = Address::<Ipv4>::prefix_block_of(0x0a00_0000, 16).unwrap();
        // same lower value; the wider block covers more and sorts after
        assert!(shorter.section().segments()[1].is_full_range());
        assert_ne!(shorter, longer);
    }

    #[test]
    fn std_net_round_trip() {
        let std_addr: std::net::Ipv4Addr = "192.0.2.1".parse().unwrap();
        let addr = Address::from(std_addr);
        assert_eq!(addr.to_std(), Some(std_addr));
    }
}
