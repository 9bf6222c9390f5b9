//! Number-like primitives backing full-width address values.

use core::fmt::Debug;
use core::hash::Hash;
use core::ops::{BitAnd, BitOr, BitXor, Not, RangeInclusive};

use num_traits::{CheckedAdd, CheckedSub};

/// Underlying integer type used to represent a full-width IP address value.
///
/// The classification ranges carry the literal RFC constants for the
/// predicates exposed on [`Address`][crate::addr::Address]; families without
/// a given class leave the corresponding constant `None`.
pub trait Value:
    Copy
    + Clone
    + Debug
    + Default
    + Hash
    + Eq
    + Ord
    + Send
    + Sync
    + Not<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + CheckedAdd
    + CheckedSub
    + 'static
{
    /// Big-endian byte representation.
    type Octets: AsRef<[u8]> + Copy + Debug + Eq + Hash;

    const BITS: u8;
    const ZERO: Self;
    const ONES: Self;

    const LOCALHOST: Self;
    const UNSPECIFIED: Self;
    /// Subnet-local broadcast, where the family defines one.
    const BROADCAST: Option<Self>;

    const LOOPBACK_RANGE: RangeInclusive<Self>;
    const LINK_LOCAL_RANGE: RangeInclusive<Self>;
    const MULTICAST_RANGE: RangeInclusive<Self>;
    const BENCHMARK_RANGE: RangeInclusive<Self>;
    const DOCUMENTATION_RANGES: &'static [RangeInclusive<Self>];
    const PRIVATE_RANGES: Option<&'static [RangeInclusive<Self>]>;
    const THISNET_RANGE: Option<RangeInclusive<Self>>;
    const ULA_RANGE: Option<RangeInclusive<Self>>;

    fn to_u128(self) -> u128;
    /// Truncating conversion; callers guarantee the value fits `Self::BITS`.
    fn from_u128(value: u128) -> Self;
    fn to_be_bytes(self) -> Self::Octets;
    fn from_be_bytes(octets: Self::Octets) -> Self;
    fn leading_zeros(self) -> u32;
    fn trailing_zeros(self) -> u32;
}

macro_rules! ipv4 {
    ($a:literal, $b:literal, $c:literal, $d:literal) => {
        u32::from_be_bytes([$a, $b, $c, $d])
    };
}

impl Value for u32 {
    type Octets = [u8; 4];

    const BITS: u8 = 32;
    const ZERO: Self = 0;
    const ONES: Self = u32::MAX;

    const LOCALHOST: Self = ipv4!(127, 0, 0, 1);
    const UNSPECIFIED: Self = ipv4!(0, 0, 0, 0);
    const BROADCAST: Option<Self> = Some(ipv4!(255, 255, 255, 255));

    const LOOPBACK_RANGE: RangeInclusive<Self> = ipv4!(127, 0, 0, 0)..=ipv4!(127, 255, 255, 255);
    const LINK_LOCAL_RANGE: RangeInclusive<Self> =
        ipv4!(169, 254, 0, 0)..=ipv4!(169, 254, 255, 255);
    const MULTICAST_RANGE: RangeInclusive<Self> = ipv4!(224, 0, 0, 0)..=ipv4!(239, 255, 255, 255);
    const BENCHMARK_RANGE: RangeInclusive<Self> = ipv4!(198, 18, 0, 0)..=ipv4!(198, 19, 255, 255);
    const DOCUMENTATION_RANGES: &'static [RangeInclusive<Self>] = &[
        ipv4!(192, 0, 2, 0)..=ipv4!(192, 0, 2, 255),
        ipv4!(198, 51, 100, 0)..=ipv4!(198, 51, 100, 255),
        ipv4!(203, 0, 113, 0)..=ipv4!(203, 0, 113, 255),
    ];
    const PRIVATE_RANGES: Option<&'static [RangeInclusive<Self>]> = Some(&[
        ipv4!(10, 0, 0, 0)..=ipv4!(10, 255, 255, 255),
        ipv4!(172, 16, 0, 0)..=ipv4!(172, 31, 255, 255),
        ipv4!(192, 168, 0, 0)..=ipv4!(192, 168, 255, 255),
    ]);
    const THISNET_RANGE: Option<RangeInclusive<Self>> =
        Some(ipv4!(0, 0, 0, 0)..=ipv4!(0, 255, 255, 255));
    const ULA_RANGE: Option<RangeInclusive<Self>> = None;

    fn to_u128(self) -> u128 {
        u128::from(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_u128(value: u128) -> Self {
        value as Self
    }

    fn to_be_bytes(self) -> Self::Octets {
        self.to_be_bytes()
    }

    fn from_be_bytes(octets: Self::Octets) -> Self {
        Self::from_be_bytes(octets)
    }

    fn leading_zeros(self) -> u32 {
        self.leading_zeros()
    }

    fn trailing_zeros(self) -> u32 {
        self.trailing_zeros()
    }
}

impl Value for u128 {
    type Octets = [u8; 16];

    const BITS: u8 = 128;
    const ZERO: Self = 0;
    const ONES: Self = u128::MAX;

    const LOCALHOST: Self = 0x0000_0000_0000_0000_0000_0000_0000_0001;
    const UNSPECIFIED: Self = Self::ZERO;
    const BROADCAST: Option<Self> = None;

    const LOOPBACK_RANGE: RangeInclusive<Self> = 0x1..=0x1;
    const LINK_LOCAL_RANGE: RangeInclusive<Self> =
        0xfe80_0000_0000_0000_0000_0000_0000_0000..=0xfebf_ffff_ffff_ffff_ffff_ffff_ffff_ffff;
    const MULTICAST_RANGE: RangeInclusive<Self> =
        0xff00_0000_0000_0000_0000_0000_0000_0000..=0xffff_ffff_ffff_ffff_ffff_ffff_ffff_ffff;
    const BENCHMARK_RANGE: RangeInclusive<Self> =
        0x2001_0002_0000_0000_0000_0000_0000_0000..=0x2001_0002_0000_ffff_ffff_ffff_ffff_ffff;
    const DOCUMENTATION_RANGES: &'static [RangeInclusive<Self>] =
        &[(0x2001_0db8_0000_0000_0000_0000_0000_0000..=0x2001_0db8_ffff_ffff_ffff_ffff_ffff_ffff)];
    const PRIVATE_RANGES: Option<&'static [RangeInclusive<Self>]> = None;
    const THISNET_RANGE: Option<RangeInclusive<Self>> = None;
    const ULA_RANGE: Option<RangeInclusive<Self>> =
        Some(0xfc00_0000_0000_0000_0000_0000_0000_0000..=0xfdff_ffff_ffff_ffff_ffff_ffff_ffff_ffff);

    fn to_u128(self) -> u128 {
        self
    }

    fn from_u128(value: u128) -> Self {
        value
    }

    fn to_be_bytes(self) -> Self::Octets {
        self.to_be_bytes()
    }

    fn from_be_bytes(octets: Self::Octets) -> Self {
        Self::from_be_bytes(octets)
    }

    fn leading_zeros(self) -> u32 {
        self.leading_zeros()
    }

    fn trailing_zeros(self) -> u32 {
        self.trailing_zeros()
    }
}

/// Split a full-width value into per-segment values, most significant first.
pub(crate) fn to_segment_values<A: crate::af::Afi>(value: u128) -> Vec<u32> {
    let bits = u32::from(A::SEGMENT_BITS);
    (0..A::SEGMENT_COUNT)
        .map(|i| {
            let shift = bits * (A::SEGMENT_COUNT - 1 - i) as u32;
            ((value >> shift) as u32) & A::MAX_SEGMENT
        })
        .collect()
}

/// Join per-segment values into a full-width value.
pub(crate) fn from_segment_values<A: crate::af::Afi>(values: impl IntoIterator<Item = u32>) -> u128 {
    let bits = u32::from(A::SEGMENT_BITS);
    values
        .into_iter()
        .fold(0u128, |acc, v| (acc << bits) | u128::from(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ipv4, Ipv6};

    #[test]
    fn segment_split_round_trip_v4() {
        let v = 0x0102_0304u128;
        let segs = to_segment_values::<Ipv4>(v);
        assert_eq!(segs, vec![1, 2, 3, 4]);
        assert_eq!(from_segment_values::<Ipv4>(segs), v);
    }

    #[test]
    fn segment_split_round_trip_v6() {
        let v = 0x2001_0db8_0000_0000_0000_0000_0000_0001u128;
        let segs = to_segment_values::<Ipv6>(v);
        assert_eq!(segs[0], 0x2001);
        assert_eq!(segs[1], 0x0db8);
        assert_eq!(segs[7], 1);
        assert_eq!(from_segment_values::<Ipv6>(segs), v);
    }

    #[test]
    fn ula_range_covers_fc_and_fd() {
        let range = <u128 as Value>::ULA_RANGE.unwrap();
        assert!(range.contains(&0xfc00_0000_0000_0000_0000_0000_0000_0001));
        assert!(range.contains(&0xfdff_ffff_ffff_ffff_ffff_ffff_ffff_ffff));
        assert!(!range.contains(&0xfe00_0000_0000_0000_0000_0000_0000_0000));
    }
}
