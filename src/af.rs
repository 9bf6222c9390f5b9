use core::fmt;
use core::fmt::Debug;
use core::hash::Hash;
use std::sync::OnceLock;

use crate::primitive;

/// The IPv4 address family.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Ipv4 {}

/// The IPv6 address family.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Ipv6 {}

/// An IP address family, defining the segment geometry and the integer
/// primitive backing full-width values.
pub trait Afi: Copy + Clone + Debug + Hash + Eq + Ord + Send + Sync + 'static {
    /// Big-endian byte representation of a full-width value.
    type Octets: AsRef<[u8]> + Copy + Debug + Eq + Hash;
    /// Integer primitive wide enough for a full address of this family.
    type Primitive: primitive::Value<Octets = Self::Octets>;

    /// Segments in a full address.
    const SEGMENT_COUNT: usize;
    /// Bits per segment.
    const SEGMENT_BITS: u8;
    /// Total bits in a full address.
    const BIT_COUNT: u8 = (Self::SEGMENT_COUNT as u8) * Self::SEGMENT_BITS;
    /// Largest per-segment value.
    const MAX_SEGMENT: u32 = (1 << Self::SEGMENT_BITS) - 1;
    /// Textual separator between segments.
    const SEGMENT_SEPARATOR: char;
    /// Radix of the default textual segment form.
    const DEFAULT_RADIX: u32;
    /// Digits per segment in the full (padded) string form.
    const SEGMENT_DIGITS: usize;

    fn as_family() -> Family;

    /// Recover the concrete variant of a family-erased address.
    fn from_any_address(any: crate::any::Address) -> Option<crate::addr::Address<Self>>;
}

impl Afi for Ipv4 {
    type Octets = [u8; 4];
    type Primitive = u32;

    const SEGMENT_COUNT: usize = 4;
    const SEGMENT_BITS: u8 = 8;
    const SEGMENT_SEPARATOR: char = '.';
    const DEFAULT_RADIX: u32 = 10;
    const SEGMENT_DIGITS: usize = 3;

    fn as_family() -> Family {
        Family::Ipv4
    }

    fn from_any_address(any: crate::any::Address) -> Option<crate::addr::Address<Self>> {
        match any {
            crate::any::Address::Ipv4(addr) => Some(addr),
            crate::any::Address::Ipv6(_) => None,
        }
    }
}

impl Afi for Ipv6 {
    type Octets = [u8; 16];
    type Primitive = u128;

    const SEGMENT_COUNT: usize = 8;
    const SEGMENT_BITS: u8 = 16;
    const SEGMENT_SEPARATOR: char = ':';
    const DEFAULT_RADIX: u32 = 16;
    const SEGMENT_DIGITS: usize = 4;

    fn as_family() -> Family {
        Family::Ipv6
    }

    fn from_any_address(any: crate::any::Address) -> Option<crate::addr::Address<Self>> {
        match any {
            crate::any::Address::Ipv4(_) => None,
            crate::any::Address::Ipv6(addr) => Some(addr),
        }
    }
}

/// Enumeration of concrete address families.
///
/// # Examples
///
/// ``` rust
/// use ip::{Afi, Family, Ipv4, Ipv6};
///
/// assert_eq!(Ipv4::as_family().to_string(), "ipv4");
/// assert_eq!(Ipv6::as_family().to_string(), "ipv6");
/// ```
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Family {
    Ipv4,
    Ipv6,
}

impl Family {
    #[must_use]
    pub const fn bit_count(self) -> u8 {
        match self {
            Self::Ipv4 => 32,
            Self::Ipv6 => 128,
        }
    }

    #[must_use]
    pub const fn segment_count(self) -> usize {
        match self {
            Self::Ipv4 => 4,
            Self::Ipv6 => 8,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4 => f.write_str("ipv4"),
            Self::Ipv6 => f.write_str("ipv6"),
        }
    }
}

/// How a prefix length attached to a value is interpreted.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrefixConfiguration {
    /// Any prefixed address denotes the full block of addresses sharing the
    /// prefix. The historical default.
    #[default]
    AllPrefixedAddressesAreSubnets,
    /// A prefixed address denotes a block only when its host bits are zero,
    /// otherwise a single address with a prefix annotation.
    ZeroHostsAreSubnets,
    /// A prefix length is pure annotation; the value always denotes the
    /// explicitly written address or range.
    PrefixedSubnetsAreExplicit,
}

impl PrefixConfiguration {
    /// Whether a prefixed single address should be widened to its block.
    #[must_use]
    pub(crate) fn implies_subnet(self, host_bits_zero: bool) -> bool {
        match self {
            Self::AllPrefixedAddressesAreSubnets => true,
            Self::ZeroHostsAreSubnets => host_bits_zero,
            Self::PrefixedSubnetsAreExplicit => false,
        }
    }
}

static DEFAULT_PREFIX_CONFIGURATION: OnceLock<PrefixConfiguration> = OnceLock::new();

/// Set the process-wide default prefix configuration.
///
/// May be called at most once, before any value is constructed through an
/// API that does not take an explicit configuration. Returns `false` when
/// the default had already been fixed.
pub fn set_default_prefix_configuration(config: PrefixConfiguration) -> bool {
    DEFAULT_PREFIX_CONFIGURATION.set(config).is_ok()
}

/// The process-wide default prefix configuration.
#[must_use]
pub fn default_prefix_configuration() -> PrefixConfiguration {
    *DEFAULT_PREFIX_CONFIGURATION.get_or_init(PrefixConfiguration::default)
}
