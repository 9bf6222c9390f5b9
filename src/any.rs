//! Family-erased sum types over the concrete IPv4/IPv6 values.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use crate::{
    addr,
    af::{Family, Ipv4, Ipv6},
    error::Error,
    num::AddressCount,
    parser::IPAddressString,
    range,
};

macro_rules! delegate {
    ( $( $(#[$attr:meta])* pub fn $name:ident(&self $(, $arg:ident : $ty:ty)*) -> $ret:ty );* $(;)? ) => {
        $(
            $(#[$attr])*
            #[must_use]
            pub fn $name(&self $(, $arg: $ty)*) -> $ret {
                match self {
                    Self::Ipv4(inner) => inner.$name($($arg),*),
                    Self::Ipv6(inner) => inner.$name($($arg),*),
                }
            }
        )*
    }
}

/// An address of either family.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Address {
    Ipv4(addr::Address<Ipv4>),
    Ipv6(addr::Address<Ipv6>),
}

impl Address {
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Self::Ipv4(_) => Family::Ipv4,
            Self::Ipv6(_) => Family::Ipv6,
        }
    }

    #[must_use]
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, Self::Ipv4(_))
    }

    #[must_use]
    pub const fn is_ipv6(&self) -> bool {
        matches!(self, Self::Ipv6(_))
    }

    #[must_use]
    pub fn as_ipv4(&self) -> Option<&addr::Address<Ipv4>> {
        match self {
            Self::Ipv4(inner) => Some(inner),
            Self::Ipv6(_) => None,
        }
    }

    #[must_use]
    pub fn as_ipv6(&self) -> Option<&addr::Address<Ipv6>> {
        match self {
            Self::Ipv4(_) => None,
            Self::Ipv6(inner) => Some(inner),
        }
    }

    delegate! {
        pub fn prefix_len(&self) -> Option<u8>;
        pub fn count(&self) -> AddressCount;
        pub fn is_multiple(&self) -> bool;
        pub fn is_sequential(&self) -> bool;
        pub fn is_prefix_block(&self) -> bool;
        pub fn is_single_prefix_block(&self) -> bool;
        pub fn is_loopback(&self) -> bool;
        pub fn is_link_local(&self) -> bool;
        pub fn is_multicast(&self) -> bool;
        pub fn is_private(&self) -> bool;
        pub fn is_unique_local(&self) -> bool;
        pub fn is_unspecified(&self) -> bool;
        pub fn is_broadcast(&self) -> bool;
        pub fn is_documentation(&self) -> bool;
        pub fn is_benchmarking(&self) -> bool;
        pub fn is_local(&self) -> bool;
    }

    /// The range from the lowest to the highest contained address.
    #[must_use]
    pub fn to_sequential_range(&self) -> SequentialRange {
        match self {
            Self::Ipv4(inner) => SequentialRange::Ipv4(inner.to_sequential_range()),
            Self::Ipv6(inner) => SequentialRange::Ipv6(inner.to_sequential_range()),
        }
    }

    /// Convert to the other family with the default converter, keeping the
    /// value when already there.
    #[must_use]
    pub fn to_canonical_family(&self) -> Self {
        match self {
            Self::Ipv4(_) => self.clone(),
            Self::Ipv6(inner) => inner
                .to_ipv4()
                .map_or_else(|| self.clone(), Self::Ipv4),
        }
    }
}

impl From<addr::Address<Ipv4>> for Address {
    fn from(addr: addr::Address<Ipv4>) -> Self {
        Self::Ipv4(addr)
    }
}

impl From<addr::Address<Ipv6>> for Address {
    fn from(addr: addr::Address<Ipv6>) -> Self {
        Self::Ipv6(addr)
    }
}

impl From<std::net::IpAddr> for Address {
    fn from(addr: std::net::IpAddr) -> Self {
        match addr {
            std::net::IpAddr::V4(v4) => Self::Ipv4(v4.into()),
            std::net::IpAddr::V6(v6) => Self::Ipv6(v6.into()),
        }
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        // IPv4 orders before IPv6, as the narrower family
        match (self, other) {
            (Self::Ipv4(a), Self::Ipv4(b)) => a.cmp(b),
            (Self::Ipv6(a), Self::Ipv6(b)) => a.cmp(b),
            (Self::Ipv4(_), Self::Ipv6(_)) => Ordering::Less,
            (Self::Ipv6(_), Self::Ipv4(_)) => Ordering::Greater,
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IPAddressString::new(s).to_address()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4(inner) => inner.fmt(f),
            Self::Ipv6(inner) => inner.fmt(f),
        }
    }
}

/// A sequential range of either family.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum SequentialRange {
    Ipv4(range::SequentialRange<Ipv4>),
    Ipv6(range::SequentialRange<Ipv6>),
}

impl SequentialRange {
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Self::Ipv4(_) => Family::Ipv4,
            Self::Ipv6(_) => Family::Ipv6,
        }
    }

    delegate! {
        pub fn count(&self) -> AddressCount;
        pub fn is_single(&self) -> bool;
    }

    /// The low endpoint, family-erased.
    #[must_use]
    pub fn lower(&self) -> Address {
        match self {
            Self::Ipv4(inner) => Address::Ipv4(inner.lower().clone()),
            Self::Ipv6(inner) => Address::Ipv6(inner.lower().clone()),
        }
    }

    #[must_use]
    pub fn upper(&self) -> Address {
        match self {
            Self::Ipv4(inner) => Address::Ipv4(inner.upper().clone()),
            Self::Ipv6(inner) => Address::Ipv6(inner.upper().clone()),
        }
    }
}

impl From<range::SequentialRange<Ipv4>> for SequentialRange {
    fn from(r: range::SequentialRange<Ipv4>) -> Self {
        Self::Ipv4(r)
    }
}

impl From<range::SequentialRange<Ipv6>> for SequentialRange {
    fn from(r: range::SequentialRange<Ipv6>) -> Self {
        Self::Ipv6(r)
    }
}

impl fmt::Display for SequentialRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4(inner) => inner.fmt(f),
            Self::Ipv6(inner) => inner.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_dispatch() {
        let v4: Address = "10.1.1.1".parse().unwrap();
        assert!(v4.is_ipv4());
        assert_eq!(v4.family(), Family::Ipv4);
        let v6: Address = "2001:db8::1".parse().unwrap();
        assert!(v6.is_ipv6());
        assert_eq!(v6.family(), Family::Ipv6);
    }

    #[test]
    fn delegated_predicates() {
        let v4: Address = "127.0.0.1".parse().unwrap();
        assert!(v4.is_loopback());
        let v6: Address = "ff02::1".parse().unwrap();
        assert!(v6.is_multicast());
    }

    #[test]
    fn mapped_value_canonicalises_to_v4() {
        let mapped: Address = "::ffff:1.2.3.4".parse().unwrap();
        let canonical = mapped.to_canonical_family();
        assert!(canonical.is_ipv4());
    }

    #[test]
    fn ipv4_orders_before_ipv6() {
        let v4: Address = "255.255.255.255".parse().unwrap();
        let v6: Address = "::".parse().unwrap();
        assert!(v4 < v6);
    }

    #[test]
    fn std_net_interop() {
        let std_addr: std::net::IpAddr = "192.0.2.7".parse().unwrap();
        let addr = Address::from(std_addr);
        assert!(addr.is_ipv4());
    }
}
