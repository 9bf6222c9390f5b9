//! Ranged IP address, subnet and segment types, with a parser covering the
//! wire-compatible notations in practical use and deterministic canonical
//! string producers.
//!
//! Every segment of an [`Address`] may hold a value range, and every value
//! may carry a CIDR prefix; set operations keep the represented sets exact.
//! [`IPAddressString`] accepts dotted-quad, inet_aton, RFC 4291 IPv6 with
//! `::` compression and the mixed trailing quad, scope zones, CIDR and
//! netmask suffixes, wildcards and value ranges.
#![doc(html_root_url = "https://docs.rs/ranged-ip/0.1.0")]

/// IP address values, scope zones and family conversion.
pub mod addr;
/// Address family markers and the prefix-interpretation configuration.
pub mod af;
/// Best-fit allocation of CIDR sub-blocks from a pool.
pub mod alloc;
/// Family-erased sum types.
pub mod any;
/// The error taxonomy.
pub mod error;
/// Canonical and auxiliary string producers.
pub mod fmt;
/// Closed-form reasoning about masked value ranges.
pub mod mask;
/// Address set sizes.
pub mod num;
/// The two-phase literal parser and its options.
pub mod parser;
/// Integer primitives backing address values.
pub mod primitive;
/// Sequential address ranges.
pub mod range;
/// Segment runs with prefix semantics.
pub mod section;
/// The per-segment value atom.
pub mod segment;

pub use crate::{
    addr::{Address, FamilyConverter, MappedConverter, Zone},
    af::{
        default_prefix_configuration, set_default_prefix_configuration, Afi, Family, Ipv4, Ipv6,
        PrefixConfiguration,
    },
    alloc::{AllocatedBlock, PrefixBlockAllocator},
    error::{
        AddressConversionError, AddressStringError, AddressValueError, Error,
        IncompatibleAddressError, NetworkMismatchError, PrefixLengthError, StringErrorKind,
    },
    fmt::{InetAtonRadix, WildcardOptions},
    num::AddressCount,
    parser::{IPAddressString, Ipv4Options, Ipv6Options, ParseOptions, RangeOptions},
    range::SequentialRange,
    section::Section,
    segment::Segment,
};
