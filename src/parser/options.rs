//! Format-configuration records gating the parser's accepted dialects.

use crate::af::{Family, PrefixConfiguration};

/// Which range notations a segment may carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeOptions {
    /// No wildcard or range syntax.
    NoRange,
    /// `*` only.
    WildcardOnly,
    /// Wildcards and `lo-hi` ranges, reversed bounds rejected.
    NoReverseRange,
    /// Wildcards and ranges, reversed bounds reordered.
    #[default]
    AllowAll,
}

impl RangeOptions {
    pub(crate) fn wildcard_allowed(self) -> bool {
        !matches!(self, Self::NoRange)
    }

    pub(crate) fn range_allowed(self) -> bool {
        matches!(self, Self::NoReverseRange | Self::AllowAll)
    }

    pub(crate) fn reverse_allowed(self) -> bool {
        matches!(self, Self::AllowAll)
    }
}

macro_rules! option_setters {
    ( $( $(#[$attr:meta])* $name:ident : $ty:ty ),* $(,)? ) => {
        $(
            $(#[$attr])*
            #[must_use]
            pub fn $name(mut self, value: $ty) -> Self {
                self.$name = value;
                self
            }
        )*
    }
}

/// The inet_aton dialect switches for IPv4 literals.
#[derive(Clone, Copy, Debug)]
pub struct Ipv4Options {
    pub(crate) allow_binary: bool,
    pub(crate) inet_aton_hex: bool,
    pub(crate) inet_aton_octal: bool,
    pub(crate) inet_aton_leading_zeros: bool,
    pub(crate) inet_aton_joined_segments: bool,
    pub(crate) inet_aton_single_segment_mask: bool,
    pub(crate) inet_aton_extraneous_digits: bool,
    pub(crate) allow_mask: bool,
}

impl Default for Ipv4Options {
    fn default() -> Self {
        Self {
            allow_binary: false,
            inet_aton_hex: true,
            inet_aton_octal: true,
            inet_aton_leading_zeros: false,
            inet_aton_joined_segments: true,
            inet_aton_single_segment_mask: false,
            inet_aton_extraneous_digits: false,
            allow_mask: true,
        }
    }
}

impl Ipv4Options {
    option_setters! {
        /// Accept `0b…` binary segments.
        allow_binary: bool,
        /// Accept `0x…` hexadecimal segments.
        inet_aton_hex: bool,
        /// Accept `0…` octal segments.
        inet_aton_octal: bool,
        /// Accept zero digits after a radix indicator, as in `0x01`.
        inet_aton_leading_zeros: bool,
        /// Accept fewer than four groups, the last spanning the trailing
        /// octets.
        inet_aton_joined_segments: bool,
        /// Accept a single-segment numeric mask after `/` on a
        /// single-segment address.
        inet_aton_single_segment_mask: bool,
        /// Accept a single numeric token longer than the address, truncated
        /// modulo `2^32`.
        inet_aton_extraneous_digits: bool,
        /// Accept an address literal after `/` as a mask.
        allow_mask: bool,
    }
}

/// The IPv6 dialect switches.
#[derive(Clone, Copy, Debug)]
pub struct Ipv6Options {
    pub(crate) allow_binary: bool,
    pub(crate) allow_mixed: bool,
    pub(crate) allow_zone: bool,
    pub(crate) allow_base_85: bool,
    pub(crate) allow_mask: bool,
}

impl Default for Ipv6Options {
    fn default() -> Self {
        Self {
            allow_binary: false,
            allow_mixed: true,
            allow_zone: true,
            allow_base_85: false,
            allow_mask: true,
        }
    }
}

impl Ipv6Options {
    option_setters! {
        /// Accept `0b…` binary segments.
        allow_binary: bool,
        /// Accept the trailing dotted-quad mixed form.
        allow_mixed: bool,
        /// Accept a `%zone` suffix.
        allow_zone: bool,
        /// Accept the RFC 1924 base 85 single-token form.
        allow_base_85: bool,
        /// Accept an address literal after `/` as a mask.
        allow_mask: bool,
    }
}

/// Top-level parse options.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub(crate) allow_empty: bool,
    pub(crate) allow_single_segment: bool,
    pub(crate) allow_all: bool,
    pub(crate) range_options: RangeOptions,
    pub(crate) allow_leading_zeros: bool,
    pub(crate) allow_unlimited_leading_zeros: bool,
    pub(crate) allow_wildcarded_separator: bool,
    pub(crate) allow_prefixes_beyond_address_size: bool,
    pub(crate) allow_prefix_length_leading_zeros: bool,
    pub(crate) allow_ipv4: bool,
    pub(crate) allow_ipv6: bool,
    pub(crate) preferred_family: Option<Family>,
    pub(crate) ipv4: Ipv4Options,
    pub(crate) ipv6: Ipv6Options,
    pub(crate) prefix_configuration: Option<PrefixConfiguration>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_empty: false,
            allow_single_segment: false,
            allow_all: false,
            range_options: RangeOptions::default(),
            allow_leading_zeros: true,
            allow_unlimited_leading_zeros: false,
            allow_wildcarded_separator: true,
            allow_prefixes_beyond_address_size: false,
            allow_prefix_length_leading_zeros: true,
            allow_ipv4: true,
            allow_ipv6: true,
            preferred_family: None,
            ipv4: Ipv4Options::default(),
            ipv6: Ipv6Options::default(),
            prefix_configuration: None,
        }
    }
}

impl ParseOptions {
    option_setters! {
        /// Resolve the empty string to the loopback address.
        allow_empty: bool,
        /// Accept a bare integer as a single-segment address.
        allow_single_segment: bool,
        /// Accept the lone `*` as all addresses.
        allow_all: bool,
        /// Range notations accepted within segments.
        range_options: RangeOptions,
        /// Accept a leading zero ahead of a segment value.
        allow_leading_zeros: bool,
        /// Put no bound on the number of leading zeros.
        allow_unlimited_leading_zeros: bool,
        /// Let a trailing `*` stand for every remaining segment.
        allow_wildcarded_separator: bool,
        /// Clamp `/n` beyond the address size instead of rejecting it.
        allow_prefixes_beyond_address_size: bool,
        /// Accept `/01` as `/1`.
        allow_prefix_length_leading_zeros: bool,
        /// Accept IPv4 literals.
        allow_ipv4: bool,
        /// Accept IPv6 literals.
        allow_ipv6: bool,
        /// Family chosen for literals valid in both, such as `*`.
        preferred_family: Option<Family>,
        /// IPv4 dialect switches.
        ipv4: Ipv4Options,
        /// IPv6 dialect switches.
        ipv6: Ipv6Options,
        /// Prefix interpretation override for constructed values.
        prefix_configuration: Option<PrefixConfiguration>,
    }
}
