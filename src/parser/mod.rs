//! The two-phase address parser and its cached string handle.

use core::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::{
    addr::Address,
    af::{default_prefix_configuration, Afi, Family, Ipv4, Ipv6, PrefixConfiguration},
    any,
    error::{AddressStringError, Error, IncompatibleAddressError},
    mask::{mask_range, mask_range_extended},
    section::Section,
    segment::Segment,
};

mod options;
pub use self::options::{Ipv4Options, Ipv6Options, ParseOptions, RangeOptions};

mod resolve;
mod tokens;

use self::resolve::{resolve, Resolved, ResolvedBody};
use self::tokens::tokenize;

/// An address literal paired with parse options, caching the parser's
/// decisions and the materialised value.
///
/// The first call that needs the token stream resolves it once; every later
/// call observes the same decisions. Caches are idempotent publications, so
/// shared handles need no external locking.
#[derive(Debug)]
pub struct IPAddressString {
    text: String,
    options: ParseOptions,
    resolved: OnceLock<Result<Resolved, AddressStringError>>,
    address: OnceLock<Result<any::Address, Error>>,
}

impl IPAddressString {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_options(text, ParseOptions::default())
    }

    #[must_use]
    pub fn with_options(text: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            text: text.into(),
            options,
            resolved: OnceLock::new(),
            address: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn resolved(&self) -> Result<&Resolved, AddressStringError> {
        self.resolved
            .get_or_init(|| {
                let tok = tokenize(&self.text, &self.options)?;
                let resolved = resolve(&tok, &self.options)?;
                debug!(input = %self.text, family = %resolved.family, "resolved address literal");
                Ok(resolved)
            })
            .as_ref()
            .map_err(|e| *e)
    }

    /// Run the parser without materialising a value.
    ///
    /// # Errors
    ///
    /// Fails when the literal is not valid under the options.
    pub fn validate(&self) -> Result<(), AddressStringError> {
        self.resolved().map(|_| ())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.resolved().is_ok()
    }

    /// The parsed prefix length, `None` when absent, invalid, or retained
    /// as a mask.
    #[must_use]
    pub fn prefix_length(&self) -> Option<u8> {
        self.resolved().ok().and_then(|r| r.prefix)
    }

    #[must_use]
    pub fn is_prefixed(&self) -> bool {
        self.prefix_length().is_some()
    }

    /// Whether the `/` suffix was a non-contiguous mask rather than a
    /// prefix.
    #[must_use]
    pub fn has_mask(&self) -> bool {
        self.resolved().ok().map_or(false, |r| r.mask.is_some())
    }

    #[must_use]
    pub fn family(&self) -> Option<Family> {
        self.resolved().ok().map(|r| r.family)
    }

    /// Materialise the address, applying any retained mask.
    ///
    /// # Errors
    ///
    /// Fails on an invalid literal, or with
    /// [`IncompatibleAddressError`] when a masked range is not sequential
    /// or a single-segment range has no per-segment form.
    pub fn to_address(&self) -> Result<any::Address, Error> {
        self.address
            .get_or_init(|| {
                let resolved = self.resolved()?;
                let config = self
                    .options
                    .prefix_configuration
                    .unwrap_or_else(default_prefix_configuration);
                match resolved.family {
                    Family::Ipv4 => {
                        build_address::<Ipv4>(resolved, config).map(any::Address::Ipv4)
                    }
                    Family::Ipv6 => build_address::<Ipv6>(resolved, config).map(|addr| {
                        match resolved.zone.clone() {
                            Some(zone) => any::Address::Ipv6(addr.with_zone(zone)),
                            None => any::Address::Ipv6(addr),
                        }
                    }),
                }
            })
            .clone()
    }

    /// Materialise the value as a sequential range.
    ///
    /// # Errors
    ///
    /// As [`to_address`][Self::to_address].
    pub fn to_sequential_range(&self) -> Result<any::SequentialRange, Error> {
        Ok(self.to_address()?.to_sequential_range())
    }

    /// String-level prefix equality: compare the first `p` bits of the
    /// parsed token streams, `p` taken from this literal's prefix.
    ///
    /// The answer is identical whether asked before validation, after
    /// validation, or after materialisation.
    ///
    /// # Errors
    ///
    /// Fails when either literal is invalid.
    pub fn prefix_equals(&self, other: &Self) -> Result<bool, AddressStringError> {
        self.prefix_compare(other, false)
    }

    /// String-level prefix containment, `p` taken from this literal's
    /// prefix.
    ///
    /// # Errors
    ///
    /// Fails when either literal is invalid.
    pub fn prefix_contains(&self, other: &Self) -> Result<bool, AddressStringError> {
        self.prefix_compare(other, true)
    }

    fn prefix_compare(&self, other: &Self, containment: bool) -> Result<bool, AddressStringError> {
        let a = self.resolved()?;
        let b = other.resolved()?;
        if a.family != b.family {
            return Ok(false);
        }
        let (Some(sa), Some(sb)) = (a.segment_intervals(), b.segment_intervals()) else {
            return Ok(false);
        };
        let (seg_bits, seg_count) = match a.family {
            Family::Ipv4 => (8u8, 4usize),
            Family::Ipv6 => (16, 8),
        };
        let p = a
            .prefix
            .unwrap_or(seg_bits * seg_count as u8);
        let result = (0..seg_count).all(|i| {
            let span = {
                let start = i * usize::from(seg_bits);
                if start + usize::from(seg_bits) <= usize::from(p) {
                    None
                } else {
                    Some(usize::from(p).saturating_sub(start) as u8)
                }
            };
            let host_bits = span.map_or(0, |sp| seg_bits - sp);
            let nm = if host_bits >= seg_bits {
                0
            } else {
                !((1u32 << host_bits) - 1)
            };
            let (a_lo, a_hi) = (sa[i].0 & nm, sa[i].1 & nm);
            let (b_lo, b_hi) = (sb[i].0 & nm, sb[i].1 & nm);
            if containment {
                a_lo <= b_lo && b_hi <= a_hi
            } else {
                a_lo == b_lo && a_hi == b_hi
            }
        });
        Ok(result)
    }
}

fn build_address<A: Afi>(
    resolved: &Resolved,
    config: PrefixConfiguration,
) -> Result<Address<A>, Error> {
    let intervals: Vec<(u32, u32)> = match &resolved.body {
        ResolvedBody::Segments(segs) => match resolved.mask {
            None => segs.clone(),
            Some(mask) => {
                let bits = u32::from(A::SEGMENT_BITS);
                segs.iter()
                    .enumerate()
                    .map(|(i, &(lo, hi))| {
                        let shift = bits * (A::SEGMENT_COUNT - 1 - i) as u32;
                        let m = ((mask >> shift) as u32) & A::MAX_SEGMENT;
                        let r = mask_range(u64::from(lo), u64::from(hi), u64::from(m));
                        if r.sequential {
                            Ok((r.lower as u32, r.upper as u32))
                        } else {
                            Err(IncompatibleAddressError::NonSequentialMask)
                        }
                    })
                    .collect::<Result<_, _>>()?
            }
        },
        ResolvedBody::SingleValue { lower, upper } => {
            let (lower, upper) = match resolved.mask {
                None => (*lower, *upper),
                Some(mask) => {
                    let r = if A::BIT_COUNT > 64 {
                        mask_range_extended(*lower, *upper, mask)
                    } else {
                        let r = mask_range(*lower as u64, *upper as u64, mask as u64);
                        crate::mask::MaskedRange {
                            sequential: r.sequential,
                            lower: u128::from(r.lower),
                            upper: u128::from(r.upper),
                        }
                    };
                    if !r.sequential {
                        return Err(IncompatibleAddressError::NonSequentialMask.into());
                    }
                    (r.lower, r.upper)
                }
            };
            resolve::value_range_to_segments(
                lower,
                upper,
                A::SEGMENT_COUNT,
                u32::from(A::SEGMENT_BITS),
            )
            .ok_or(IncompatibleAddressError::NonSequentialRange)?
        }
    };
    let segments: Vec<Segment<A>> = intervals
        .into_iter()
        .map(|(lo, hi)| Segment::ranged_unchecked(lo, hi, None))
        .collect();
    let section = Section::with_config(segments, resolved.prefix, config)?;
    Address::from_section(section).map_err(Error::from)
}

impl fmt::Display for IPAddressString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Clone for IPAddressString {
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            options: self.options.clone(),
            resolved: self.resolved.clone(),
            address: self.address.clone(),
        }
    }
}

impl PartialEq for IPAddressString {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for IPAddressString {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::AddressCount;

    #[test]
    fn block_under_auto_subnet() {
        let s = IPAddressString::new("1.2.3.4/16");
        let addr = s.to_address().unwrap();
        assert_eq!(addr.count(), AddressCount::Count(65536));
        assert!(addr.is_prefix_block());
    }

    #[test]
    fn single_under_explicit_mode() {
        let s = IPAddressString::with_options(
            "1.2.3.4/16",
            ParseOptions::default()
                .prefix_configuration(Some(PrefixConfiguration::PrefixedSubnetsAreExplicit)),
        );
        let addr = s.to_address().unwrap();
        assert_eq!(addr.count(), AddressCount::Count(1));
        assert_eq!(addr.prefix_len(), Some(16));
    }

    #[test]
    fn mapped_equals_grouped() {
        let a = IPAddressString::new("::ffff:1.2.3.4").to_address().unwrap();
        let b = IPAddressString::new("0:0:0:0:0:ffff:102:304")
            .to_address()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn validation_is_cached_and_stable() {
        let s = IPAddressString::new("1.2.3.4/255.255.3.3");
        assert!(s.is_valid());
        assert_eq!(s.prefix_length(), None);
        assert!(s.has_mask());
        assert!(s.is_valid());
    }

    #[test]
    fn masked_parse_applies_mask() {
        let s = IPAddressString::new("1.2.0.0/16");
        let addr = s.to_address().unwrap();
        let masked = IPAddressString::new("1.2.3.4/255.255.0.0")
            .to_address()
            .unwrap();
        // the contiguous netmask became prefix 16, widening to the block
        assert_eq!(addr, masked);
    }

    #[test]
    fn non_sequential_mask_fails_on_demand() {
        // host range under a sparse mask has a non-contiguous image per
        // segment only when the segment range is partial
        let s = IPAddressString::new("0-3.2.3.4/250.255.255.255");
        assert!(s.is_valid());
        assert!(matches!(
            s.to_address(),
            Err(Error::Incompatible(
                IncompatibleAddressError::NonSequentialMask
            ))
        ));
    }

    #[test]
    fn invalid_literal_reported_once() {
        let s = IPAddressString::new("1.2.3.4.5");
        assert!(!s.is_valid());
        assert!(s.to_address().is_err());
    }

    #[test]
    fn range_materialises() {
        let s = IPAddressString::new("1.2.0.0/15");
        let range = s.to_sequential_range().unwrap();
        assert_eq!(range.lower().to_string(), "1.2.0.0");
        assert_eq!(range.upper().to_string(), "1.3.255.255");
    }

    #[test]
    fn prefix_contains_string_level() {
        let outer = IPAddressString::new("1.2.0.0/16");
        let inner = IPAddressString::new("1.2.3.0/24");
        assert!(outer.prefix_contains(&inner).unwrap());
        assert!(!inner.prefix_contains(&outer).unwrap());
        assert!(outer.prefix_equals(&IPAddressString::new("1.2.9.9/16")).unwrap());
    }

    #[test]
    fn prefix_contains_consistent_across_phases() {
        // fresh handles, queried at different lifecycle points
        let early_a = IPAddressString::new("10.128.0.0/9");
        let early_b = IPAddressString::new("10.200.1.1/24");
        let early = early_a.prefix_contains(&early_b).unwrap();

        let late_a = IPAddressString::new("10.128.0.0/9");
        let late_b = IPAddressString::new("10.200.1.1/24");
        late_a.to_address().unwrap();
        late_b.to_address().unwrap();
        let late = late_a.prefix_contains(&late_b).unwrap();
        assert_eq!(early, late);
        assert!(early);
    }

    #[test]
    fn single_segment_scenario() {
        let options = ParseOptions::default()
            .allow_single_segment(true)
            .allow_ipv6(false)
            .ipv4(Ipv4Options::default().inet_aton_extraneous_digits(true));
        let s = IPAddressString::with_options("0xBADC0DE7f000001", options);
        let addr = s.to_address().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1");
    }

    #[test]
    fn zone_carried_to_address() {
        let s = IPAddressString::new("fe80::1%eth0");
        let addr = s.to_address().unwrap();
        let any::Address::Ipv6(v6) = addr else {
            panic!("expected an IPv6 address");
        };
        assert_eq!(v6.zone().map(|z| z.as_str()), Some("eth0"));
    }
}
