//! Deterministic string producers for sections and addresses.

use core::fmt;
use core::fmt::Write as _;

use crate::{
    addr::{convert, Address},
    af::{Afi, Ipv4, Ipv6},
    error::IncompatibleAddressError,
    section::Section,
    segment::Segment,
};

/// Options governing how ranged segments are rendered.
#[derive(Clone, Copy, Debug)]
pub struct WildcardOptions {
    /// Render a full-range segment as `*` instead of `lo-hi`.
    pub wildcard: bool,
    /// Separator between range endpoints.
    pub range_separator: char,
}

impl Default for WildcardOptions {
    fn default() -> Self {
        Self {
            wildcard: true,
            range_separator: '-',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Style {
    Normalized,
    Canonical,
    Compressed,
    Full,
}

struct SegToken {
    text: String,
    is_zero: bool,
}

fn write_value(out: &mut String, v: u32, radix: u32, width: usize) {
    match radix {
        16 => write!(out, "{:0width$x}", v),
        8 => write!(out, "{:0width$o}", v),
        2 => write!(out, "{:0width$b}", v),
        _ => write!(out, "{:0width$}", v),
    }
    .expect("writing to a String cannot fail");
}

fn segment_token<A: Afi>(seg: &Segment<A>, pad: bool, opts: WildcardOptions) -> SegToken {
    let width = if pad { A::SEGMENT_DIGITS } else { 0 };
    let mut text = String::new();
    if seg.is_full_range() && opts.wildcard {
        text.push('*');
    } else {
        write_value(&mut text, seg.lower(), A::DEFAULT_RADIX, width);
        if seg.is_multiple() {
            text.push(opts.range_separator);
            write_value(&mut text, seg.upper(), A::DEFAULT_RADIX, width);
        }
    }
    SegToken {
        is_zero: !seg.is_multiple() && seg.lower() == 0,
        text,
    }
}

/// Tokens for each segment. A prefix block renders its lower (network)
/// values, the host segments showing as zero under the prefix.
fn section_tokens<A: Afi>(section: &Section<A>, style: Style) -> Vec<SegToken> {
    let pad = style == Style::Full;
    let opts = WildcardOptions {
        wildcard: style != Style::Full,
        range_separator: '-',
    };
    if section.is_prefix_block() {
        section
            .segments()
            .iter()
            .map(|seg| {
                let lower = Segment::<A>::ranged_unchecked(seg.lower(), seg.lower(), None);
                segment_token(&lower, pad, opts)
            })
            .collect()
    } else {
        section
            .segments()
            .iter()
            .map(|seg| segment_token(seg, pad, opts))
            .collect()
    }
}

#[derive(Copy, Clone, Default)]
struct Span {
    start: usize,
    length: usize,
}

/// The longest run of zero-valued tokens, leftmost on ties.
fn longest_zero_run(tokens: &[SegToken]) -> Span {
    let mut longest = Span::default();
    let mut current = Span::default();
    tokens.iter().enumerate().for_each(|(i, token)| {
        if token.is_zero {
            if current.length == 0 {
                current.start = i;
            }
            current.length += 1;
            if current.length > longest.length {
                longest = current;
            }
        } else {
            current = Span::default();
        }
    });
    longest
}

fn join_tokens(tokens: &[SegToken], sep: char, out: &mut String) {
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(&token.text);
    }
}

/// Join tokens, compressing the chosen zero run with the double separator.
fn join_compressed(tokens: &[SegToken], run: Span, sep: char, out: &mut String) {
    join_tokens(&tokens[..run.start], sep, out);
    out.push(sep);
    out.push(sep);
    join_tokens(&tokens[run.start + run.length..], sep, out);
}

fn render_body<A: Afi>(section: &Section<A>, style: Style) -> String {
    let tokens = section_tokens(section, style);
    let mut out = String::new();
    let compress = match (A::as_family(), style) {
        (crate::af::Family::Ipv6, Style::Canonical | Style::Compressed) => {
            let run = longest_zero_run(&tokens);
            if run.length >= 2 {
                Some(run)
            } else if run.length == 1
                && style == Style::Compressed
                && run.start > 0
                && run.start + 1 < tokens.len()
            {
                // a lone zero only shortens the string away from the ends
                Some(run)
            } else {
                None
            }
        }
        _ => None,
    };
    match compress {
        Some(run) => join_compressed(&tokens, run, A::SEGMENT_SEPARATOR, &mut out),
        None => join_tokens(&tokens, A::SEGMENT_SEPARATOR, &mut out),
    }
    out
}

fn push_prefix(out: &mut String, prefix: Option<u8>) {
    if let Some(p) = prefix {
        write!(out, "/{}", p).expect("writing to a String cannot fail");
    }
}

/// Split a 16-bit interval into byte intervals, where representable.
fn split_byte_pair(lo: u32, up: u32) -> Option<((u32, u32), (u32, u32))> {
    if lo >> 8 == up >> 8 {
        Some(((lo >> 8, up >> 8), (lo & 0xff, up & 0xff)))
    } else if lo & 0xff == 0 && up & 0xff == 0xff {
        Some(((lo >> 8, up >> 8), (0, 0xff)))
    } else {
        None
    }
}

impl<A: Afi> Section<A> {
    /// The style body, prefix suffix not yet applied.
    pub(crate) fn style_body(&self, style: Style) -> String {
        if style == Style::Canonical {
            if let Some(body) = self.canonical_mapped_body() {
                return body;
            }
        }
        render_body(self, style)
    }

    /// The `::ffff:a.b.c.d` body for IPv4-mapped values, where the mapped
    /// predicate holds and the trailing intervals have a byte-pair form.
    fn canonical_mapped_body(&self) -> Option<String> {
        if A::SEGMENT_BITS != 16 || self.segment_count() != 8 {
            return None;
        }
        let segs = self.segments();
        if segs[..5].iter().any(|s| s.value() != Some(0)) || segs[5].value() != Some(0xffff) {
            return None;
        }
        let as_block = self.is_prefix_block();
        let mut out = String::from("::ffff:");
        for (i, seg) in segs[6..8].iter().enumerate() {
            let (lo, up) = if as_block {
                (seg.lower(), seg.lower())
            } else {
                (seg.lower(), seg.upper())
            };
            let ((hi_lo, hi_up), (lo_lo, lo_up)) = split_byte_pair(lo, up)?;
            for (j, (a, b)) in [(hi_lo, hi_up), (lo_lo, lo_up)].into_iter().enumerate() {
                if i > 0 || j > 0 {
                    out.push('.');
                }
                let octet = Segment::<Ipv4>::ranged_unchecked(a, b, None);
                out.push_str(&segment_token(&octet, false, WildcardOptions::default()).text);
            }
        }
        Some(out)
    }

    /// Each segment in the family's default radix, no compression, ranges
    /// as `lo-hi`, `/p` appended when prefixed.
    #[must_use]
    pub fn to_normalized_string(&self) -> String {
        let mut out = self.style_body(Style::Normalized);
        push_prefix(&mut out, self.prefix_len());
        out
    }

    /// RFC 5952 form for IPv6 (longest zero run of two or more compressed,
    /// leftmost on ties, lowercase), except that an IPv4-mapped value
    /// renders in the mixed `::ffff:a.b.c.d` form; identical to the
    /// normalized form for IPv4.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        let mut out = self.style_body(Style::Canonical);
        push_prefix(&mut out, self.prefix_len());
        out
    }

    /// As canonical, also compressing a lone zero group when that shortens
    /// the string.
    #[must_use]
    pub fn to_compressed_string(&self) -> String {
        let mut out = self.style_body(Style::Compressed);
        push_prefix(&mut out, self.prefix_len());
        out
    }

    /// Every segment padded to the family's fixed digit count, no
    /// compression.
    #[must_use]
    pub fn to_full_string(&self) -> String {
        let mut out = self.style_body(Style::Full);
        push_prefix(&mut out, self.prefix_len());
        out
    }

    /// Normalized rendering under explicit wildcard options.
    #[must_use]
    pub fn to_string_with(&self, opts: WildcardOptions) -> String {
        let tokens: Vec<SegToken> = if self.is_prefix_block() {
            self.segments()
                .iter()
                .map(|seg| {
                    let lower = Segment::<A>::ranged_unchecked(seg.lower(), seg.lower(), None);
                    segment_token(&lower, false, opts)
                })
                .collect()
        } else {
            self.segments()
                .iter()
                .map(|seg| segment_token(seg, false, opts))
                .collect()
        };
        let mut out = String::new();
        join_tokens(&tokens, A::SEGMENT_SEPARATOR, &mut out);
        push_prefix(&mut out, self.prefix_len());
        out
    }

    /// The reverse-DNS name. A prefix bounds the emitted labels to
    /// `ceil(p / label_bits)`; a full-range segment renders as `*` labels.
    ///
    /// # Errors
    ///
    /// Fails when a partially ranged segment falls inside the emitted
    /// labels.
    pub fn to_reverse_dns_string(&self) -> Result<String, IncompatibleAddressError> {
        let mut labels: Vec<String> = Vec::new();
        let label_bits = match A::as_family() {
            crate::af::Family::Ipv4 => 8usize,
            crate::af::Family::Ipv6 => 4,
        };
        let total_labels = usize::from(A::BIT_COUNT) / label_bits;
        let emitted = self.prefix_len().map_or(total_labels, |p| {
            (usize::from(p) + label_bits - 1) / label_bits
        });
        let labels_per_seg = usize::from(A::SEGMENT_BITS) / label_bits;
        'outer: for (i, seg) in self.segments().iter().enumerate() {
            for j in 0..labels_per_seg {
                if i * labels_per_seg + j >= emitted {
                    break 'outer;
                }
                if seg.is_full_range() {
                    labels.push("*".to_owned());
                    continue;
                }
                let Some(v) = seg.value() else {
                    return Err(IncompatibleAddressError::RangeFormat);
                };
                let shift = (labels_per_seg - 1 - j) * label_bits;
                let piece = (v >> shift) & ((1u32 << label_bits) - 1);
                let mut text = String::new();
                write_value(
                    &mut text,
                    piece,
                    if label_bits == 4 { 16 } else { 10 },
                    0,
                );
                labels.push(text);
            }
        }
        labels.reverse();
        let suffix = match A::as_family() {
            crate::af::Family::Ipv4 => "in-addr.arpa",
            crate::af::Family::Ipv6 => "ip6.arpa",
        };
        let mut out = labels.join(".");
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(suffix);
        Ok(out)
    }
}

impl Section<Ipv6> {
    /// The mixed form `x:x:x:x:x:x:d.d.d.d`, compression chosen from the
    /// pure-IPv6 prefix.
    ///
    /// # Errors
    ///
    /// Fails when the trailing segments have no byte-pair product form.
    pub fn to_mixed_string(&self) -> Result<String, IncompatibleAddressError> {
        let tokens = section_tokens(self, Style::Canonical);
        let head = &tokens[..6];
        let mut out = String::new();
        let run = longest_zero_run(head);
        if run.length >= 2 {
            join_compressed(head, run, ':', &mut out);
        } else {
            join_tokens(head, ':', &mut out);
        }
        if !out.ends_with(':') {
            out.push(':');
        }
        let as_block = self.is_prefix_block();
        let mut octets: Vec<Segment<Ipv4>> = Vec::with_capacity(4);
        for seg in &self.segments()[6..8] {
            let seg = if as_block {
                Segment::ranged_unchecked(seg.lower(), seg.lower(), None)
            } else {
                *seg
            };
            let (high, low) =
                convert::split_segment(&seg).ok_or(IncompatibleAddressError::NonSequentialRange)?;
            octets.push(high);
            octets.push(low);
        }
        for (i, octet) in octets.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&segment_token(octet, false, WildcardOptions::default()).text);
        }
        push_prefix(&mut out, self.prefix_len());
        Ok(out)
    }

    /// The UNC literal form: `-` separators, `--` compression, and the
    /// `.ipv6-literal.net` suffix.
    ///
    /// # Errors
    ///
    /// Fails on multi-valued sections, which have no hostname form.
    pub fn to_unc_string(&self) -> Result<String, IncompatibleAddressError> {
        if self.is_multiple() && !self.is_prefix_block() {
            return Err(IncompatibleAddressError::RangeFormat);
        }
        let tokens = section_tokens(self, Style::Canonical);
        let mut out = String::new();
        let run = longest_zero_run(&tokens);
        if run.length >= 2 {
            join_compressed(&tokens, run, '-', &mut out);
        } else {
            join_tokens(&tokens, '-', &mut out);
        }
        Ok(out)
    }
}

/// Radix for the inet_aton style outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InetAtonRadix {
    Decimal,
    Octal,
    Hex,
}

impl Section<Ipv4> {
    /// The inet_aton form with `parts` dot-separated parts (1 to 4), the
    /// last part carrying the joined trailing octets.
    ///
    /// # Errors
    ///
    /// Fails when the joined trailing segments have no single-interval
    /// form, or on a prefix block whose prefix cuts a joined part.
    pub fn to_inet_aton_string(
        &self,
        radix: InetAtonRadix,
        parts: usize,
    ) -> Result<String, IncompatibleAddressError> {
        assert!((1..=4).contains(&parts), "inet_aton takes 1 to 4 parts");
        let segs = self.segments();
        // the joined tail is representable when only its leading octet
        // ranges, the rest covering full octets
        let tail = &segs[parts - 1..];
        if tail
            .iter()
            .skip(1)
            .any(|seg| seg.is_multiple() && !seg.is_full_range())
            || (tail[0].is_multiple() && !tail.iter().skip(1).all(Segment::is_full_range))
        {
            return Err(IncompatibleAddressError::RangeFormat);
        }
        let (r, prefix_text) = match radix {
            InetAtonRadix::Decimal => (10, ""),
            InetAtonRadix::Octal => (8, "0"),
            InetAtonRadix::Hex => (16, "0x"),
        };
        let mut out = String::new();
        for (i, seg) in segs[..parts - 1].iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            if seg.lower() != 0 || r == 10 {
                out.push_str(prefix_text);
            }
            write_value(&mut out, seg.lower(), r, 0);
            if seg.is_multiple() {
                out.push('-');
                if seg.upper() != 0 || r == 10 {
                    out.push_str(prefix_text);
                }
                write_value(&mut out, seg.upper(), r, 0);
            }
        }
        if parts > 1 {
            out.push('.');
        }
        let join_values = |take_upper: bool| {
            tail.iter().fold(0u32, |acc, seg| {
                (acc << 8) | if take_upper { seg.upper() } else { seg.lower() }
            })
        };
        let lower = join_values(false);
        let upper = join_values(true);
        if lower != 0 || r == 10 {
            out.push_str(prefix_text);
        }
        write_value(&mut out, lower, r, 0);
        if upper != lower {
            out.push('-');
            if upper != 0 || r == 10 {
                out.push_str(prefix_text);
            }
            write_value(&mut out, upper, r, 0);
        }
        push_prefix(&mut out, self.prefix_len());
        Ok(out)
    }
}

macro_rules! lift_strings {
    ( $( $(#[$attr:meta])* $name:ident => $style:ident ),* $(,)? ) => {
        impl<A: Afi> Address<A> {
            $(
                $(#[$attr])*
                #[must_use]
                pub fn $name(&self) -> String {
                    let mut out = self.section().style_body(Style::$style);
                    if let Some(zone) = self.zone() {
                        out.push('%');
                        out.push_str(zone.as_str());
                    }
                    push_prefix(&mut out, self.prefix_len());
                    out
                }
            )*
        }
    }
}

lift_strings! {
    /// As [`Section::to_normalized_string`], zone included.
    to_normalized_string => Normalized,
    /// As [`Section::to_canonical_string`], zone included.
    to_canonical_string => Canonical,
    /// As [`Section::to_compressed_string`], zone included.
    to_compressed_string => Compressed,
    /// As [`Section::to_full_string`], zone included.
    to_full_string => Full,
}

impl<A: Afi> Address<A> {
    /// As [`Section::to_reverse_dns_string`]; zones have no reverse-DNS
    /// form and are ignored.
    ///
    /// # Errors
    ///
    /// As [`Section::to_reverse_dns_string`].
    pub fn to_reverse_dns_string(&self) -> Result<String, IncompatibleAddressError> {
        self.section().to_reverse_dns_string()
    }
}

impl Address<Ipv6> {
    /// As [`Section::to_mixed_string`], zone included.
    ///
    /// # Errors
    ///
    /// As [`Section::to_mixed_string`].
    pub fn to_mixed_string(&self) -> Result<String, IncompatibleAddressError> {
        let mut out = self.section().to_mixed_string()?;
        if let Some(zone) = self.zone() {
            // the zone slots in before any prefix suffix
            let suffix = self
                .prefix_len()
                .map(|p| format!("/{}", p))
                .unwrap_or_default();
            out.truncate(out.len() - suffix.len());
            out.push('%');
            out.push_str(zone.as_str());
            out.push_str(&suffix);
        }
        Ok(out)
    }

    /// The UNC hostname, zone separated by `s`.
    ///
    /// # Errors
    ///
    /// As [`Section::to_unc_string`].
    pub fn to_unc_string(&self) -> Result<String, IncompatibleAddressError> {
        let mut out = self.section().to_unc_string()?;
        if let Some(zone) = self.zone() {
            out.push('s');
            out.push_str(zone.as_str());
        }
        out.push_str(".ipv6-literal.net");
        Ok(out)
    }
}

impl Address<Ipv4> {
    /// As [`Section::to_inet_aton_string`].
    ///
    /// # Errors
    ///
    /// As [`Section::to_inet_aton_string`].
    pub fn to_inet_aton_string(
        &self,
        radix: InetAtonRadix,
        parts: usize,
    ) -> Result<String, IncompatibleAddressError> {
        self.section().to_inet_aton_string(radix, parts)
    }
}

impl<A: Afi> fmt::Display for Section<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_normalized_string())
    }
}

impl<A: Afi> fmt::Display for Address<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl<A: Afi> fmt::Debug for Address<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address<{}>({})", A::as_family(), self)
    }
}
