//! Phase two of parsing: classify the recorded token stream, select radixes,
//! expand ranges and wildcards, and resolve the `/` suffix into a prefix
//! length or a mask. Nothing here re-scans the input.

use crate::{
    addr::Zone,
    af::Family,
    error::{AddressStringError, StringErrorKind},
};

use super::{
    options::ParseOptions,
    tokens::{tokenize, Group, Tokenized},
};

/// The value body of a resolved literal.
#[derive(Clone, Debug)]
pub(crate) enum ResolvedBody {
    /// Per-segment intervals, full family width.
    Segments(Vec<(u32, u32)>),
    /// A single-segment token's full-width value interval.
    SingleValue { lower: u128, upper: u128 },
}

/// The parser's decisions for one input, cached by
/// [`IPAddressString`][super::IPAddressString].
#[derive(Clone, Debug)]
pub(crate) struct Resolved {
    pub family: Family,
    pub body: ResolvedBody,
    pub prefix: Option<u8>,
    /// A non-contiguous mask retained from an address-literal suffix,
    /// applied at materialisation.
    pub mask: Option<u128>,
    pub zone: Option<Zone>,
}

impl Resolved {
    /// The body as per-segment intervals; a single-segment interval is
    /// split when it has a product form.
    pub(crate) fn segment_intervals(&self) -> Option<Vec<(u32, u32)>> {
        match &self.body {
            ResolvedBody::Segments(segs) => Some(segs.clone()),
            ResolvedBody::SingleValue { lower, upper } => {
                let (count, bits) = match self.family {
                    Family::Ipv4 => (4usize, 8u32),
                    Family::Ipv6 => (8, 16),
                };
                value_range_to_segments(*lower, *upper, count, bits)
            }
        }
    }
}

/// Split `[l..u]` into per-segment intervals, where the interval is exactly
/// a Cartesian product: leading segments equal, one boundary segment
/// ranging, trailing segments full.
pub(crate) fn value_range_to_segments(
    l: u128,
    u: u128,
    count: usize,
    bits: u32,
) -> Option<Vec<(u32, u32)>> {
    let max = (1u32 << bits) - 1;
    let seg = |value: u128, i: usize| -> u32 {
        ((value >> (bits * (count - 1 - i) as u32)) as u32) & max
    };
    let mut out = Vec::with_capacity(count);
    let mut boundary_seen = false;
    for i in 0..count {
        let (lo, up) = (seg(l, i), seg(u, i));
        if boundary_seen {
            if lo != 0 || up != max {
                return None;
            }
            out.push((0, max));
        } else {
            if lo != up {
                boundary_seen = true;
            }
            out.push((lo, up));
        }
    }
    Some(out)
}

/// Radix and leading-zero context for the groups of one family position.
struct SegmentDialect {
    default_radix: u32,
    /// Digits of the default radix needed for the largest value.
    max_digits: usize,
    allow_hex_indicator: bool,
    allow_octal: bool,
    allow_binary: bool,
    allow_indicator_zeros: bool,
    allow_sql: bool,
}

impl SegmentDialect {
    fn ipv4(options: &ParseOptions, max: u128) -> Self {
        Self {
            default_radix: 10,
            max_digits: digits_for(max, 10),
            allow_hex_indicator: options.ipv4.inet_aton_hex,
            allow_octal: options.ipv4.inet_aton_octal,
            allow_binary: options.ipv4.allow_binary,
            allow_indicator_zeros: options.ipv4.inet_aton_leading_zeros,
            allow_sql: true,
        }
    }

    fn ipv6(options: &ParseOptions, max: u128) -> Self {
        Self {
            default_radix: 16,
            max_digits: digits_for(max, 16),
            allow_hex_indicator: false,
            allow_octal: false,
            allow_binary: options.ipv6.allow_binary,
            allow_indicator_zeros: false,
            allow_sql: false,
        }
    }

    /// The mixed-form trailing quad: plain decimal octets only.
    fn mixed(_options: &ParseOptions) -> Self {
        Self {
            default_radix: 10,
            max_digits: 3,
            allow_hex_indicator: false,
            allow_octal: false,
            allow_binary: false,
            allow_indicator_zeros: false,
            allow_sql: false,
        }
    }
}

fn digits_for(max: u128, radix: u128) -> usize {
    let mut digits = 1;
    let mut top = radix - 1;
    while top < max {
        top = top * radix + (radix - 1);
        digits += 1;
    }
    digits
}

fn digit_value(b: u8, radix: u32) -> Option<u32> {
    let v = match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        b'a'..=b'f' => u32::from(b - b'a') + 10,
        b'A'..=b'F' => u32::from(b - b'A') + 10,
        _ => return None,
    };
    (v < radix).then_some(v)
}

/// Parse one numeric token into a value no greater than `max`.
///
/// With `extraneous` set the digit-count cap is waived and the value wraps
/// modulo `2^32`.
fn parse_value(
    text: &str,
    off: usize,
    max: u128,
    dialect: &SegmentDialect,
    options: &ParseOptions,
    extraneous: bool,
) -> Result<u128, AddressStringError> {
    let err = |kind, at| Err(AddressStringError::new(kind, at));
    if text.is_empty() {
        return err(StringErrorKind::InvalidSegmentValue, off);
    }
    let bytes = text.as_bytes();
    let (radix, digits, indicator) = if bytes.len() > 2 && (bytes[..2] == *b"0x" || bytes[..2] == *b"0X")
    {
        if !dialect.allow_hex_indicator {
            return err(StringErrorKind::InvalidRadix, off);
        }
        (16u32, &text[2..], true)
    } else if bytes.len() > 2 && (bytes[..2] == *b"0b" || bytes[..2] == *b"0B") && dialect.allow_binary
    {
        (2, &text[2..], true)
    } else if bytes.len() > 1 && bytes[0] == b'0' && dialect.allow_octal {
        (8, &text[1..], true)
    } else {
        (dialect.default_radix, text, false)
    };
    if digits.is_empty() {
        return err(StringErrorKind::InvalidSegmentValue, off);
    }
    if digits.len() > 1 && digits.starts_with('0') {
        let allowed = if indicator {
            dialect.allow_indicator_zeros
        } else {
            options.allow_leading_zeros
        };
        if !allowed {
            return err(StringErrorKind::LeadingZerosNotAllowed, off);
        }
    }
    if !extraneous && !options.allow_unlimited_leading_zeros {
        let cap = match radix {
            16 => digits_for(max, 16),
            8 => digits_for(max, 8),
            2 => digits_for(max, 2),
            _ => dialect.max_digits,
        };
        if digits.len() > cap {
            return err(StringErrorKind::InvalidSegmentValue, off);
        }
    }
    let mut value: u128 = 0;
    for (i, &b) in digits.as_bytes().iter().enumerate() {
        let Some(d) = digit_value(b, radix) else {
            return err(StringErrorKind::InvalidCharacter, off + i);
        };
        value = value
            .checked_mul(u128::from(radix))
            .and_then(|v| v.checked_add(u128::from(d)))
            .ok_or(AddressStringError::new(
                StringErrorKind::InvalidSegmentValue,
                off,
            ))?;
        if extraneous {
            value &= u128::from(u32::MAX);
        } else if value > max {
            return err(StringErrorKind::InvalidSegmentValue, off);
        }
    }
    Ok(value)
}

/// Parse one group into a value interval, expanding wildcards, ranges and
/// SQL wildcards.
fn parse_interval(
    group: &Group<'_>,
    max: u128,
    dialect: &SegmentDialect,
    options: &ParseOptions,
) -> Result<(u128, u128), AddressStringError> {
    let err = |kind, at| Err(AddressStringError::new(kind, at));
    let text = group.text;
    let off = group.start;
    let ranges = options.range_options;
    if text == "*" {
        return if ranges.wildcard_allowed() {
            Ok((0, max))
        } else {
            err(StringErrorKind::RangeNotAllowed, off)
        };
    }
    if let Some(pos) = text.find('-') {
        if !ranges.range_allowed() {
            return err(StringErrorKind::RangeNotAllowed, off + pos);
        }
        let (lo_text, hi_text) = (&text[..pos], &text[pos + 1..]);
        let lo = if lo_text.is_empty() {
            0
        } else {
            parse_value(lo_text, off, max, dialect, options, false)?
        };
        let hi = if hi_text.is_empty() {
            max
        } else {
            parse_value(hi_text, off + pos + 1, max, dialect, options, false)?
        };
        return if lo <= hi {
            Ok((lo, hi))
        } else if ranges.reverse_allowed() {
            Ok((hi, lo))
        } else {
            err(StringErrorKind::RangeNotAllowed, off)
        };
    }
    if dialect.allow_sql && text.ends_with('%') {
        if !ranges.wildcard_allowed() {
            return err(StringErrorKind::RangeNotAllowed, off);
        }
        let base = &text[..text.len() - 1];
        if base.is_empty() {
            return Ok((0, max));
        }
        let d = parse_value(base, off, max, dialect, options, false)?;
        return sql_expansion(d, base.len(), max, dialect.default_radix, off);
    }
    if dialect.allow_sql && text.ends_with('_') {
        if !ranges.wildcard_allowed() {
            return err(StringErrorKind::RangeNotAllowed, off);
        }
        let wildcards = text.len() - text.trim_end_matches('_').len();
        let base = &text[..text.len() - wildcards];
        if base.is_empty() {
            return err(StringErrorKind::InvalidSegmentValue, off);
        }
        let d = parse_value(base, off, max, dialect, options, false)?;
        let r = u128::from(dialect.default_radix);
        let scale = r.pow(wildcards as u32);
        let lo = d * scale;
        let hi = lo + scale - 1;
        return if hi <= max {
            Ok((lo, hi))
        } else {
            err(StringErrorKind::InvalidSegmentValue, off)
        };
    }
    let v = parse_value(text, off, max, dialect, options, false)?;
    Ok((v, v))
}

/// `d%` stands for `d` followed by zero or more digits; the match set is
/// accepted only when it forms one contiguous interval.
fn sql_expansion(
    d: u128,
    digits: usize,
    max: u128,
    radix: u32,
    off: usize,
) -> Result<(u128, u128), AddressStringError> {
    let r = u128::from(radix);
    let mut intervals = vec![(d, d)];
    let mut scale = 1u128;
    for _ in digits..digits_for(max, r) {
        scale *= r;
        let lo = d * scale;
        if lo > max {
            break;
        }
        let hi = (lo + scale - 1).min(max);
        intervals.push((lo, hi));
    }
    intervals.sort_unstable();
    let contiguous = intervals
        .windows(2)
        .all(|w| w[0].1 + 1 >= w[1].0);
    if contiguous {
        Ok((intervals[0].0, intervals.last().unwrap().1))
    } else {
        Err(AddressStringError::new(StringErrorKind::RangeNotAllowed, off))
    }
}

/// Resolve a tokenized literal under the given options.
pub(crate) fn resolve(
    tok: &Tokenized<'_>,
    options: &ParseOptions,
) -> Result<Resolved, AddressStringError> {
    if tok.is_empty() {
        return resolve_empty(options);
    }
    if tok.has_colon {
        resolve_ipv6(tok, options)
    } else if tok.has_dot {
        resolve_ipv4(tok, options)
    } else {
        resolve_single(tok, options)
    }
}

fn resolve_empty(options: &ParseOptions) -> Result<Resolved, AddressStringError> {
    if !options.allow_empty {
        return Err(AddressStringError::new(StringErrorKind::Empty, 0));
    }
    let prefer_v6 = options.preferred_family == Some(Family::Ipv6) || !options.allow_ipv4;
    if prefer_v6 && options.allow_ipv6 {
        Ok(Resolved {
            family: Family::Ipv6,
            body: ResolvedBody::SingleValue { lower: 1, upper: 1 },
            prefix: None,
            mask: None,
            zone: None,
        })
    } else if options.allow_ipv4 {
        Ok(Resolved {
            family: Family::Ipv4,
            body: ResolvedBody::Segments(vec![(127, 127), (0, 0), (0, 0), (1, 1)]),
            prefix: None,
            mask: None,
            zone: None,
        })
    } else {
        Err(AddressStringError::new(StringErrorKind::Empty, 0))
    }
}

fn resolve_ipv4(tok: &Tokenized<'_>, options: &ParseOptions) -> Result<Resolved, AddressStringError> {
    let err = |kind, at| Err(AddressStringError::new(kind, at));
    if !options.allow_ipv4 {
        return err(StringErrorKind::ConflictingDialectOptions, 0);
    }
    let groups = &tok.groups;
    if groups.len() > 4 {
        return err(StringErrorKind::TooManySegments, groups[4].start);
    }
    let n = groups.len();
    let octet = SegmentDialect::ipv4(options, 255);
    let mut segments: Vec<(u32, u32)> = Vec::with_capacity(4);
    let wildcard_tail = n < 4
        && groups[n - 1].text == "*"
        && options.allow_wildcarded_separator
        && options.range_options.wildcard_allowed();
    if n == 4 || wildcard_tail {
        for group in &groups[..n - 1] {
            let (lo, hi) = parse_interval(group, 255, &octet, options)?;
            segments.push((lo as u32, hi as u32));
        }
        if wildcard_tail {
            segments.extend((segments.len()..4).map(|_| (0u32, 255u32)));
        } else {
            let (lo, hi) = parse_interval(&groups[3], 255, &octet, options)?;
            segments.push((lo as u32, hi as u32));
        }
    } else {
        // inet_aton joined trailing segments
        if !options.ipv4.inet_aton_joined_segments {
            return err(StringErrorKind::TooFewSegments, groups[n - 1].start);
        }
        for group in &groups[..n - 1] {
            let (lo, hi) = parse_interval(group, 255, &octet, options)?;
            segments.push((lo as u32, hi as u32));
        }
        let spanned = 4 - (n - 1);
        let max = (1u128 << (8 * spanned)) - 1;
        let joined = SegmentDialect::ipv4(options, max);
        let (lo, hi) = parse_interval(&groups[n - 1], max, &joined, options)?;
        let Some(tail) = value_range_to_segments(lo, hi, spanned, 8) else {
            return err(StringErrorKind::InvalidSegmentValue, groups[n - 1].start);
        };
        segments.extend(tail);
    }
    let (prefix, mask) = resolve_suffix(tok, Family::Ipv4, options, false)?;
    Ok(Resolved {
        family: Family::Ipv4,
        body: ResolvedBody::Segments(segments),
        prefix,
        mask,
        zone: None,
    })
}

fn resolve_ipv6(tok: &Tokenized<'_>, options: &ParseOptions) -> Result<Resolved, AddressStringError> {
    let err = |kind, at| Err(AddressStringError::new(kind, at));
    if !options.allow_ipv6 {
        return err(StringErrorKind::ConflictingDialectOptions, 0);
    }
    let zone = match tok.zone {
        None => None,
        Some((off, text)) => {
            if !options.ipv6.allow_zone {
                return err(StringErrorKind::InvalidZone, off);
            }
            Some(Zone::new(text).map_err(|e| {
                AddressStringError::new(StringErrorKind::InvalidZone, off + e.index)
            })?)
        }
    };
    let groups = &tok.groups;
    let first_dotted = groups.iter().position(|g| g.after_dot);
    let (colon_groups, mixed_segments) = match first_dotted {
        None => (&groups[..], Vec::new()),
        Some(idx) => {
            if !options.ipv6.allow_mixed || idx == 0 {
                return err(
                    StringErrorKind::MixedFormInvalid,
                    groups.get(idx).map_or(0, |g| g.start),
                );
            }
            let quad = &groups[idx - 1..];
            if quad.len() != 4 {
                return err(StringErrorKind::MixedFormInvalid, quad[0].start);
            }
            let dialect = SegmentDialect::mixed(options);
            let mut octets: Vec<(u32, u32)> = Vec::with_capacity(4);
            for group in quad {
                let (lo, hi) = parse_interval(group, 255, &dialect, options)?;
                octets.push((lo as u32, hi as u32));
            }
            let mut segs = Vec::with_capacity(2);
            for pair in octets.chunks(2) {
                let ((hi_lo, hi_up), (lo_lo, lo_up)) = (pair[0], pair[1]);
                // a ranged high byte needs a full low byte for a 16-bit form
                if hi_lo != hi_up && !(lo_lo == 0 && lo_up == 255) {
                    return err(StringErrorKind::MixedFormInvalid, quad[0].start);
                }
                segs.push(((hi_lo << 8) | lo_lo, (hi_up << 8) | lo_up));
            }
            (&groups[..idx - 1], segs)
        }
    };
    if let Some(dc) = tok.double_colon {
        if dc > colon_groups.len() {
            return err(StringErrorKind::MixedFormInvalid, tok.input.len());
        }
    }
    let provided = colon_groups.len() + mixed_segments.len();
    let missing = match tok.double_colon {
        Some(_) => {
            if provided >= 8 {
                return err(StringErrorKind::TooManySegments, 0);
            }
            8 - provided
        }
        None => {
            if provided < 8 {
                return err(StringErrorKind::TooFewSegments, tok.input.len());
            }
            if provided > 8 {
                return err(StringErrorKind::TooManySegments, 0);
            }
            0
        }
    };
    let dialect = SegmentDialect::ipv6(options, 0xffff);
    let mut segments: Vec<(u32, u32)> = Vec::with_capacity(8);
    for (i, group) in colon_groups.iter().enumerate() {
        if tok.double_colon == Some(i) {
            segments.extend((0..missing).map(|_| (0u32, 0u32)));
        }
        if group.text.is_empty() {
            return err(StringErrorKind::InvalidSegmentValue, group.start);
        }
        let (lo, hi) = parse_interval(group, 0xffff, &dialect, options)?;
        segments.push((lo as u32, hi as u32));
    }
    if tok.double_colon == Some(colon_groups.len()) {
        segments.extend((0..missing).map(|_| (0u32, 0u32)));
    }
    segments.extend(mixed_segments);
    debug_assert_eq!(segments.len(), 8);
    let (prefix, mask) = resolve_suffix(tok, Family::Ipv6, options, false)?;
    Ok(Resolved {
        family: Family::Ipv6,
        body: ResolvedBody::Segments(segments),
        prefix,
        mask,
        zone,
    })
}

fn resolve_single(
    tok: &Tokenized<'_>,
    options: &ParseOptions,
) -> Result<Resolved, AddressStringError> {
    let err = |kind, at| Err(AddressStringError::new(kind, at));
    let group = &tok.groups[0];
    let text = group.text;
    if text == "*" {
        if !options.allow_all || !options.range_options.wildcard_allowed() {
            return err(StringErrorKind::RangeNotAllowed, group.start);
        }
        let family = preferred_family(options)
            .ok_or(AddressStringError::new(StringErrorKind::ConflictingDialectOptions, 0))?;
        let upper = match family {
            Family::Ipv4 => u128::from(u32::MAX),
            Family::Ipv6 => u128::MAX,
        };
        let (prefix, mask) = resolve_suffix(tok, family, options, false)?;
        return Ok(Resolved {
            family,
            body: ResolvedBody::SingleValue { lower: 0, upper },
            prefix,
            mask,
            zone: None,
        });
    }
    if !options.allow_single_segment {
        return err(StringErrorKind::TooFewSegments, group.start);
    }
    let hex_indicator = text.len() > 2 && (text.starts_with("0x") || text.starts_with("0X"));
    let plain_decimal = text.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'*');
    let digit_len = if hex_indicator {
        text.len() - 2
    } else {
        text.len()
    };
    // pick the family: an explicit 0x indicator or non-decimal digits mean
    // hex; a short hex token stays IPv4 inet_aton, a long one goes IPv6
    let try_v4_first = options.allow_ipv4
        && (plain_decimal || (hex_indicator && (digit_len <= 8 || options.ipv4.inet_aton_extraneous_digits)));
    if try_v4_first {
        match resolve_single_value(tok, group, Family::Ipv4, options) {
            Ok(resolved) => return Ok(resolved),
            Err(e) => {
                if !options.allow_ipv6 {
                    return Err(e);
                }
            }
        }
    }
    if options.allow_ipv6 {
        match resolve_single_value(tok, group, Family::Ipv6, options) {
            Ok(resolved) => return Ok(resolved),
            Err(e) => {
                if !(options.ipv6.allow_base_85 && is_base85_candidate(text)) {
                    return Err(e);
                }
            }
        }
        if options.ipv6.allow_base_85 && is_base85_candidate(text) {
            let value = decode_base85(text, group.start)?;
            let (prefix, mask) = resolve_suffix(tok, Family::Ipv6, options, false)?;
            return Ok(Resolved {
                family: Family::Ipv6,
                body: ResolvedBody::SingleValue {
                    lower: value,
                    upper: value,
                },
                prefix,
                mask,
                zone: None,
            });
        }
    }
    err(StringErrorKind::ConflictingDialectOptions, group.start)
}

fn resolve_single_value(
    tok: &Tokenized<'_>,
    group: &Group<'_>,
    family: Family,
    options: &ParseOptions,
) -> Result<Resolved, AddressStringError> {
    let (max, dialect) = match family {
        Family::Ipv4 => (
            u128::from(u32::MAX),
            SegmentDialect::ipv4(options, u128::from(u32::MAX)),
        ),
        Family::Ipv6 => (u128::MAX, SegmentDialect::ipv6(options, u128::MAX)),
    };
    let extraneous = family == Family::Ipv4 && options.ipv4.inet_aton_extraneous_digits;
    let (lower, upper) = if extraneous && !group.text.contains(['-', '*', '%', '_']) {
        let v = parse_value(group.text, group.start, max, &dialect, options, true)?;
        (v, v)
    } else {
        parse_interval(group, max, &dialect, options)?
    };
    let (prefix, mask) = resolve_suffix(tok, family, options, true)?;
    Ok(Resolved {
        family,
        body: ResolvedBody::SingleValue { lower, upper },
        prefix,
        mask,
        zone: None,
    })
}

fn preferred_family(options: &ParseOptions) -> Option<Family> {
    match options.preferred_family {
        Some(Family::Ipv4) if options.allow_ipv4 => Some(Family::Ipv4),
        Some(Family::Ipv6) if options.allow_ipv6 => Some(Family::Ipv6),
        _ if options.allow_ipv4 => Some(Family::Ipv4),
        _ if options.allow_ipv6 => Some(Family::Ipv6),
        _ => None,
    }
}

/// Resolve the `/` suffix: a plain integer is a prefix length; otherwise an
/// address literal, converted to a prefix when it is a contiguous netmask
/// and retained as a mask otherwise.
fn resolve_suffix(
    tok: &Tokenized<'_>,
    family: Family,
    options: &ParseOptions,
    single_segment: bool,
) -> Result<(Option<u8>, Option<u128>), AddressStringError> {
    let err = |kind, at| Err(AddressStringError::new(kind, at));
    let Some((off, text)) = tok.suffix else {
        return Ok((None, None));
    };
    if text.is_empty() {
        return err(StringErrorKind::InvalidPrefixLength, off);
    }
    let bits = u32::from(family.bit_count());
    if text.bytes().all(|b| b.is_ascii_digit()) && text.len() <= 3 && !single_segment_mask_digits(text, single_segment, options)
    {
        if text.len() > 1 && text.starts_with('0') && !options.allow_prefix_length_leading_zeros {
            return err(StringErrorKind::InvalidPrefixLength, off);
        }
        let n: u32 = text
            .parse()
            .map_err(|_| AddressStringError::new(StringErrorKind::InvalidPrefixLength, off))?;
        return if n <= bits {
            Ok((Some(n as u8), None))
        } else if options.allow_prefixes_beyond_address_size {
            Ok((Some(bits as u8), None))
        } else {
            err(StringErrorKind::InvalidPrefixLength, off)
        };
    }
    // an address-literal mask
    let mask_allowed = match family {
        Family::Ipv4 => options.ipv4.allow_mask,
        Family::Ipv6 => options.ipv6.allow_mask,
    };
    if !mask_allowed {
        return err(StringErrorKind::InvalidMask, off);
    }
    let nested_options = options
        .clone()
        .allow_ipv4(family == Family::Ipv4)
        .allow_ipv6(family == Family::Ipv6)
        .allow_single_segment(single_segment && options.ipv4.inet_aton_single_segment_mask)
        .allow_empty(false)
        .allow_all(false);
    let nested = tokenize(text, &nested_options)
        .and_then(|t| {
            if t.suffix.is_some() || t.zone.is_some() {
                Err(AddressStringError::new(StringErrorKind::InvalidMask, 0))
            } else {
                resolve(&t, &nested_options)
            }
        })
        .map_err(|e| AddressStringError::new(StringErrorKind::InvalidMask, off + 1 + e.index))?;
    let value = match nested.body {
        ResolvedBody::SingleValue { lower, upper } if lower == upper => lower,
        ResolvedBody::Segments(ref segs) if segs.iter().all(|(lo, hi)| lo == hi) => {
            let seg_bits = match family {
                Family::Ipv4 => 8u32,
                Family::Ipv6 => 16,
            };
            segs.iter()
                .fold(0u128, |acc, &(lo, _)| (acc << seg_bits) | u128::from(lo))
        }
        _ => return err(StringErrorKind::InvalidMask, off),
    };
    let all_ones = if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    };
    let inverted = value ^ all_ones;
    if inverted & inverted.wrapping_add(1) == 0 {
        // a contiguous netmask: the inverted value is all host bits
        let host_bits = 128 - inverted.leading_zeros();
        Ok((Some((bits - host_bits) as u8), None))
    } else {
        Ok((None, Some(value)))
    }
}

fn single_segment_mask_digits(text: &str, single_segment: bool, options: &ParseOptions) -> bool {
    // a short all-digit suffix on a single-segment address may itself be a
    // single-segment mask rather than a prefix length, but only when the
    // value exceeds the bit count and that dialect is enabled
    single_segment
        && options.ipv4.inet_aton_single_segment_mask
        && text.parse::<u32>().map_or(false, |v| v > 128)
}

fn is_base85_candidate(text: &str) -> bool {
    text.len() == 20 && text.bytes().all(|b| base85_digit(b).is_some())
}

fn base85_digit(b: u8) -> Option<u128> {
    // the RFC 1924 alphabet
    const ALPHABET: &[u8; 85] =
        b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";
    ALPHABET.iter().position(|&c| c == b).map(|v| v as u128)
}

fn decode_base85(text: &str, off: usize) -> Result<u128, AddressStringError> {
    let mut value: u128 = 0;
    for (i, b) in text.bytes().enumerate() {
        let d = base85_digit(b).ok_or(AddressStringError::new(
            StringErrorKind::InvalidCharacter,
            off + i,
        ))?;
        value = value
            .checked_mul(85)
            .and_then(|v| v.checked_add(d))
            .ok_or(AddressStringError::new(
                StringErrorKind::InvalidSegmentValue,
                off,
            ))?;
    }
    Ok(value)
}
