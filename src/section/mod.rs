use core::cmp::Ordering;
use core::fmt;

use crate::{
    af::{default_prefix_configuration, Afi, PrefixConfiguration},
    error::{
        AddressValueError, Error, IncompatibleAddressError, NetworkMismatchError,
        PrefixLengthError,
    },
    num::AddressCount,
    primitive::{from_segment_values, to_segment_values},
    segment::Segment,
};

mod iter;
pub use self::iter::{BlockIter, PrefixBlockIter, PrefixIter, SectionIter, SequentialBlockIter};

mod set;

#[allow(clippy::wildcard_imports)]
mod private {
    use super::*;

    /// An ordered, fixed-length run of segments with an optional network
    /// prefix length.
    ///
    /// A full-width section backs an [`Address`][crate::addr::Address];
    /// partial sections arise from network/host splits and from the IPv6
    /// mixed form. `start_index` records the leftmost segment position
    /// within the full address.
    #[derive(Clone, Hash, PartialEq, Eq)]
    pub struct Section<A: Afi> {
        segments: Vec<Segment<A>>,
        start_index: u8,
        prefix: Option<u8>,
        config: PrefixConfiguration,
    }

    impl<A: Afi> Section<A> {
        /// Construct a section under the process-wide prefix configuration.
        ///
        /// Under a subnet-implying configuration a prefixed section is
        /// widened to its prefix block.
        ///
        /// # Errors
        ///
        /// Fails when the segment count exceeds the family width or the
        /// prefix length exceeds the section bit count.
        pub fn new(segments: Vec<Segment<A>>, prefix: Option<u8>) -> Result<Self, Error> {
            Self::with_config(segments, prefix, default_prefix_configuration())
        }

        /// As [`new`][Self::new], under an explicit prefix configuration.
        ///
        /// # Errors
        ///
        /// As [`new`][Self::new].
        pub fn with_config(
            segments: Vec<Segment<A>>,
            prefix: Option<u8>,
            config: PrefixConfiguration,
        ) -> Result<Self, Error> {
            Self::partial_with_config(segments, 0, prefix, config)
        }

        /// Construct a partial section starting at `start_index`.
        ///
        /// # Errors
        ///
        /// As [`new`][Self::new].
        pub fn partial_with_config(
            segments: Vec<Segment<A>>,
            start_index: u8,
            prefix: Option<u8>,
            config: PrefixConfiguration,
        ) -> Result<Self, Error> {
            if usize::from(start_index) + segments.len() > A::SEGMENT_COUNT {
                return Err(AddressValueError::SegmentCount.into());
            }
            let bit_count = (segments.len() as u32) * u32::from(A::SEGMENT_BITS);
            if let Some(p) = prefix {
                if u32::from(p) > bit_count {
                    return Err(PrefixLengthError {
                        length: u32::from(p),
                        bit_count: bit_count as u8,
                    }
                    .into());
                }
            }
            let segments = normalize_segments(segments, prefix, config);
            Ok(Self {
                segments,
                start_index,
                prefix,
                config,
            })
        }

        /// Construction path that applies no prefix normalisation; used by
        /// operations whose results must not be re-widened.
        pub(crate) fn raw(
            segments: Vec<Segment<A>>,
            start_index: u8,
            prefix: Option<u8>,
            config: PrefixConfiguration,
        ) -> Self {
            debug_assert!(usize::from(start_index) + segments.len() <= A::SEGMENT_COUNT);
            debug_assert!(prefix.map_or(true, |p| {
                usize::from(p) <= segments.len() * usize::from(A::SEGMENT_BITS)
            }));
            Self {
                segments,
                start_index,
                prefix,
                config,
            }
        }

        pub fn segments(&self) -> &[Segment<A>] {
            &self.segments
        }

        pub const fn start_index(&self) -> u8 {
            self.start_index
        }

        /// The network prefix length, where one is attached.
        pub const fn prefix_len(&self) -> Option<u8> {
            self.prefix
        }

        pub const fn prefix_configuration(&self) -> PrefixConfiguration {
            self.config
        }
    }

    /// Widen prefixed segments to their blocks when the configuration calls
    /// for it, and assign per-segment prefixes.
    fn normalize_segments<A: Afi>(
        mut segments: Vec<Segment<A>>,
        prefix: Option<u8>,
        config: PrefixConfiguration,
    ) -> Vec<Segment<A>> {
        let Some(p) = prefix else {
            for seg in &mut segments {
                *seg = seg.with_segment_prefix(None);
            }
            return segments;
        };
        let host_bits_zero = segments.iter().enumerate().all(|(i, seg)| {
            segment_prefix_span::<A>(i, p).map_or(true, |sp| {
                let hm = Segment::<A>::host_mask(sp);
                (seg.lower() | seg.upper()) & hm == 0
            })
        });
        for (i, seg) in segments.iter_mut().enumerate() {
            let span = segment_prefix_span::<A>(i, p);
            if config.implies_subnet(host_bits_zero) {
                if let Some(sp) = span {
                    *seg = seg.to_prefix_block(sp).with_segment_prefix(Some(sp));
                    continue;
                }
            }
            *seg = seg.with_segment_prefix(span.filter(|_| config.implies_subnet(host_bits_zero)));
        }
        segments
    }
}

pub use self::private::Section;

/// The portion of a section-level prefix `p` that falls on segment `i`:
/// `None` when the segment lies wholly inside the network part, `Some(0)`
/// when wholly inside the host part, and the in-segment bit count on the
/// boundary segment.
pub(crate) fn segment_prefix_span<A: Afi>(i: usize, p: u8) -> Option<u8> {
    let bits = usize::from(A::SEGMENT_BITS);
    let start = i * bits;
    if start + bits <= usize::from(p) {
        None
    } else {
        Some(usize::from(p).saturating_sub(start) as u8)
    }
}

impl<A: Afi> Section<A> {
    /// Full-width section holding a single address value.
    #[must_use]
    pub fn from_value(value: A::Primitive) -> Self {
        use crate::primitive::Value as _;
        let segments = to_segment_values::<A>(value.to_u128())
            .into_iter()
            .map(|v| Segment::ranged_unchecked(v, v, None))
            .collect();
        Self::raw(segments, 0, None, default_prefix_configuration())
    }

    /// The prefix block `value/p`, widened to cover every host value.
    ///
    /// # Errors
    ///
    /// Fails when `p` exceeds the family bit count.
    pub fn prefix_block_of(value: A::Primitive, p: u8) -> Result<Self, PrefixLengthError> {
        use crate::primitive::Value as _;
        if p > A::BIT_COUNT {
            return Err(PrefixLengthError {
                length: u32::from(p),
                bit_count: A::BIT_COUNT,
            });
        }
        let segments = to_segment_values::<A>(value.to_u128())
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let seg = Segment::<A>::ranged_unchecked(v, v, None);
                match segment_prefix_span::<A>(i, p) {
                    None => seg,
                    Some(sp) => seg.to_prefix_block(sp).with_segment_prefix(Some(sp)),
                }
            })
            .collect();
        Ok(Self::raw(
            segments,
            0,
            Some(p),
            default_prefix_configuration(),
        ))
    }

    pub fn segment(&self, i: usize) -> &Segment<A> {
        &self.segments()[i]
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments().len()
    }

    /// Total bits covered by this section.
    #[must_use]
    pub fn bit_count(&self) -> u8 {
        (self.segment_count() * usize::from(A::SEGMENT_BITS)) as u8
    }

    #[must_use]
    pub fn is_full_width(&self) -> bool {
        self.start_index() == 0 && self.segment_count() == A::SEGMENT_COUNT
    }

    /// `true` when any segment covers more than one value.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.segments().iter().any(Segment::is_multiple)
    }

    /// `true` when the represented set is one contiguous interval: every
    /// segment below a multi-valued segment covers its full range.
    #[must_use]
    pub fn is_sequential(&self) -> bool {
        let mut seen_multiple = false;
        for seg in self.segments() {
            if seen_multiple && !seg.is_full_range() {
                return false;
            }
            seen_multiple |= seg.is_multiple();
        }
        true
    }

    #[must_use]
    pub fn count(&self) -> AddressCount {
        self.segments()
            .iter()
            .map(|seg| AddressCount::from(u128::from(seg.count())))
            .fold(AddressCount::ONE, |acc, n| acc * n)
    }

    /// Number of distinct prefixes covered, or the full count when no
    /// prefix is attached.
    #[must_use]
    pub fn prefix_count(&self) -> AddressCount {
        match self.prefix_len() {
            None => self.count(),
            Some(p) => self
                .segments()
                .iter()
                .enumerate()
                .map(|(i, seg)| match segment_prefix_span::<A>(i, p) {
                    None => AddressCount::from(u128::from(seg.count())),
                    Some(sp) => {
                        let shift = A::SEGMENT_BITS - sp;
                        let lo = seg.lower() >> shift;
                        let hi = seg.upper() >> shift;
                        AddressCount::from(u128::from(hi - lo) + 1)
                    }
                })
                .fold(AddressCount::ONE, |acc, n| acc * n),
        }
    }

    pub(crate) fn lower_value(&self) -> u128 {
        from_segment_values::<A>(self.segments().iter().map(Segment::lower))
    }

    pub(crate) fn upper_value(&self) -> u128 {
        from_segment_values::<A>(self.segments().iter().map(Segment::upper))
    }

    /// The lowest contained value as a primitive. Meaningful only on
    /// full-width sections.
    #[must_use]
    pub fn lower_primitive(&self) -> A::Primitive {
        use crate::primitive::Value as _;
        A::Primitive::from_u128(self.lower_value())
    }

    #[must_use]
    pub fn upper_primitive(&self) -> A::Primitive {
        use crate::primitive::Value as _;
        A::Primitive::from_u128(self.upper_value())
    }

    /// The single-valued section at the low end, prefix dropped.
    #[must_use]
    pub fn lower_section(&self) -> Self {
        let segments = self
            .segments()
            .iter()
            .map(|seg| Segment::ranged_unchecked(seg.lower(), seg.lower(), None))
            .collect();
        Self::raw(segments, self.start_index(), None, self.prefix_configuration())
    }

    #[must_use]
    pub fn upper_section(&self) -> Self {
        let segments = self
            .segments()
            .iter()
            .map(|seg| Segment::ranged_unchecked(seg.upper(), seg.upper(), None))
            .collect();
        Self::raw(segments, self.start_index(), None, self.prefix_configuration())
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.segment_count() == other.segment_count() && self.start_index() == other.start_index()
    }

    fn check_config(&self, other: &Self) -> Result<(), NetworkMismatchError> {
        if self.prefix_configuration() == other.prefix_configuration() {
            Ok(())
        } else {
            Err(NetworkMismatchError)
        }
    }

    /// Set containment: every combination matched by `other` is matched by
    /// `self`. Sections of different shapes are never comparable.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.same_shape(other)
            && self
                .segments()
                .iter()
                .zip(other.segments())
                .all(|(s, o)| s.contains(o))
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.same_shape(other)
            && self
                .segments()
                .iter()
                .zip(other.segments())
                .all(|(s, o)| s.overlaps(o))
    }

    /// Compare the first `p` bits of both sections, where `p` is this
    /// section's prefix length (its full bit count when unprefixed).
    #[must_use]
    pub fn prefix_equals(&self, other: &Self) -> bool {
        let p = self.prefix_len().unwrap_or_else(|| self.bit_count());
        self.same_shape(other)
            && self.segments().iter().zip(other.segments()).enumerate().all(
                |(i, (s, o))| match segment_prefix_span::<A>(i, p) {
                    Some(0) => true,
                    span => {
                        let nm = Segment::<A>::network_mask(span.unwrap_or(A::SEGMENT_BITS));
                        s.lower() & nm == o.lower() & nm && s.upper() & nm == o.upper() & nm
                    }
                },
            )
    }

    /// Whether the first `p` bits of `self` cover the first `p` bits of
    /// `other`, with `p` taken from this section's prefix.
    #[must_use]
    pub fn prefix_contains(&self, other: &Self) -> bool {
        let p = self.prefix_len().unwrap_or_else(|| self.bit_count());
        self.same_shape(other)
            && self.segments().iter().zip(other.segments()).enumerate().all(
                |(i, (s, o))| match segment_prefix_span::<A>(i, p) {
                    Some(0) => true,
                    span => {
                        let nm = Segment::<A>::network_mask(span.unwrap_or(A::SEGMENT_BITS));
                        s.lower() & nm <= o.lower() & nm && o.upper() & nm <= s.upper() & nm
                    }
                },
            )
    }

    /// Whether the value set includes every host combination under `p`.
    #[must_use]
    pub fn contains_prefix_block(&self, p: u8) -> bool {
        self.segments().iter().enumerate().all(|(i, seg)| {
            match segment_prefix_span::<A>(i, p) {
                None => true,
                Some(sp) => seg.is_prefix_block(sp),
            }
        })
    }

    /// Whether the value set is exactly one prefix block under `p`.
    #[must_use]
    pub fn contains_single_prefix_block(&self, p: u8) -> bool {
        self.segments().iter().enumerate().all(|(i, seg)| {
            match segment_prefix_span::<A>(i, p) {
                None => !seg.is_multiple(),
                Some(sp) => seg.is_single_prefix_block(sp),
            }
        })
    }

    /// Whether the section is the prefix block of its own prefix length.
    #[must_use]
    pub fn is_prefix_block(&self) -> bool {
        self.prefix_len()
            .map_or(false, |p| self.contains_prefix_block(p))
    }

    #[must_use]
    pub fn is_single_prefix_block(&self) -> bool {
        self.prefix_len()
            .map_or(false, |p| self.contains_single_prefix_block(p))
    }

    /// The section widened to the prefix block at `p`.
    ///
    /// # Errors
    ///
    /// Fails when `p` exceeds the section bit count.
    pub fn to_prefix_block(&self, p: u8) -> Result<Self, PrefixLengthError> {
        if u32::from(p) > u32::from(self.bit_count()) {
            return Err(PrefixLengthError {
                length: u32::from(p),
                bit_count: self.bit_count(),
            });
        }
        let segments = self
            .segments()
            .iter()
            .enumerate()
            .map(|(i, seg)| match segment_prefix_span::<A>(i, p) {
                None => seg.with_segment_prefix(None),
                Some(sp) => seg.to_prefix_block(sp).with_segment_prefix(Some(sp)),
            })
            .collect();
        Ok(Self::raw(
            segments,
            self.start_index(),
            Some(p),
            self.prefix_configuration(),
        ))
    }

    /// The prefix block of the attached prefix, or the section itself when
    /// unprefixed.
    #[must_use]
    pub fn to_prefix_block_of_own(&self) -> Self {
        match self.prefix_len() {
            // bit counts already validated
            Some(p) => self.to_prefix_block(p).expect("own prefix is in range"),
            None => self.clone(),
        }
    }

    /// Segments covering bits `[0, p)`, with the prefix attached when
    /// `with_prefix` is set.
    #[must_use]
    pub fn network_section(&self, p: u8, with_prefix: bool) -> Self {
        let bits = usize::from(A::SEGMENT_BITS);
        let seg_count = (usize::from(p) + bits - 1) / bits;
        let segments = self
            .segments()
            .iter()
            .take(seg_count)
            .enumerate()
            .map(|(i, seg)| match segment_prefix_span::<A>(i, p) {
                None => *seg,
                Some(sp) => {
                    let nm = Segment::<A>::network_mask(sp);
                    Segment::ranged_unchecked(seg.lower() & nm, seg.upper() & nm, Some(sp))
                }
            })
            .collect();
        Self::raw(
            segments,
            self.start_index(),
            with_prefix.then_some(p),
            self.prefix_configuration(),
        )
    }

    /// Segments covering bits `[p, bit_count)`, network bits cleared on the
    /// boundary segment. When the boundary segment ranges across distinct
    /// network values the host projection is the full host range.
    #[must_use]
    pub fn host_section(&self, p: u8) -> Self {
        let bits = usize::from(A::SEGMENT_BITS);
        let first = usize::from(p) / bits;
        let segments = self
            .segments()
            .iter()
            .enumerate()
            .skip(first)
            .map(|(i, seg)| match segment_prefix_span::<A>(i, p) {
                None => unreachable!("host section starts at the boundary segment"),
                Some(0) => seg.with_segment_prefix(None),
                Some(sp) => {
                    let hm = Segment::<A>::host_mask(sp);
                    let nm = Segment::<A>::network_mask(sp);
                    if seg.lower() & nm == seg.upper() & nm {
                        Segment::ranged_unchecked(seg.lower() & hm, seg.upper() & hm, None)
                    } else {
                        Segment::ranged_unchecked(0, hm, None)
                    }
                }
            })
            .collect();
        Self::raw(
            segments,
            self.start_index() + first as u8,
            None,
            self.prefix_configuration(),
        )
    }

    /// Pointwise AND with the lower value of each mask segment.
    ///
    /// # Errors
    ///
    /// Fails when the operands were built under different prefix
    /// configurations, have different shapes, or a masked segment image is
    /// not contiguous.
    pub fn mask(&self, mask: &Self, retain_prefix: bool) -> Result<Self, Error> {
        self.check_config(mask)?;
        if !self.same_shape(mask) {
            return Err(AddressValueError::SegmentCount.into());
        }
        let segments = self
            .segments()
            .iter()
            .zip(mask.segments())
            .map(|(seg, m)| seg.mask(m.lower()))
            .collect::<Result<Vec<_>, IncompatibleAddressError>>()?;
        Ok(Self::raw(
            segments,
            self.start_index(),
            if retain_prefix { self.prefix_len() } else { None },
            self.prefix_configuration(),
        ))
    }

    /// Mask the network part and attach prefix `p`; the host part follows
    /// the prefix configuration.
    ///
    /// # Errors
    ///
    /// As [`mask`][Self::mask], plus prefix-length validation.
    pub fn mask_network(&self, mask: &Self, p: u8) -> Result<Self, Error> {
        self.check_config(mask)?;
        if !self.same_shape(mask) {
            return Err(AddressValueError::SegmentCount.into());
        }
        let segments = self
            .segments()
            .iter()
            .zip(mask.segments())
            .enumerate()
            .map(|(i, (seg, m))| match segment_prefix_span::<A>(i, p) {
                Some(0) => Ok(*seg),
                _ => seg.mask(m.lower()),
            })
            .collect::<Result<Vec<_>, IncompatibleAddressError>>()?;
        Self::partial_with_config(
            segments,
            self.start_index(),
            Some(p),
            self.prefix_configuration(),
        )
    }

    /// Pointwise OR with the lower value of each mask segment.
    ///
    /// # Errors
    ///
    /// As [`mask`][Self::mask].
    pub fn bitwise_or(&self, mask: &Self, retain_prefix: bool) -> Result<Self, Error> {
        self.check_config(mask)?;
        if !self.same_shape(mask) {
            return Err(AddressValueError::SegmentCount.into());
        }
        let segments = self
            .segments()
            .iter()
            .zip(mask.segments())
            .map(|(seg, m)| seg.bitwise_or(m.lower()))
            .collect::<Result<Vec<_>, IncompatibleAddressError>>()?;
        Ok(Self::raw(
            segments,
            self.start_index(),
            if retain_prefix { self.prefix_len() } else { None },
            self.prefix_configuration(),
        ))
    }

    /// OR the network part and attach prefix `p`.
    ///
    /// # Errors
    ///
    /// As [`mask_network`][Self::mask_network].
    pub fn bitwise_or_network(&self, mask: &Self, p: u8) -> Result<Self, Error> {
        self.check_config(mask)?;
        if !self.same_shape(mask) {
            return Err(AddressValueError::SegmentCount.into());
        }
        let segments = self
            .segments()
            .iter()
            .zip(mask.segments())
            .enumerate()
            .map(|(i, (seg, m))| match segment_prefix_span::<A>(i, p) {
                Some(0) => Ok(*seg),
                _ => seg.bitwise_or(m.lower()),
            })
            .collect::<Result<Vec<_>, IncompatibleAddressError>>()?;
        Self::partial_with_config(
            segments,
            self.start_index(),
            Some(p),
            self.prefix_configuration(),
        )
    }

    /// Zero every bit below the attached prefix (the whole value when
    /// unprefixed), keeping the prefix annotation.
    ///
    /// # Errors
    ///
    /// Fails when a segment's zeroed image is not contiguous.
    pub fn to_zero_host(&self) -> Result<Self, IncompatibleAddressError> {
        let p = self.prefix_len().unwrap_or(0);
        let segments = self
            .segments()
            .iter()
            .enumerate()
            .map(|(i, seg)| match segment_prefix_span::<A>(i, p) {
                None => Ok(*seg),
                Some(sp) => seg
                    .mask(Segment::<A>::network_mask(sp))
                    .map(|s| s.with_segment_prefix(seg.segment_prefix())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::raw(
            segments,
            self.start_index(),
            self.prefix_len(),
            self.prefix_configuration(),
        ))
    }

    /// Set every bit below the attached prefix, keeping the annotation.
    ///
    /// # Errors
    ///
    /// As [`to_zero_host`][Self::to_zero_host].
    pub fn to_max_host(&self) -> Result<Self, IncompatibleAddressError> {
        let p = self.prefix_len().unwrap_or(0);
        let segments = self
            .segments()
            .iter()
            .enumerate()
            .map(|(i, seg)| match segment_prefix_span::<A>(i, p) {
                None => Ok(*seg),
                Some(sp) => seg
                    .bitwise_or(Segment::<A>::host_mask(sp))
                    .map(|s| s.with_segment_prefix(seg.segment_prefix())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::raw(
            segments,
            self.start_index(),
            self.prefix_len(),
            self.prefix_configuration(),
        ))
    }

    /// Drop the prefix annotation, keeping the value set.
    #[must_use]
    pub fn without_prefix(&self) -> Self {
        let segments = self
            .segments()
            .iter()
            .map(|seg| seg.with_segment_prefix(None))
            .collect();
        Self::raw(segments, self.start_index(), None, self.prefix_configuration())
    }

    /// Single-valued section from per-segment values, no prefix.
    pub(crate) fn from_lower_values(&self, values: &[u32]) -> Self {
        let segments = values
            .iter()
            .map(|&v| Segment::ranged_unchecked(v, v, None))
            .collect();
        Self::raw(segments, self.start_index(), None, self.prefix_configuration())
    }

    pub(crate) fn from_value_in_shape(&self, value: u128, prefix: Option<u8>) -> Self {
        let bits = u32::from(A::SEGMENT_BITS);
        let n = self.segment_count();
        let segments = (0..n)
            .map(|i| {
                let shift = bits * (n - 1 - i) as u32;
                let v = ((value >> shift) as u32) & A::MAX_SEGMENT;
                Segment::ranged_unchecked(v, v, None)
            })
            .collect();
        Self::raw(segments, self.start_index(), prefix, self.prefix_configuration())
    }

    /// Step `n` values through the section.
    ///
    /// On a multi-valued section, `0 <= n < count` indexes the enumeration
    /// order; `n >= count` continues from past the upper bound; negative
    /// `n` offsets the lower bound. Under an explicit prefix configuration
    /// the prefix annotation is preserved.
    ///
    /// # Errors
    ///
    /// Fails when the result would step outside the address space.
    pub fn increment(&self, n: i128) -> Result<Self, AddressValueError> {
        if n == 0 {
            return Ok(self.clone());
        }
        let keep_prefix = matches!(
            self.prefix_configuration(),
            PrefixConfiguration::PrefixedSubnetsAreExplicit
        );
        let prefix = if keep_prefix { self.prefix_len() } else { None };
        let space_max = if self.bit_count() >= 128 {
            u128::MAX
        } else {
            (1u128 << self.bit_count()) - 1
        };
        let value = if n < 0 {
            let delta = n.unsigned_abs();
            self.lower_value()
                .checked_sub(delta)
                .ok_or(AddressValueError::Overflow)?
        } else {
            let delta = n as u128;
            if self.is_multiple() {
                let count = self.count();
                let within = count.as_u128().map_or(true, |c| delta < c);
                if within {
                    return Ok(self.nth_in_enumeration(delta, prefix));
                }
                let past = delta - count.as_u128().expect("within checked above") + 1;
                self.upper_value()
                    .checked_add(past)
                    .ok_or(AddressValueError::Overflow)?
            } else {
                self.lower_value()
                    .checked_add(delta)
                    .ok_or(AddressValueError::Overflow)?
            }
        };
        if value > space_max {
            return Err(AddressValueError::Overflow);
        }
        Ok(self.from_value_in_shape(value, prefix))
    }

    /// Step the boundary: positive `n` offsets the upper bound, negative
    /// `n` the lower bound.
    ///
    /// # Errors
    ///
    /// As [`increment`][Self::increment].
    pub fn increment_boundary(&self, n: i128) -> Result<Self, AddressValueError> {
        match n.cmp(&0) {
            Ordering::Equal => Ok(self.clone()),
            Ordering::Greater => {
                let space_max = if self.bit_count() >= 128 {
                    u128::MAX
                } else {
                    (1u128 << self.bit_count()) - 1
                };
                let value = self
                    .upper_value()
                    .checked_add(n as u128)
                    .filter(|v| *v <= space_max)
                    .ok_or(AddressValueError::Overflow)?;
                Ok(self.from_value_in_shape(value, None))
            }
            Ordering::Less => {
                let value = self
                    .lower_value()
                    .checked_sub(n.unsigned_abs())
                    .ok_or(AddressValueError::Overflow)?;
                Ok(self.from_value_in_shape(value, None))
            }
        }
    }

    /// The `idx`-th element of the Cartesian enumeration.
    fn nth_in_enumeration(&self, idx: u128, prefix: Option<u8>) -> Self {
        let counts: Vec<u128> = self
            .segments()
            .iter()
            .map(|seg| u128::from(seg.count()))
            .collect();
        let mut suffix_products = vec![1u128; counts.len()];
        for i in (0..counts.len().saturating_sub(1)).rev() {
            // products of counts after position i; saturation is safe since
            // an index below the count never reaches a saturated divisor
            suffix_products[i] = suffix_products[i + 1].saturating_mul(counts[i + 1]);
        }
        let values: Vec<u32> = self
            .segments()
            .iter()
            .zip(suffix_products)
            .zip(&counts)
            .map(|((seg, product), &count)| {
                let step = (idx / product) % count;
                seg.lower() + step as u32
            })
            .collect();
        let mut section = self.from_lower_values(&values);
        if prefix.is_some() {
            section = Self::raw(
                section.segments().to_vec(),
                self.start_index(),
                prefix,
                self.prefix_configuration(),
            );
        }
        section
    }
}

impl<A: Afi> PartialOrd for Section<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: Afi> Ord for Section<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments()
            .iter()
            .map(|s| (s.lower(), s.upper()))
            .cmp(other.segments().iter().map(|s| (s.lower(), s.upper())))
            .then_with(|| {
                // shorter prefix sorts first; unprefixed last
                let rank = |p: Option<u8>| p.map_or(u16::from(u8::MAX) + 1, u16::from);
                rank(self.prefix_len()).cmp(&rank(other.prefix_len()))
            })
            .then_with(|| {
                self.segments()
                    .iter()
                    .map(Segment::segment_prefix)
                    .cmp(other.segments().iter().map(Segment::segment_prefix))
            })
            .then_with(|| self.start_index().cmp(&other.start_index()))
            .then_with(|| self.prefix_configuration().cmp(&other.prefix_configuration()))
    }
}

impl<A: Afi> fmt::Debug for Section<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Section<{}>(", A::as_family())?;
        for (i, seg) in self.segments().iter().enumerate() {
            if i > 0 {
                write!(f, "{}", A::SEGMENT_SEPARATOR)?;
            }
            write!(f, "{}", seg)?;
        }
        if let Some(p) = self.prefix_len() {
            write!(f, "/{}", p)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ipv4, Ipv6};

    fn v4_section(values: [u32; 4], prefix: Option<u8>) -> Section<Ipv4> {
        let segments = values
            .iter()
            .map(|&v| Segment::new(v).unwrap())
            .collect();
        Section::with_config(
            segments,
            prefix,
            PrefixConfiguration::AllPrefixedAddressesAreSubnets,
        )
        .unwrap()
    }

    fn v4_explicit(values: [u32; 4], prefix: Option<u8>) -> Section<Ipv4> {
        let segments = values
            .iter()
            .map(|&v| Segment::new(v).unwrap())
            .collect();
        Section::with_config(
            segments,
            prefix,
            PrefixConfiguration::PrefixedSubnetsAreExplicit,
        )
        .unwrap()
    }

    #[test]
    fn auto_subnet_widens_host() {
        let s = v4_section([1, 2, 3, 4], Some(16));
        assert_eq!(s.segment(0).value(), Some(1));
        assert_eq!(s.segment(1).value(), Some(2));
        assert!(s.segment(2).is_full_range());
        assert!(s.segment(3).is_full_range());
        assert_eq!(s.count(), AddressCount::Count(65536));
        assert!(s.is_prefix_block());
    }

    #[test]
    fn explicit_mode_keeps_host() {
        let s = v4_explicit([1, 2, 3, 4], Some(16));
        assert_eq!(s.segment(2).value(), Some(3));
        assert_eq!(s.count(), AddressCount::Count(1));
        assert!(!s.is_prefix_block());
    }

    #[test]
    fn zero_hosts_mode() {
        let segments: Vec<_> = [1u32, 2, 0, 0]
            .iter()
            .map(|&v| Segment::new(v).unwrap())
            .collect();
        let block = Section::<Ipv4>::with_config(
            segments,
            Some(16),
            PrefixConfiguration::ZeroHostsAreSubnets,
        )
        .unwrap();
        assert_eq!(block.count(), AddressCount::Count(65536));

        let segments: Vec<_> = [1u32, 2, 3, 4]
            .iter()
            .map(|&v| Segment::new(v).unwrap())
            .collect();
        let single = Section::<Ipv4>::with_config(
            segments,
            Some(16),
            PrefixConfiguration::ZeroHostsAreSubnets,
        )
        .unwrap();
        assert_eq!(single.count(), AddressCount::Count(1));
    }

    #[test]
    fn boundary_segment_prefix() {
        let s = v4_section([10, 20, 0, 0], Some(20));
        assert_eq!(s.segment(0).segment_prefix(), None);
        assert_eq!(s.segment(1).segment_prefix(), None);
        assert_eq!(s.segment(2).segment_prefix(), Some(4));
        assert_eq!(s.segment(3).segment_prefix(), Some(0));
        assert_eq!((s.segment(2).lower(), s.segment(2).upper()), (0, 15));
    }

    #[test]
    fn prefix_too_long_rejected() {
        let segments: Vec<_> = (0..4).map(|_| Segment::<Ipv4>::zero()).collect();
        assert!(Section::new(segments, Some(33)).is_err());
    }

    #[test]
    fn network_and_host_sections() {
        let s = v4_explicit([1, 2, 3, 4], None);
        let net = s.network_section(24, true);
        assert_eq!(net.segment_count(), 3);
        assert_eq!(net.prefix_len(), Some(24));
        let host = s.host_section(24);
        assert_eq!(host.segment_count(), 1);
        assert_eq!(host.start_index(), 3);
        assert_eq!(host.segment(0).value(), Some(4));
    }

    #[test]
    fn network_section_boundary_masked() {
        let s = v4_explicit([1, 2, 0xab, 4], None);
        let net = s.network_section(20, false);
        assert_eq!(net.segment_count(), 3);
        assert_eq!(net.segment(2).value(), Some(0xa0));
        assert_eq!(net.prefix_len(), None);
    }

    #[test]
    fn mask_block_scenario() {
        // 1.2.0.0/16 & 255.255.3.3 => 1.2.0-3.0-3
        let block = v4_section([1, 2, 0, 0], Some(16));
        let mask = v4_section([255, 255, 3, 3], None);
        let masked = block.mask(&mask, false).unwrap();
        assert_eq!(masked.segment(0).value(), Some(1));
        assert_eq!(masked.segment(1).value(), Some(2));
        assert_eq!(
            (masked.segment(2).lower(), masked.segment(2).upper()),
            (0, 3)
        );
        assert_eq!(
            (masked.segment(3).lower(), masked.segment(3).upper()),
            (0, 3)
        );
        assert_eq!(masked.prefix_len(), None);
    }

    #[test]
    fn mask_config_mismatch() {
        let a = v4_section([1, 2, 0, 0], None);
        let b = v4_explicit([255, 255, 0, 0], None);
        assert!(matches!(
            a.mask(&b, false),
            Err(Error::NetworkMismatch(NetworkMismatchError))
        ));
    }

    #[test]
    fn zero_and_max_host() {
        let s = v4_explicit([1, 2, 3, 4], Some(16));
        let zeroed = s.to_zero_host().unwrap();
        assert_eq!(zeroed.segment(2).value(), Some(0));
        assert_eq!(zeroed.segment(3).value(), Some(0));
        assert_eq!(zeroed.prefix_len(), Some(16));
        let maxed = s.to_max_host().unwrap();
        assert_eq!(maxed.segment(2).value(), Some(255));
        assert_eq!(maxed.segment(3).value(), Some(255));
    }

    #[test]
    fn containment_and_overlap() {
        let outer = v4_section([1, 2, 0, 0], Some(16));
        let inner = v4_section([1, 2, 3, 0], Some(24));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn prefix_predicates() {
        let a = v4_section([1, 2, 0, 0], Some(16));
        let b = v4_section([1, 2, 3, 0], Some(24));
        assert!(a.prefix_equals(&b));
        assert!(a.prefix_contains(&b));
        let c = v4_section([1, 3, 0, 0], Some(16));
        assert!(!a.prefix_equals(&c));
    }

    #[test]
    fn increment_single() {
        let s = v4_explicit([1, 2, 3, 4], None);
        let next = s.increment(1).unwrap();
        assert_eq!(next.segment(3).value(), Some(5));
        let back = next.increment(-1).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn increment_through_enumeration() {
        // 1.2.0-1.0-1: enumeration order 0.0, 0.1, 1.0, 1.1
        let segments = vec![
            Segment::new(1).unwrap(),
            Segment::new(2).unwrap(),
            Segment::ranged(0, 1, None).unwrap(),
            Segment::ranged(0, 1, None).unwrap(),
        ];
        let s = Section::<Ipv4>::with_config(
            segments,
            None,
            PrefixConfiguration::PrefixedSubnetsAreExplicit,
        )
        .unwrap();
        let third = s.increment(2).unwrap();
        assert_eq!(third.segment(2).value(), Some(1));
        assert_eq!(third.segment(3).value(), Some(0));
        // past the enumeration: upper + (n - count + 1)
        let past = s.increment(5).unwrap();
        assert_eq!(past.segment(3).value(), Some(3));
    }

    #[test]
    fn increment_overflow() {
        let s = v4_explicit([255, 255, 255, 255], None);
        assert_eq!(s.increment(1), Err(AddressValueError::Overflow));
        let z = v4_explicit([0, 0, 0, 0], None);
        assert_eq!(z.increment(-1), Err(AddressValueError::Overflow));
    }

    #[test]
    fn increment_boundary_steps() {
        let segments = vec![
            Segment::new(1).unwrap(),
            Segment::new(2).unwrap(),
            Segment::new(3).unwrap(),
            Segment::ranged(4, 6, None).unwrap(),
        ];
        let s = Section::<Ipv4>::with_config(
            segments,
            None,
            PrefixConfiguration::PrefixedSubnetsAreExplicit,
        )
        .unwrap();
        let up = s.increment_boundary(2).unwrap();
        assert_eq!(up.segment(3).value(), Some(8));
        let down = s.increment_boundary(-2).unwrap();
        assert_eq!(down.segment(3).value(), Some(2));
    }

    #[test]
    fn full_v6_count() {
        let segments: Vec<_> = (0..8).map(|_| Segment::<Ipv6>::full()).collect();
        let s = Section::<Ipv6>::with_config(
            segments,
            None,
            PrefixConfiguration::PrefixedSubnetsAreExplicit,
        )
        .unwrap();
        assert_eq!(s.count(), AddressCount::MaxU128PlusOne);
    }

    #[test]
    fn sequential_detection() {
        let seq = vec![
            Segment::<Ipv4>::new(1).unwrap(),
            Segment::ranged(2, 3, None).unwrap(),
            Segment::full(),
            Segment::full(),
        ];
        let s = Section::<Ipv4>::with_config(
            seq,
            None,
            PrefixConfiguration::PrefixedSubnetsAreExplicit,
        )
        .unwrap();
        assert!(s.is_sequential());

        let not_seq = vec![
            Segment::<Ipv4>::new(1).unwrap(),
            Segment::ranged(2, 3, None).unwrap(),
            Segment::new(0).unwrap(),
            Segment::full(),
        ];
        let s = Section::<Ipv4>::with_config(
            not_seq,
            None,
            PrefixConfiguration::PrefixedSubnetsAreExplicit,
        )
        .unwrap();
        assert!(!s.is_sequential());
    }
}
