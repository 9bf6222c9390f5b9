//! Set arithmetic over sections: difference, interval spanning and block
//! merging.

use crate::{
    af::Afi,
    error::{AddressValueError, Error},
    segment::Segment,
};

use super::{segment_prefix_span, Section};

/// Decompose `[l..u]` into the minimum run of CIDR blocks, as
/// `(network value, prefix length)` pairs in ascending order.
pub(crate) fn span_block_values(mut l: u128, u: u128, bit_count: u8) -> Vec<(u128, u8)> {
    debug_assert!(l <= u);
    let space_max = if bit_count >= 128 {
        u128::MAX
    } else {
        (1u128 << bit_count) - 1
    };
    debug_assert!(u <= space_max);
    if l == 0 && u == u128::MAX {
        return vec![(0, 0)];
    }
    let mut out = Vec::new();
    loop {
        let align = if l == 0 {
            u32::from(bit_count)
        } else {
            l.trailing_zeros().min(u32::from(bit_count))
        };
        let span = u - l + 1;
        let fit = 127 - span.leading_zeros();
        let k = align.min(fit);
        out.push((l, bit_count - k as u8));
        match (1u128 << k).checked_add(l) {
            Some(next) if next <= u => l = next,
            _ => break,
        }
    }
    out
}

fn prepend<A: Afi>(value: u32, covers: Vec<Vec<Segment<A>>>) -> Vec<Vec<Segment<A>>> {
    covers
        .into_iter()
        .map(|mut segs| {
            segs.insert(0, Segment::ranged_unchecked(value, value, None));
            segs
        })
        .collect()
}

fn full_tail<A: Afi>(first: Segment<A>, len: usize) -> Vec<Segment<A>> {
    let mut segs = vec![first];
    segs.extend((1..len).map(|_| Segment::full()));
    segs
}

/// Sequential cover of `[l .. l-prefix|max-tail]`.
fn cover_from<A: Afi>(l: &[u32]) -> Vec<Vec<Segment<A>>> {
    let (first, rest) = l.split_first().expect("non-empty segment run");
    if rest.is_empty() {
        return vec![vec![Segment::ranged_unchecked(*first, A::MAX_SEGMENT, None)]];
    }
    if rest.iter().all(|&v| v == 0) {
        return vec![full_tail(
            Segment::ranged_unchecked(*first, A::MAX_SEGMENT, None),
            l.len(),
        )];
    }
    let mut out = prepend(*first, cover_from::<A>(rest));
    if *first < A::MAX_SEGMENT {
        out.push(full_tail(
            Segment::ranged_unchecked(first + 1, A::MAX_SEGMENT, None),
            l.len(),
        ));
    }
    out
}

/// Sequential cover of `[u-prefix|zero-tail .. u]`.
fn cover_to<A: Afi>(u: &[u32]) -> Vec<Vec<Segment<A>>> {
    let (first, rest) = u.split_first().expect("non-empty segment run");
    if rest.is_empty() {
        return vec![vec![Segment::ranged_unchecked(0, *first, None)]];
    }
    if rest.iter().all(|&v| v == A::MAX_SEGMENT) {
        return vec![full_tail(Segment::ranged_unchecked(0, *first, None), u.len())];
    }
    let mut out = Vec::new();
    if *first > 0 {
        out.push(full_tail(
            Segment::ranged_unchecked(0, first - 1, None),
            u.len(),
        ));
    }
    out.extend(prepend(*first, cover_to::<A>(rest)));
    out
}

/// Minimum sequential cover of `[l..u]`, ascending.
fn cover_between<A: Afi>(l: &[u32], u: &[u32]) -> Vec<Vec<Segment<A>>> {
    let (l_first, l_rest) = l.split_first().expect("non-empty segment run");
    let (u_first, u_rest) = u.split_first().expect("non-empty segment run");
    if l_rest.is_empty() {
        return vec![vec![Segment::ranged_unchecked(*l_first, *u_first, None)]];
    }
    if l_first == u_first {
        return prepend(*l_first, cover_between::<A>(l_rest, u_rest));
    }
    let lo_tail_zero = l_rest.iter().all(|&v| v == 0);
    let hi_tail_max = u_rest.iter().all(|&v| v == A::MAX_SEGMENT);
    match (lo_tail_zero, hi_tail_max) {
        (true, true) => vec![full_tail(
            Segment::ranged_unchecked(*l_first, *u_first, None),
            l.len(),
        )],
        (true, false) => {
            let mut out = vec![full_tail(
                Segment::ranged_unchecked(*l_first, u_first - 1, None),
                l.len(),
            )];
            out.extend(prepend(*u_first, cover_to::<A>(u_rest)));
            out
        }
        (false, true) => {
            let mut out = prepend(*l_first, cover_from::<A>(l_rest));
            out.push(full_tail(
                Segment::ranged_unchecked(l_first + 1, *u_first, None),
                l.len(),
            ));
            out
        }
        (false, false) => {
            let mut out = prepend(*l_first, cover_from::<A>(l_rest));
            if l_first + 2 <= *u_first {
                out.push(full_tail(
                    Segment::ranged_unchecked(l_first + 1, u_first - 1, None),
                    l.len(),
                ));
            }
            out.extend(prepend(*u_first, cover_to::<A>(u_rest)));
            out
        }
    }
}

impl<A: Afi> Section<A> {
    /// Build the prefix block `value/p` in the shape of `self`.
    pub(crate) fn prefix_block_in_shape(&self, value: u128, p: u8) -> Self {
        let bits = u32::from(A::SEGMENT_BITS);
        let n = self.segment_count();
        let segments = (0..n)
            .map(|i| {
                let shift = bits * (n - 1 - i) as u32;
                let v = ((value >> shift) as u32) & A::MAX_SEGMENT;
                match segment_prefix_span::<A>(i, p) {
                    None => Segment::ranged_unchecked(v, v, None),
                    Some(sp) => {
                        let hm = Segment::<A>::host_mask(sp);
                        Segment::ranged_unchecked(v & !hm, v | hm, Some(sp))
                    }
                }
            })
            .collect();
        Self::raw(
            segments,
            self.start_index(),
            Some(p),
            self.prefix_configuration(),
        )
    }

    /// Set difference, as a minimal disjoint union of sections. An empty
    /// result means `other` covers `self` entirely.
    ///
    /// # Errors
    ///
    /// Fails on mismatched prefix configurations or section shapes.
    pub fn subtract(&self, other: &Self) -> Result<Vec<Self>, Error> {
        self.check_config(other)?;
        if !self.same_shape(other) {
            return Err(AddressValueError::SegmentCount.into());
        }
        if !self.overlaps(other) {
            return Ok(vec![self.clone()]);
        }
        let n = self.segment_count();
        let mut result = Vec::new();
        for i in 0..n {
            let s = self.segment(i);
            let o = other.segment(i);
            let mut pieces: Vec<(u32, u32)> = Vec::new();
            if s.lower() < o.lower() {
                pieces.push((s.lower(), o.lower() - 1));
            }
            if s.upper() > o.upper() {
                pieces.push((o.upper() + 1, s.upper()));
            }
            for (lo, up) in pieces {
                let segments = (0..n)
                    .map(|k| {
                        if k < i {
                            self.segment(k)
                                .intersect(other.segment(k))
                                .expect("segments overlap on every axis")
                        } else if k == i {
                            Segment::ranged_unchecked(lo, up, None)
                        } else {
                            self.segment(k).with_segment_prefix(None)
                        }
                    })
                    .collect();
                result.push(Self::raw(
                    segments,
                    self.start_index(),
                    None,
                    self.prefix_configuration(),
                ));
            }
        }
        Ok(result)
    }

    /// Decompose the closed interval from the low end of `lower` to the
    /// high end of `upper` into the minimum run of prefix blocks.
    ///
    /// # Errors
    ///
    /// Fails on mismatched configurations or shapes, or when the bounds are
    /// reversed.
    pub fn spanning_prefix_blocks(lower: &Self, upper: &Self) -> Result<Vec<Self>, Error> {
        lower.check_config(upper)?;
        if !lower.same_shape(upper) {
            return Err(AddressValueError::SegmentCount.into());
        }
        let l = lower.lower_value();
        let u = upper.upper_value();
        if l > u {
            return Err(AddressValueError::ReversedRange.into());
        }
        Ok(span_block_values(l, u, lower.bit_count())
            .into_iter()
            .map(|(value, p)| lower.prefix_block_in_shape(value, p))
            .collect())
    }

    /// Decompose the closed interval into the minimum run of sequential
    /// sections.
    ///
    /// # Errors
    ///
    /// As [`spanning_prefix_blocks`][Self::spanning_prefix_blocks].
    pub fn spanning_sequential_blocks(lower: &Self, upper: &Self) -> Result<Vec<Self>, Error> {
        lower.check_config(upper)?;
        if !lower.same_shape(upper) {
            return Err(AddressValueError::SegmentCount.into());
        }
        let l = lower.lower_value();
        let u = upper.upper_value();
        if l > u {
            return Err(AddressValueError::ReversedRange.into());
        }
        let bits = u32::from(A::SEGMENT_BITS);
        let n = lower.segment_count();
        let value_segs = |value: u128| -> Vec<u32> {
            (0..n)
                .map(|i| {
                    let shift = bits * (n - 1 - i) as u32;
                    ((value >> shift) as u32) & A::MAX_SEGMENT
                })
                .collect()
        };
        Ok(cover_between::<A>(&value_segs(l), &value_segs(u))
            .into_iter()
            .map(|segs| {
                Self::raw(
                    segs,
                    lower.start_index(),
                    None,
                    lower.prefix_configuration(),
                )
            })
            .collect())
    }

    /// The minimum set of prefix blocks whose union equals the union of
    /// `sections`: convert to sequential ranges, sort, coalesce
    /// adjacent or overlapping ranges, then span each.
    ///
    /// # Errors
    ///
    /// Fails on mismatched configurations or shapes among the inputs.
    pub fn merge_to_prefix_blocks(sections: &[Self]) -> Result<Vec<Self>, Error> {
        let Some(template) = sections.first() else {
            return Ok(Vec::new());
        };
        let mut ranges: Vec<(u128, u128)> = Vec::new();
        for section in sections {
            template.check_config(section)?;
            if !template.same_shape(section) {
                return Err(AddressValueError::SegmentCount.into());
            }
            for chunk in section.sequential_block_iter() {
                ranges.push((chunk.lower_value(), chunk.upper_value()));
            }
        }
        ranges.sort_unstable();
        let mut merged: Vec<(u128, u128)> = Vec::new();
        for (lo, up) in ranges {
            match merged.last_mut() {
                Some((_, prev_up)) if lo <= prev_up.saturating_add(1) => {
                    *prev_up = (*prev_up).max(up);
                }
                _ => merged.push((lo, up)),
            }
        }
        let mut out = Vec::new();
        for (lo, up) in merged {
            out.extend(
                span_block_values(lo, up, template.bit_count())
                    .into_iter()
                    .map(|(value, p)| template.prefix_block_in_shape(value, p)),
            );
        }
        Ok(out)
    }
}
