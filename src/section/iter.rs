//! Restartable lazy cursors over the value sets of a section.
//!
//! Every `*_iter` method on [`Section`] yields an independent cursor; a
//! cursor never errors mid-enumeration.

use crate::{
    af::{Afi, PrefixConfiguration},
    segment::Segment,
};

use super::{segment_prefix_span, Section};

/// Mixed-radix odometer over per-position `(lower, upper, step)` triples.
#[derive(Clone, Debug)]
struct Odometer {
    lowers: Vec<u32>,
    uppers: Vec<u32>,
    steps: Vec<u32>,
    current: Vec<u32>,
    exhausted: bool,
}

impl Odometer {
    fn new(positions: impl IntoIterator<Item = (u32, u32, u32)>) -> Self {
        let (mut lowers, mut uppers, mut steps) = (Vec::new(), Vec::new(), Vec::new());
        for (lo, up, step) in positions {
            debug_assert!(lo <= up && step > 0);
            lowers.push(lo);
            uppers.push(up);
            steps.push(step);
        }
        Self {
            current: lowers.clone(),
            lowers,
            uppers,
            steps,
            exhausted: false,
        }
    }

    fn next_values(&mut self) -> Option<Vec<u32>> {
        if self.exhausted {
            return None;
        }
        let result = self.current.clone();
        let mut i = self.current.len();
        loop {
            if i == 0 {
                self.exhausted = true;
                break;
            }
            i -= 1;
            match self.current[i]
                .checked_add(self.steps[i])
                .filter(|v| *v <= self.uppers[i])
            {
                Some(v) => {
                    self.current[i] = v;
                    break;
                }
                None => self.current[i] = self.lowers[i],
            }
        }
        Some(result)
    }
}

fn keep_prefix<A: Afi>(section: &Section<A>) -> Option<u8> {
    match section.prefix_configuration() {
        PrefixConfiguration::PrefixedSubnetsAreExplicit => section.prefix_len(),
        _ => None,
    }
}

/// Cursor over every contained value, in enumeration order.
#[derive(Clone, Debug)]
pub struct SectionIter<A: Afi> {
    template: Section<A>,
    odometer: Odometer,
    prefix: Option<u8>,
}

impl<A: Afi> Iterator for SectionIter<A> {
    type Item = Section<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.odometer.next_values()?;
        let segments = values
            .iter()
            .map(|&v| Segment::ranged_unchecked(v, v, None))
            .collect();
        Some(Section::raw(
            segments,
            self.template.start_index(),
            self.prefix,
            self.template.prefix_configuration(),
        ))
    }
}

/// Shared cursor over the distinct network-prefix values of a section.
#[derive(Clone, Debug)]
struct NetworkCursor<A: Afi> {
    template: Section<A>,
    prefix: u8,
    odometer: Odometer,
}

impl<A: Afi> NetworkCursor<A> {
    fn new(template: &Section<A>) -> Self {
        let prefix = template.prefix_len().unwrap_or_else(|| template.bit_count());
        let positions = template
            .segments()
            .iter()
            .enumerate()
            .map(|(i, seg)| match segment_prefix_span::<A>(i, prefix) {
                None => (seg.lower(), seg.upper(), 1),
                Some(0) => (0, 0, 1),
                Some(sp) => {
                    let nm = Segment::<A>::network_mask(sp);
                    let hm = Segment::<A>::host_mask(sp);
                    (seg.lower() & nm, seg.upper() & nm, hm + 1)
                }
            });
        Self {
            template: template.clone(),
            prefix,
            odometer: Odometer::new(positions),
        }
    }
}

/// Cursor over distinct prefixes; each item is the original section
/// restricted to one prefix value.
#[derive(Clone, Debug)]
pub struct PrefixIter<A: Afi> {
    cursor: NetworkCursor<A>,
}

impl<A: Afi> Iterator for PrefixIter<A> {
    type Item = Section<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.cursor.odometer.next_values()?;
        let prefix = self.cursor.prefix;
        let segments = self
            .cursor
            .template
            .segments()
            .iter()
            .enumerate()
            .zip(values)
            .map(|((i, seg), v)| match segment_prefix_span::<A>(i, prefix) {
                None => Segment::ranged_unchecked(v, v, seg.segment_prefix()),
                Some(0) => *seg,
                Some(sp) => {
                    let hm = Segment::<A>::host_mask(sp);
                    Segment::ranged_unchecked(
                        seg.lower().max(v),
                        seg.upper().min(v | hm),
                        Some(sp),
                    )
                }
            })
            .collect();
        Some(Section::raw(
            segments,
            self.cursor.template.start_index(),
            Some(prefix),
            self.cursor.template.prefix_configuration(),
        ))
    }
}

/// Cursor over the prefix blocks covering the section, one full block per
/// item.
#[derive(Clone, Debug)]
pub struct PrefixBlockIter<A: Afi> {
    cursor: NetworkCursor<A>,
}

impl<A: Afi> Iterator for PrefixBlockIter<A> {
    type Item = Section<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.cursor.odometer.next_values()?;
        let prefix = self.cursor.prefix;
        let segments = self
            .cursor
            .template
            .segments()
            .iter()
            .enumerate()
            .zip(values)
            .map(|((i, _), v)| match segment_prefix_span::<A>(i, prefix) {
                None => Segment::ranged_unchecked(v, v, None),
                Some(sp) => {
                    let hm = Segment::<A>::host_mask(sp);
                    Segment::ranged_unchecked(v, v | hm, Some(sp))
                }
            })
            .collect();
        Some(Section::raw(
            segments,
            self.cursor.template.start_index(),
            Some(prefix),
            self.cursor.template.prefix_configuration(),
        ))
    }
}

/// Cursor over the Cartesian product of the first `n` segments, the
/// remaining segments held as ranges.
#[derive(Clone, Debug)]
pub struct BlockIter<A: Afi> {
    template: Section<A>,
    fixed: usize,
    odometer: Odometer,
}

impl<A: Afi> Iterator for BlockIter<A> {
    type Item = Section<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.odometer.next_values()?;
        let segments = values
            .iter()
            .map(|&v| Segment::ranged_unchecked(v, v, None))
            .chain(
                self.template.segments()[self.fixed..]
                    .iter()
                    .map(|seg| seg.with_segment_prefix(None)),
            )
            .collect();
        Some(Section::raw(
            segments,
            self.template.start_index(),
            None,
            self.template.prefix_configuration(),
        ))
    }
}

/// Cursor over the largest contained sections that are themselves
/// sequential.
#[derive(Clone, Debug)]
pub struct SequentialBlockIter<A: Afi> {
    template: Section<A>,
    pivot: usize,
    odometer: Odometer,
}

impl<A: Afi> Iterator for SequentialBlockIter<A> {
    type Item = Section<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.odometer.next_values()?;
        let segments = values
            .iter()
            .map(|&v| Segment::ranged_unchecked(v, v, None))
            .chain(
                self.template.segments()[self.pivot..]
                    .iter()
                    .map(|seg| seg.with_segment_prefix(None)),
            )
            .collect();
        Some(Section::raw(
            segments,
            self.template.start_index(),
            None,
            self.template.prefix_configuration(),
        ))
    }
}

impl<A: Afi> Section<A> {
    /// Iterate every contained value as a single-valued section.
    ///
    /// The prefix annotation is preserved only under the explicit prefix
    /// configuration; under the subnet modes a prefixed element would
    /// itself denote a block.
    #[must_use]
    pub fn iter(&self) -> SectionIter<A> {
        SectionIter {
            odometer: Odometer::new(
                self.segments().iter().map(|seg| (seg.lower(), seg.upper(), 1)),
            ),
            prefix: keep_prefix(self),
            template: self.clone(),
        }
    }

    /// Iterate the distinct prefixes, each item restricted to the original
    /// value set.
    #[must_use]
    pub fn prefix_iter(&self) -> PrefixIter<A> {
        PrefixIter {
            cursor: NetworkCursor::new(self),
        }
    }

    /// Iterate whole prefix blocks.
    #[must_use]
    pub fn prefix_block_iter(&self) -> PrefixBlockIter<A> {
        PrefixBlockIter {
            cursor: NetworkCursor::new(self),
        }
    }

    /// Iterate the Cartesian product of the first `segment_count` segments.
    #[must_use]
    pub fn block_iter(&self, segment_count: usize) -> BlockIter<A> {
        let fixed = segment_count.min(self.segment_count());
        BlockIter {
            odometer: Odometer::new(
                self.segments()[..fixed]
                    .iter()
                    .map(|seg| (seg.lower(), seg.upper(), 1)),
            ),
            fixed,
            template: self.clone(),
        }
    }

    /// Iterate the largest sequential chunks of the value set.
    #[must_use]
    pub fn sequential_block_iter(&self) -> SequentialBlockIter<A> {
        // the first position from which every following segment covers its
        // full range
        let mut pivot = self.segment_count();
        while pivot > 0 && self.segments()[pivot - 1].is_full_range() {
            pivot -= 1;
        }
        pivot = pivot.saturating_sub(1);
        SequentialBlockIter {
            odometer: Odometer::new(
                self.segments()[..pivot]
                    .iter()
                    .map(|seg| (seg.lower(), seg.upper(), 1)),
            ),
            pivot,
            template: self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ipv4;

    fn section(
        ranges: [(u32, u32); 4],
        prefix: Option<u8>,
        config: PrefixConfiguration,
    ) -> Section<Ipv4> {
        let segments = ranges
            .iter()
            .map(|&(lo, up)| Segment::ranged(lo, up, None).unwrap())
            .collect();
        Section::with_config(segments, prefix, config).unwrap()
    }

    const EXPLICIT: PrefixConfiguration = PrefixConfiguration::PrefixedSubnetsAreExplicit;
    const AUTO: PrefixConfiguration = PrefixConfiguration::AllPrefixedAddressesAreSubnets;

    #[test]
    fn value_iteration_order() {
        let s = section([(1, 1), (2, 2), (0, 1), (0, 1)], None, EXPLICIT);
        let seen: Vec<(u32, u32)> = s
            .iter()
            .map(|item| (item.segment(2).value().unwrap(), item.segment(3).value().unwrap()))
            .collect();
        assert_eq!(seen, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn iteration_is_restartable() {
        let s = section([(1, 1), (2, 2), (0, 3), (0, 0)], None, EXPLICIT);
        assert_eq!(s.iter().count(), 4);
        assert_eq!(s.iter().count(), 4);
    }

    #[test]
    fn prefix_block_iteration() {
        // 10.0.0.0/14 as a block covers four /16-shaped steps when re-cut
        let s = section([(10, 10), (0, 3), (0, 255), (0, 255)], Some(16), AUTO);
        let blocks: Vec<Section<Ipv4>> = s.prefix_block_iter().collect();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].segment(1).value(), Some(0));
        assert_eq!(blocks[3].segment(1).value(), Some(3));
        assert!(blocks.iter().all(Section::is_prefix_block));
    }

    #[test]
    fn prefix_iteration_restricts_to_original() {
        // boundary inside segment 2: 1.2.0-63.5 with /18
        let segments = vec![
            Segment::new(1).unwrap(),
            Segment::new(2).unwrap(),
            Segment::ranged(0, 63, None).unwrap(),
            Segment::new(5).unwrap(),
        ];
        let s = Section::<Ipv4>::with_config(segments, Some(18), EXPLICIT).unwrap();
        let prefixes: Vec<Section<Ipv4>> = s.prefix_iter().collect();
        assert_eq!(prefixes.len(), 1);
        assert_eq!(
            (prefixes[0].segment(2).lower(), prefixes[0].segment(2).upper()),
            (0, 63)
        );
        assert_eq!(prefixes[0].segment(3).value(), Some(5));
    }

    #[test]
    fn block_iteration_over_leading_segments() {
        let s = section([(1, 2), (0, 0), (0, 255), (0, 255)], None, EXPLICIT);
        let blocks: Vec<Section<Ipv4>> = s.block_iter(2).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].segment(2).is_full_range());
    }

    #[test]
    fn sequential_blocks_cut_at_last_partial_segment() {
        let s = section([(1, 1), (2, 2), (0, 3), (0, 3)], None, EXPLICIT);
        let chunks: Vec<Section<Ipv4>> = s.sequential_block_iter().collect();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.is_sequential()));
        assert_eq!(chunks[0].segment(2).value(), Some(0));
        assert_eq!(
            (chunks[0].segment(3).lower(), chunks[0].segment(3).upper()),
            (0, 3)
        );
    }

    #[test]
    fn sequential_blocks_single_when_sequential() {
        let s = section([(1, 1), (2, 2), (0, 3), (0, 255)], None, EXPLICIT);
        assert_eq!(s.sequential_block_iter().count(), 1);
    }
}
