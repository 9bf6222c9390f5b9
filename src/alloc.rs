//! Best-fit allocation of CIDR sub-blocks from a pool.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{
    addr::Address,
    af::Afi,
    error::AddressValueError,
    num::AddressCount,
    primitive::Value as _,
};

/// A block handed out by the allocator, annotated with the request it
/// served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatedBlock<A: Afi> {
    pub block: Address<A>,
    /// The requested host count, zero for bit-length requests.
    pub size: u128,
    /// The reserved overhead deducted from the block's usable capacity.
    pub reserved: u128,
}

impl<A: Afi> AllocatedBlock<A> {
    /// Total addresses in the block.
    #[must_use]
    pub fn count(&self) -> AddressCount {
        self.block.count()
    }
}

/// Serves variable-size block requests from a pool of CIDR blocks,
/// splitting on demand and coalescing freed siblings.
#[derive(Clone, Debug)]
pub struct PrefixBlockAllocator<A: Afi> {
    // prefix length -> network values of free blocks at that length
    pool: BTreeMap<u8, BTreeSet<u128>>,
    reserved: u128,
    _family: core::marker::PhantomData<A>,
}

impl<A: Afi> Default for PrefixBlockAllocator<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Afi> PrefixBlockAllocator<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: BTreeMap::new(),
            reserved: 0,
            _family: core::marker::PhantomData,
        }
    }

    /// Set the per-allocation reserved overhead (network, broadcast,
    /// gateway addresses and the like) deducted from each block's usable
    /// capacity.
    pub fn set_reserved(&mut self, reserved: u128) {
        self.reserved = reserved;
    }

    #[must_use]
    pub fn reserved(&self) -> u128 {
        self.reserved
    }

    /// Return a block to the pool, coalescing with its buddy while one is
    /// free.
    ///
    /// # Errors
    ///
    /// Fails when the address is not a single prefix block.
    pub fn add_available(&mut self, block: &Address<A>) -> Result<(), AddressValueError> {
        let p = block.prefix_len().unwrap_or(A::BIT_COUNT);
        if block.prefix_len().is_some() && !block.is_single_prefix_block() {
            return Err(AddressValueError::SegmentCount);
        }
        let value = block.section().lower_value();
        self.insert_coalescing(value, p);
        Ok(())
    }

    fn insert_coalescing(&mut self, mut value: u128, mut p: u8) {
        while p > 0 {
            let buddy = value ^ block_size_bit::<A>(p);
            let siblings = self.pool.entry(p).or_default();
            if siblings.remove(&buddy) {
                debug!(prefix_len = p, "coalesced freed block with its buddy");
                value = value.min(buddy);
                p -= 1;
            } else {
                break;
            }
        }
        self.pool.entry(p).or_default().insert(value);
    }

    /// Allocate the tightest block able to hold `size` hosts on top of the
    /// reserved overhead. `None` when the pool cannot satisfy the request.
    pub fn allocate_size(&mut self, size: u128) -> Option<AllocatedBlock<A>> {
        if size == 0 {
            return None;
        }
        let needed = size.checked_add(self.reserved)?;
        let host_bits = ceil_log2(needed);
        if host_bits > u32::from(A::BIT_COUNT) {
            return None;
        }
        let p = A::BIT_COUNT - host_bits as u8;
        let block = self.carve(p)?;
        debug!(size, prefix_len = p, "allocated block for size request");
        Some(AllocatedBlock {
            block,
            size,
            reserved: self.reserved,
        })
    }

    /// Allocate a run of sizes in input order, each matched best-fit. The
    /// result is shorter than the input when the pool runs dry.
    pub fn allocate_sizes(&mut self, sizes: &[u128]) -> Vec<AllocatedBlock<A>> {
        sizes
            .iter()
            .map_while(|&size| self.allocate_size(size))
            .collect()
    }

    /// Allocate a block of exactly the given prefix length, ignoring the
    /// reserved count.
    pub fn allocate_bit_length(&mut self, p: u8) -> Option<Address<A>> {
        if p > A::BIT_COUNT {
            return None;
        }
        let block = self.carve(p)?;
        debug!(prefix_len = p, "allocated block for bit-length request");
        Some(block)
    }

    /// Allocate a run of prefix lengths in input order.
    pub fn allocate_bit_lengths(&mut self, lengths: &[u8]) -> Vec<Address<A>> {
        lengths
            .iter()
            .map_while(|&p| self.allocate_bit_length(p))
            .collect()
    }

    /// Return a previously allocated block to the pool.
    ///
    /// # Errors
    ///
    /// As [`add_available`][Self::add_available].
    pub fn free(&mut self, block: &Address<A>) -> Result<(), AddressValueError> {
        self.add_available(block)
    }

    /// The current pool in canonical form: coalesced, ordered by network
    /// value then prefix length.
    #[must_use]
    pub fn available_blocks(&self) -> Vec<Address<A>> {
        let mut blocks: Vec<(u128, u8)> = self
            .pool
            .iter()
            .flat_map(|(&p, values)| values.iter().map(move |&v| (v, p)))
            .collect();
        blocks.sort_unstable();
        blocks
            .into_iter()
            .map(|(v, p)| {
                Address::prefix_block_of(A::Primitive::from_u128(v), p)
                    .expect("pool holds valid prefix lengths")
            })
            .collect()
    }

    /// Total free addresses across the pool.
    #[must_use]
    pub fn total_available(&self) -> AddressCount {
        self.pool
            .iter()
            .flat_map(|(&p, values)| {
                values
                    .iter()
                    .map(move |_| AddressCount::power_of_two(A::BIT_COUNT - p))
            })
            .sum()
    }

    /// Pull the lowest-addressed smallest free block of length at most
    /// `p`, splitting it down to exactly `p`.
    fn carve(&mut self, p: u8) -> Option<Address<A>> {
        // the longest free prefix no longer than p is the tightest fit
        let source = self
            .pool
            .range(..=p)
            .rev()
            .find_map(|(&len, values)| (!values.is_empty()).then_some(len))?;
        let value = {
            let values = self.pool.get_mut(&source)?;
            let v = *values.iter().next()?;
            values.remove(&v);
            v
        };
        let mut len = source;
        while len < p {
            len += 1;
            let upper_half = value | block_size_bit::<A>(len);
            self.pool.entry(len).or_default().insert(upper_half);
            debug!(prefix_len = len, "split block, upper half returned to pool");
        }
        Some(
            Address::prefix_block_of(A::Primitive::from_u128(value), p)
                .expect("carved prefix length is in range"),
        )
    }
}

/// The bit distinguishing a block of prefix length `p` from its buddy.
fn block_size_bit<A: Afi>(p: u8) -> u128 {
    debug_assert!(p > 0);
    1u128 << (A::BIT_COUNT - p)
}

/// Smallest `k` with `2^k >= n`.
fn ceil_log2(n: u128) -> u32 {
    match n {
        0 | 1 => 0,
        _ => 128 - (n - 1).leading_zeros(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ipv4;

    fn block(s: &str) -> Address<Ipv4> {
        s.parse().unwrap()
    }

    fn pool_with(s: &str) -> PrefixBlockAllocator<Ipv4> {
        let mut alloc = PrefixBlockAllocator::new();
        alloc.add_available(&block(s)).unwrap();
        alloc
    }

    #[test]
    fn ceil_log2_values() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(52), 6);
        assert_eq!(ceil_log2(64), 6);
        assert_eq!(ceil_log2(65), 7);
    }

    #[test]
    fn size_run_with_reserved_overhead() {
        let mut alloc = pool_with("192.168.10.0/24");
        alloc.set_reserved(2);
        let blocks = alloc.allocate_sizes(&[50, 30, 20, 2, 2, 2]);
        let got: Vec<String> = blocks
            .iter()
            .map(|b| {
                format!(
                    "{}/{}",
                    std::net::Ipv4Addr::from(b.block.lower_primitive()),
                    b.block.prefix_len().unwrap()
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                "192.168.10.0/26",
                "192.168.10.64/27",
                "192.168.10.96/27",
                "192.168.10.128/30",
                "192.168.10.132/30",
                "192.168.10.136/30",
            ]
        );
    }

    #[test]
    fn exhausted_pool_truncates_result() {
        let mut alloc = pool_with("10.0.0.0/30");
        let blocks = alloc.allocate_sizes(&[2, 2, 2]);
        assert_eq!(blocks.len(), 2);
        assert!(alloc.allocate_size(1).is_none());
    }

    #[test]
    fn bit_length_allocation_ignores_reserved() {
        let mut alloc = pool_with("10.0.0.0/24");
        alloc.set_reserved(100);
        let b = alloc.allocate_bit_length(26).unwrap();
        assert_eq!(b.prefix_len(), Some(26));
        assert_eq!(b.lower_primitive(), 0x0a00_0000);
    }

    #[test]
    fn free_coalesces_back_to_original() {
        let mut alloc = pool_with("10.0.0.0/24");
        let a = alloc.allocate_bit_length(26).unwrap();
        let b = alloc.allocate_bit_length(26).unwrap();
        alloc.free(&a).unwrap();
        alloc.free(&b).unwrap();
        let available = alloc.available_blocks();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].prefix_len(), Some(24));
    }

    #[test]
    fn total_available_tracks_allocations() {
        let mut alloc = pool_with("10.0.0.0/24");
        assert_eq!(alloc.total_available(), AddressCount::Count(256));
        let _ = alloc.allocate_bit_length(25).unwrap();
        assert_eq!(alloc.total_available(), AddressCount::Count(128));
    }

    #[test]
    fn best_fit_prefers_tightest_source() {
        let mut alloc = pool_with("10.0.0.0/26");
        alloc.add_available(&block("10.1.0.0/24")).unwrap();
        // a /26 request should come from the /26, not split the /24
        let b = alloc.allocate_bit_length(26).unwrap();
        assert_eq!(b.lower_primitive(), 0x0a00_0000);
    }

    #[test]
    fn oversize_request_fails() {
        let mut alloc = pool_with("10.0.0.0/24");
        assert!(alloc.allocate_size(300).is_none());
    }
}
