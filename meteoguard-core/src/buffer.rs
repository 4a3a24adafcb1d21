//! Fixed-Size Ring Buffer with Logical Indexing
//!
//! ## Overview
//!
//! This module provides the ring buffer underneath the history ledger. It
//! stores at most `N` items in a fixed array, overwrites the oldest item once
//! full, and never exposes the physical layout: every accessor speaks in
//! logical indices, where 0 is the oldest item still held and `len - 1` the
//! newest.
//!
//! ## Memory Layout
//!
//! ```text
//! RingBuffer<T, 5> after pushing A..G (7 pushes):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F  │  G  │  C  │  D  │  E  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!    0     1     2     3     4
//!                ↑
//!                └── write_pos = 2 (next slot to overwrite, also the oldest)
//!
//! logical view: [C, D, E, F, G]
//! ```
//!
//! ## Index Mapping
//!
//! The valid items always form a contiguous run (modulo `N`) ending just
//! before `write_pos`. The run starts at
//!
//! ```text
//! start = (write_pos + N - len) % N
//! ```
//!
//! and logical index `i` lives in physical slot `(start + i) % N`. This one
//! formula covers the partially filled case (`start` is 0 until the first
//! wrap) and the full case (`start == write_pos`), so there is no branch on
//! fullness anywhere in the read path.
//!
//! ## Fill States
//!
//! ```text
//! Empty ──push──▶ Filling ──push (len reaches N)──▶ Full ──push──▶ Full
//! ```
//!
//! There is no removal operation; a buffer never leaves `Full`.
//!
//! ## Usage Example
//!
//! ```rust
//! use meteoguard_core::buffer::RingBuffer;
//!
//! let mut buf: RingBuffer<u32, 3> = RingBuffer::new();
//! for i in 1..=5 {
//!     buf.push(i);
//! }
//!
//! // Oldest two were overwritten
//! let items: Vec<u32> = buf.iter().copied().collect();
//! assert_eq!(items, vec![3, 4, 5]);
//!
//! // Most recent two, still oldest-first
//! let recent: Vec<u32> = buf.recent(2).copied().collect();
//! assert_eq!(recent, vec![4, 5]);
//! ```

use core::iter::FusedIterator;

/// How much of the buffer is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FillState {
    /// Nothing pushed yet
    Empty,
    /// Some slots still unwritten
    Filling,
    /// Every push now evicts the oldest item
    Full,
}

/// Fixed-capacity ring buffer that overwrites its oldest item when full
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - the `len` slots ending just before `write_pos` (modulo `N`) are `Some`
///
/// ## Thread Safety
///
/// Mutation takes `&mut self`, so the borrow checker already guarantees a
/// single writer and no reader overlapping a write. Sharing across threads
/// needs an external lock.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    /// Slots; `None` only until first written
    slots: [Option<T>; N],

    /// Physical slot the next push writes to
    write_pos: usize,

    /// Number of valid items, saturates at N
    len: usize,
}

impl<T, const N: usize> RingBuffer<T, N> {
    const EMPTY_SLOT: Option<T> = None;
    const NONZERO_CAPACITY: () = assert!(N > 0, "ring buffer capacity must be non-zero");

    /// Creates a new empty buffer
    ///
    /// Usable in const contexts, so a station can keep its history in a
    /// `static` without heap allocation.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_CAPACITY;

        Self {
            slots: [Self::EMPTY_SLOT; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Appends an item, overwriting the oldest one when full
    pub fn push(&mut self, item: T) {
        if self.len < N {
            self.len += 1;
        }

        self.slots[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % N;
    }

    /// Maximum number of items held
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Physical slot the next push will write to
    pub fn write_index(&self) -> usize {
        self.write_pos
    }

    pub fn fill_state(&self) -> FillState {
        match self.len {
            0 => FillState::Empty,
            len if len < N => FillState::Filling,
            _ => FillState::Full,
        }
    }

    /// Maps a logical index (0 = oldest) to its physical slot
    ///
    /// Returns `None` for indices at or past `len`, which covers both
    /// never-written and evicted positions.
    pub fn physical_index(&self, logical: usize) -> Option<usize> {
        if logical >= self.len {
            return None;
        }

        let start = (self.write_pos + N - self.len) % N;
        Some((start + logical) % N)
    }

    /// Gets an item by logical index (0 = oldest, len-1 = newest)
    pub fn get(&self, logical: usize) -> Option<&T> {
        let slot = self.physical_index(logical)?;
        self.slots[slot].as_ref()
    }

    /// Most recently pushed item
    pub fn last(&self) -> Option<&T> {
        self.get(self.len.checked_sub(1)?)
    }

    /// Iterate over all items from oldest to newest
    pub fn iter(&self) -> Iter<'_, T, N> {
        self.recent(self.len)
    }

    /// Iterate over the `n` most recent items, oldest first
    ///
    /// `n` larger than `len` is clamped; `n == 0` yields nothing.
    pub fn recent(&self, n: usize) -> Iter<'_, T, N> {
        let take = n.min(self.len);
        Iter {
            buffer: self,
            front: self.len - take,
            back: self.len,
        }
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a RingBuffer<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Oldest-to-newest iterator over a logical range of a ring buffer
#[derive(Debug, Clone)]
pub struct Iter<'a, T, const N: usize> {
    buffer: &'a RingBuffer<T, N>,
    /// Next logical index from the front
    front: usize,
    /// One past the next logical index from the back
    back: usize,
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }

        let item = self.buffer.get(self.front)?;
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for Iter<'_, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }

        let item = self.buffer.get(self.back - 1)?;
        self.back -= 1;
        Some(item)
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}

impl<T, const N: usize> FusedIterator for Iter<'_, T, N> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled<const N: usize>(count: u32) -> RingBuffer<u32, N> {
        let mut buffer = RingBuffer::new();
        for i in 1..=count {
            buffer.push(i);
        }
        buffer
    }

    #[test]
    fn empty_buffer() {
        let buffer: RingBuffer<u32, 5> = RingBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.fill_state(), FillState::Empty);
        assert!(buffer.last().is_none());
        assert_eq!(buffer.iter().count(), 0);
        assert_eq!(buffer.physical_index(0), None);
    }

    #[test]
    fn partial_fill_maps_identity() {
        let buffer = filled::<5>(3);
        assert_eq!(buffer.fill_state(), FillState::Filling);
        assert_eq!(buffer.write_index(), 3);

        for logical in 0..3 {
            assert_eq!(buffer.physical_index(logical), Some(logical));
        }
        assert_eq!(buffer.physical_index(3), None);
    }

    #[test]
    fn wrapped_mapping_starts_at_write_pos() {
        // A..G into 5 slots: physical [F, G, C, D, E], write_pos = 2
        let buffer = filled::<5>(7);
        assert_eq!(buffer.write_index(), 2);
        assert_eq!(buffer.physical_index(0), Some(2));
        assert_eq!(buffer.physical_index(2), Some(4));
        assert_eq!(buffer.physical_index(3), Some(0));
        assert_eq!(buffer.physical_index(4), Some(1));
        assert_eq!(buffer.physical_index(5), None);
    }

    #[test]
    fn circular_overwrite() {
        let buffer = filled::<3>(5);

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());
        assert_eq!(buffer.fill_state(), FillState::Full);

        // 1 and 2 were overwritten
        let values: Vec<u32> = buffer.iter().copied().collect();
        assert_eq!(values, vec![3, 4, 5]);
        assert_eq!(buffer.last(), Some(&5));
    }

    #[test]
    fn recent_clamps_and_keeps_order() {
        let buffer = filled::<4>(6);

        assert_eq!(buffer.recent(0).count(), 0);
        assert_eq!(buffer.recent(2).copied().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(buffer.recent(100).copied().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn iterator_runs_both_ways() {
        let buffer = filled::<4>(6);
        let reversed: Vec<u32> = buffer.iter().rev().copied().collect();
        assert_eq!(reversed, vec![6, 5, 4, 3]);
        assert_eq!(buffer.recent(3).len(), 3);
    }

    #[test]
    fn capacity_one_always_holds_newest() {
        let buffer = filled::<1>(4);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.write_index(), 0);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![4]);
    }
}
