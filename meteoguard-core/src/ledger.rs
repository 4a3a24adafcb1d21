//! Bounded History Ledger
//!
//! Keeps the last `HISTORY_CAPACITY` readings saved by the station loop and
//! serves them to the presentation layer in chronological order. The ledger
//! is a thin domain wrapper over [`RingBuffer`]: capacity exhaustion is not
//! an error, the oldest reading is simply evicted.
//!
//! Callers only ever see logical, oldest-first sequences. Slot positions are
//! exposed through [`HistoryLedger::write_index`] for diagnostics and
//! nothing else.
//!
//! ```rust
//! use meteoguard_core::{HistoryLedger, Reading};
//! use meteoguard_core::time::TimeLabel;
//!
//! let mut ledger: HistoryLedger = HistoryLedger::new();
//! for i in 1..=53 {
//!     ledger.append(Reading::new(i as f32, 50.0, false, 0, TimeLabel::sentinel()));
//! }
//!
//! let temps: Vec<f32> = ledger.all().map(|r| r.temperature).collect();
//! assert_eq!(temps.first(), Some(&4.0));
//! assert_eq!(temps.last(), Some(&53.0));
//! ```

use crate::buffer::{self, FillState, RingBuffer};
use crate::constants::buffers::HISTORY_CAPACITY;
use crate::reading::Reading;

/// Oldest-first view over a range of the ledger
pub type LedgerView<'a, const N: usize> = buffer::Iter<'a, Reading, N>;

/// Fixed-capacity history of readings
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger<const N: usize = HISTORY_CAPACITY> {
    readings: RingBuffer<Reading, N>,
}

impl<const N: usize> HistoryLedger<N> {
    pub const fn new() -> Self {
        Self { readings: RingBuffer::new() }
    }

    /// Ingest a reading; evicts the oldest one once the ledger is full
    pub fn append(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    /// The `n` most recently appended readings, oldest first
    ///
    /// Yields `min(n, len)` readings; `n == 0` yields nothing.
    pub fn recent_n(&self, n: usize) -> LedgerView<'_, N> {
        self.readings.recent(n)
    }

    /// Full contents in chronological order
    pub fn all(&self) -> LedgerView<'_, N> {
        self.readings.iter()
    }

    /// Most recently appended reading
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Number of readings held
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Slot the next append overwrites
    pub fn write_index(&self) -> usize {
        self.readings.write_index()
    }

    pub fn fill_state(&self) -> FillState {
        self.readings.fill_state()
    }
}
