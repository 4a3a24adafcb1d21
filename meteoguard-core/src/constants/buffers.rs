//! History Capacity and View Sizes

/// Number of readings kept in the history ledger.
///
/// 50 × ~40 bytes per reading stays under 2KB of RAM.
pub const HISTORY_CAPACITY: usize = 50;

/// Number of most recent readings included in a chat history reply.
pub const CHAT_HISTORY_LEN: usize = 5;

/// Maximum number of station events produced by a single tick.
pub const MAX_TICK_EVENTS: usize = 5;

/// Capacity of a formatted time label (`HH:MM DD.MM`).
pub const TIME_LABEL_LEN: usize = 11;
