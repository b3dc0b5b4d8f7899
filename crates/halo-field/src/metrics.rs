//! Ghost synchronization counters.

/// Cumulative counters for one field's ghost synchronizations.
///
/// Durations are wall-clock microseconds measured around the whole
/// four-pass exchange, including time blocked on neighbours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncMetrics {
    /// Completed `sync_ghosts()` calls.
    pub syncs: u64,
    /// Messages sent (four per completed sync).
    pub messages_sent: u64,
    /// Values sent across all messages.
    pub values_sent: u64,
    /// Duration of the most recent sync, in microseconds.
    pub last_sync_us: u64,
    /// Duration of all syncs, in microseconds.
    pub total_sync_us: u64,
}

impl SyncMetrics {
    /// Mean sync duration in microseconds, or 0 before the first sync.
    pub fn mean_sync_us(&self) -> u64 {
        self.total_sync_us.checked_div(self.syncs).unwrap_or(0)
    }
}
