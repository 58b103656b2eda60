use core_types::SyncEvent;

pub mod sync;

pub use sync::{FrameSync, SyncState, SyncStats};

/// Trait for converting a stream of bytes into discrete frame events.
///
/// Implementations are stateful: partial frames carry over between calls,
/// and feeding a byte sequence chunk-by-chunk must produce the same event
/// sequence as feeding it whole.
pub trait Framer: Send {
    /// Ingest new bytes and return the events produced while consuming them.
    ///
    /// # Arguments
    /// * `bytes` - The new chunk of data read from transport.
    /// * `timestamp_us` - The receipt timestamp associated with this chunk.
    fn push(&mut self, bytes: &[u8], timestamp_us: u64) -> Vec<SyncEvent>;

    /// Reset internal state (drop any partial frame).
    fn reset(&mut self);

    /// Get the name of the framer.
    fn name(&self) -> &'static str;
}
