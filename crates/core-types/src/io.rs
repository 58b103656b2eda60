use crate::Record;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("transport read failed: {0}")]
    Io(String),
    #[error("source error: {0}")]
    Other(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("storing record failed: {0}")]
    Write(String),
    #[error("sink error: {0}")]
    Other(String),
}

/// A transport collaborator delivering raw byte chunks in arrival order.
///
/// Chunks are arbitrarily sized and carry a receipt timestamp in
/// microseconds; the consumer has no knowledge of chunk sizing or timing.
/// Opening and configuring the underlying connection is the implementor's
/// business.
#[allow(async_fn_in_trait)]
pub trait ChunkSource: Send {
    /// Read the next chunk. `Ok(None)` means the stream has closed cleanly
    /// and no further chunks will arrive.
    async fn next_chunk(&mut self) -> Result<Option<(Vec<u8>, u64)>, SourceError>;
}

/// A storage collaborator consuming decoded records.
#[allow(async_fn_in_trait)]
pub trait RecordSink: Send {
    /// Persist one record.
    async fn store(&mut self, record: Record) -> Result<(), SinkError>;
}
