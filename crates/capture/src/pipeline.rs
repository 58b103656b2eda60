use core_types::{
    ChunkSource, ConfigError, FrameConfig, RecordSink, RejectReason, SinkError, SourceError,
    SyncEvent,
};
use decoders::RecordDecoder;
use framing::{FrameSync, Framer};
use futures_channel::mpsc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("stream configuration rejected: {0}")]
    Config(#[from] ConfigError),
    #[error("reading from source failed: {0}")]
    Source(#[from] SourceError),
    #[error("writing to sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// Running counters for one capture run.
#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CaptureStats {
    pub chunks: u64,
    pub frames_stored: u64,
    pub frames_rejected: u64,
    pub decode_failures: u64,
}

/// Observable pipeline activity, published on a best-effort channel for
/// whoever is watching (a status display, a health check). Dropped on a
/// full or absent channel; the pipeline never blocks on observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    FrameStored { timestamp_us: u64 },
    FrameRejected { reason: RejectReason },
    DecodeFailed { message: String },
    SourceClosed,
}

/// The acquisition pipeline for one stream.
///
/// Owns the synchronizer and decoder built from one [`FrameConfig`]; the
/// run loop reads chunks until the source closes, storing every decoded
/// record. Malformed input is logged and counted, never fatal: the worst
/// a corrupted stream can do is produce no records.
pub struct Capture {
    sync: FrameSync,
    decoder: RecordDecoder,
    events: Option<mpsc::Sender<StreamEvent>>,
    stats: CaptureStats,
}

impl Capture {
    pub fn new(config: &FrameConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            sync: FrameSync::new(config)?,
            decoder: RecordDecoder::new(config)?,
            events: None,
            stats: CaptureStats::default(),
        })
    }

    /// Attach an observer channel for [`StreamEvent`]s.
    pub fn with_events(mut self, tx: mpsc::Sender<StreamEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn notify(&mut self, event: StreamEvent) {
        if let Some(tx) = &mut self.events {
            let _ = tx.try_send(event);
        }
    }

    /// Consume the source until it closes, storing decoded records in the
    /// sink. Returns the final counters on clean shutdown.
    ///
    /// Source and sink failures propagate; what to do about a broken
    /// transport or full store is the caller's policy, not ours.
    pub async fn run<S, K>(mut self, source: &mut S, sink: &mut K) -> Result<CaptureStats, CaptureError>
    where
        S: ChunkSource,
        K: RecordSink,
    {
        while let Some((bytes, timestamp_us)) = source.next_chunk().await? {
            self.stats.chunks += 1;
            debug!(len = bytes.len(), timestamp_us, "chunk received");

            for event in self.sync.push(&bytes, timestamp_us) {
                match event {
                    SyncEvent::Frame(frame) => match self.decoder.decode(&frame) {
                        Ok(record) => {
                            let ts = record.timestamp_us;
                            sink.store(record).await?;
                            self.stats.frames_stored += 1;
                            self.notify(StreamEvent::FrameStored { timestamp_us: ts });
                        }
                        Err(e) => {
                            // A validated frame that will not decode means the
                            // configured layout does not match the device
                            // firmware. Retrying cannot help; tell the operator.
                            self.stats.decode_failures += 1;
                            error!(error = %e, "frame decode failed");
                            self.notify(StreamEvent::DecodeFailed {
                                message: e.to_string(),
                            });
                        }
                    },
                    SyncEvent::Rejected(reason) => {
                        self.stats.frames_rejected += 1;
                        warn!(%reason, "ignoring frame");
                        self.notify(StreamEvent::FrameRejected { reason });
                    }
                }
            }
        }

        info!(
            frames = self.stats.frames_stored,
            rejected = self.stats.frames_rejected,
            "source closed, capture finished"
        );
        self.notify(StreamEvent::SourceClosed);
        Ok(self.stats)
    }
}
