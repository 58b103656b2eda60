//! Synchronizer for fixed-size, magic-prefixed device frames.
//!
//! The device emits frames of a fixed configured size whose first four
//! bytes are a magic sentinel. The transport gives no boundary signaling
//! and no alignment guarantee, so [`FrameSync`] carries partial-match
//! state across chunks and recovers on its own after corruption: a filled
//! candidate whose header fails validation is dropped and scanning
//! resumes at the next byte.

use core_types::config::MAGIC_LEN;
use core_types::{ConfigError, Frame, FrameConfig, RejectReason, ResyncPolicy, SyncEvent};
use serde::Serialize;

use crate::Framer;

/// Where the synchronizer is in the byte stream.
///
/// Exactly one of two regimes, made explicit instead of folding both into
/// one signed counter:
/// - `Seeking`: `matched` header bytes (0 to 3) sit at the start of the
///   scratch buffer and the next input byte must continue the sentinel.
/// - `Filling`: a header has been accepted and `remaining` bytes (1 to
///   `frame_size`) are still needed to complete the candidate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Seeking { matched: usize },
    Filling { remaining: usize },
}

/// Running counters for one stream.
#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SyncStats {
    pub bytes_consumed: u64,
    pub frames_emitted: u64,
    pub frames_rejected: u64,
}

/// Stateful frame synchronizer. One instance owns one logical stream.
///
/// Owns a single scratch buffer of exactly `frame_size` bytes, overwritten
/// in place; completed frames are handed out as copies. Processing is
/// strictly in input order with no backtracking, so work is linear in the
/// input length and memory never exceeds the one scratch buffer.
pub struct FrameSync {
    frame_size: usize,
    magic: u32,
    magic_bytes: [u8; MAGIC_LEN],
    resync: ResyncPolicy,
    buffer: Vec<u8>,
    state: SyncState,
    /// Receipt timestamp of the chunk that wrote the buffer's first byte.
    start_timestamp_us: Option<u64>,
    stats: SyncStats,
}

impl FrameSync {
    pub fn new(config: &FrameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            frame_size: config.frame_size,
            magic: config.magic,
            magic_bytes: config.magic_bytes(),
            resync: config.resync,
            buffer: vec![0; config.frame_size],
            state: SyncState::Seeking { matched: 0 },
            start_timestamp_us: None,
            stats: SyncStats::default(),
        })
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Validate a completed candidate and re-arm for the next frame.
    fn complete(&mut self, timestamp_us: u64, events: &mut Vec<SyncEvent>) {
        let mut word = [0u8; MAGIC_LEN];
        word.copy_from_slice(&self.buffer[..MAGIC_LEN]);
        let observed = u32::from_le_bytes(word);

        if observed == self.magic {
            let ts = self.start_timestamp_us.take().unwrap_or(timestamp_us);
            events.push(SyncEvent::Frame(Frame::new(self.buffer.clone(), ts)));
            self.stats.frames_emitted += 1;
            self.state = match self.resync {
                // Frames are back-to-back once synchronized: keep filling
                // and defer the header check to the next completion.
                ResyncPolicy::Assume => SyncState::Filling {
                    remaining: self.frame_size,
                },
                ResyncPolicy::Rescan => SyncState::Seeking { matched: 0 },
            };
        } else {
            events.push(SyncEvent::Rejected(RejectReason::BadHeader { observed }));
            self.stats.frames_rejected += 1;
            self.start_timestamp_us = None;
            // Bytes already consumed into the rejected buffer are not
            // re-inspected; scanning resumes at the next input byte.
            self.state = SyncState::Seeking { matched: 0 };
        }
    }
}

impl Framer for FrameSync {
    fn push(&mut self, bytes: &[u8], timestamp_us: u64) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        self.stats.bytes_consumed += bytes.len() as u64;

        let mut i = 0;
        while i < bytes.len() {
            match self.state {
                SyncState::Seeking { matched } => {
                    let Some(&b) = bytes.get(i) else {
                        break;
                    };
                    i += 1;
                    if b == self.magic_bytes[matched] {
                        if matched == 0 {
                            self.start_timestamp_us = Some(timestamp_us);
                        }
                        self.buffer[matched] = b;
                        self.state = if matched + 1 == MAGIC_LEN {
                            SyncState::Filling {
                                remaining: self.frame_size - MAGIC_LEN,
                            }
                        } else {
                            SyncState::Seeking {
                                matched: matched + 1,
                            }
                        };
                    } else {
                        // Forget any partial sentinel. The mismatched byte
                        // is consumed, not retried as a new match start.
                        self.state = SyncState::Seeking { matched: 0 };
                    }
                }
                SyncState::Filling { remaining } => {
                    if remaining == self.frame_size {
                        self.start_timestamp_us = Some(timestamp_us);
                    }
                    let take = remaining.min(bytes.len() - i);
                    let written = self.frame_size - remaining;
                    self.buffer[written..written + take].copy_from_slice(&bytes[i..i + take]);
                    i += take;
                    if remaining == take {
                        self.complete(timestamp_us, &mut events);
                    } else {
                        self.state = SyncState::Filling {
                            remaining: remaining - take,
                        };
                    }
                }
            }
        }
        events
    }

    fn reset(&mut self) {
        self.state = SyncState::Seeking { matched: 0 };
        self.start_timestamp_us = None;
    }

    fn name(&self) -> &'static str {
        "FixedFrame"
    }
}
