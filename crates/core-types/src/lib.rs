use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod io;
pub use config::{ConfigError, FieldSpec, FieldWidth, FrameConfig, ResyncPolicy};
pub use io::{ChunkSource, RecordSink, SinkError, SourceError};

/// A complete, header-validated frame as received from the device.
///
/// The synchronizer hands these out by value; it never shares a reference
/// into its own scratch buffer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frame {
    /// The raw frame bytes, magic header included. Always exactly
    /// `frame_size` bytes long.
    pub bytes: Vec<u8>,
    /// Receipt timestamp in microseconds of the chunk that carried this
    /// frame's first byte. The wire protocol carries no timestamp of its own.
    pub timestamp_us: u64,
}

impl Frame {
    pub fn new(bytes: Vec<u8>, timestamp_us: u64) -> Self {
        Self {
            bytes,
            timestamp_us,
        }
    }
}

/// Why a filled candidate frame was discarded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RejectReason {
    /// The first word of the completed buffer did not match the configured
    /// magic. Carries the word actually observed (little-endian), which is
    /// usually enough to tell a desynchronized stream from line noise.
    BadHeader { observed: u32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadHeader { observed } => {
                write!(f, "bad frame header (observed 0x{observed:08X})")
            }
        }
    }
}

/// One outcome produced while consuming an input chunk.
///
/// Events are ordered: they appear in the sequence the stream produced them,
/// regardless of how the input was chunked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SyncEvent {
    /// A well-formed frame is ready for decoding.
    Frame(Frame),
    /// A candidate frame failed validation and was dropped. The stream
    /// re-synchronizes automatically; this is informational, not fatal.
    Rejected(RejectReason),
}

/// A decoded field value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    I64(i64),
    F64(f64),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

/// One decoded measurement, ready for storage.
///
/// Fields are kept as an ordered Vec rather than a map; layouts are small
/// and order mirrors the configured field table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Receipt timestamp inherited from the frame.
    pub timestamp_us: u64,
    /// Named field values in layout order.
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Look a field up by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_serialization() {
        let frame = Frame::new(vec![0xFE, 0xFE, 0xFE, 0xFE, 0x01], 1000);
        let json = serde_json::to_string(&frame).unwrap();
        let deserialized: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(frame, deserialized);
    }

    #[test]
    fn test_record_builder() {
        let record = Record::new(123_456)
            .with_field("temperature", 25.5)
            .with_field("pressure", 101_325_i64);

        assert_eq!(record.get("temperature"), Some(&Value::F64(25.5)));
        assert_eq!(record.get("pressure"), Some(&Value::I64(101_325)));
        assert_eq!(record.get("humidity"), None);
    }

    #[test]
    fn test_reject_reason_display() {
        let reason = RejectReason::BadHeader {
            observed: 0x01FE_FEFE,
        };
        assert_eq!(reason.to_string(), "bad frame header (observed 0x01FEFEFE)");
    }
}
