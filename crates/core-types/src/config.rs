use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of magic bytes prefixing every frame.
pub const MAGIC_LEN: usize = 4;

/// Default header sentinel: four consecutive 0xFE bytes, read as a
/// little-endian 32-bit word. This is the single source of truth for the
/// magic value; both the byte-wise header matcher and the completed-frame
/// validator derive from it.
pub const DEFAULT_MAGIC: u32 = 0xFEFE_FEFE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("frame_size {frame_size} is too small: frames need the 4-byte header plus at least one payload byte")]
    FrameTooSmall { frame_size: usize },
    #[error("field '{field}' (offset {offset}, {width} bytes) extends past the {frame_size}-byte frame")]
    FieldBeyondFrame {
        field: String,
        offset: usize,
        width: usize,
        frame_size: usize,
    },
    #[error("field '{field}' has a zero scale divisor")]
    ZeroScale { field: String },
}

/// Width and signedness of a payload field. All fields are little-endian.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldWidth {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
}

impl FieldWidth {
    /// Number of bytes this field occupies in the frame.
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 => 4,
        }
    }
}

/// One payload field: where it sits in the frame and how to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    /// Byte offset from the start of the frame (header included).
    pub offset: usize,
    pub width: FieldWidth,
    /// Optional divisor applied to the raw integer to produce a float
    /// reading. Absent means the raw integer is the reading.
    pub scale: Option<f64>,
}

impl FieldSpec {
    /// A raw integer field.
    pub fn raw(name: impl Into<String>, offset: usize, width: FieldWidth) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
            scale: None,
        }
    }

    /// A scaled field: raw integer divided by `scale`.
    pub fn scaled(name: impl Into<String>, offset: usize, width: FieldWidth, scale: f64) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
            scale: Some(scale),
        }
    }
}

/// How the synchronizer re-arms after emitting a valid frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResyncPolicy {
    /// Assume frames are transmitted back-to-back: start filling the next
    /// frame immediately and validate its header only on completion. This
    /// matches the device protocol, at the cost of one frame's worth of
    /// data to notice a lost sync.
    #[default]
    Assume,
    /// Return to byte-by-byte header scanning after every frame. Stricter,
    /// tolerates inter-frame gaps and single dropped bytes.
    Rescan,
}

/// Configuration for one device stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameConfig {
    /// Total bytes per frame, the 4-byte header included.
    pub frame_size: usize,
    /// Header sentinel as a little-endian 32-bit word.
    #[serde(default = "default_magic")]
    pub magic: u32,
    /// Ordered payload field table.
    #[serde(default)]
    pub layout: Vec<FieldSpec>,
    #[serde(default)]
    pub resync: ResyncPolicy,
}

fn default_magic() -> u32 {
    DEFAULT_MAGIC
}

impl FrameConfig {
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            magic: DEFAULT_MAGIC,
            layout: Vec::new(),
            resync: ResyncPolicy::default(),
        }
    }

    pub fn with_magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.layout.push(field);
        self
    }

    pub fn with_resync(mut self, resync: ResyncPolicy) -> Self {
        self.resync = resync;
        self
    }

    /// The magic in wire order: the byte expected first on the wire is
    /// element 0.
    pub fn magic_bytes(&self) -> [u8; MAGIC_LEN] {
        self.magic.to_le_bytes()
    }

    /// Check that the frame size and field table are mutually consistent.
    ///
    /// `frame_size` and the layout are configured independently, so a field
    /// reaching past the end of the frame is a configuration mistake we
    /// catch here rather than at decode time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_size <= MAGIC_LEN {
            return Err(ConfigError::FrameTooSmall {
                frame_size: self.frame_size,
            });
        }
        for field in &self.layout {
            let width = field.width.bytes();
            if field.offset + width > self.frame_size {
                return Err(ConfigError::FieldBeyondFrame {
                    field: field.name.clone(),
                    offset: field.offset,
                    width,
                    frame_size: self.frame_size,
                });
            }
            if field.scale == Some(0.0) {
                return Err(ConfigError::ZeroScale {
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_magic_wire_order() {
        let config = FrameConfig::new(12);
        assert_eq!(config.magic_bytes(), [0xFE, 0xFE, 0xFE, 0xFE]);

        // A non-uniform magic comes out least-significant byte first.
        let config = FrameConfig::new(12).with_magic(0x1234_5678);
        assert_eq!(config.magic_bytes(), [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_validate_accepts_reasonable_config() {
        let config = FrameConfig::new(12)
            .with_field(FieldSpec::scaled("temperature", 4, FieldWidth::I32, 160.0))
            .with_field(FieldSpec::raw("pressure", 8, FieldWidth::I32));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_header_only_frame() {
        assert_eq!(
            FrameConfig::new(4).validate(),
            Err(ConfigError::FrameTooSmall { frame_size: 4 })
        );
        assert!(FrameConfig::new(0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_field_past_frame_end() {
        // Last byte of the field would land at offset 12 in a 12-byte frame.
        let config = FrameConfig::new(12).with_field(FieldSpec::raw("x", 9, FieldWidth::I32));
        match config.validate() {
            Err(ConfigError::FieldBeyondFrame { field, .. }) => assert_eq!(field, "x"),
            other => panic!("expected FieldBeyondFrame, got {other:?}"),
        }

        // A field ending exactly at the frame boundary is fine.
        let config = FrameConfig::new(12).with_field(FieldSpec::raw("x", 8, FieldWidth::I32));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let config = FrameConfig::new(12).with_field(FieldSpec::scaled("x", 4, FieldWidth::I32, 0.0));
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroScale { field: "x".into() })
        );
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = FrameConfig::new(36)
            .with_field(FieldSpec::scaled("temperature", 16, FieldWidth::I32, 160.0))
            .with_resync(ResyncPolicy::Rescan);
        let json = serde_json::to_string(&config).unwrap();
        let back: FrameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_config_defaults_from_minimal_json() {
        // Only frame_size given: magic and resync fall back to defaults.
        let config: FrameConfig = serde_json::from_str(r#"{"frame_size": 36}"#).unwrap();
        assert_eq!(config.magic, DEFAULT_MAGIC);
        assert_eq!(config.resync, ResyncPolicy::Assume);
        assert!(config.layout.is_empty());
    }
}
