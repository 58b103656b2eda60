use core_types::{ConfigError, FieldSpec, FieldWidth, Frame, FrameConfig, Record, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame is shorter than a configured field requires. Frame size
    /// and field layout are configured independently, so this means the
    /// configuration does not match the device's protocol version; retrying
    /// cannot fix it.
    #[error("field '{field}' needs bytes {offset}..{end} but the frame is {frame_len} bytes; field layout does not match this frame size")]
    FieldOutOfBounds {
        field: String,
        offset: usize,
        end: usize,
        frame_len: usize,
    },
}

/// Stateless payload decoder: applies a configured field table to
/// validated frames.
///
/// Decoding is a pure function of the frame bytes and the configuration;
/// the same frame always decodes to the same record.
pub struct RecordDecoder {
    layout: Vec<FieldSpec>,
}

impl RecordDecoder {
    pub fn new(config: &FrameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            layout: config.layout.clone(),
        })
    }

    /// Extract every configured field from `frame`, in layout order.
    pub fn decode(&self, frame: &Frame) -> Result<Record, DecodeError> {
        let mut record = Record::new(frame.timestamp_us);
        for field in &self.layout {
            let raw = read_le(&frame.bytes, field)?;
            let value = match field.scale {
                Some(scale) => Value::F64(raw as f64 / scale),
                None => Value::I64(raw),
            };
            record.fields.push((field.name.clone(), value));
        }
        Ok(record)
    }
}

/// Read one little-endian field out of the frame, sign-extended to i64.
fn read_le(bytes: &[u8], field: &FieldSpec) -> Result<i64, DecodeError> {
    let width = field.width.bytes();
    let end = field.offset + width;
    let slice = bytes
        .get(field.offset..end)
        .ok_or_else(|| DecodeError::FieldOutOfBounds {
            field: field.name.clone(),
            offset: field.offset,
            end,
            frame_len: bytes.len(),
        })?;

    let raw = match field.width {
        FieldWidth::U8 => i64::from(slice[0]),
        FieldWidth::I8 => i64::from(slice[0] as i8),
        FieldWidth::U16 => {
            let mut b = [0u8; 2];
            b.copy_from_slice(slice);
            i64::from(u16::from_le_bytes(b))
        }
        FieldWidth::I16 => {
            let mut b = [0u8; 2];
            b.copy_from_slice(slice);
            i64::from(i16::from_le_bytes(b))
        }
        FieldWidth::U32 => {
            let mut b = [0u8; 4];
            b.copy_from_slice(slice);
            i64::from(u32::from_le_bytes(b))
        }
        FieldWidth::I32 => {
            let mut b = [0u8; 4];
            b.copy_from_slice(slice);
            i64::from(i32::from_le_bytes(b))
        }
    };
    Ok(raw)
}
