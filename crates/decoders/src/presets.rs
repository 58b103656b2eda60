//! Frame layouts for the supported device firmwares.
//!
//! Offsets follow the device's packed packet struct: a 4-byte header,
//! then fields in declaration order with no padding, all little-endian.

use core_types::{FieldSpec, FieldWidth, FrameConfig};

/// Production environmental packet: 36 bytes carrying the GPS timing block
/// followed by the sensor block. Temperature is reported as raw counts that
/// divide by 160 to give degrees C; pressure is in Pascals.
pub fn environmental_config() -> FrameConfig {
    FrameConfig::new(36)
        .with_field(FieldSpec::raw("time_of_week", 12, FieldWidth::U32))
        .with_field(FieldSpec::scaled("temperature", 16, FieldWidth::I32, 160.0))
        .with_field(FieldSpec::raw("pressure", 20, FieldWidth::I32))
        .with_field(FieldSpec::raw("thermistor", 24, FieldWidth::U16))
        .with_field(FieldSpec::raw("raw_phase", 26, FieldWidth::U16))
}

/// Bench packet used by the development firmware: 12 bytes with the same
/// two sensor readings directly after the header.
pub fn bench_config() -> FrameConfig {
    FrameConfig::new(12)
        .with_field(FieldSpec::scaled("temperature", 4, FieldWidth::I32, 160.0))
        .with_field(FieldSpec::raw("pressure", 8, FieldWidth::I32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordDecoder;
    use core_types::{Frame, Value};

    #[test]
    fn test_presets_validate() {
        assert!(environmental_config().validate().is_ok());
        assert!(bench_config().validate().is_ok());
    }

    #[test]
    fn test_environmental_frame_decodes() {
        let config = environmental_config();
        let mut bytes = vec![0u8; 36];
        bytes[..4].copy_from_slice(&config.magic_bytes());
        bytes[12..16].copy_from_slice(&123_456_u32.to_le_bytes());
        bytes[16..20].copy_from_slice(&3_520_i32.to_le_bytes()); // 22.0 C
        bytes[20..24].copy_from_slice(&101_325_i32.to_le_bytes());
        bytes[24..26].copy_from_slice(&512_u16.to_le_bytes());
        bytes[26..28].copy_from_slice(&77_u16.to_le_bytes());

        let decoder = RecordDecoder::new(&config).unwrap();
        let record = decoder.decode(&Frame::new(bytes, 42)).unwrap();

        assert_eq!(record.get("time_of_week"), Some(&Value::I64(123_456)));
        assert_eq!(record.get("temperature"), Some(&Value::F64(22.0)));
        assert_eq!(record.get("pressure"), Some(&Value::I64(101_325)));
        assert_eq!(record.get("thermistor"), Some(&Value::I64(512)));
        assert_eq!(record.get("raw_phase"), Some(&Value::I64(77)));
    }
}
