//! Pure conversions between raw register words and typed values.
//!
//! Multi-word values are big-endian: most significant word first. Numeric
//! registers carry an integer on the wire; the catalog gain divides it into
//! the engineering domain. No I/O and no state — everything here is a
//! stateless transform, exact up to the resolution the gain implies.

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::registers::{RegisterDef, WireType};

/// A decoded register value.
///
/// Unit-gain numeric registers decode to the integer domain (`UInt`/`Int`,
/// full 64-bit width for U64 — no wraparound); any other gain scales into
/// `Float`. String registers decode to `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    UInt(u64),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value, `None` for strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::UInt(v) => Some(*v as f64),
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::UInt(_) => "unsigned integer",
            Value::Int(_) => "signed integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

/// Decode raw register words into a typed value.
pub fn decode(words: &[u16], def: &RegisterDef) -> Result<Value, DeviceError> {
    if words.len() != def.count as usize {
        return Err(DeviceError::ShortResponse {
            expected: def.count as usize,
            got: words.len(),
        });
    }
    match def.wire {
        WireType::Str => Ok(Value::Text(decode_string(words))),
        WireType::U16 => Ok(scale_unsigned(u64::from(words[0]), def)),
        WireType::S16 => Ok(scale_signed(i64::from(words[0] as i16), def)),
        WireType::U32 => Ok(scale_unsigned(assemble(words), def)),
        WireType::S32 => Ok(scale_signed(i64::from(assemble(words) as u32 as i32), def)),
        WireType::U64 => Ok(scale_unsigned(assemble(words), def)),
    }
}

/// Encode a typed value into register words for writing.
pub fn encode(value: &Value, def: &RegisterDef) -> Result<Vec<u16>, DeviceError> {
    match (def.wire, value) {
        (WireType::Str, Value::Text(s)) => encode_string(s, def),
        (WireType::Str, other) => Err(DeviceError::UnsupportedType {
            wire: def.wire,
            kind: other.kind(),
        }),
        (_, Value::Text(_)) => Err(DeviceError::UnsupportedType {
            wire: def.wire,
            kind: "string",
        }),
        (wire, numeric) => {
            let scaled = scale_to_raw(numeric, def);
            encode_numeric(scaled, wire)
        }
    }
}

/// Big-endian assembly of up to four words into an unsigned integer.
fn assemble(words: &[u16]) -> u64 {
    words.iter().fold(0u64, |acc, w| (acc << 16) | u64::from(*w))
}

fn scale_unsigned(raw: u64, def: &RegisterDef) -> Value {
    if def.gain == 1.0 {
        Value::UInt(raw)
    } else {
        Value::Float(raw as f64 / def.gain)
    }
}

fn scale_signed(raw: i64, def: &RegisterDef) -> Value {
    if def.gain == 1.0 {
        Value::Int(raw)
    } else {
        Value::Float(raw as f64 / def.gain)
    }
}

/// Scale an engineering value back into the raw integer domain. The
/// unit-gain integer paths stay exact so full-width U64 values survive.
fn scale_to_raw(value: &Value, def: &RegisterDef) -> i128 {
    if def.gain == 1.0 {
        match value {
            Value::UInt(v) => *v as i128,
            Value::Int(v) => *v as i128,
            Value::Float(f) => f.round() as i128,
            Value::Text(_) => unreachable!("string handled by caller"),
        }
    } else {
        let v = match value {
            Value::UInt(v) => *v as f64,
            Value::Int(v) => *v as f64,
            Value::Float(f) => *f,
            Value::Text(_) => unreachable!("string handled by caller"),
        };
        (v * def.gain).round() as i128
    }
}

fn encode_numeric(scaled: i128, wire: WireType) -> Result<Vec<u16>, DeviceError> {
    let overflow = |scaled| DeviceError::EncodingOverflow { scaled, wire };
    match wire {
        WireType::U16 => {
            let raw = u16::try_from(scaled).map_err(|_| overflow(scaled))?;
            Ok(vec![raw])
        }
        WireType::S16 => {
            let raw = i16::try_from(scaled).map_err(|_| overflow(scaled))?;
            Ok(vec![raw as u16])
        }
        WireType::U32 => {
            let raw = u32::try_from(scaled).map_err(|_| overflow(scaled))?;
            Ok(split_words(u64::from(raw), 2))
        }
        WireType::S32 => {
            let raw = i32::try_from(scaled).map_err(|_| overflow(scaled))?;
            Ok(split_words(u64::from(raw as u32), 2))
        }
        WireType::U64 => {
            let raw = u64::try_from(scaled).map_err(|_| overflow(scaled))?;
            Ok(split_words(raw, 4))
        }
        WireType::Str => unreachable!("string handled by caller"),
    }
}

fn split_words(raw: u64, count: usize) -> Vec<u16> {
    (0..count)
        .rev()
        .map(|i| ((raw >> (16 * i)) & 0xFFFF) as u16)
        .collect()
}

fn decode_string(words: &[u16]) -> String {
    let mut bytes = vec![0u8; words.len() * 2];
    BigEndian::write_u16_into(words, &mut bytes);
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn encode_string(s: &str, def: &RegisterDef) -> Result<Vec<u16>, DeviceError> {
    let capacity = def.count as usize * 2;
    if s.len() > capacity {
        return Err(DeviceError::StringOverflow {
            len: s.len(),
            capacity,
        });
    }
    let mut padded = s.as_bytes().to_vec();
    padded.resize(capacity, 0);
    let mut words = vec![0u16; def.count as usize];
    BigEndian::read_u16_into(&padded, &mut words);
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{AccessMode, PollTier, Unit};
    use proptest::prelude::*;

    fn def(count: u16, wire: WireType, gain: f64) -> RegisterDef {
        RegisterDef::new(30000, count, AccessMode::ReadOnly, wire, gain, None, PollTier::High)
    }

    #[test]
    fn unit_gain_keeps_integers() {
        let d = def(1, WireType::U16, 1.0);
        assert_eq!(decode(&[42], &d).unwrap(), Value::UInt(42));

        let d = def(1, WireType::S16, 1.0);
        assert_eq!(decode(&[0x8000], &d).unwrap(), Value::Int(-32768));
    }

    #[test]
    fn gain_scales_into_float() {
        let d = def(1, WireType::U16, 10.0);
        assert_eq!(decode(&[235], &d).unwrap(), Value::Float(23.5));

        let d = def(2, WireType::S32, 1000.0);
        let raw = (-12_345_i32) as u32;
        let words = [(raw >> 16) as u16, raw as u16];
        assert_eq!(decode(&words, &d).unwrap(), Value::Float(-12.345));
    }

    #[test]
    fn u64_uses_full_width() {
        let d = def(4, WireType::U64, 1.0);
        let words = [0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF];
        assert_eq!(decode(&words, &d).unwrap(), Value::UInt(u64::MAX));
        assert_eq!(encode(&Value::UInt(u64::MAX), &d).unwrap(), words);
    }

    #[test]
    fn short_response_is_rejected() {
        let d = def(2, WireType::U32, 1.0);
        let err = decode(&[1], &d).unwrap_err();
        assert!(matches!(err, DeviceError::ShortResponse { expected: 2, got: 1 }));
    }

    #[test]
    fn string_trims_trailing_nuls() {
        // a model string padded into an 8-word block
        let d = def(8, WireType::Str, 1.0);
        let words = encode(&Value::Text("PCS-3000".into()), &d).unwrap();
        assert_eq!(words.len(), 8);
        assert_eq!(decode(&words, &d).unwrap(), Value::Text("PCS-3000".into()));
    }

    #[test]
    fn partially_filled_string_keeps_interior_bytes() {
        let d = def(2, WireType::Str, 1.0);
        // "A\0B" + trailing NUL: interior NUL survives, trailing does not
        let words = [0x4100, 0x4200];
        assert_eq!(decode(&words, &d).unwrap(), Value::Text("A\0B".into()));
    }

    #[test]
    fn oversized_string_is_rejected() {
        let d = def(2, WireType::Str, 1.0);
        let err = encode(&Value::Text("too long for two words".into()), &d).unwrap_err();
        assert!(matches!(err, DeviceError::StringOverflow { .. }));
    }

    #[test]
    fn encoding_overflow_is_reported() {
        let d = def(1, WireType::U16, 1.0);
        let err = encode(&Value::UInt(70_000), &d).unwrap_err();
        assert!(matches!(err, DeviceError::EncodingOverflow { scaled: 70_000, .. }));

        // gain pushes an in-range value out of the wire width
        let d = def(1, WireType::S16, 1000.0);
        let err = encode(&Value::Float(40.0), &d).unwrap_err();
        assert!(matches!(err, DeviceError::EncodingOverflow { .. }));
    }

    #[test]
    fn negative_value_does_not_fit_unsigned() {
        let d = def(1, WireType::U16, 1.0);
        let err = encode(&Value::Int(-1), &d).unwrap_err();
        assert!(matches!(err, DeviceError::EncodingOverflow { scaled: -1, .. }));
    }

    #[test]
    fn type_mismatch_is_unsupported() {
        let d = def(1, WireType::U16, 1.0);
        let err = encode(&Value::Text("text".into()), &d).unwrap_err();
        assert!(matches!(err, DeviceError::UnsupportedType { .. }));

        let d = def(4, WireType::Str, 1.0);
        let err = encode(&Value::UInt(7), &d).unwrap_err();
        assert!(matches!(err, DeviceError::UnsupportedType { .. }));
    }

    #[test]
    fn scale_resolution_round_trip() {
        // write 23.5 % into a gain-10 register and read it back
        let d = RegisterDef::new(
            40100,
            1,
            AccessMode::ReadWrite,
            WireType::U16,
            10.0,
            Some(Unit::Percent),
            PollTier::Low,
        );
        let words = encode(&Value::Float(23.5), &d).unwrap();
        assert_eq!(words, vec![235]);
        assert_eq!(decode(&words, &d).unwrap(), Value::Float(23.5));
    }

    proptest! {
        #[test]
        fn u16_words_round_trip(raw in any::<u16>()) {
            let d = def(1, WireType::U16, 1.0);
            let value = decode(&[raw], &d).unwrap();
            prop_assert_eq!(encode(&value, &d).unwrap(), vec![raw]);
        }

        #[test]
        fn s16_words_round_trip(raw in any::<u16>(), gain in prop::sample::select(vec![1.0, 10.0, 100.0, 1000.0])) {
            let d = def(1, WireType::S16, gain);
            let value = decode(&[raw], &d).unwrap();
            prop_assert_eq!(encode(&value, &d).unwrap(), vec![raw]);
        }

        #[test]
        fn s32_words_round_trip(raw in any::<u32>(), gain in prop::sample::select(vec![1.0, 10.0, 1000.0])) {
            let d = def(2, WireType::S32, gain);
            let words = vec![(raw >> 16) as u16, raw as u16];
            let value = decode(&words, &d).unwrap();
            prop_assert_eq!(encode(&value, &d).unwrap(), words);
        }

        #[test]
        fn u64_words_round_trip_unit_gain(raw in any::<u64>()) {
            let d = def(4, WireType::U64, 1.0);
            let words = split_words(raw, 4);
            let value = decode(&words, &d).unwrap();
            prop_assert_eq!(encode(&value, &d).unwrap(), words);
        }

        #[test]
        fn scaled_u64_round_trips_within_float_precision(raw in 0u64..(1 << 50)) {
            let d = def(4, WireType::U64, 10.0);
            let words = split_words(raw, 4);
            let value = decode(&words, &d).unwrap();
            prop_assert_eq!(encode(&value, &d).unwrap(), words);
        }

        #[test]
        fn strings_round_trip(s in "[ -~]{0,16}") {
            // printable ASCII without trailing NULs, up to the block size
            let d = def(8, WireType::Str, 1.0);
            let words = encode(&Value::Text(s.clone()), &d).unwrap();
            let trimmed = s.trim_end_matches('\0').to_owned();
            prop_assert_eq!(decode(&words, &d).unwrap(), Value::Text(trimmed));
        }
    }
}
