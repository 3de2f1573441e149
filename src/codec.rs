//! Value codec: raw directory cells to tagged values and text
//!
//! The directory stores untyped cells alongside a numeric type code; this
//! module converts those cells into [`TypedValue`]s and renders them in the
//! exact textual forms the command protocol promises:
//!
//! - bit: `TRUE` / `FALSE`
//! - float: 7 significant digits (`%.7g` style)
//! - s32: right-justified width-10 decimal
//! - u32: width-10 decimal plus its 8-digit hex form in parentheses
//!
//! An unrecognized type code never fails the sampling path: decoding yields
//! `None` and [`format_cell`] falls back to an empty string.

use crate::error::{Result, ScopeError};
use crate::types::{TypedValue, ValueType};

/// A raw directory cell: a type code plus uninterpreted bits
///
/// This is what the directory hands out; only the codec knows how to
/// interpret the bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCell {
    /// Declared type code of the cell (see [`ValueType::from_code`])
    pub type_code: u8,
    /// Cell contents, widened to 64 bits
    pub bits: u64,
}

/// Decode a raw cell into a tagged value
///
/// Returns `None` if the type code is not recognized.
pub fn decode(cell: RawCell) -> Option<TypedValue> {
    let value = match ValueType::from_code(cell.type_code)? {
        ValueType::Bit => TypedValue::Bit(cell.bits != 0),
        ValueType::Float => TypedValue::Float(f64::from_bits(cell.bits)),
        ValueType::Signed32 => TypedValue::Signed32(cell.bits as i64),
        ValueType::Unsigned32 => TypedValue::Unsigned32(cell.bits),
    };
    Some(value)
}

/// Encode a tagged value back into a raw cell
pub fn encode(value: TypedValue) -> RawCell {
    let (value_type, bits) = match value {
        TypedValue::Bit(b) => (ValueType::Bit, b as u64),
        TypedValue::Float(f) => (ValueType::Float, f.to_bits()),
        TypedValue::Signed32(v) => (ValueType::Signed32, v as u64),
        TypedValue::Unsigned32(v) => (ValueType::Unsigned32, v),
    };
    RawCell {
        type_code: value_type.code(),
        bits,
    }
}

/// Render a tagged value in its wire form
pub fn format_value(value: &TypedValue) -> String {
    match value {
        TypedValue::Bit(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        TypedValue::Float(f) => format_float(*f),
        TypedValue::Signed32(v) => format!("{:>10}", v),
        TypedValue::Unsigned32(v) => format!("{:>10} (0x{:08X})", v, v),
    }
}

/// Render a raw cell, falling back to an empty string for unrecognized
/// type codes
pub fn format_cell(cell: RawCell) -> String {
    decode(cell).map(|v| format_value(&v)).unwrap_or_default()
}

/// Parse a wire-form rendering back into a value of the given type
pub fn parse_value(text: &str, value_type: ValueType) -> Result<TypedValue> {
    let trimmed = text.trim();
    match value_type {
        ValueType::Bit => match trimmed {
            "TRUE" => Ok(TypedValue::Bit(true)),
            "FALSE" => Ok(TypedValue::Bit(false)),
            other => Err(ScopeError::Protocol(format!("invalid bit value: {other:?}"))),
        },
        ValueType::Float => trimmed
            .parse::<f64>()
            .map(TypedValue::Float)
            .map_err(|e| ScopeError::Protocol(format!("invalid float value {trimmed:?}: {e}"))),
        ValueType::Signed32 => trimmed
            .parse::<i64>()
            .map(TypedValue::Signed32)
            .map_err(|e| ScopeError::Protocol(format!("invalid s32 value {trimmed:?}: {e}"))),
        ValueType::Unsigned32 => {
            // The hex form in parentheses is informative only
            let decimal = trimmed.split_whitespace().next().unwrap_or(trimmed);
            decimal
                .parse::<u64>()
                .map(TypedValue::Unsigned32)
                .map_err(|e| ScopeError::Protocol(format!("invalid u32 value {trimmed:?}: {e}")))
        }
    }
}

/// Format a float with 7 significant digits, trimming trailing zeros
///
/// Matches the `%.7g` rendering the wire contract requires: plain decimal
/// in the mid-range, exponent form outside it.
fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let exp = value.abs().log10().floor() as i32;
    if !(-4..7).contains(&exp) {
        let s = format!("{:.6e}", value);
        match s.split_once('e') {
            Some((mantissa, exponent)) => {
                let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
                // Signed two-digit exponent, e.g. e+07 / e-05
                let exponent: i32 = exponent.parse().unwrap_or(exp);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => s,
        }
    } else {
        let decimals = (6 - exp).max(0) as usize;
        let s = format!("{:.*}", decimals, value);
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    }
}
