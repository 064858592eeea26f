//! Decoding of the LINEAR11 format the PSU reports its measurements in.
//!
//! A LINEAR11 word packs an 11 bit two's complement mantissa in its low bits and a
//! 5 bit two's complement exponent in its high bits. The real value is
//! `mantissa * 2^exponent`. Values are converted to integer milli/micro units
//! with integer arithmetic only, so results are identical on every platform.

use modular_bitfield::prelude::*;

#[bitfield]
struct Linear11Packed {
    mantissa: B11,
    exponent: B5,
}

/// A LINEAR11 word split into its signed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linear11 {
    /// -1024..=1023
    pub mantissa: i16,
    /// -16..=15
    pub exponent: i8,
}

impl Linear11 {
    /// Split a raw word as received from the PSU.
    pub fn from_raw(raw: u16) -> Self {
        let packed = Linear11Packed::from_bytes(raw.to_le_bytes());
        Self {
            // Shift the sign bit to the top of the lane, then back down arithmetically.
            mantissa: ((packed.mantissa() << 5) as i16) >> 5,
            exponent: ((packed.exponent() << 3) as i8) >> 3,
        }
    }

    /// Pack back into a raw word. Out of range fields are truncated to their width.
    pub fn to_raw(self) -> u16 {
        let packed = Linear11Packed::new()
            .with_mantissa(self.mantissa as u16 & 0x07FF)
            .with_exponent(self.exponent as u8 & 0x1F);
        u16::from_le_bytes(packed.into_bytes())
    }

    /// `mantissa * scale`, shifted by the exponent.
    ///
    /// Negative exponents shift right arithmetically, so negative results round
    /// toward negative infinity. Returns `None` when the result does not fit an `i64`.
    pub fn scaled(self, scale: i64) -> Option<i64> {
        let value = i64::from(self.mantissa).checked_mul(scale)?;
        if self.exponent >= 0 {
            value.checked_mul(1i64 << self.exponent)
        } else {
            Some(value >> -self.exponent)
        }
    }
}

/// Decode a raw LINEAR11 word, multiplying by `scale` before applying the exponent.
///
/// Use a scale of 1000 for milli-units, 1_000_000 for micro-units or 1 for plain counts.
/// These never overflow. Larger scales may, and then yield `None`.
pub fn decode(raw: u16, scale: i64) -> Option<i64> {
    Linear11::from_raw(raw).scaled(scale)
}
