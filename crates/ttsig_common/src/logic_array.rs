//! Fixed-width 4-state vectors used as signal values.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest vector a [`LogicArray`] can hold.
pub const MAX_WIDTH: u32 = 64;

/// A fixed-width vector of 4-state [`Logic`] values, bit 0 least significant.
///
/// Stored as two masks: `val` carries the 0/1 level and `xz` flags bits that
/// are not a driven level. A flagged bit with `val == 0` is `X`, with
/// `val == 1` it is `Z`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicArray {
    width: u32,
    val: u64,
    xz: u64,
}

/// Errors converting integers into a [`LogicArray`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The integer does not fit the vector as either a signed or an unsigned value.
    #[error("value {value} does not fit in {width} bit(s)")]
    OutOfRange {
        /// The rejected value.
        value: i64,
        /// The vector width.
        width: u32,
    },
}

impl LogicArray {
    /// Creates an all-zero vector.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or larger than [`MAX_WIDTH`].
    pub fn new(width: u32) -> Self {
        assert!(
            (1..=MAX_WIDTH).contains(&width),
            "width {width} outside 1..={MAX_WIDTH}"
        );
        Self {
            width,
            val: 0,
            xz: 0,
        }
    }

    /// Creates an all-`X` vector, the power-up state of a register.
    pub fn unknown(width: u32) -> Self {
        let mut v = Self::new(width);
        v.xz = mask(width);
        v
    }

    /// Creates an all-`Z` vector.
    pub fn high_z(width: u32) -> Self {
        let mut v = Self::new(width);
        v.xz = mask(width);
        v.val = mask(width);
        v
    }

    /// Creates a single-bit vector from a bool.
    pub fn from_bool(b: bool) -> Self {
        Self::from_unsigned(u64::from(b), 1)
    }

    /// Creates a vector from the low `width` bits of `value`.
    pub fn from_unsigned(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        v.val = value & mask(width);
        v
    }

    /// Creates a vector from an integer, accepting both the signed and the
    /// unsigned range of `width` bits.
    ///
    /// Negative values are stored in two's complement, so `-40` into an
    /// 8-bit vector reads back as `216` unsigned and `-40` signed.
    pub fn from_int(value: i64, width: u32) -> Result<Self, ValueError> {
        let out_of_range = ValueError::OutOfRange { value, width };
        if width >= 64 {
            return Ok(Self::from_unsigned(value as u64, width));
        }
        let min = -(1i64 << (width - 1));
        let max = (1i64 << width) - 1;
        if value < min || value > max {
            return Err(out_of_range);
        }
        Ok(Self::from_unsigned(value as u64, width))
    }

    /// Number of bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let v = (self.val >> index) & 1;
        let x = (self.xz >> index) & 1;
        Logic::from_bits(v | (x << 1))
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let bit = 1u64 << index;
        let bits = value as u64;
        self.val = (self.val & !bit) | ((bits & 1) << index);
        self.xz = (self.xz & !bit) | (((bits >> 1) & 1) << index);
    }

    /// Returns `true` when no bit is `X` or `Z`.
    pub fn is_resolvable(&self) -> bool {
        self.xz == 0
    }

    /// Reads the vector as an unsigned integer, or `None` if any bit is `X`/`Z`.
    pub fn to_unsigned(&self) -> Option<u64> {
        self.is_resolvable().then_some(self.val)
    }

    /// Reads the vector as a two's-complement signed integer.
    pub fn to_signed(&self) -> Option<i64> {
        let raw = self.to_unsigned()?;
        if self.width >= 64 {
            return Some(raw as i64);
        }
        let sign = 1u64 << (self.width - 1);
        Some(if raw & sign != 0 {
            (raw | !mask(self.width)) as i64
        } else {
            raw as i64
        })
    }

    /// Iterates bits from most significant to least significant.
    pub fn iter_msb_first(&self) -> impl Iterator<Item = Logic> + '_ {
        (0..self.width).rev().map(move |i| self.get(i))
    }
}

impl fmt::Display for LogicArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter_msb_first() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicArray({self})")
    }
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_all_zero() {
        let v = LogicArray::new(8);
        assert_eq!(v.width(), 8);
        assert_eq!(v.to_unsigned(), Some(0));
    }

    #[test]
    fn unknown_is_not_resolvable() {
        let v = LogicArray::unknown(8);
        assert!(!v.is_resolvable());
        assert_eq!(v.to_unsigned(), None);
        assert_eq!(v.to_string(), "XXXXXXXX");
    }

    #[test]
    fn high_z_displays_z() {
        assert_eq!(LogicArray::high_z(3).to_string(), "ZZZ");
    }

    #[test]
    fn negative_int_is_twos_complement() {
        let v = LogicArray::from_int(-40, 8).unwrap();
        assert_eq!(v.to_unsigned(), Some(216));
        assert_eq!(v.to_signed(), Some(-40));
    }

    #[test]
    fn int_range_accepts_signed_and_unsigned() {
        assert!(LogicArray::from_int(-128, 8).is_ok());
        assert!(LogicArray::from_int(255, 8).is_ok());
        assert_eq!(
            LogicArray::from_int(256, 8).unwrap_err(),
            ValueError::OutOfRange {
                value: 256,
                width: 8
            }
        );
        assert!(LogicArray::from_int(-129, 8).is_err());
    }

    #[test]
    fn single_bit_range() {
        assert!(LogicArray::from_int(1, 1).is_ok());
        assert!(LogicArray::from_int(-1, 1).is_ok());
        assert!(LogicArray::from_int(2, 1).is_err());
    }

    #[test]
    fn set_get_all_states() {
        let mut v = LogicArray::new(4);
        v.set(0, Logic::Zero);
        v.set(1, Logic::One);
        v.set(2, Logic::X);
        v.set(3, Logic::Z);
        assert_eq!(v.get(0), Logic::Zero);
        assert_eq!(v.get(1), Logic::One);
        assert_eq!(v.get(2), Logic::X);
        assert_eq!(v.get(3), Logic::Z);
        assert_eq!(v.to_string(), "ZX10");
    }

    #[test]
    fn overwriting_x_with_level_resolves() {
        let mut v = LogicArray::unknown(2);
        v.set(0, Logic::One);
        v.set(1, Logic::Zero);
        assert_eq!(v.to_unsigned(), Some(1));
    }

    #[test]
    fn display_msb_first() {
        let mut v = LogicArray::new(4);
        v.set(3, Logic::One);
        v.set(2, Logic::X);
        v.set(0, Logic::Z);
        assert_eq!(v.to_string(), "1X0Z");
    }

    #[test]
    fn from_unsigned_truncates() {
        let v = LogicArray::from_unsigned(0x1ff, 8);
        assert_eq!(v.to_unsigned(), Some(0xff));
    }

    #[test]
    fn equality_includes_width() {
        assert_ne!(LogicArray::new(1), LogicArray::new(2));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        LogicArray::new(4).get(4);
    }

    #[test]
    fn serde_roundtrip() {
        let v = LogicArray::from_int(-3, 8).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicArray = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
