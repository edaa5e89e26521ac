//! Bit-addressable buffer and typed field extraction.
//!
//! All reads take a [`Field`], a named half-open range `[start, end)` of bit
//! offsets counted MSB-first from the start of the message. Reads outside the
//! buffer fail with `AisError::BitRange`; there are no default values.

use bitvec::prelude::*;

use crate::types::{AisError, Result};

/// Packed MSB-first bit storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: BitVec<u8, Msb0>,
}

impl BitBuffer {
    pub fn new() -> Self {
        BitBuffer::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        BitBuffer {
            bits: BitVec::with_capacity(bits),
        }
    }

    /// Append the low `width` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u64, width: usize) {
        debug_assert!(width <= 64);
        self.bits.extend_from_bitslice(&value.view_bits::<Msb0>()[64 - width..]);
    }

    pub fn push_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn extend_from_bitslice(&mut self, slice: &BitSlice<u8, Msb0>) {
        self.bits.extend_from_bitslice(slice);
    }

    /// Drop bits past `len`. No-op if the buffer is already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.bits.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    fn slice(&self, field: Field) -> &BitSlice<u8, Msb0> {
        &self.bits[field.start..field.end]
    }
}

// ---------------------------------------------------------------------------
// Field descriptors
// ---------------------------------------------------------------------------

/// A named bit range within a message layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

impl Field {
    pub const fn new(name: &'static str, start: usize, end: usize) -> Field {
        Field { name, start, end }
    }

    /// Field running from `start` to the end of a message of `len` bits.
    pub const fn to_end(name: &'static str, start: usize, len: usize) -> Field {
        Field {
            name,
            start,
            end: len,
        }
    }

    pub const fn width(&self) -> usize {
        self.end - self.start
    }
}

fn check(bits: &BitBuffer, field: Field) -> Result<()> {
    if field.start >= field.end || field.end > bits.len() {
        return Err(AisError::BitRange {
            field: field.name,
            start: field.start,
            end: field.end,
            len: bits.len(),
        });
    }
    Ok(())
}

fn check_int(bits: &BitBuffer, field: Field) -> Result<()> {
    check(bits, field)?;
    if field.width() > 64 {
        return Err(AisError::BitRange {
            field: field.name,
            start: field.start,
            end: field.end,
            len: bits.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Big-endian unsigned integer of up to 64 bits.
pub fn unsigned(bits: &BitBuffer, field: Field) -> Result<u64> {
    check_int(bits, field)?;
    Ok(bits.slice(field).load_be::<u64>())
}

/// Two's-complement signed integer of up to 64 bits.
pub fn signed(bits: &BitBuffer, field: Field) -> Result<i64> {
    let raw = unsigned(bits, field)?;
    let width = field.width();
    if width < 64 && bits.bits[field.start] {
        Ok(raw as i64 - (1i64 << width))
    } else {
        Ok(raw as i64)
    }
}

/// Single-bit flag.
pub fn boolean(bits: &BitBuffer, field: Field) -> Result<bool> {
    check(bits, field)?;
    if field.width() != 1 {
        return Err(AisError::BitRange {
            field: field.name,
            start: field.start,
            end: field.end,
            len: bits.len(),
        });
    }
    Ok(bits.bits[field.start])
}

/// Unsigned field divided by `divisor`.
pub fn scaled_unsigned(bits: &BitBuffer, field: Field, divisor: f64) -> Result<f64> {
    Ok(unsigned(bits, field)? as f64 / divisor)
}

/// Signed field divided by `divisor`.
pub fn scaled_signed(bits: &BitBuffer, field: Field, divisor: f64) -> Result<f64> {
    Ok(signed(bits, field)? as f64 / divisor)
}

/// Map a 6-bit value to its ITU text character.
///
/// 0-31 map to `@`..`_`, 32-63 map to ` `..`?`.
pub fn sixbit_char(value: u8) -> char {
    let value = value & 0x3F;
    if value < 32 {
        (value + 64) as char
    } else {
        value as char
    }
}

/// 6-bit ITU text. Trailing `@` and space padding is trimmed; a trailing
/// partial group (width not a multiple of 6) is ignored.
pub fn text(bits: &BitBuffer, field: Field) -> Result<String> {
    check(bits, field)?;
    let mut out: String = bits
        .slice(field)
        .chunks_exact(6)
        .map(|group| sixbit_char(group.load_be::<u8>()))
        .collect();
    let trimmed = out.trim_end_matches(['@', ' ']).len();
    out.truncate(trimmed);
    Ok(out)
}

/// Copy an arbitrary bit range into bytes, MSB-first, zero padded at the end.
pub fn bytes(bits: &BitBuffer, field: Field) -> Result<Vec<u8>> {
    check(bits, field)?;
    let mut out = vec![0u8; field.width().div_ceil(8)];
    out.view_bits_mut::<Msb0>()[..field.width()].copy_from_bitslice(bits.slice(field));
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
