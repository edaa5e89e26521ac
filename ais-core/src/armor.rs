//! ASCII armor: 6 bits per payload character.
//!
//! Valid characters are `0`..`W` (values 0-39) and `` ` ``..`w` (values
//! 40-63). The last character may carry 0-5 fill bits that are not part of
//! the message.

use bitvec::prelude::*;

use crate::bits::BitBuffer;
use crate::types::{AisError, Result};

/// Maximum fill bits in the final armored character.
pub const MAX_FILL_BITS: u8 = 5;

/// 6-bit value of one armored character, `None` if outside the alphabet.
pub fn sixbit_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'W' => Some(c - 48),
        b'`'..=b'w' => Some(c - 56),
        _ => None,
    }
}

/// Decode an armored payload into a bit buffer of `6 * len - fill_bits` bits.
pub fn decode_payload(payload: &str, fill_bits: u8) -> Result<BitBuffer> {
    if payload.is_empty() {
        return Err(AisError::InvalidEncodedMessage("empty payload".into()));
    }
    if fill_bits > MAX_FILL_BITS {
        return Err(AisError::InvalidEncodedMessage(format!(
            "fill bits {fill_bits} out of range 0-{MAX_FILL_BITS}"
        )));
    }

    let mut bits = BitBuffer::with_capacity(payload.len() * 6);
    for (pos, &c) in payload.as_bytes().iter().enumerate() {
        let value = sixbit_value(c).ok_or_else(|| {
            AisError::InvalidEncodedMessage(format!(
                "invalid armor character {:?} at position {pos}",
                c as char
            ))
        })?;
        bits.extend_from_bitslice(&value.view_bits::<Msb0>()[2..]);
    }

    bits.truncate(payload.len() * 6 - fill_bits as usize);
    Ok(bits)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{self, Field};

    fn armor_char(value: u8) -> char {
        let c = value + 48;
        if c > b'W' {
            (c + 8) as char
        } else {
            c as char
        }
    }

    #[test]
    fn test_sixbit_value_boundaries() {
        assert_eq!(sixbit_value(b'0'), Some(0));
        assert_eq!(sixbit_value(b'W'), Some(39));
        assert_eq!(sixbit_value(b'`'), Some(40));
        assert_eq!(sixbit_value(b'w'), Some(63));
        assert_eq!(sixbit_value(b'X'), None);
        assert_eq!(sixbit_value(b'_'), None);
        assert_eq!(sixbit_value(b'x'), None);
        assert_eq!(sixbit_value(b'/'), None);
    }

    #[test]
    fn test_armor_alphabet_identity() {
        let payload: String = (0..64u8).map(armor_char).collect();
        let bits = decode_payload(&payload, 0).unwrap();
        assert_eq!(bits.len(), 64 * 6);
        for value in 0..64usize {
            let field = Field::new("c", value * 6, value * 6 + 6);
            assert_eq!(bits::unsigned(&bits, field).unwrap(), value as u64);
        }
    }

    #[test]
    fn test_decode_message_type() {
        let bits = decode_payload("13aEOK?P00PD2wVMdLDRcQv40PSh", 0).unwrap();
        assert_eq!(bits.len(), 168);
        assert_eq!(bits::unsigned(&bits, Field::new("type", 0, 6)).unwrap(), 1);
    }

    #[test]
    fn test_fill_bits_shorten_buffer() {
        let bits = decode_payload("88888888880", 2).unwrap();
        assert_eq!(bits.len(), 64);
        let err = bits::unsigned(&bits, Field::new("tail", 60, 66)).unwrap_err();
        assert!(matches!(err, AisError::BitRange { len: 64, .. }));
    }

    #[test]
    fn test_invalid_character() {
        let err = decode_payload("13aE!K", 0).unwrap_err();
        assert!(matches!(err, AisError::InvalidEncodedMessage(_)));
    }

    #[test]
    fn test_invalid_fill_bits() {
        assert!(decode_payload("1", 6).is_err());
        assert!(decode_payload("", 0).is_err());
    }
}
