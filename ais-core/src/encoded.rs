//! Bit-addressable form of one complete AIS message.
//!
//! Built from a reassembled armored payload. Construction never fails: a
//! payload with bad armor becomes an invalid message that carries the reason,
//! and every decoder refuses it with `InvalidEncodedMessage`.

use crate::armor;
use crate::bits::{self, BitBuffer, Field};
use crate::fragment::AssembledPayload;
use crate::types::{AisError, MessageType, Mmsi, Result};

/// Header fields shared by every message type.
pub const MESSAGE_TYPE: Field = Field::new("message_type", 0, 6);
pub const REPEAT: Field = Field::new("repeat", 6, 8);
pub const MMSI: Field = Field::new("mmsi", 8, 38);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    bits: BitBuffer,
    invalid_reason: Option<String>,
}

impl EncodedMessage {
    /// Decode the armor of a complete payload.
    pub fn from_payload(payload: &str, fill_bits: u8) -> Self {
        match armor::decode_payload(payload, fill_bits) {
            Ok(bits) => EncodedMessage {
                bits,
                invalid_reason: None,
            },
            Err(err) => EncodedMessage {
                bits: BitBuffer::new(),
                invalid_reason: Some(err.to_string()),
            },
        }
    }

    pub fn from_assembled(assembled: &AssembledPayload) -> Self {
        EncodedMessage::from_payload(&assembled.payload, assembled.fill_bits)
    }

    /// Wrap an already decoded bit buffer.
    pub fn from_bits(bits: BitBuffer) -> Self {
        EncodedMessage {
            bits,
            invalid_reason: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_reason.is_none()
    }

    /// Message length in bits, fill bits excluded.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    /// Raw 6-bit type code from bits 0-5.
    pub fn message_type_code(&self) -> Result<u8> {
        self.ensure_valid()?;
        Ok(self.uint(MESSAGE_TYPE)? as u8)
    }

    /// Known message type, or `UnsupportedMessageType` with the raw code.
    pub fn message_type(&self) -> Result<MessageType> {
        let code = self.message_type_code()?;
        MessageType::from_code(code).ok_or(AisError::UnsupportedMessageType(code))
    }

    pub fn ensure_valid(&self) -> Result<()> {
        match &self.invalid_reason {
            None => Ok(()),
            Some(reason) => Err(AisError::InvalidEncodedMessage(reason.clone())),
        }
    }

    /// Precondition for every per-type decoder.
    pub fn expect_type(&self, expected: MessageType) -> Result<()> {
        let code = self.message_type_code()?;
        if code != expected.code() {
            return Err(AisError::UnsupportedMessageType(code));
        }
        Ok(())
    }

    /// True if the message is long enough to contain `field`.
    pub fn has(&self, field: Field) -> bool {
        field.end <= self.bits.len()
    }

    /// Field from `start` to the end of this message.
    pub fn rest(&self, name: &'static str, start: usize) -> Field {
        Field::to_end(name, start, self.bits.len())
    }

    pub fn uint(&self, field: Field) -> Result<u64> {
        bits::unsigned(&self.bits, field)
    }

    pub fn int(&self, field: Field) -> Result<i64> {
        bits::signed(&self.bits, field)
    }

    pub fn flag(&self, field: Field) -> Result<bool> {
        bits::boolean(&self.bits, field)
    }

    pub fn scaled(&self, field: Field, divisor: f64) -> Result<f64> {
        bits::scaled_unsigned(&self.bits, field, divisor)
    }

    pub fn scaled_signed(&self, field: Field, divisor: f64) -> Result<f64> {
        bits::scaled_signed(&self.bits, field, divisor)
    }

    pub fn text(&self, field: Field) -> Result<String> {
        bits::text(&self.bits, field)
    }

    pub fn bytes(&self, field: Field) -> Result<Vec<u8>> {
        bits::bytes(&self.bits, field)
    }

    pub fn mmsi(&self, field: Field) -> Result<Mmsi> {
        Mmsi::from_bits(self.uint(field)?)
    }

    pub fn repeat(&self) -> Result<u8> {
        Ok(self.uint(REPEAT)? as u8)
    }

    pub fn source_mmsi(&self) -> Result<Mmsi> {
        self.mmsi(MMSI)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
