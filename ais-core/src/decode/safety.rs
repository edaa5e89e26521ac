//! Safety related text: addressed (12) and broadcast (14).

use serde::Serialize;

use crate::bits::Field;
use crate::encoded::EncodedMessage;
use crate::types::*;

const ADDRESSED_SEQNO: Field = Field::new("seqno", 38, 40);
const ADDRESSED_DEST: Field = Field::new("dest_mmsi", 40, 70);
const ADDRESSED_RETRANSMIT: Field = Field::new("retransmit", 70, 71);
const ADDRESSED_TEXT_START: usize = 72;
const BROADCAST_TEXT_START: usize = 40;

/// Free text from `start` to the end of the message. A message that ends
/// exactly at `start` carries empty text.
fn trailing_text(msg: &EncodedMessage, start: usize) -> Result<String> {
    if msg.bit_len() == start {
        return Ok(String::new());
    }
    msg.text(msg.rest("text", start))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressedSafety {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub seqno: u8,
    pub dest_mmsi: Mmsi,
    pub retransmit: bool,
    pub text: String,
}

pub fn decode_addressed_safety(msg: &EncodedMessage) -> Result<AddressedSafety> {
    msg.expect_type(MessageType::AddressedSafety)?;

    Ok(AddressedSafety {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        seqno: msg.uint(ADDRESSED_SEQNO)? as u8,
        dest_mmsi: msg.mmsi(ADDRESSED_DEST)?,
        retransmit: msg.flag(ADDRESSED_RETRANSMIT)?,
        text: trailing_text(msg, ADDRESSED_TEXT_START)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyBroadcast {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub text: String,
}

pub fn decode_safety_broadcast(msg: &EncodedMessage) -> Result<SafetyBroadcast> {
    msg.expect_type(MessageType::SafetyBroadcast)?;

    Ok(SafetyBroadcast {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        text: trailing_text(msg, BROADCAST_TEXT_START)?,
    })
}
