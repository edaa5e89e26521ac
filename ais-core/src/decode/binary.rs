//! Binary and acknowledge messages: 6, 7, 8, 13, 17, 25, 26.
//!
//! Application payloads are returned as raw bits; no DAC/FID specific
//! sub-decoding is attempted.

use serde::Serialize;

use super::{expect_any, latitude, longitude};
use crate::bits::Field;
use crate::encoded::EncodedMessage;
use crate::types::*;

mod addressed {
    use crate::bits::Field;

    pub const SEQNO: Field = Field::new("seqno", 38, 40);
    pub const DEST: Field = Field::new("dest_mmsi", 40, 70);
    pub const RETRANSMIT: Field = Field::new("retransmit", 70, 71);
    pub const DAC: Field = Field::new("dac", 72, 82);
    pub const FID: Field = Field::new("fid", 82, 88);
    pub const DATA_START: usize = 88;
}

mod broadcast {
    use crate::bits::Field;

    pub const DAC: Field = Field::new("dac", 40, 50);
    pub const FID: Field = Field::new("fid", 50, 56);
    pub const DATA_START: usize = 56;
}

mod gnss {
    use crate::bits::Field;

    pub const LON: Field = Field::new("lon", 40, 58);
    pub const LAT: Field = Field::new("lat", 58, 75);
    pub const DATA_START: usize = 80;
}

mod slot {
    use crate::bits::Field;

    pub const ADDRESSED: Field = Field::new("addressed", 38, 39);
    pub const STRUCTURED: Field = Field::new("structured", 39, 40);
    pub const DEST: Field = Field::new("dest_mmsi", 40, 70);
    pub const DAC_WIDTH: usize = 10;
    pub const FID_WIDTH: usize = 6;
    pub const RADIO_WIDTH: usize = 20;
}

/// Acknowledgements start at bit 40, 32 bits each, up to four.
const ACK_START: usize = 40;
const ACK_WIDTH: usize = 32;
const MAX_ACKS: usize = 4;

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Designated area code and function identifier of a binary application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicationId {
    pub dac: u16,
    pub fid: u8,
}

/// Opaque application data, packed MSB-first and zero padded to whole bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BinaryData {
    pub bit_len: usize,
    pub bytes: Vec<u8>,
}

impl BinaryData {
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    pub fn hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Data between `start` and `end`; empty when the range is empty.
fn binary_data(msg: &EncodedMessage, start: usize, end: usize) -> Result<BinaryData> {
    if start == end {
        return Ok(BinaryData::default());
    }
    let bytes = msg.bytes(Field::new("data", start, end))?;
    Ok(BinaryData {
        bit_len: end - start,
        bytes,
    })
}

// ---------------------------------------------------------------------------
// Type 6
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressedBinary {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub seqno: u8,
    pub dest_mmsi: Mmsi,
    pub retransmit: bool,
    pub app_id: ApplicationId,
    pub data: BinaryData,
}

pub fn decode_addressed_binary(msg: &EncodedMessage) -> Result<AddressedBinary> {
    msg.expect_type(MessageType::AddressedBinary)?;

    Ok(AddressedBinary {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        seqno: msg.uint(addressed::SEQNO)? as u8,
        dest_mmsi: msg.mmsi(addressed::DEST)?,
        retransmit: msg.flag(addressed::RETRANSMIT)?,
        app_id: ApplicationId {
            dac: msg.uint(addressed::DAC)? as u16,
            fid: msg.uint(addressed::FID)? as u8,
        },
        data: binary_data(msg, addressed::DATA_START, msg.bit_len())?,
    })
}

// ---------------------------------------------------------------------------
// Types 7 and 13
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AckEntry {
    pub mmsi: Mmsi,
    pub seqno: u8,
}

/// Binary (7) or safety (13) acknowledge. Carries one to four entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acknowledge {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub acks: Vec<AckEntry>,
}

pub fn decode_acknowledge(msg: &EncodedMessage) -> Result<Acknowledge> {
    expect_any(
        msg,
        &[MessageType::BinaryAcknowledge, MessageType::SafetyAcknowledge],
    )?;

    let mut acks = Vec::with_capacity(MAX_ACKS);
    for idx in 0..MAX_ACKS {
        let start = ACK_START + idx * ACK_WIDTH;
        let mmsi = Field::new("ack_mmsi", start, start + 30);
        let seqno = Field::new("ack_seqno", start + 30, start + ACK_WIDTH);
        // The first entry is mandatory; later ones only if fully present.
        if idx > 0 && !msg.has(seqno) {
            break;
        }
        acks.push(AckEntry {
            mmsi: msg.mmsi(mmsi)?,
            seqno: msg.uint(seqno)? as u8,
        });
    }

    Ok(Acknowledge {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        acks,
    })
}

// ---------------------------------------------------------------------------
// Type 8
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryBroadcast {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub app_id: ApplicationId,
    pub data: BinaryData,
}

pub fn decode_binary_broadcast(msg: &EncodedMessage) -> Result<BinaryBroadcast> {
    msg.expect_type(MessageType::BinaryBroadcast)?;

    Ok(BinaryBroadcast {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        app_id: ApplicationId {
            dac: msg.uint(broadcast::DAC)? as u16,
            fid: msg.uint(broadcast::FID)? as u8,
        },
        data: binary_data(msg, broadcast::DATA_START, msg.bit_len())?,
    })
}

// ---------------------------------------------------------------------------
// Type 17
// ---------------------------------------------------------------------------

/// DGNSS correction broadcast. The correction payload is kept raw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GnssBroadcast {
    pub repeat: u8,
    pub mmsi: Mmsi,
    /// Reference station position, degrees.
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub data: BinaryData,
}

pub fn decode_gnss_broadcast(msg: &EncodedMessage) -> Result<GnssBroadcast> {
    msg.expect_type(MessageType::GnssBroadcast)?;

    let lon = longitude(msg, gnss::LON, 600.0)?;
    let lat = latitude(msg, gnss::LAT, 600.0)?;
    let data = if msg.bit_len() > gnss::DATA_START {
        binary_data(msg, gnss::DATA_START, msg.bit_len())?
    } else {
        BinaryData::default()
    };

    Ok(GnssBroadcast {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        lon,
        lat,
        data,
    })
}

// ---------------------------------------------------------------------------
// Types 25 and 26
// ---------------------------------------------------------------------------

/// Single slot (25) or multiple slot (26) binary message.
///
/// The destination and application id are present only when the
/// `addressed` and `structured` flags say so.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotBinary {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub dest_mmsi: Option<Mmsi>,
    pub app_id: Option<ApplicationId>,
    pub data: BinaryData,
    /// Communication state, type 26 only.
    pub radio: Option<u32>,
}

pub fn decode_slot_binary(msg: &EncodedMessage) -> Result<SlotBinary> {
    let ty = expect_any(
        msg,
        &[MessageType::SingleSlotBinary, MessageType::MultiSlotBinary],
    )?;

    let mut cursor = slot::DEST.start;

    let dest_mmsi = if msg.flag(slot::ADDRESSED)? {
        cursor = slot::DEST.end;
        Some(msg.mmsi(slot::DEST)?)
    } else {
        None
    };

    let app_id = if msg.flag(slot::STRUCTURED)? {
        let dac = Field::new("dac", cursor, cursor + slot::DAC_WIDTH);
        let fid = Field::new("fid", dac.end, dac.end + slot::FID_WIDTH);
        cursor = fid.end;
        Some(ApplicationId {
            dac: msg.uint(dac)? as u16,
            fid: msg.uint(fid)? as u8,
        })
    } else {
        None
    };

    let (data_end, radio) = match ty {
        MessageType::MultiSlotBinary => {
            let len = msg.bit_len();
            if len < cursor + slot::RADIO_WIDTH {
                return Err(AisError::BitRange {
                    field: "radio",
                    start: cursor,
                    end: cursor + slot::RADIO_WIDTH,
                    len,
                });
            }
            let radio = Field::new("radio", len - slot::RADIO_WIDTH, len);
            (radio.start, Some(msg.uint(radio)? as u32))
        }
        _ => (msg.bit_len(), None),
    };

    let data = binary_data(msg, cursor, data_end)?;

    Ok(SlotBinary {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        dest_mmsi,
        app_id,
        data,
        radio,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
