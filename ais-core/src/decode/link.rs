//! Link management and station control: UTC inquiry (10), interrogation
//! (15), assigned mode (16), data link management (20), channel management
//! (22) and group assignment (23).

use serde::Serialize;

use crate::bits::Field;
use crate::encoded::EncodedMessage;
use crate::types::*;

mod inquiry {
    use crate::bits::Field;

    pub const DEST: Field = Field::new("dest_mmsi", 40, 70);
}

mod interrogation {
    use crate::bits::Field;

    pub const MMSI1: Field = Field::new("mmsi1", 40, 70);
    pub const TYPE1_1: Field = Field::new("type1_1", 70, 76);
    pub const OFFSET1_1: Field = Field::new("offset1_1", 76, 88);
    pub const TYPE1_2: Field = Field::new("type1_2", 90, 96);
    pub const OFFSET1_2: Field = Field::new("offset1_2", 96, 108);
    pub const MMSI2: Field = Field::new("mmsi2", 110, 140);
    pub const TYPE2_1: Field = Field::new("type2_1", 140, 146);
    pub const OFFSET2_1: Field = Field::new("offset2_1", 146, 158);
}

mod assigned_mode {
    use crate::bits::Field;

    pub const DEST_A: Field = Field::new("dest_a", 40, 70);
    pub const OFFSET_A: Field = Field::new("offset_a", 70, 82);
    pub const INCREMENT_A: Field = Field::new("increment_a", 82, 92);
    pub const DEST_B: Field = Field::new("dest_b", 92, 122);
    pub const OFFSET_B: Field = Field::new("offset_b", 122, 134);
    pub const INCREMENT_B: Field = Field::new("increment_b", 134, 144);
}

mod channel {
    use crate::bits::Field;

    pub const CHANNEL_A: Field = Field::new("channel_a", 40, 52);
    pub const CHANNEL_B: Field = Field::new("channel_b", 52, 64);
    pub const TXRX: Field = Field::new("txrx", 64, 68);
    pub const POWER: Field = Field::new("power", 68, 69);
    pub const NE_LON: Field = Field::new("ne_lon", 69, 87);
    pub const NE_LAT: Field = Field::new("ne_lat", 87, 104);
    pub const SW_LON: Field = Field::new("sw_lon", 104, 122);
    pub const SW_LAT: Field = Field::new("sw_lat", 122, 138);
    pub const DEST1: Field = Field::new("dest1", 69, 99);
    pub const DEST2: Field = Field::new("dest2", 104, 134);
    pub const ADDRESSED: Field = Field::new("addressed", 139, 140);
    pub const BAND_A: Field = Field::new("band_a", 140, 141);
    pub const BAND_B: Field = Field::new("band_b", 141, 142);
    pub const ZONE_SIZE: Field = Field::new("zonesize", 142, 145);
}

mod group {
    use crate::bits::Field;

    pub const NE_LON: Field = Field::new("ne_lon", 40, 58);
    pub const NE_LAT: Field = Field::new("ne_lat", 58, 75);
    pub const SW_LON: Field = Field::new("sw_lon", 75, 93);
    pub const SW_LAT: Field = Field::new("sw_lat", 93, 110);
    pub const STATION_TYPE: Field = Field::new("station_type", 110, 114);
    pub const SHIP_TYPE: Field = Field::new("ship_type", 114, 122);
    pub const TXRX: Field = Field::new("txrx", 144, 146);
    pub const INTERVAL: Field = Field::new("interval", 146, 150);
    pub const QUIET: Field = Field::new("quiet", 150, 154);
}

/// Slot reservations start at bit 40, 30 bits each, up to four.
const RESERVATION_START: usize = 40;
const RESERVATION_WIDTH: usize = 30;
const MAX_RESERVATIONS: usize = 4;

/// Rectangle corners stored as signed tenths of a minute.
fn geo_area(
    msg: &EncodedMessage,
    ne_lon: Field,
    ne_lat: Field,
    sw_lon: Field,
    sw_lat: Field,
) -> Result<GeoArea> {
    Ok(GeoArea {
        ne_lon: msg.scaled_signed(ne_lon, 10.0)? as f32,
        ne_lat: msg.scaled_signed(ne_lat, 10.0)? as f32,
        sw_lon: msg.scaled_signed(sw_lon, 10.0)? as f32,
        sw_lat: msg.scaled_signed(sw_lat, 10.0)? as f32,
    })
}

// ---------------------------------------------------------------------------
// Type 10
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtcDateInquiry {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub dest_mmsi: Mmsi,
}

pub fn decode_utc_date_inquiry(msg: &EncodedMessage) -> Result<UtcDateInquiry> {
    msg.expect_type(MessageType::UtcDateInquiry)?;

    Ok(UtcDateInquiry {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        dest_mmsi: msg.mmsi(inquiry::DEST)?,
    })
}

// ---------------------------------------------------------------------------
// Type 15
// ---------------------------------------------------------------------------

/// One "send me message type N" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterrogationRequest {
    pub station: Mmsi,
    pub message_type: u8,
    pub slot_offset: u16,
}

/// Up to three requests: two to the first station, one to a second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interrogation {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub requests: Vec<InterrogationRequest>,
}

pub fn decode_interrogation(msg: &EncodedMessage) -> Result<Interrogation> {
    msg.expect_type(MessageType::Interrogation)?;

    let first = msg.mmsi(interrogation::MMSI1)?;
    let mut requests = vec![InterrogationRequest {
        station: first,
        message_type: msg.uint(interrogation::TYPE1_1)? as u8,
        slot_offset: msg.uint(interrogation::OFFSET1_1)? as u16,
    }];

    if msg.has(interrogation::OFFSET1_2) {
        requests.push(InterrogationRequest {
            station: first,
            message_type: msg.uint(interrogation::TYPE1_2)? as u8,
            slot_offset: msg.uint(interrogation::OFFSET1_2)? as u16,
        });
    }

    if msg.has(interrogation::OFFSET2_1) {
        requests.push(InterrogationRequest {
            station: msg.mmsi(interrogation::MMSI2)?,
            message_type: msg.uint(interrogation::TYPE2_1)? as u8,
            slot_offset: msg.uint(interrogation::OFFSET2_1)? as u16,
        });
    }

    Ok(Interrogation {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        requests,
    })
}

// ---------------------------------------------------------------------------
// Type 16
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeAssignment {
    pub dest_mmsi: Mmsi,
    pub offset: u16,
    pub increment: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedModeCommand {
    pub repeat: u8,
    pub mmsi: Mmsi,
    /// One or two stations.
    pub assignments: Vec<ModeAssignment>,
}

pub fn decode_assigned_mode_command(msg: &EncodedMessage) -> Result<AssignedModeCommand> {
    msg.expect_type(MessageType::AssignedModeCommand)?;

    let mut assignments = vec![ModeAssignment {
        dest_mmsi: msg.mmsi(assigned_mode::DEST_A)?,
        offset: msg.uint(assigned_mode::OFFSET_A)? as u16,
        increment: msg.uint(assigned_mode::INCREMENT_A)? as u16,
    }];
    if msg.has(assigned_mode::INCREMENT_B) {
        assignments.push(ModeAssignment {
            dest_mmsi: msg.mmsi(assigned_mode::DEST_B)?,
            offset: msg.uint(assigned_mode::OFFSET_B)? as u16,
            increment: msg.uint(assigned_mode::INCREMENT_B)? as u16,
        });
    }

    Ok(AssignedModeCommand {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        assignments,
    })
}

// ---------------------------------------------------------------------------
// Type 20
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotReservation {
    pub offset: u16,
    pub number: u8,
    /// Minutes.
    pub timeout: u8,
    pub increment: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLinkManagement {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub reservations: Vec<SlotReservation>,
}

pub fn decode_data_link_management(msg: &EncodedMessage) -> Result<DataLinkManagement> {
    msg.expect_type(MessageType::DataLinkManagement)?;

    let mut reservations = Vec::with_capacity(MAX_RESERVATIONS);
    for idx in 0..MAX_RESERVATIONS {
        let start = RESERVATION_START + idx * RESERVATION_WIDTH;
        let offset = Field::new("offset", start, start + 12);
        let number = Field::new("number", offset.end, offset.end + 4);
        let timeout = Field::new("timeout", number.end, number.end + 3);
        let increment = Field::new("increment", timeout.end, timeout.end + 11);
        if idx > 0 && !msg.has(increment) {
            break;
        }
        let reservation = SlotReservation {
            offset: msg.uint(offset)? as u16,
            number: msg.uint(number)? as u8,
            timeout: msg.uint(timeout)? as u8,
            increment: msg.uint(increment)? as u16,
        };
        // A zero offset marks an unused trailing block.
        if idx > 0 && reservation.offset == 0 {
            break;
        }
        reservations.push(reservation);
    }

    Ok(DataLinkManagement {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        reservations,
    })
}

// ---------------------------------------------------------------------------
// Type 22
// ---------------------------------------------------------------------------

/// Who a channel management message applies to, selected by the
/// `addressed` flag. Both variants occupy the same bits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChannelManagementTarget {
    Addressed { destination1: Mmsi, destination2: Mmsi },
    Area(GeoArea),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelManagement {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub channel_a: u16,
    pub channel_b: u16,
    pub txrx: TxRxMode,
    /// Low power when set.
    pub power: bool,
    pub target: ChannelManagementTarget,
    /// 12.5 kHz bandwidth on channel A when set.
    pub band_a: bool,
    pub band_b: bool,
    /// Transitional zone size in nautical miles minus one.
    pub zone_size: u8,
}

impl ChannelManagement {
    pub fn is_addressed(&self) -> bool {
        matches!(self.target, ChannelManagementTarget::Addressed { .. })
    }

    pub fn destinations(&self) -> Option<(Mmsi, Mmsi)> {
        match self.target {
            ChannelManagementTarget::Addressed {
                destination1,
                destination2,
            } => Some((destination1, destination2)),
            ChannelManagementTarget::Area(_) => None,
        }
    }

    pub fn area(&self) -> Option<GeoArea> {
        match self.target {
            ChannelManagementTarget::Area(area) => Some(area),
            ChannelManagementTarget::Addressed { .. } => None,
        }
    }
}

pub fn decode_channel_management(msg: &EncodedMessage) -> Result<ChannelManagement> {
    msg.expect_type(MessageType::ChannelManagement)?;

    let target = if msg.flag(channel::ADDRESSED)? {
        ChannelManagementTarget::Addressed {
            destination1: msg.mmsi(channel::DEST1)?,
            destination2: msg.mmsi(channel::DEST2)?,
        }
    } else {
        ChannelManagementTarget::Area(geo_area(
            msg,
            channel::NE_LON,
            channel::NE_LAT,
            channel::SW_LON,
            channel::SW_LAT,
        )?)
    };

    Ok(ChannelManagement {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        channel_a: msg.uint(channel::CHANNEL_A)? as u16,
        channel_b: msg.uint(channel::CHANNEL_B)? as u16,
        txrx: TxRxMode::from_code(msg.uint(channel::TXRX)?),
        power: msg.flag(channel::POWER)?,
        target,
        band_a: msg.flag(channel::BAND_A)?,
        band_b: msg.flag(channel::BAND_B)?,
        zone_size: msg.uint(channel::ZONE_SIZE)? as u8,
    })
}

// ---------------------------------------------------------------------------
// Type 23
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAssignment {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub area: GeoArea,
    pub station_type: u8,
    pub ship_type: ShipType,
    pub txrx: TxRxMode,
    /// Reporting interval code (0-11); 12-15 reserved.
    pub interval: u8,
    /// Quiet time in minutes, 0 for none.
    pub quiet: u8,
}

pub fn decode_group_assignment(msg: &EncodedMessage) -> Result<GroupAssignment> {
    msg.expect_type(MessageType::GroupAssignment)?;

    Ok(GroupAssignment {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        area: geo_area(msg, group::NE_LON, group::NE_LAT, group::SW_LON, group::SW_LAT)?,
        station_type: msg.uint(group::STATION_TYPE)? as u8,
        ship_type: ShipType(msg.uint(group::SHIP_TYPE)? as u8),
        txrx: TxRxMode::from_code(msg.uint(group::TXRX)?),
        interval: msg.uint(group::INTERVAL)? as u8,
        quiet: msg.uint(group::QUIET)? as u8,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
