//! Position-bearing reports: class A (1-3), base station and UTC response
//! (4, 11), SAR aircraft (9), class B (18, 19) and long range (27).

use serde::Serialize;

use super::{course_tenths, dimensions, expect_any, heading, latitude, longitude, speed_tenths};
use crate::encoded::EncodedMessage;
use crate::types::*;

/// Position in 1/10000 minute, as carried by most position reports.
const DEG_E4_MIN: f64 = 600_000.0;
/// Position in 1/10 minute (type 27).
const DEG_E1_MIN: f64 = 600.0;

mod class_a {
    use crate::bits::Field;

    pub const STATUS: Field = Field::new("status", 38, 42);
    pub const TURN: Field = Field::new("turn", 42, 50);
    pub const SPEED: Field = Field::new("speed", 50, 60);
    pub const ACCURACY: Field = Field::new("accuracy", 60, 61);
    pub const LON: Field = Field::new("lon", 61, 89);
    pub const LAT: Field = Field::new("lat", 89, 116);
    pub const COURSE: Field = Field::new("course", 116, 128);
    pub const HEADING: Field = Field::new("heading", 128, 137);
    pub const SECOND: Field = Field::new("second", 137, 143);
    pub const MANEUVER: Field = Field::new("maneuver", 143, 145);
    pub const RAIM: Field = Field::new("raim", 148, 149);
    pub const RADIO: Field = Field::new("radio", 149, 168);
}

mod base_station {
    use crate::bits::Field;

    pub const YEAR: Field = Field::new("year", 38, 52);
    pub const MONTH: Field = Field::new("month", 52, 56);
    pub const DAY: Field = Field::new("day", 56, 61);
    pub const HOUR: Field = Field::new("hour", 61, 66);
    pub const MINUTE: Field = Field::new("minute", 66, 72);
    pub const SECOND: Field = Field::new("second", 72, 78);
    pub const ACCURACY: Field = Field::new("accuracy", 78, 79);
    pub const LON: Field = Field::new("lon", 79, 107);
    pub const LAT: Field = Field::new("lat", 107, 134);
    pub const EPFD: Field = Field::new("epfd", 134, 138);
    pub const RAIM: Field = Field::new("raim", 148, 149);
    pub const RADIO: Field = Field::new("radio", 149, 168);
}

mod sar {
    use crate::bits::Field;

    pub const ALTITUDE: Field = Field::new("altitude", 38, 50);
    pub const SPEED: Field = Field::new("speed", 50, 60);
    pub const ACCURACY: Field = Field::new("accuracy", 60, 61);
    pub const LON: Field = Field::new("lon", 61, 89);
    pub const LAT: Field = Field::new("lat", 89, 116);
    pub const COURSE: Field = Field::new("course", 116, 128);
    pub const SECOND: Field = Field::new("second", 128, 134);
    pub const REGIONAL: Field = Field::new("regional", 134, 142);
    pub const DTE: Field = Field::new("dte", 142, 143);
    pub const ASSIGNED: Field = Field::new("assigned", 146, 147);
    pub const RAIM: Field = Field::new("raim", 147, 148);
    pub const RADIO: Field = Field::new("radio", 148, 168);
}

/// Fields shared by types 18 and 19 up to the timestamp.
mod class_b {
    use crate::bits::Field;

    pub const SPEED: Field = Field::new("speed", 46, 56);
    pub const ACCURACY: Field = Field::new("accuracy", 56, 57);
    pub const LON: Field = Field::new("lon", 57, 85);
    pub const LAT: Field = Field::new("lat", 85, 112);
    pub const COURSE: Field = Field::new("course", 112, 124);
    pub const HEADING: Field = Field::new("heading", 124, 133);
    pub const SECOND: Field = Field::new("second", 133, 139);
}

mod standard_b {
    use crate::bits::Field;

    pub const REGIONAL: Field = Field::new("regional", 139, 141);
    pub const CS: Field = Field::new("cs", 141, 142);
    pub const DISPLAY: Field = Field::new("display", 142, 143);
    pub const DSC: Field = Field::new("dsc", 143, 144);
    pub const BAND: Field = Field::new("band", 144, 145);
    pub const MSG22: Field = Field::new("msg22", 145, 146);
    pub const ASSIGNED: Field = Field::new("assigned", 146, 147);
    pub const RAIM: Field = Field::new("raim", 147, 148);
    pub const RADIO: Field = Field::new("radio", 148, 168);
}

mod extended_b {
    use crate::bits::Field;

    pub const REGIONAL: Field = Field::new("regional", 139, 143);
    pub const NAME: Field = Field::new("shipname", 143, 263);
    pub const SHIPTYPE: Field = Field::new("shiptype", 263, 271);
    pub const TO_BOW: Field = Field::new("to_bow", 271, 280);
    pub const TO_STERN: Field = Field::new("to_stern", 280, 289);
    pub const TO_PORT: Field = Field::new("to_port", 289, 295);
    pub const TO_STARBOARD: Field = Field::new("to_starboard", 295, 301);
    pub const EPFD: Field = Field::new("epfd", 301, 305);
    pub const RAIM: Field = Field::new("raim", 305, 306);
    pub const DTE: Field = Field::new("dte", 306, 307);
    pub const ASSIGNED: Field = Field::new("assigned", 307, 308);
}

mod long_range {
    use crate::bits::Field;

    pub const ACCURACY: Field = Field::new("accuracy", 38, 39);
    pub const RAIM: Field = Field::new("raim", 39, 40);
    pub const STATUS: Field = Field::new("status", 40, 44);
    pub const LON: Field = Field::new("lon", 44, 62);
    pub const LAT: Field = Field::new("lat", 62, 79);
    pub const SPEED: Field = Field::new("speed", 79, 85);
    pub const COURSE: Field = Field::new("course", 85, 94);
    pub const GNSS: Field = Field::new("gnss", 94, 95);
}

// ---------------------------------------------------------------------------
// Types 1, 2, 3
// ---------------------------------------------------------------------------

/// Class A position report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub status: NavigationStatus,
    /// Raw rate-of-turn indicator, -127..=127. `None` when -128 (no sensor).
    pub turn: Option<i8>,
    /// Knots.
    pub speed: Option<f64>,
    pub accuracy: bool,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    /// Degrees.
    pub course: Option<f64>,
    pub heading: Option<u16>,
    /// UTC second of the fix; 60-63 are "not available" style markers.
    pub second: u8,
    pub maneuver: ManeuverIndicator,
    pub raim: bool,
    pub radio: u32,
}

impl PositionReport {
    /// Rate of turn in degrees per minute, right positive.
    ///
    /// `None` without a turn indicator or when only the direction is known
    /// (raw +/-127).
    pub fn rate_of_turn(&self) -> Option<f64> {
        let raw = self.turn?;
        if raw.unsigned_abs() >= 127 {
            return None;
        }
        let rate = (raw as f64 / 4.733).powi(2);
        Some(if raw < 0 { -rate } else { rate })
    }
}

pub fn decode_position_report(msg: &EncodedMessage) -> Result<PositionReport> {
    expect_any(
        msg,
        &[
            MessageType::PositionReportScheduled,
            MessageType::PositionReportAssigned,
            MessageType::PositionReportResponse,
        ],
    )?;

    let turn = msg.int(class_a::TURN)?;

    Ok(PositionReport {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        status: NavigationStatus::from_code(msg.uint(class_a::STATUS)?),
        turn: (turn != -128).then_some(turn as i8),
        speed: speed_tenths(msg, class_a::SPEED)?,
        accuracy: msg.flag(class_a::ACCURACY)?,
        lon: longitude(msg, class_a::LON, DEG_E4_MIN)?,
        lat: latitude(msg, class_a::LAT, DEG_E4_MIN)?,
        course: course_tenths(msg, class_a::COURSE)?,
        heading: heading(msg, class_a::HEADING)?,
        second: msg.uint(class_a::SECOND)? as u8,
        maneuver: ManeuverIndicator::from_code(msg.uint(class_a::MANEUVER)?),
        raim: msg.flag(class_a::RAIM)?,
        radio: msg.uint(class_a::RADIO)? as u32,
    })
}

// ---------------------------------------------------------------------------
// Types 4 and 11
// ---------------------------------------------------------------------------

/// Base station report (type 4) or UTC/date response (type 11).
///
/// Date and time fields are raw; zero year/month/day and hour 24, minute 60,
/// second 60 mean not available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseStationReport {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub accuracy: bool,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub epfd: EpfdType,
    pub raim: bool,
    pub radio: u32,
}

impl BaseStationReport {
    /// `YYYY-MM-DDTHH:MM:SSZ` when every component is available.
    pub fn timestamp(&self) -> Option<String> {
        let valid = self.year > 0
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60;
        valid.then(|| {
            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            )
        })
    }
}

pub fn decode_base_station_report(msg: &EncodedMessage) -> Result<BaseStationReport> {
    expect_any(
        msg,
        &[MessageType::BaseStationReport, MessageType::UtcDateResponse],
    )?;

    Ok(BaseStationReport {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        year: msg.uint(base_station::YEAR)? as u16,
        month: msg.uint(base_station::MONTH)? as u8,
        day: msg.uint(base_station::DAY)? as u8,
        hour: msg.uint(base_station::HOUR)? as u8,
        minute: msg.uint(base_station::MINUTE)? as u8,
        second: msg.uint(base_station::SECOND)? as u8,
        accuracy: msg.flag(base_station::ACCURACY)?,
        lon: longitude(msg, base_station::LON, DEG_E4_MIN)?,
        lat: latitude(msg, base_station::LAT, DEG_E4_MIN)?,
        epfd: EpfdType::from_code(msg.uint(base_station::EPFD)?),
        raim: msg.flag(base_station::RAIM)?,
        radio: msg.uint(base_station::RADIO)? as u32,
    })
}

// ---------------------------------------------------------------------------
// Type 9
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarAircraftPosition {
    pub repeat: u8,
    pub mmsi: Mmsi,
    /// Metres; 4094 means 4094 or higher.
    pub altitude: Option<u16>,
    /// Knots, whole steps.
    pub speed: Option<u16>,
    pub accuracy: bool,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub course: Option<f64>,
    pub second: u8,
    pub regional: u8,
    pub dte: bool,
    pub assigned: bool,
    pub raim: bool,
    pub radio: u32,
}

pub fn decode_sar_aircraft_position(msg: &EncodedMessage) -> Result<SarAircraftPosition> {
    msg.expect_type(MessageType::SarAircraftPosition)?;

    let altitude = msg.uint(sar::ALTITUDE)?;
    let speed = msg.uint(sar::SPEED)?;

    Ok(SarAircraftPosition {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        altitude: (altitude != 4095).then_some(altitude as u16),
        speed: (speed != 1023).then_some(speed as u16),
        accuracy: msg.flag(sar::ACCURACY)?,
        lon: longitude(msg, sar::LON, DEG_E4_MIN)?,
        lat: latitude(msg, sar::LAT, DEG_E4_MIN)?,
        course: course_tenths(msg, sar::COURSE)?,
        second: msg.uint(sar::SECOND)? as u8,
        regional: msg.uint(sar::REGIONAL)? as u8,
        dte: msg.flag(sar::DTE)?,
        assigned: msg.flag(sar::ASSIGNED)?,
        raim: msg.flag(sar::RAIM)?,
        radio: msg.uint(sar::RADIO)? as u32,
    })
}

// ---------------------------------------------------------------------------
// Types 18 and 19
// ---------------------------------------------------------------------------

/// Kinematic block common to class B reports.
struct ClassBPosition {
    speed: Option<f64>,
    accuracy: bool,
    lon: Option<f64>,
    lat: Option<f64>,
    course: Option<f64>,
    heading: Option<u16>,
    second: u8,
}

fn decode_class_b_position(msg: &EncodedMessage) -> Result<ClassBPosition> {
    Ok(ClassBPosition {
        speed: speed_tenths(msg, class_b::SPEED)?,
        accuracy: msg.flag(class_b::ACCURACY)?,
        lon: longitude(msg, class_b::LON, DEG_E4_MIN)?,
        lat: latitude(msg, class_b::LAT, DEG_E4_MIN)?,
        course: course_tenths(msg, class_b::COURSE)?,
        heading: heading(msg, class_b::HEADING)?,
        second: msg.uint(class_b::SECOND)? as u8,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardClassB {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub speed: Option<f64>,
    pub accuracy: bool,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub course: Option<f64>,
    pub heading: Option<u16>,
    pub second: u8,
    pub regional: u8,
    /// Carrier-sense unit rather than SOTDMA.
    pub cs: bool,
    pub display: bool,
    pub dsc: bool,
    /// Can use the whole marine band.
    pub band: bool,
    /// Accepts channel management (type 22).
    pub msg22: bool,
    pub assigned: bool,
    pub raim: bool,
    pub radio: u32,
}

pub fn decode_standard_class_b(msg: &EncodedMessage) -> Result<StandardClassB> {
    msg.expect_type(MessageType::StandardClassB)?;
    let pos = decode_class_b_position(msg)?;

    Ok(StandardClassB {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        speed: pos.speed,
        accuracy: pos.accuracy,
        lon: pos.lon,
        lat: pos.lat,
        course: pos.course,
        heading: pos.heading,
        second: pos.second,
        regional: msg.uint(standard_b::REGIONAL)? as u8,
        cs: msg.flag(standard_b::CS)?,
        display: msg.flag(standard_b::DISPLAY)?,
        dsc: msg.flag(standard_b::DSC)?,
        band: msg.flag(standard_b::BAND)?,
        msg22: msg.flag(standard_b::MSG22)?,
        assigned: msg.flag(standard_b::ASSIGNED)?,
        raim: msg.flag(standard_b::RAIM)?,
        radio: msg.uint(standard_b::RADIO)? as u32,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedClassB {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub speed: Option<f64>,
    pub accuracy: bool,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub course: Option<f64>,
    pub heading: Option<u16>,
    pub second: u8,
    pub regional: u8,
    pub shipname: String,
    pub shiptype: ShipType,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    pub raim: bool,
    pub dte: bool,
    pub assigned: bool,
}

pub fn decode_extended_class_b(msg: &EncodedMessage) -> Result<ExtendedClassB> {
    msg.expect_type(MessageType::ExtendedClassB)?;
    let pos = decode_class_b_position(msg)?;

    Ok(ExtendedClassB {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        speed: pos.speed,
        accuracy: pos.accuracy,
        lon: pos.lon,
        lat: pos.lat,
        course: pos.course,
        heading: pos.heading,
        second: pos.second,
        regional: msg.uint(extended_b::REGIONAL)? as u8,
        shipname: msg.text(extended_b::NAME)?,
        shiptype: ShipType(msg.uint(extended_b::SHIPTYPE)? as u8),
        dimensions: dimensions(
            msg,
            extended_b::TO_BOW,
            extended_b::TO_STERN,
            extended_b::TO_PORT,
            extended_b::TO_STARBOARD,
        )?,
        epfd: EpfdType::from_code(msg.uint(extended_b::EPFD)?),
        raim: msg.flag(extended_b::RAIM)?,
        dte: msg.flag(extended_b::DTE)?,
        assigned: msg.flag(extended_b::ASSIGNED)?,
    })
}

// ---------------------------------------------------------------------------
// Type 27
// ---------------------------------------------------------------------------

/// Long range broadcast, received by satellite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRangeBroadcast {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub accuracy: bool,
    pub raim: bool,
    pub status: NavigationStatus,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    /// Knots, whole steps.
    pub speed: Option<u8>,
    /// Degrees, whole steps.
    pub course: Option<u16>,
    /// Position is from the current GNSS fix rather than stale.
    pub gnss: bool,
}

pub fn decode_long_range_broadcast(msg: &EncodedMessage) -> Result<LongRangeBroadcast> {
    msg.expect_type(MessageType::LongRangeBroadcast)?;

    let speed = msg.uint(long_range::SPEED)?;
    let course = msg.uint(long_range::COURSE)?;

    Ok(LongRangeBroadcast {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        accuracy: msg.flag(long_range::ACCURACY)?,
        raim: msg.flag(long_range::RAIM)?,
        status: NavigationStatus::from_code(msg.uint(long_range::STATUS)?),
        lon: longitude(msg, long_range::LON, DEG_E1_MIN)?,
        lat: latitude(msg, long_range::LAT, DEG_E1_MIN)?,
        speed: (speed != 63).then_some(speed as u8),
        course: (course != 511).then_some(course as u16),
        gnss: !msg.flag(long_range::GNSS)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
