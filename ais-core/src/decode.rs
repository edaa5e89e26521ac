//! Decode encoded AIS messages into typed records.
//!
//! Every message type has a fixed layout table of [`Field`]s in its module;
//! decoders read those fields through `EncodedMessage` and never substitute a
//! default for a field past the end of the message.
//!
//! - Types 1-3, 4, 9, 11, 18, 19, 27: [`position`]
//! - Types 5, 21, 24:                 [`voyage`]
//! - Types 6, 7, 8, 13, 17, 25, 26:   [`binary`]
//! - Types 12, 14:                    [`safety`]
//! - Types 10, 15, 16, 20, 22, 23:    [`link`]

use serde::Serialize;

use crate::bits::Field;
use crate::encoded::EncodedMessage;
use crate::types::*;

pub mod binary;
pub mod link;
pub mod position;
pub mod safety;
pub mod voyage;

pub use binary::*;
pub use link::*;
pub use position::*;
pub use safety::*;
pub use voyage::*;

// ---------------------------------------------------------------------------
// Decoded message union
// ---------------------------------------------------------------------------

/// One variant per ITU message type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DecodedMsg {
    PositionReportScheduled(PositionReport),
    PositionReportAssigned(PositionReport),
    PositionReportResponse(PositionReport),
    BaseStationReport(BaseStationReport),
    StaticVoyageData(StaticVoyageData),
    AddressedBinary(AddressedBinary),
    BinaryAcknowledge(Acknowledge),
    BinaryBroadcast(BinaryBroadcast),
    SarAircraftPosition(SarAircraftPosition),
    UtcDateInquiry(UtcDateInquiry),
    UtcDateResponse(BaseStationReport),
    AddressedSafety(AddressedSafety),
    SafetyAcknowledge(Acknowledge),
    SafetyBroadcast(SafetyBroadcast),
    Interrogation(Interrogation),
    AssignedModeCommand(AssignedModeCommand),
    GnssBroadcast(GnssBroadcast),
    StandardClassB(StandardClassB),
    ExtendedClassB(ExtendedClassB),
    DataLinkManagement(DataLinkManagement),
    AidToNavigation(AidToNavigation),
    ChannelManagement(ChannelManagement),
    GroupAssignment(GroupAssignment),
    StaticDataReport(StaticDataReport),
    SingleSlotBinary(SlotBinary),
    MultiSlotBinary(SlotBinary),
    LongRangeBroadcast(LongRangeBroadcast),
}

impl DecodedMsg {
    pub fn message_type(&self) -> MessageType {
        match self {
            DecodedMsg::PositionReportScheduled(_) => MessageType::PositionReportScheduled,
            DecodedMsg::PositionReportAssigned(_) => MessageType::PositionReportAssigned,
            DecodedMsg::PositionReportResponse(_) => MessageType::PositionReportResponse,
            DecodedMsg::BaseStationReport(_) => MessageType::BaseStationReport,
            DecodedMsg::StaticVoyageData(_) => MessageType::StaticVoyageData,
            DecodedMsg::AddressedBinary(_) => MessageType::AddressedBinary,
            DecodedMsg::BinaryAcknowledge(_) => MessageType::BinaryAcknowledge,
            DecodedMsg::BinaryBroadcast(_) => MessageType::BinaryBroadcast,
            DecodedMsg::SarAircraftPosition(_) => MessageType::SarAircraftPosition,
            DecodedMsg::UtcDateInquiry(_) => MessageType::UtcDateInquiry,
            DecodedMsg::UtcDateResponse(_) => MessageType::UtcDateResponse,
            DecodedMsg::AddressedSafety(_) => MessageType::AddressedSafety,
            DecodedMsg::SafetyAcknowledge(_) => MessageType::SafetyAcknowledge,
            DecodedMsg::SafetyBroadcast(_) => MessageType::SafetyBroadcast,
            DecodedMsg::Interrogation(_) => MessageType::Interrogation,
            DecodedMsg::AssignedModeCommand(_) => MessageType::AssignedModeCommand,
            DecodedMsg::GnssBroadcast(_) => MessageType::GnssBroadcast,
            DecodedMsg::StandardClassB(_) => MessageType::StandardClassB,
            DecodedMsg::ExtendedClassB(_) => MessageType::ExtendedClassB,
            DecodedMsg::DataLinkManagement(_) => MessageType::DataLinkManagement,
            DecodedMsg::AidToNavigation(_) => MessageType::AidToNavigation,
            DecodedMsg::ChannelManagement(_) => MessageType::ChannelManagement,
            DecodedMsg::GroupAssignment(_) => MessageType::GroupAssignment,
            DecodedMsg::StaticDataReport(_) => MessageType::StaticDataReport,
            DecodedMsg::SingleSlotBinary(_) => MessageType::SingleSlotBinary,
            DecodedMsg::MultiSlotBinary(_) => MessageType::MultiSlotBinary,
            DecodedMsg::LongRangeBroadcast(_) => MessageType::LongRangeBroadcast,
        }
    }

    /// Repeat indicator and source MMSI, common to every type.
    pub fn header(&self) -> (u8, Mmsi) {
        match self {
            DecodedMsg::PositionReportScheduled(m)
            | DecodedMsg::PositionReportAssigned(m)
            | DecodedMsg::PositionReportResponse(m) => (m.repeat, m.mmsi),
            DecodedMsg::BaseStationReport(m) | DecodedMsg::UtcDateResponse(m) => {
                (m.repeat, m.mmsi)
            }
            DecodedMsg::StaticVoyageData(m) => (m.repeat, m.mmsi),
            DecodedMsg::AddressedBinary(m) => (m.repeat, m.mmsi),
            DecodedMsg::BinaryAcknowledge(m) | DecodedMsg::SafetyAcknowledge(m) => {
                (m.repeat, m.mmsi)
            }
            DecodedMsg::BinaryBroadcast(m) => (m.repeat, m.mmsi),
            DecodedMsg::SarAircraftPosition(m) => (m.repeat, m.mmsi),
            DecodedMsg::UtcDateInquiry(m) => (m.repeat, m.mmsi),
            DecodedMsg::AddressedSafety(m) => (m.repeat, m.mmsi),
            DecodedMsg::SafetyBroadcast(m) => (m.repeat, m.mmsi),
            DecodedMsg::Interrogation(m) => (m.repeat, m.mmsi),
            DecodedMsg::AssignedModeCommand(m) => (m.repeat, m.mmsi),
            DecodedMsg::GnssBroadcast(m) => (m.repeat, m.mmsi),
            DecodedMsg::StandardClassB(m) => (m.repeat, m.mmsi),
            DecodedMsg::ExtendedClassB(m) => (m.repeat, m.mmsi),
            DecodedMsg::DataLinkManagement(m) => (m.repeat, m.mmsi),
            DecodedMsg::AidToNavigation(m) => (m.repeat, m.mmsi),
            DecodedMsg::ChannelManagement(m) => (m.repeat, m.mmsi),
            DecodedMsg::GroupAssignment(m) => (m.repeat, m.mmsi),
            DecodedMsg::StaticDataReport(m) => (m.repeat, m.mmsi),
            DecodedMsg::SingleSlotBinary(m) | DecodedMsg::MultiSlotBinary(m) => {
                (m.repeat, m.mmsi)
            }
            DecodedMsg::LongRangeBroadcast(m) => (m.repeat, m.mmsi),
        }
    }

    pub fn repeat(&self) -> u8 {
        self.header().0
    }

    /// Source station.
    pub fn mmsi(&self) -> Mmsi {
        self.header().1
    }

    /// Reported position as (lat, lon) in degrees, for types that carry one.
    pub fn position(&self) -> Option<(f64, f64)> {
        let (lat, lon) = match self {
            DecodedMsg::PositionReportScheduled(m)
            | DecodedMsg::PositionReportAssigned(m)
            | DecodedMsg::PositionReportResponse(m) => (m.lat, m.lon),
            DecodedMsg::BaseStationReport(m) | DecodedMsg::UtcDateResponse(m) => (m.lat, m.lon),
            DecodedMsg::SarAircraftPosition(m) => (m.lat, m.lon),
            DecodedMsg::GnssBroadcast(m) => (m.lat, m.lon),
            DecodedMsg::StandardClassB(m) => (m.lat, m.lon),
            DecodedMsg::ExtendedClassB(m) => (m.lat, m.lon),
            DecodedMsg::AidToNavigation(m) => (m.lat, m.lon),
            DecodedMsg::LongRangeBroadcast(m) => (m.lat, m.lon),
            _ => (None, None),
        };
        Some((lat?, lon?))
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Decode a complete message, routing on the type code in bits 0-5.
///
/// Invalid messages fail with `InvalidEncodedMessage`, codes outside 1-27
/// with `UnsupportedMessageType`.
pub fn decode(msg: &EncodedMessage) -> Result<DecodedMsg> {
    let msg_type = msg.message_type()?;

    let decoded = match msg_type {
        MessageType::PositionReportScheduled => {
            DecodedMsg::PositionReportScheduled(decode_position_report(msg)?)
        }
        MessageType::PositionReportAssigned => {
            DecodedMsg::PositionReportAssigned(decode_position_report(msg)?)
        }
        MessageType::PositionReportResponse => {
            DecodedMsg::PositionReportResponse(decode_position_report(msg)?)
        }
        MessageType::BaseStationReport => {
            DecodedMsg::BaseStationReport(decode_base_station_report(msg)?)
        }
        MessageType::StaticVoyageData => {
            DecodedMsg::StaticVoyageData(decode_static_voyage_data(msg)?)
        }
        MessageType::AddressedBinary => DecodedMsg::AddressedBinary(decode_addressed_binary(msg)?),
        MessageType::BinaryAcknowledge => {
            DecodedMsg::BinaryAcknowledge(decode_acknowledge(msg)?)
        }
        MessageType::BinaryBroadcast => DecodedMsg::BinaryBroadcast(decode_binary_broadcast(msg)?),
        MessageType::SarAircraftPosition => {
            DecodedMsg::SarAircraftPosition(decode_sar_aircraft_position(msg)?)
        }
        MessageType::UtcDateInquiry => DecodedMsg::UtcDateInquiry(decode_utc_date_inquiry(msg)?),
        MessageType::UtcDateResponse => {
            DecodedMsg::UtcDateResponse(decode_base_station_report(msg)?)
        }
        MessageType::AddressedSafety => DecodedMsg::AddressedSafety(decode_addressed_safety(msg)?),
        MessageType::SafetyAcknowledge => {
            DecodedMsg::SafetyAcknowledge(decode_acknowledge(msg)?)
        }
        MessageType::SafetyBroadcast => DecodedMsg::SafetyBroadcast(decode_safety_broadcast(msg)?),
        MessageType::Interrogation => DecodedMsg::Interrogation(decode_interrogation(msg)?),
        MessageType::AssignedModeCommand => {
            DecodedMsg::AssignedModeCommand(decode_assigned_mode_command(msg)?)
        }
        MessageType::GnssBroadcast => DecodedMsg::GnssBroadcast(decode_gnss_broadcast(msg)?),
        MessageType::StandardClassB => DecodedMsg::StandardClassB(decode_standard_class_b(msg)?),
        MessageType::ExtendedClassB => DecodedMsg::ExtendedClassB(decode_extended_class_b(msg)?),
        MessageType::DataLinkManagement => {
            DecodedMsg::DataLinkManagement(decode_data_link_management(msg)?)
        }
        MessageType::AidToNavigation => {
            DecodedMsg::AidToNavigation(decode_aid_to_navigation(msg)?)
        }
        MessageType::ChannelManagement => {
            DecodedMsg::ChannelManagement(decode_channel_management(msg)?)
        }
        MessageType::GroupAssignment => DecodedMsg::GroupAssignment(decode_group_assignment(msg)?),
        MessageType::StaticDataReport => {
            DecodedMsg::StaticDataReport(decode_static_data_report(msg)?)
        }
        MessageType::SingleSlotBinary => DecodedMsg::SingleSlotBinary(decode_slot_binary(msg)?),
        MessageType::MultiSlotBinary => DecodedMsg::MultiSlotBinary(decode_slot_binary(msg)?),
        MessageType::LongRangeBroadcast => {
            DecodedMsg::LongRangeBroadcast(decode_long_range_broadcast(msg)?)
        }
    };

    Ok(decoded)
}

// ---------------------------------------------------------------------------
// Shared field conversions
// ---------------------------------------------------------------------------

/// Check validity and that the type code is one of `accepted`.
pub(crate) fn expect_any(msg: &EncodedMessage, accepted: &[MessageType]) -> Result<MessageType> {
    let code = msg.message_type_code()?;
    accepted
        .iter()
        .copied()
        .find(|ty| ty.code() == code)
        .ok_or(AisError::UnsupportedMessageType(code))
}

/// Longitude in degrees; 181 (and anything out of range) means not available.
pub(crate) fn longitude(msg: &EncodedMessage, field: Field, divisor: f64) -> Result<Option<f64>> {
    let lon = msg.scaled_signed(field, divisor)?;
    Ok((-180.0..=180.0).contains(&lon).then_some(lon))
}

/// Latitude in degrees; 91 (and anything out of range) means not available.
pub(crate) fn latitude(msg: &EncodedMessage, field: Field, divisor: f64) -> Result<Option<f64>> {
    let lat = msg.scaled_signed(field, divisor)?;
    Ok((-90.0..=90.0).contains(&lat).then_some(lat))
}

/// Speed over ground in 0.1 knot steps; 1023 means not available.
pub(crate) fn speed_tenths(msg: &EncodedMessage, field: Field) -> Result<Option<f64>> {
    let raw = msg.uint(field)?;
    Ok((raw != 1023).then(|| raw as f64 / 10.0))
}

/// Course over ground in 0.1 degree steps; 3600 and above mean not available.
pub(crate) fn course_tenths(msg: &EncodedMessage, field: Field) -> Result<Option<f64>> {
    let raw = msg.uint(field)?;
    Ok((raw < 3600).then(|| raw as f64 / 10.0))
}

/// True heading in degrees; 511 means not available.
pub(crate) fn heading(msg: &EncodedMessage, field: Field) -> Result<Option<u16>> {
    let raw = msg.uint(field)?;
    Ok((raw < 360).then_some(raw as u16))
}

pub(crate) fn dimensions(
    msg: &EncodedMessage,
    to_bow: Field,
    to_stern: Field,
    to_port: Field,
    to_starboard: Field,
) -> Result<Dimensions> {
    Ok(Dimensions {
        to_bow: msg.uint(to_bow)? as u16,
        to_stern: msg.uint(to_stern)? as u16,
        to_port: msg.uint(to_port)? as u8,
        to_starboard: msg.uint(to_starboard)? as u8,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Writer;

    fn encoded(payload: &str, fill: u8) -> EncodedMessage {
        EncodedMessage::from_payload(payload, fill)
    }

    #[test]
    fn test_decode_routes_position_report() {
        let msg = decode(&encoded("13aEOK?P00PD2wVMdLDRcQv40PSh", 0)).unwrap();
        assert!(matches!(msg, DecodedMsg::PositionReportScheduled(_)));
        assert_eq!(msg.message_type(), MessageType::PositionReportScheduled);
        assert_eq!(msg.mmsi().value(), 244670316);
        assert_eq!(msg.repeat(), 0);
    }

    #[test]
    fn test_decode_routes_base_station() {
        let msg = decode(&encoded("403OviQuMGCqWrRO9>E6fE700@GO", 0)).unwrap();
        assert!(matches!(msg, DecodedMsg::BaseStationReport(_)));
        assert_eq!(msg.mmsi().value(), 3669702);
    }

    #[test]
    fn test_decode_routes_binary_broadcast() {
        let msg = decode(&encoded("85M:Ih1KmPAU6jAs85`03cJm", 0)).unwrap();
        assert!(matches!(msg, DecodedMsg::BinaryBroadcast(_)));
        assert_eq!(msg.mmsi().value(), 366123456);
    }

    #[test]
    fn test_decode_routes_static_data_report() {
        let msg = decode(&encoded("H42O55i18tMET00000000000000", 2)).unwrap();
        assert!(matches!(msg, DecodedMsg::StaticDataReport(_)));
    }

    #[test]
    fn test_decode_every_type_code() {
        // Long enough all-zero bodies for every fixed layout.
        for code in 1..=27u64 {
            let w = Writer::header(code, 1, 123456789).pad_to(424);
            let msg = decode(&w.message())
                .unwrap_or_else(|e| panic!("type {code} failed: {e}"));
            assert_eq!(msg.message_type().code() as u64, code);
            assert_eq!(msg.repeat(), 1);
            assert_eq!(msg.mmsi().value(), 123456789);
        }
    }

    #[test]
    fn test_unsupported_type() {
        let w = Writer::header(63, 0, 1).pad_to(168);
        assert!(matches!(
            decode(&w.message()),
            Err(AisError::UnsupportedMessageType(63))
        ));
        let w = Writer::header(0, 0, 1).pad_to(168);
        assert!(matches!(
            decode(&w.message()),
            Err(AisError::UnsupportedMessageType(0))
        ));
    }

    #[test]
    fn test_invalid_message_rejected() {
        assert!(matches!(
            decode(&encoded("13aEOK?P00PD2wVMdLDRcQv40PSh", 6)),
            Err(AisError::InvalidEncodedMessage(_))
        ));
        assert!(matches!(
            decode(&encoded("13aEOK?P00PD2wVMdLDRcQv40PS~", 0)),
            Err(AisError::InvalidEncodedMessage(_))
        ));
    }

    #[test]
    fn test_truncated_message_is_range_error() {
        // Type 1 needs 168 bits; give it 60.
        let w = Writer::header(1, 0, 244670316).pad_to(60);
        assert!(matches!(
            decode(&w.message()),
            Err(AisError::BitRange { .. })
        ));
    }

    #[test]
    fn test_too_short_for_type_field() {
        let w = Writer::new().u(1, 4);
        assert!(matches!(
            decode(&w.message()),
            Err(AisError::BitRange {
                field: "message_type",
                ..
            })
        ));
    }

    #[test]
    fn test_position_accessor() {
        let msg = decode(&encoded("13aEOK?P00PD2wVMdLDRcQv40PSh", 0)).unwrap();
        let (lat, lon) = msg.position().unwrap();
        assert!((lat - 51.89475).abs() < 1e-9);
        assert!((lon - 4.379285).abs() < 1e-9);

        let msg = decode(&encoded("85M:Ih1KmPAU6jAs85`03cJm", 0)).unwrap();
        assert!(msg.position().is_none());
    }

    #[test]
    fn test_serialize_tagged() {
        let msg = decode(&encoded("13aEOK?P00PD2wVMdLDRcQv40PSh", 0)).unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "PositionReportScheduled");
        assert_eq!(json["mmsi"], 244670316);
    }
}
