//! Shared types and error enum for ais-core.

use serde::Serialize;
use thiserror::Error;

/// All errors produced by ais-core.
#[derive(Debug, Error)]
pub enum AisError {
    #[error("malformed sentence: {0}")]
    MalformedSentence(String),
    #[error("checksum mismatch: sentence says {expected:02X}, computed {computed:02X}")]
    Checksum { expected: u8, computed: u8 },
    #[error("invalid encoded message: {0}")]
    InvalidEncodedMessage(String),
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(u8),
    #[error("field {field} needs bits {start}..{end} but message has {len}")]
    BitRange {
        field: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("invalid value {value} in field {field}")]
    InvalidField { field: &'static str, value: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

impl AisError {
    /// Short stable tag for counters and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AisError::MalformedSentence(_) => "malformed",
            AisError::Checksum { .. } => "checksum",
            AisError::InvalidEncodedMessage(_) => "invalid",
            AisError::UnsupportedMessageType(_) => "unsupported",
            AisError::BitRange { .. } => "range",
            AisError::InvalidField { .. } => "field",
            AisError::Io(_) => "io",
            AisError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, AisError>;

// ---------------------------------------------------------------------------
// MMSI
// ---------------------------------------------------------------------------

/// Maritime Mobile Service Identity: a 30-bit station identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Mmsi(u32);

impl Mmsi {
    pub const MAX: u32 = (1 << 30) - 1;

    /// Build from a raw 30-bit field value.
    pub fn from_bits(value: u64) -> Result<Mmsi> {
        if value > Mmsi::MAX as u64 {
            return Err(AisError::InvalidField {
                field: "mmsi",
                value,
            });
        }
        Ok(Mmsi(value as u32))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Craft associated with a parent ship (98MIDXXXX).
    pub fn is_auxiliary_craft(&self) -> bool {
        (980_000_000..990_000_000).contains(&self.0)
    }
}

impl std::fmt::Display for Mmsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Message type table
// ---------------------------------------------------------------------------

/// ITU-R M.1371 message types 1-27.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageType {
    PositionReportScheduled,
    PositionReportAssigned,
    PositionReportResponse,
    BaseStationReport,
    StaticVoyageData,
    AddressedBinary,
    BinaryAcknowledge,
    BinaryBroadcast,
    SarAircraftPosition,
    UtcDateInquiry,
    UtcDateResponse,
    AddressedSafety,
    SafetyAcknowledge,
    SafetyBroadcast,
    Interrogation,
    AssignedModeCommand,
    GnssBroadcast,
    StandardClassB,
    ExtendedClassB,
    DataLinkManagement,
    AidToNavigation,
    ChannelManagement,
    GroupAssignment,
    StaticDataReport,
    SingleSlotBinary,
    MultiSlotBinary,
    LongRangeBroadcast,
}

/// Known message type table, indexed by code - 1.
pub const MESSAGE_TYPES: [(MessageType, &str); 27] = [
    (MessageType::PositionReportScheduled, "Position report (scheduled)"),
    (MessageType::PositionReportAssigned, "Position report (assigned)"),
    (MessageType::PositionReportResponse, "Position report (interrogated)"),
    (MessageType::BaseStationReport, "Base station report"),
    (MessageType::StaticVoyageData, "Static and voyage related data"),
    (MessageType::AddressedBinary, "Binary addressed message"),
    (MessageType::BinaryAcknowledge, "Binary acknowledge"),
    (MessageType::BinaryBroadcast, "Binary broadcast message"),
    (MessageType::SarAircraftPosition, "SAR aircraft position report"),
    (MessageType::UtcDateInquiry, "UTC/date inquiry"),
    (MessageType::UtcDateResponse, "UTC/date response"),
    (MessageType::AddressedSafety, "Addressed safety related message"),
    (MessageType::SafetyAcknowledge, "Safety related acknowledge"),
    (MessageType::SafetyBroadcast, "Safety related broadcast message"),
    (MessageType::Interrogation, "Interrogation"),
    (MessageType::AssignedModeCommand, "Assigned mode command"),
    (MessageType::GnssBroadcast, "DGNSS broadcast binary message"),
    (MessageType::StandardClassB, "Standard class B position report"),
    (MessageType::ExtendedClassB, "Extended class B position report"),
    (MessageType::DataLinkManagement, "Data link management"),
    (MessageType::AidToNavigation, "Aid-to-navigation report"),
    (MessageType::ChannelManagement, "Channel management"),
    (MessageType::GroupAssignment, "Group assignment command"),
    (MessageType::StaticDataReport, "Static data report"),
    (MessageType::SingleSlotBinary, "Single slot binary message"),
    (MessageType::MultiSlotBinary, "Multiple slot binary message"),
    (MessageType::LongRangeBroadcast, "Long range AIS broadcast"),
];

impl MessageType {
    /// Look up a 6-bit type code. `None` for codes outside 1-27.
    pub fn from_code(code: u8) -> Option<MessageType> {
        let idx = (code as usize).checked_sub(1)?;
        MESSAGE_TYPES.get(idx).map(|(ty, _)| *ty)
    }

    pub fn code(&self) -> u8 {
        MESSAGE_TYPES
            .iter()
            .position(|(ty, _)| ty == self)
            .map(|idx| idx as u8 + 1)
            .unwrap_or(0)
    }

    pub fn name(&self) -> &'static str {
        MESSAGE_TYPES
            .iter()
            .find(|(ty, _)| ty == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

// ---------------------------------------------------------------------------
// Shared field enums
// ---------------------------------------------------------------------------

/// Navigational status (4 bits), class A position reports and type 27.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationStatus {
    UnderWayUsingEngine,
    AtAnchor,
    NotUnderCommand,
    RestrictedManoeuverability,
    ConstrainedByDraught,
    Moored,
    Aground,
    EngagedInFishing,
    UnderWaySailing,
    ReservedForHsc,
    ReservedForWig,
    PowerDrivenTowingAstern,
    PowerDrivenPushingAhead,
    Reserved,
    AisSartActive,
    NotDefined,
}

impl NavigationStatus {
    pub fn from_code(code: u64) -> NavigationStatus {
        match code {
            0 => NavigationStatus::UnderWayUsingEngine,
            1 => NavigationStatus::AtAnchor,
            2 => NavigationStatus::NotUnderCommand,
            3 => NavigationStatus::RestrictedManoeuverability,
            4 => NavigationStatus::ConstrainedByDraught,
            5 => NavigationStatus::Moored,
            6 => NavigationStatus::Aground,
            7 => NavigationStatus::EngagedInFishing,
            8 => NavigationStatus::UnderWaySailing,
            9 => NavigationStatus::ReservedForHsc,
            10 => NavigationStatus::ReservedForWig,
            11 => NavigationStatus::PowerDrivenTowingAstern,
            12 => NavigationStatus::PowerDrivenPushingAhead,
            13 => NavigationStatus::Reserved,
            14 => NavigationStatus::AisSartActive,
            _ => NavigationStatus::NotDefined,
        }
    }
}

/// Special manoeuvre indicator (2 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ManeuverIndicator {
    NotAvailable,
    NoSpecialManeuver,
    SpecialManeuver,
    Reserved,
}

impl ManeuverIndicator {
    pub fn from_code(code: u64) -> ManeuverIndicator {
        match code {
            0 => ManeuverIndicator::NotAvailable,
            1 => ManeuverIndicator::NoSpecialManeuver,
            2 => ManeuverIndicator::SpecialManeuver,
            _ => ManeuverIndicator::Reserved,
        }
    }
}

/// Electronic position fixing device (4 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpfdType {
    Undefined,
    Gps,
    Glonass,
    CombinedGpsGlonass,
    LoranC,
    Chayka,
    IntegratedNavigation,
    Surveyed,
    Galileo,
    InternalGnss,
    Reserved(u8),
}

impl EpfdType {
    pub fn from_code(code: u64) -> EpfdType {
        match code {
            0 => EpfdType::Undefined,
            1 => EpfdType::Gps,
            2 => EpfdType::Glonass,
            3 => EpfdType::CombinedGpsGlonass,
            4 => EpfdType::LoranC,
            5 => EpfdType::Chayka,
            6 => EpfdType::IntegratedNavigation,
            7 => EpfdType::Surveyed,
            8 => EpfdType::Galileo,
            15 => EpfdType::InternalGnss,
            other => EpfdType::Reserved(other as u8),
        }
    }
}

/// Transmit/receive mode for channel management (4 bits) and group
/// assignment (2 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxRxMode {
    /// Tx A and B, Rx A and B.
    TxABRxAB,
    /// Tx A, Rx A and B.
    TxARxAB,
    /// Tx B, Rx A and B.
    TxBRxAB,
    Reserved(u8),
}

impl TxRxMode {
    pub fn from_code(code: u64) -> TxRxMode {
        match code {
            0 => TxRxMode::TxABRxAB,
            1 => TxRxMode::TxARxAB,
            2 => TxRxMode::TxBRxAB,
            other => TxRxMode::Reserved(other as u8),
        }
    }
}

/// Ship and cargo type code (8 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShipType(pub u8);

impl ShipType {
    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Not available",
            1..=19 => "Reserved",
            20..=29 => "Wing in ground",
            30 => "Fishing",
            31 | 32 => "Towing",
            33 => "Dredging or underwater ops",
            34 => "Diving ops",
            35 => "Military ops",
            36 => "Sailing",
            37 => "Pleasure craft",
            38 | 39 => "Reserved",
            40..=49 => "High speed craft",
            50 => "Pilot vessel",
            51 => "Search and rescue vessel",
            52 => "Tug",
            53 => "Port tender",
            54 => "Anti-pollution equipment",
            55 => "Law enforcement",
            56 | 57 => "Spare - local vessel",
            58 => "Medical transport",
            59 => "Noncombatant ship",
            60..=69 => "Passenger",
            70..=79 => "Cargo",
            80..=89 => "Tanker",
            90..=99 => "Other type",
            _ => "Reserved",
        }
    }
}

impl std::fmt::Display for ShipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

/// Aid-to-navigation type (5 bits), type 21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AidType(pub u8);

impl AidType {
    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Default, type not specified",
            1 => "Reference point",
            2 => "RACON",
            3 => "Fixed structure off shore",
            4 => "Spare",
            5 => "Light, without sectors",
            6 => "Light, with sectors",
            7 => "Leading light front",
            8 => "Leading light rear",
            9 => "Beacon, cardinal N",
            10 => "Beacon, cardinal E",
            11 => "Beacon, cardinal S",
            12 => "Beacon, cardinal W",
            13 => "Beacon, port hand",
            14 => "Beacon, starboard hand",
            15 => "Beacon, preferred channel port hand",
            16 => "Beacon, preferred channel starboard hand",
            17 => "Beacon, isolated danger",
            18 => "Beacon, safe water",
            19 => "Beacon, special mark",
            20 => "Cardinal mark N",
            21 => "Cardinal mark E",
            22 => "Cardinal mark S",
            23 => "Cardinal mark W",
            24 => "Port hand mark",
            25 => "Starboard hand mark",
            26 => "Preferred channel port hand",
            27 => "Preferred channel starboard hand",
            28 => "Isolated danger",
            29 => "Safe water",
            30 => "Special mark",
            31 => "Light vessel / LANBY / rigs",
            _ => "Unknown",
        }
    }

    /// Codes 1-19 are fixed structures, 20-31 floating.
    pub fn is_floating(&self) -> bool {
        (20..=31).contains(&self.0)
    }
}

impl std::fmt::Display for AidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

/// Vessel dimensions relative to the position reference point, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub to_bow: u16,
    pub to_stern: u16,
    pub to_port: u8,
    pub to_starboard: u8,
}

impl Dimensions {
    pub fn length(&self) -> u16 {
        self.to_bow + self.to_stern
    }

    pub fn beam(&self) -> u16 {
        self.to_port as u16 + self.to_starboard as u16
    }
}

/// Rectangular region given by its north-east and south-west corners.
///
/// Corners are in the unit carried on the air (tenths of a minute) divided
/// by ten, i.e. arc minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoArea {
    pub ne_lon: f32,
    pub ne_lat: f32,
    pub sw_lon: f32,
    pub sw_lat: f32,
}

impl GeoArea {
    /// Corners converted to decimal degrees: (ne_lon, ne_lat, sw_lon, sw_lat).
    pub fn degrees(&self) -> (f64, f64, f64, f64) {
        (
            self.ne_lon as f64 / 60.0,
            self.ne_lat as f64 / 60.0,
            self.sw_lon as f64 / 60.0,
            self.sw_lat as f64 / 60.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmsi_from_bits() {
        let mmsi = Mmsi::from_bits(244670316).unwrap();
        assert_eq!(mmsi.value(), 244670316);
        assert_eq!(mmsi.to_string(), "244670316");
        assert!(Mmsi::from_bits(1 << 30).is_err());
        assert!(Mmsi::from_bits(Mmsi::MAX as u64).is_ok());
    }

    #[test]
    fn test_mmsi_display_zero_padded() {
        assert_eq!(Mmsi::from_bits(3669702).unwrap().to_string(), "003669702");
    }

    #[test]
    fn test_mmsi_auxiliary() {
        assert!(Mmsi::from_bits(982_310_001).unwrap().is_auxiliary_craft());
        assert!(!Mmsi::from_bits(271_041_815).unwrap().is_auxiliary_craft());
    }

    #[test]
    fn test_message_type_table() {
        for code in 1..=27u8 {
            let ty = MessageType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        assert_eq!(MessageType::from_code(0), None);
        assert_eq!(MessageType::from_code(28), None);
        assert_eq!(MessageType::from_code(63), None);
        assert_eq!(MessageType::ChannelManagement.code(), 22);
        assert_eq!(MessageType::ChannelManagement.name(), "Channel management");
    }

    #[test]
    fn test_enum_codes() {
        assert_eq!(NavigationStatus::from_code(15), NavigationStatus::NotDefined);
        assert_eq!(NavigationStatus::from_code(5), NavigationStatus::Moored);
        assert_eq!(EpfdType::from_code(12), EpfdType::Reserved(12));
        assert_eq!(TxRxMode::from_code(3), TxRxMode::Reserved(3));
        assert_eq!(ShipType(70).description(), "Cargo");
        assert_eq!(ShipType(0).description(), "Not available");
        assert_eq!(AidType(28).description(), "Isolated danger");
        assert!(AidType(28).is_floating());
        assert!(!AidType(5).is_floating());
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(AisError::UnsupportedMessageType(63).kind(), "unsupported");
        assert_eq!(
            AisError::Checksum {
                expected: 0x5C,
                computed: 0x34
            }
            .to_string(),
            "checksum mismatch: sentence says 5C, computed 34"
        );
    }

    #[test]
    fn test_dimensions() {
        let d = Dimensions {
            to_bow: 225,
            to_stern: 70,
            to_port: 1,
            to_starboard: 31,
        };
        assert_eq!(d.length(), 295);
        assert_eq!(d.beam(), 32);
    }
}
