//! Identity and static data: static and voyage data (5), aid to navigation
//! (21) and the two-part static data report (24).

use serde::Serialize;

use super::{dimensions, latitude, longitude};
use crate::encoded::EncodedMessage;
use crate::types::*;

mod static_voyage {
    use crate::bits::Field;

    pub const AIS_VERSION: Field = Field::new("ais_version", 38, 40);
    pub const IMO: Field = Field::new("imo", 40, 70);
    pub const CALLSIGN: Field = Field::new("callsign", 70, 112);
    pub const NAME: Field = Field::new("shipname", 112, 232);
    pub const SHIPTYPE: Field = Field::new("shiptype", 232, 240);
    pub const TO_BOW: Field = Field::new("to_bow", 240, 249);
    pub const TO_STERN: Field = Field::new("to_stern", 249, 258);
    pub const TO_PORT: Field = Field::new("to_port", 258, 264);
    pub const TO_STARBOARD: Field = Field::new("to_starboard", 264, 270);
    pub const EPFD: Field = Field::new("epfd", 270, 274);
    pub const MONTH: Field = Field::new("month", 274, 278);
    pub const DAY: Field = Field::new("day", 278, 283);
    pub const HOUR: Field = Field::new("hour", 283, 288);
    pub const MINUTE: Field = Field::new("minute", 288, 294);
    pub const DRAUGHT: Field = Field::new("draught", 294, 302);
    pub const DESTINATION: Field = Field::new("destination", 302, 422);
    pub const DTE: Field = Field::new("dte", 422, 423);
}

mod aid {
    use crate::bits::Field;

    pub const AID_TYPE: Field = Field::new("aid_type", 38, 43);
    pub const NAME: Field = Field::new("name", 43, 163);
    pub const ACCURACY: Field = Field::new("accuracy", 163, 164);
    pub const LON: Field = Field::new("lon", 164, 192);
    pub const LAT: Field = Field::new("lat", 192, 219);
    pub const TO_BOW: Field = Field::new("to_bow", 219, 228);
    pub const TO_STERN: Field = Field::new("to_stern", 228, 237);
    pub const TO_PORT: Field = Field::new("to_port", 237, 243);
    pub const TO_STARBOARD: Field = Field::new("to_starboard", 243, 249);
    pub const EPFD: Field = Field::new("epfd", 249, 253);
    pub const SECOND: Field = Field::new("second", 253, 259);
    pub const OFF_POSITION: Field = Field::new("off_position", 259, 260);
    pub const REGIONAL: Field = Field::new("regional", 260, 268);
    pub const RAIM: Field = Field::new("raim", 268, 269);
    pub const VIRTUAL: Field = Field::new("virtual_aid", 269, 270);
    pub const ASSIGNED: Field = Field::new("assigned", 270, 271);
    /// Start of the optional name extension (up to 14 more characters).
    pub const NAME_EXT_START: usize = 272;
}

mod static_data {
    use crate::bits::Field;

    pub const PART: Field = Field::new("partno", 38, 40);
    pub const NAME: Field = Field::new("shipname", 40, 160);
    pub const SHIPTYPE: Field = Field::new("shiptype", 40, 48);
    pub const VENDOR: Field = Field::new("vendorid", 48, 66);
    pub const MODEL: Field = Field::new("model", 66, 70);
    pub const SERIAL: Field = Field::new("serial", 70, 90);
    pub const CALLSIGN: Field = Field::new("callsign", 90, 132);
    pub const TO_BOW: Field = Field::new("to_bow", 132, 141);
    pub const TO_STERN: Field = Field::new("to_stern", 141, 150);
    pub const TO_PORT: Field = Field::new("to_port", 150, 156);
    pub const TO_STARBOARD: Field = Field::new("to_starboard", 156, 162);
    pub const MOTHERSHIP: Field = Field::new("mothership_mmsi", 132, 162);
}

// ---------------------------------------------------------------------------
// Type 5
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticVoyageData {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub ais_version: u8,
    /// IMO ship number; `None` when zero.
    pub imo: Option<u32>,
    pub callsign: String,
    pub shipname: String,
    pub shiptype: ShipType,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    /// ETA components, raw. Month/day 0, hour 24 and minute 60 mean not available.
    pub eta_month: u8,
    pub eta_day: u8,
    pub eta_hour: u8,
    pub eta_minute: u8,
    /// Metres.
    pub draught: f64,
    pub destination: String,
    /// Data terminal not ready.
    pub dte: bool,
}

pub fn decode_static_voyage_data(msg: &EncodedMessage) -> Result<StaticVoyageData> {
    msg.expect_type(MessageType::StaticVoyageData)?;

    let imo = msg.uint(static_voyage::IMO)? as u32;

    Ok(StaticVoyageData {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        ais_version: msg.uint(static_voyage::AIS_VERSION)? as u8,
        imo: (imo != 0).then_some(imo),
        callsign: msg.text(static_voyage::CALLSIGN)?,
        shipname: msg.text(static_voyage::NAME)?,
        shiptype: ShipType(msg.uint(static_voyage::SHIPTYPE)? as u8),
        dimensions: dimensions(
            msg,
            static_voyage::TO_BOW,
            static_voyage::TO_STERN,
            static_voyage::TO_PORT,
            static_voyage::TO_STARBOARD,
        )?,
        epfd: EpfdType::from_code(msg.uint(static_voyage::EPFD)?),
        eta_month: msg.uint(static_voyage::MONTH)? as u8,
        eta_day: msg.uint(static_voyage::DAY)? as u8,
        eta_hour: msg.uint(static_voyage::HOUR)? as u8,
        eta_minute: msg.uint(static_voyage::MINUTE)? as u8,
        draught: msg.scaled(static_voyage::DRAUGHT, 10.0)?,
        destination: msg.text(static_voyage::DESTINATION)?,
        dte: msg.flag(static_voyage::DTE)?,
    })
}

// ---------------------------------------------------------------------------
// Type 21
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AidToNavigation {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub aid_type: AidType,
    pub name: String,
    /// Characters beyond the first 20, if the message carries them.
    pub name_extension: Option<String>,
    pub accuracy: bool,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    pub second: u8,
    pub off_position: bool,
    pub regional: u8,
    pub raim: bool,
    pub virtual_aid: bool,
    pub assigned: bool,
}

impl AidToNavigation {
    pub fn full_name(&self) -> String {
        match &self.name_extension {
            Some(ext) => format!("{}{}", self.name, ext),
            None => self.name.clone(),
        }
    }
}

pub fn decode_aid_to_navigation(msg: &EncodedMessage) -> Result<AidToNavigation> {
    msg.expect_type(MessageType::AidToNavigation)?;

    let name_extension = if msg.bit_len() >= aid::NAME_EXT_START + 6 {
        let ext = msg.text(msg.rest("name_extension", aid::NAME_EXT_START))?;
        (!ext.is_empty()).then_some(ext)
    } else {
        None
    };

    Ok(AidToNavigation {
        repeat: msg.repeat()?,
        mmsi: msg.source_mmsi()?,
        aid_type: AidType(msg.uint(aid::AID_TYPE)? as u8),
        name: msg.text(aid::NAME)?,
        name_extension,
        accuracy: msg.flag(aid::ACCURACY)?,
        lon: longitude(msg, aid::LON, 600_000.0)?,
        lat: latitude(msg, aid::LAT, 600_000.0)?,
        dimensions: dimensions(
            msg,
            aid::TO_BOW,
            aid::TO_STERN,
            aid::TO_PORT,
            aid::TO_STARBOARD,
        )?,
        epfd: EpfdType::from_code(msg.uint(aid::EPFD)?),
        second: msg.uint(aid::SECOND)? as u8,
        off_position: msg.flag(aid::OFF_POSITION)?,
        regional: msg.uint(aid::REGIONAL)? as u8,
        raim: msg.flag(aid::RAIM)?,
        virtual_aid: msg.flag(aid::VIRTUAL)?,
        assigned: msg.flag(aid::ASSIGNED)?,
    })
}

// ---------------------------------------------------------------------------
// Type 24
// ---------------------------------------------------------------------------

/// Part B ends either with hull dimensions or, for craft associated with a
/// parent ship, the parent's MMSI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PartBReference {
    Dimensions(Dimensions),
    Mothership(Mmsi),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StaticDataPart {
    A {
        shipname: String,
    },
    B {
        shiptype: ShipType,
        vendor_id: String,
        model: u8,
        serial: u32,
        callsign: String,
        reference: PartBReference,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticDataReport {
    pub repeat: u8,
    pub mmsi: Mmsi,
    pub part: StaticDataPart,
}

impl StaticDataReport {
    pub fn part_number(&self) -> u8 {
        match self.part {
            StaticDataPart::A { .. } => 0,
            StaticDataPart::B { .. } => 1,
        }
    }
}

pub fn decode_static_data_report(msg: &EncodedMessage) -> Result<StaticDataReport> {
    msg.expect_type(MessageType::StaticDataReport)?;

    let mmsi = msg.source_mmsi()?;
    let part = match msg.uint(static_data::PART)? {
        0 => StaticDataPart::A {
            shipname: msg.text(static_data::NAME)?,
        },
        1 => {
            let reference = if mmsi.is_auxiliary_craft() {
                PartBReference::Mothership(msg.mmsi(static_data::MOTHERSHIP)?)
            } else {
                PartBReference::Dimensions(dimensions(
                    msg,
                    static_data::TO_BOW,
                    static_data::TO_STERN,
                    static_data::TO_PORT,
                    static_data::TO_STARBOARD,
                )?)
            };
            StaticDataPart::B {
                shiptype: ShipType(msg.uint(static_data::SHIPTYPE)? as u8),
                vendor_id: msg.text(static_data::VENDOR)?,
                model: msg.uint(static_data::MODEL)? as u8,
                serial: msg.uint(static_data::SERIAL)? as u32,
                callsign: msg.text(static_data::CALLSIGN)?,
                reference,
            }
        }
        other => {
            return Err(AisError::InvalidField {
                field: static_data::PART.name,
                value: other,
            })
        }
    };

    Ok(StaticDataReport {
        repeat: msg.repeat()?,
        mmsi,
        part,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Writer;

    #[test]
    fn test_static_voyage_known_vector() {
        let payload = "55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp888888888880";
        let msg = EncodedMessage::from_payload(payload, 2);
        assert_eq!(msg.bit_len(), 424);

        let r = decode_static_voyage_data(&msg).unwrap();
        assert_eq!(r.mmsi.value(), 351759000);
        assert_eq!(r.ais_version, 0);
        assert_eq!(r.imo, Some(9134270));
        assert_eq!(r.callsign, "3FOF8");
        assert_eq!(r.shipname, "EVER DIADEM");
        assert_eq!(r.shiptype, ShipType(70));
        assert_eq!(
            r.dimensions,
            Dimensions {
                to_bow: 225,
                to_stern: 70,
                to_port: 1,
                to_starboard: 31
            }
        );
        assert_eq!(r.epfd, EpfdType::Gps);
        assert_eq!((r.eta_month, r.eta_day, r.eta_hour, r.eta_minute), (5, 15, 14, 0));
        assert!((r.draught - 12.2).abs() < 1e-9);
        assert_eq!(r.destination, "NEW YORK");
        assert!(!r.dte);
    }

    #[test]
    fn test_static_voyage_first_fragment_only_is_truncated() {
        let msg = EncodedMessage::from_payload(
            "55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp8",
            0,
        );
        assert!(matches!(
            decode_static_voyage_data(&msg),
            Err(AisError::BitRange {
                field: "destination",
                ..
            })
        ));
    }

    #[test]
    fn test_aid_to_navigation_known_vector() {
        let msg =
            EncodedMessage::from_payload("E>jCfrv2`0c2h0W:0a2ah@@@@@@004WD>;2<H50hppN000", 4);
        assert_eq!(msg.bit_len(), 272);

        let r = decode_aid_to_navigation(&msg).unwrap();
        assert_eq!(r.mmsi.value(), 992276203);
        assert_eq!(r.aid_type, AidType(28));
        assert_eq!(r.name, "EPAVE ANTARES");
        assert_eq!(r.name_extension, None);
        assert_eq!(r.full_name(), "EPAVE ANTARES");
        assert!(!r.accuracy);
        assert!((r.lon.unwrap() - 0.0315).abs() < 1e-6);
        assert!((r.lat.unwrap() - 49.536165).abs() < 1e-6);
        assert_eq!(r.dimensions.length(), 11);
        assert_eq!(r.dimensions.beam(), 14);
        assert_eq!(r.epfd, EpfdType::Undefined);
        assert_eq!(r.second, 60);
        assert!(!r.off_position);
        assert!(!r.virtual_aid);
    }

    #[test]
    fn test_aid_to_navigation_name_extension() {
        let msg = Writer::header(21, 0, 993672087)
            .u(1, 5)
            .text("SOUTHAMPTON CONTAINE", 20)
            .pad_to(272)
            .text("R TERMINAL", 10)
            .message();
        let r = decode_aid_to_navigation(&msg).unwrap();
        assert_eq!(r.name_extension.as_deref(), Some("R TERMINAL"));
        assert_eq!(r.full_name(), "SOUTHAMPTON CONTAINER TERMINAL");
    }

    #[test]
    fn test_static_data_part_a() {
        let msg = EncodedMessage::from_payload("H42O55i18tMET00000000000000", 2);
        assert_eq!(msg.bit_len(), 160);
        let r = decode_static_data_report(&msg).unwrap();
        assert_eq!(r.mmsi.value(), 271041815);
        assert_eq!(r.part_number(), 0);
        assert_eq!(
            r.part,
            StaticDataPart::A {
                shipname: "PROGUY".into()
            }
        );
    }

    #[test]
    fn test_static_data_part_b() {
        let msg = EncodedMessage::from_payload("H42O55lti4hhhilD3nink000?050", 0);
        let r = decode_static_data_report(&msg).unwrap();
        assert_eq!(r.part_number(), 1);
        match r.part {
            StaticDataPart::B {
                shiptype,
                vendor_id,
                model,
                serial,
                callsign,
                reference,
            } => {
                assert_eq!(shiptype, ShipType(60));
                assert_eq!(vendor_id, "1D0");
                assert_eq!(model, 12);
                assert_eq!(serial, 199796);
                assert_eq!(callsign, "TC6163");
                assert_eq!(
                    reference,
                    PartBReference::Dimensions(Dimensions {
                        to_bow: 0,
                        to_stern: 15,
                        to_port: 0,
                        to_starboard: 5
                    })
                );
            }
            other => panic!("expected part B, got {other:?}"),
        }
    }

    #[test]
    fn test_static_data_part_b_auxiliary_craft() {
        let msg = Writer::header(24, 0, 982_310_001)
            .u(1, 2)
            .u(52, 8)
            .text("ABC", 3)
            .u(1, 4)
            .u(7, 20)
            .text("TUG1", 7)
            .u(310_123_456, 30)
            .pad_to(168)
            .message();
        let r = decode_static_data_report(&msg).unwrap();
        match r.part {
            StaticDataPart::B { reference, .. } => {
                assert_eq!(
                    reference,
                    PartBReference::Mothership(Mmsi::from_bits(310_123_456).unwrap())
                );
            }
            other => panic!("expected part B, got {other:?}"),
        }
    }

    #[test]
    fn test_static_data_reserved_part() {
        let msg = Writer::header(24, 0, 271041815).u(2, 2).pad_to(168).message();
        assert!(matches!(
            decode_static_data_report(&msg),
            Err(AisError::InvalidField {
                field: "partno",
                value: 2
            })
        ));
    }
}
