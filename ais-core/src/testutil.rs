//! Payload builder for tests: writes fields MSB-first and armors the result.

use crate::bits::BitBuffer;
use crate::encoded::EncodedMessage;
use crate::sentence::checksum;

/// Map a text character to its 6-bit ITU value.
fn sixbit_of(c: char) -> u64 {
    match c {
        '@'..='_' => c as u64 - 64,
        ' '..='?' => c as u64,
        _ => 0,
    }
}

fn armor_char(value: u8) -> char {
    let c = value + 48;
    if c > b'W' {
        (c + 8) as char
    } else {
        c as char
    }
}

#[derive(Debug, Default, Clone)]
pub struct Writer {
    bits: BitBuffer,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    /// Type, repeat indicator and source MMSI.
    pub fn header(msg_type: u64, repeat: u64, mmsi: u64) -> Self {
        Writer::new().u(msg_type, 6).u(repeat, 2).u(mmsi, 30)
    }

    pub fn u(mut self, value: u64, width: usize) -> Self {
        self.bits.push_bits(value, width);
        self
    }

    pub fn i(mut self, value: i64, width: usize) -> Self {
        let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
        self.bits.push_bits(value as u64 & mask, width);
        self
    }

    pub fn flag(self, value: bool) -> Self {
        self.u(value as u64, 1)
    }

    /// Text padded with `@` to `chars` characters.
    pub fn text(mut self, s: &str, chars: usize) -> Self {
        let mut n = 0;
        for c in s.chars().take(chars) {
            self.bits.push_bits(sixbit_of(c), 6);
            n += 1;
        }
        for _ in n..chars {
            self.bits.push_bits(0, 6);
        }
        self
    }

    /// Zero bits up to an absolute offset.
    pub fn pad_to(self, offset: usize) -> Self {
        let len = self.bits.len();
        assert!(offset >= len, "pad_to {offset} behind cursor {len}");
        let mut w = self;
        for _ in len..offset {
            w.bits.push_bit(false);
        }
        w
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn message(self) -> EncodedMessage {
        EncodedMessage::from_bits(self.bits)
    }

    /// Armored payload and fill bit count.
    pub fn armor(&self) -> (String, u8) {
        let fill = (6 - self.bits.len() % 6) % 6;
        let mut padded = self.bits.clone();
        padded.push_bits(0, fill);
        let mut payload = String::new();
        for chunk in 0..padded.len() / 6 {
            let field = crate::bits::Field::new("chunk", chunk * 6, chunk * 6 + 6);
            let value = crate::bits::unsigned(&padded, field).unwrap_or(0) as u8;
            payload.push(armor_char(value));
        }
        (payload, fill as u8)
    }

    /// Single-part `!AIVDM` line with a correct checksum.
    pub fn sentence(&self) -> String {
        let (payload, fill) = self.armor();
        nmea_line(1, 1, None, &payload, fill)
    }
}

/// Build a `!AIVDM` line with a correct checksum.
pub fn nmea_line(count: u8, number: u8, seq: Option<u8>, payload: &str, fill: u8) -> String {
    let seq = seq.map(|s| s.to_string()).unwrap_or_default();
    let body = format!("AIVDM,{count},{number},{seq},A,{payload},{fill}");
    format!("!{body}*{:02X}", checksum(&body))
}
