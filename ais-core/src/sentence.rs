//! Parse NMEA 0183 AIS sentences (`!AIVDM` / `!AIVDO`).
//!
//! Responsibilities:
//! - Strip framing: whitespace, CR/LF, optional NMEA 4.0 tag block
//! - Validate the XOR checksum before looking at any field
//! - Split into fragment count/number, sequence id, channel, payload, fill bits
//!
//! Lines failing either step are rejected whole; nothing is retried.

use crate::types::{AisError, Result};

/// Number of comma-separated fields in a VDM/VDO sentence body.
const FIELD_COUNT: usize = 7;

/// One parsed AIS sentence (a single fragment of a message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Two-letter talker, e.g. `AI`, `AB`, `BS`.
    pub talker: String,
    /// True for `VDO` (own ship), false for `VDM`.
    pub own_vessel: bool,
    /// Total fragments in the message (1 if single-part).
    pub fragment_count: u8,
    /// 1-based index of this fragment.
    pub fragment_number: u8,
    /// Sequential message id linking fragments of one message.
    pub sequence_id: Option<u8>,
    /// Radio channel (`A`, `B`, `1`, `2`) if given.
    pub channel: Option<char>,
    /// Armored payload characters.
    pub payload: String,
    /// Padding bits in the last payload character (0-5).
    pub fill_bits: u8,
    /// Checksum as transmitted (already verified).
    pub checksum: u8,
}

impl Sentence {
    pub fn is_multipart(&self) -> bool {
        self.fragment_count > 1
    }

    pub fn is_last_fragment(&self) -> bool {
        self.fragment_number == self.fragment_count
    }
}

/// XOR of all bytes of the sentence body (between `!`/`$` and `*`).
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

fn malformed(msg: impl Into<String>) -> AisError {
    AisError::MalformedSentence(msg.into())
}

/// Remove a leading `\tag:value,...*hh\` block if present.
fn strip_tag_block(line: &str) -> Result<&str> {
    match line.strip_prefix('\\') {
        Some(rest) => rest
            .split_once('\\')
            .map(|(_, sentence)| sentence)
            .ok_or_else(|| malformed("unterminated tag block")),
        None => Ok(line),
    }
}

fn parse_count(field: &str, name: &str) -> Result<u8> {
    if field.is_empty() {
        return Ok(1);
    }
    field
        .parse::<u8>()
        .map_err(|_| malformed(format!("non-numeric {name}: {field:?}")))
}

/// Parse and checksum-validate one line.
pub fn parse_sentence(line: &str) -> Result<Sentence> {
    let line = strip_tag_block(line.trim())?;

    let body_and_sum = line
        .strip_prefix('!')
        .or_else(|| line.strip_prefix('$'))
        .ok_or_else(|| malformed("missing '!' or '$' start delimiter"))?;

    let (body, sum) = body_and_sum
        .rsplit_once('*')
        .ok_or_else(|| malformed("missing '*' checksum delimiter"))?;

    if sum.len() != 2 {
        return Err(malformed(format!("checksum must be 2 hex digits: {sum:?}")));
    }
    let expected = u8::from_str_radix(sum, 16)
        .map_err(|_| malformed(format!("checksum is not hex: {sum:?}")))?;
    let computed = checksum(body);
    if expected != computed {
        return Err(AisError::Checksum { expected, computed });
    }

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let address = fields[0];
    if address.len() != 5 || !address.is_ascii() {
        return Err(malformed(format!("bad address field: {address:?}")));
    }
    let (talker, formatter) = address.split_at(2);
    let own_vessel = match formatter {
        "VDM" => false,
        "VDO" => true,
        other => return Err(malformed(format!("not an AIS sentence: {other}"))),
    };

    let fragment_count = parse_count(fields[1], "fragment count")?;
    let fragment_number = parse_count(fields[2], "fragment number")?;
    if fragment_count == 0 || fragment_number == 0 || fragment_number > fragment_count {
        return Err(malformed(format!(
            "fragment {fragment_number} of {fragment_count}"
        )));
    }

    let sequence_id = match fields[3] {
        "" => None,
        s => Some(
            s.parse::<u8>()
                .map_err(|_| malformed(format!("non-numeric sequence id: {s:?}")))?,
        ),
    };

    let mut channel_chars = fields[4].chars();
    let channel = channel_chars.next();
    if channel_chars.next().is_some() {
        return Err(malformed(format!("bad channel: {:?}", fields[4])));
    }

    let fill_bits = match fields[6] {
        "" => 0,
        s => s
            .parse::<u8>()
            .map_err(|_| malformed(format!("non-numeric fill bits: {s:?}")))?,
    };
    if fill_bits > 5 {
        return Err(malformed(format!("fill bits out of range: {fill_bits}")));
    }

    Ok(Sentence {
        talker: talker.to_string(),
        own_vessel,
        fragment_count,
        fragment_number,
        sequence_id,
        channel,
        payload: fields[5].to_string(),
        fill_bits,
        checksum: expected,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,0*34";
    const PART1: &str =
        "!AIVDM,2,1,1,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp8,0*1C";
    const PART2: &str = "!AIVDM,2,2,1,A,88888888880,2*25";

    #[test]
    fn test_parse_single_part() {
        let s = parse_sentence(SINGLE).unwrap();
        assert_eq!(s.talker, "AI");
        assert!(!s.own_vessel);
        assert_eq!(s.fragment_count, 1);
        assert_eq!(s.fragment_number, 1);
        assert_eq!(s.sequence_id, None);
        assert_eq!(s.channel, Some('A'));
        assert_eq!(s.payload, "13aEOK?P00PD2wVMdLDRcQv40PSh");
        assert_eq!(s.fill_bits, 0);
        assert_eq!(s.checksum, 0x34);
        assert!(!s.is_multipart());
    }

    #[test]
    fn test_parse_multipart() {
        let first = parse_sentence(PART1).unwrap();
        assert_eq!(first.fragment_count, 2);
        assert_eq!(first.fragment_number, 1);
        assert_eq!(first.sequence_id, Some(1));
        assert!(first.is_multipart());
        assert!(!first.is_last_fragment());

        let second = parse_sentence(PART2).unwrap();
        assert_eq!(second.fill_bits, 2);
        assert!(second.is_last_fragment());
    }

    #[test]
    fn test_checksum_value() {
        assert_eq!(checksum("AIVDM,2,2,1,A,88888888880,2"), 0x25);
    }

    #[test]
    fn test_checksum_mismatch() {
        let err = parse_sentence("!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,0*5C").unwrap_err();
        match err {
            AisError::Checksum { expected, computed } => {
                assert_eq!(expected, 0x5C);
                assert_eq!(computed, 0x34);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_flipped_payload_bit_fails_checksum() {
        // 'P' (0x50) -> 'Q' (0x51): one flipped bit, checksum untouched.
        let corrupted = SINGLE.replacen("40PSh", "40QSh", 1);
        assert!(matches!(
            parse_sentence(&corrupted),
            Err(AisError::Checksum { .. })
        ));
    }

    #[test]
    fn test_lowercase_checksum_accepted() {
        let line = "!AIVDM,1,1,,B,E>jCfrv2`0c2h0W:0a2ah@@@@@@004WD>;2<H50hppN000,4*0a";
        assert!(parse_sentence(line).is_ok());
    }

    #[test]
    fn test_crlf_and_whitespace() {
        let line = format!("  {SINGLE}\r\n");
        assert!(parse_sentence(&line).is_ok());
    }

    #[test]
    fn test_tag_block_stripped() {
        let line = format!("\\s:2573345,c:1671620143*0B\\{SINGLE}");
        let s = parse_sentence(&line).unwrap();
        assert_eq!(s.payload, "13aEOK?P00PD2wVMdLDRcQv40PSh");
        assert!(parse_sentence("\\s:2573345,c:1671620143*0B").is_err());
    }

    #[test]
    fn test_vdo_is_own_vessel() {
        let body = "AIVDO,1,1,,,13aEOK?P00PD2wVMdLDRcQv40PSh,0";
        let line = format!("!{body}*{:02X}", checksum(body));
        let s = parse_sentence(&line).unwrap();
        assert!(s.own_vessel);
        assert_eq!(s.channel, None);
    }

    #[test]
    fn test_defaults_for_empty_counts() {
        let body = "AIVDM,,,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,";
        let line = format!("!{body}*{:02X}", checksum(body));
        let s = parse_sentence(&line).unwrap();
        assert_eq!(s.fragment_count, 1);
        assert_eq!(s.fragment_number, 1);
        assert_eq!(s.fill_bits, 0);
    }

    fn with_checksum(body: &str) -> String {
        format!("!{body}*{:02X}", checksum(body))
    }

    #[test]
    fn test_malformed_sentences() {
        let cases = [
            "AIVDM,1,1,,A,13aEOK,0*00".to_string(),
            "!AIVDM,1,1,,A,13aEOK,0".to_string(),
            "!AIVDM,1,1,,A,13aEOK,0*3".to_string(),
            "!AIVDM,1,1,,A,13aEOK,0*ZZ".to_string(),
            with_checksum("AIVDM,1,1,,A,13aEOK"),
            with_checksum("AIVDM,1,1,,A,13aEOK,0,extra"),
            with_checksum("GPGGA,1,1,,A,13aEOK,0"),
            with_checksum("AIVDM,x,1,,A,13aEOK,0"),
            with_checksum("AIVDM,1,y,,A,13aEOK,0"),
            with_checksum("AIVDM,1,1,,A,13aEOK,z"),
            with_checksum("AIVDM,1,1,,A,13aEOK,6"),
            with_checksum("AIVDM,2,3,1,A,13aEOK,0"),
            with_checksum("AIVDM,0,0,,A,13aEOK,0"),
            with_checksum("AIVDM,2,1,q,A,13aEOK,0"),
            with_checksum("AIVDM,1,1,,AB,13aEOK,0"),
        ];
        for line in &cases {
            assert!(
                matches!(parse_sentence(line), Err(AisError::MalformedSentence(_))),
                "expected malformed: {line}"
            );
        }
    }

    #[test]
    fn test_dollar_start_accepted() {
        let line = with_checksum("AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,0").replacen('!', "$", 1);
        assert!(parse_sentence(&line).is_ok());
    }
}
