//! Line-by-line decode pipeline.
//!
//! Each line is parsed, reassembled and dispatched before the next one is
//! read. Errors are per line: they are counted, reported to the handler and
//! logged, and the loop moves on. Cancellation is checked between lines only.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::decode::{decode, DecodedMsg};
use crate::encoded::EncodedMessage;
use crate::fragment::FragmentBuffer;
use crate::sentence::parse_sentence;
use crate::types::{AisError, Result};

// ---------------------------------------------------------------------------
// Handler and stop signal
// ---------------------------------------------------------------------------

/// Receives decoded messages, synchronously on the decoding thread.
pub trait MessageHandler {
    fn on_message(&mut self, msg: DecodedMsg);

    /// Called for each line that failed. The default ignores it.
    fn on_error(&mut self, line: &str, err: &AisError) {
        let _ = (line, err);
    }
}

impl<F> MessageHandler for F
where
    F: FnMut(DecodedMsg),
{
    fn on_message(&mut self, msg: DecodedMsg) {
        self(msg)
    }
}

/// Cooperative stop flag shared between the reader and whoever wants it to
/// finish (a Ctrl-C handler, another thread).
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        StopSignal::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    /// Non-blank lines seen.
    pub lines: u64,
    /// Messages delivered to the handler.
    pub decoded: u64,
    /// Failures by `AisError::kind()`.
    pub errors: BTreeMap<&'static str, u64>,
    /// Decoded messages by type code.
    pub by_type: BTreeMap<u8, u64>,
    /// Incomplete fragment sets replaced by a newer message.
    pub discarded_fragments: u64,
    /// Incomplete fragment sets still waiting.
    pub pending_fragments: usize,
}

impl DecodeStats {
    pub fn total_errors(&self) -> u64 {
        self.errors.values().sum()
    }

    pub fn error_count(&self, kind: &str) -> u64 {
        self.errors.get(kind).copied().unwrap_or(0)
    }

    fn record_error(&mut self, err: &AisError) {
        *self.errors.entry(err.kind()).or_insert(0) += 1;
    }

    fn record_message(&mut self, msg: &DecodedMsg) {
        self.decoded += 1;
        *self.by_type.entry(msg.message_type().code()).or_insert(0) += 1;
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decoder state for one input stream.
///
/// Streams must not share a decoder: the fragment buffer is keyed by
/// sequence id only, so interleaving two feeds would mix their fragments.
#[derive(Debug, Default)]
pub struct NmeaDecoder {
    fragments: FragmentBuffer,
    stats: DecodeStats,
}

impl NmeaDecoder {
    pub fn new() -> Self {
        NmeaDecoder::default()
    }

    /// Decode one line.
    ///
    /// Returns `Ok(None)` while a multi-part message is still collecting.
    /// The error, if any, is recorded in the statistics before returning.
    pub fn decode_line(&mut self, line: &str) -> Result<Option<DecodedMsg>> {
        self.stats.lines += 1;
        let result = self.decode_inner(line);

        self.stats.discarded_fragments = self.fragments.discarded();
        self.stats.pending_fragments = self.fragments.pending();
        match &result {
            Ok(Some(msg)) => self.stats.record_message(msg),
            Ok(None) => {}
            Err(err) => self.stats.record_error(err),
        }
        result
    }

    fn decode_inner(&mut self, line: &str) -> Result<Option<DecodedMsg>> {
        let sentence = parse_sentence(line)?;
        let Some(assembled) = self.fragments.push(sentence) else {
            return Ok(None);
        };
        let encoded = EncodedMessage::from_assembled(&assembled);
        decode(&encoded).map(Some)
    }

    /// Feed lines until they run out or `stop` is raised, calling `handler`
    /// for every decoded message. Blank lines are skipped.
    pub fn run<I, S, H>(&mut self, lines: I, stop: &StopSignal, handler: &mut H) -> &DecodeStats
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        H: MessageHandler + ?Sized,
    {
        for line in lines {
            if stop.is_stopped() {
                debug!("stop requested, leaving read loop");
                break;
            }

            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }

            match self.decode_line(line) {
                Ok(Some(msg)) => handler.on_message(msg),
                Ok(None) => {}
                Err(err) => {
                    warn!(kind = err.kind(), error = %err, line = line.trim(), "dropping line");
                    handler.on_error(line, &err);
                }
            }
        }
        &self.stats
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Forget incomplete fragments, e.g. after a reconnect.
    pub fn reset_fragments(&mut self) {
        self.fragments.clear();
        self.stats.pending_fragments = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{nmea_line, Writer};
    use crate::types::MessageType;
    use std::sync::Mutex;

    const POSITION: &str = "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,0*34";
    const VOYAGE_1: &str =
        "!AIVDM,2,1,1,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp8,0*1C";
    const VOYAGE_2: &str = "!AIVDM,2,2,1,A,88888888880,2*25";

    #[derive(Default)]
    struct Collect {
        messages: Vec<DecodedMsg>,
        errors: Vec<&'static str>,
    }

    impl MessageHandler for Collect {
        fn on_message(&mut self, msg: DecodedMsg) {
            self.messages.push(msg);
        }

        fn on_error(&mut self, _line: &str, err: &AisError) {
            self.errors.push(err.kind());
        }
    }

    #[test]
    fn test_end_to_end_position_report() {
        let mut decoder = NmeaDecoder::new();
        let msg = decoder.decode_line(POSITION).unwrap().unwrap();
        match msg {
            DecodedMsg::PositionReportScheduled(report) => {
                assert_eq!(report.mmsi.value(), 244670316);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(decoder.stats().decoded, 1);
        assert_eq!(decoder.stats().by_type.get(&1), Some(&1));
    }

    #[test]
    fn test_wrong_checksum_is_reported() {
        let mut decoder = NmeaDecoder::new();
        let line = "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,0*5C";
        assert!(matches!(
            decoder.decode_line(line),
            Err(AisError::Checksum {
                expected: 0x5C,
                computed: 0x34
            })
        ));
        assert_eq!(decoder.stats().error_count("checksum"), 1);
    }

    #[test]
    fn test_multipart_yields_single_emission() {
        let mut decoder = NmeaDecoder::new();
        let mut handler = Collect::default();
        decoder.run([VOYAGE_1, VOYAGE_2], &StopSignal::new(), &mut handler);
        assert_eq!(handler.messages.len(), 1);
        assert_eq!(
            handler.messages[0].message_type(),
            MessageType::StaticVoyageData
        );
        assert_eq!(handler.messages[0].mmsi().value(), 351759000);
        assert!(handler.errors.is_empty());
        assert_eq!(decoder.stats().pending_fragments, 0);
    }

    #[test]
    fn test_out_of_order_fragments_through_pipeline() {
        let mut decoder = NmeaDecoder::new();
        assert!(decoder.decode_line(VOYAGE_2).unwrap().is_none());
        let msg = decoder.decode_line(VOYAGE_1).unwrap().unwrap();
        assert_eq!(msg.mmsi().value(), 351759000);
    }

    #[test]
    fn test_bad_lines_do_not_stop_stream() {
        let truncated = Writer::header(1, 0, 244670316).pad_to(72).sentence();
        let unsupported = Writer::header(63, 0, 1).pad_to(168).sentence();
        let lines = vec![
            "garbage".to_string(),
            truncated,
            String::new(),
            unsupported,
            "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,0*5C".to_string(),
            POSITION.to_string(),
        ];

        let mut decoder = NmeaDecoder::new();
        let mut handler = Collect::default();
        let stats = decoder.run(&lines, &StopSignal::new(), &mut handler).clone();

        assert_eq!(handler.messages.len(), 1);
        assert_eq!(handler.messages[0].mmsi().value(), 244670316);
        assert_eq!(
            handler.errors,
            vec!["malformed", "range", "unsupported", "checksum"]
        );
        assert_eq!(stats.lines, 5);
        assert_eq!(stats.decoded, 1);
        assert_eq!(stats.total_errors(), 4);
    }

    #[test]
    fn test_bad_fragment_does_not_disturb_other_ids() {
        let corrupt = nmea_line(2, 1, Some(2), "5#", 0);
        let mut decoder = NmeaDecoder::new();
        let mut handler = Collect::default();
        decoder.run(
            [VOYAGE_1, corrupt.as_str(), VOYAGE_2],
            &StopSignal::new(),
            &mut handler,
        );
        assert_eq!(handler.messages.len(), 1);
        assert_eq!(decoder.stats().pending_fragments, 1);
    }

    #[test]
    fn test_stop_signal_checked_between_lines() {
        let stop = StopSignal::new();
        let mut seen = 0;
        let mut handler = |_msg: DecodedMsg| {
            seen += 1;
            stop.request_stop();
        };
        let mut decoder = NmeaDecoder::new();
        decoder.run([POSITION, POSITION, POSITION], &stop, &mut handler);
        assert_eq!(seen, 1);
        assert_eq!(decoder.stats().lines, 1);
    }

    #[test]
    fn test_stop_before_start_reads_nothing() {
        let stop = StopSignal::new();
        stop.request_stop();
        let mut decoder = NmeaDecoder::new();
        let mut count = 0;
        decoder.run([POSITION], &stop, &mut |_msg: DecodedMsg| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_reset_fragments() {
        let mut decoder = NmeaDecoder::new();
        decoder.decode_line(VOYAGE_1).unwrap();
        assert_eq!(decoder.stats().pending_fragments, 1);
        decoder.reset_fragments();
        assert_eq!(decoder.stats().pending_fragments, 0);
        assert!(decoder.decode_line(VOYAGE_2).unwrap().is_none());
    }

    #[test]
    fn test_shared_decoder_under_lock() {
        let decoder = Arc::new(Mutex::new(NmeaDecoder::new()));
        let handles: Vec<_> = [VOYAGE_1, VOYAGE_2]
            .into_iter()
            .map(|line| {
                let decoder = Arc::clone(&decoder);
                std::thread::spawn(move || {
                    let mut guard = decoder.lock().unwrap();
                    guard.decode_line(line).unwrap().is_some()
                })
            })
            .collect();
        let emitted: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(emitted, 1);
        assert_eq!(decoder.lock().unwrap().stats().decoded, 1);
    }

    #[test]
    fn test_stats_serialize() {
        let mut decoder = NmeaDecoder::new();
        decoder.decode_line(POSITION).unwrap();
        let json = serde_json::to_value(decoder.stats()).unwrap();
        assert_eq!(json["decoded"], 1);
        assert_eq!(json["by_type"]["1"], 1);
    }
}
