//! ais-core: Pure decode library for AIS messages carried in NMEA 0183.
//!
//! No async, no sockets: just parsing and bit layouts. The `ais-feeder`
//! binary supplies the lines (file, stdin or TCP) and prints the results.
//!
//! Pipeline: [`sentence`] → [`fragment`] → [`armor`] / [`encoded`] →
//! [`decode`], driven line by line by [`stream::NmeaDecoder`].

pub mod armor;
pub mod bits;
pub mod config;
pub mod decode;
pub mod encoded;
pub mod fragment;
pub mod sentence;
pub mod stream;
pub mod types;

#[cfg(test)]
mod testutil;

// Re-export commonly used types at crate root
pub use decode::{decode, DecodedMsg};
pub use encoded::EncodedMessage;
pub use fragment::{AssembledPayload, FragmentBuffer};
pub use sentence::{parse_sentence, Sentence};
pub use stream::{DecodeStats, MessageHandler, NmeaDecoder, StopSignal};
pub use types::*;
