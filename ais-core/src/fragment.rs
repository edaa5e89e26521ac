//! Multi-sentence payload reassembly.
//!
//! Fragments are grouped by sequential message id and slotted by fragment
//! number, so out-of-order arrival still concatenates in index order. An
//! entry leaves the buffer the moment it completes.
//!
//! There are no timers. A fragment that collides with an incomplete entry
//! (its slot is already filled, or it declares a different fragment count)
//! is taken as the start of a new message: the old entry is dropped and a
//! fresh one begins. Sequence ids are a small cycling range, so stale
//! entries are recycled this way.

use std::collections::HashMap;

use tracing::debug;

use crate::sentence::Sentence;

/// A complete armored payload, merged from one or more sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPayload {
    pub payload: String,
    /// Fill bits of the final fragment.
    pub fill_bits: u8,
    pub fragments: u8,
    pub channel: Option<char>,
    pub own_vessel: bool,
}

impl AssembledPayload {
    fn single(sentence: Sentence) -> Self {
        AssembledPayload {
            payload: sentence.payload,
            fill_bits: sentence.fill_bits,
            fragments: 1,
            channel: sentence.channel,
            own_vessel: sentence.own_vessel,
        }
    }
}

/// Fragments collected so far for one sequence id.
#[derive(Debug)]
struct PendingMessage {
    total: u8,
    received: u8,
    slots: Vec<Option<Sentence>>,
}

impl PendingMessage {
    fn new(total: u8) -> Self {
        PendingMessage {
            total,
            received: 0,
            slots: vec![None; total as usize],
        }
    }

    fn is_complete(&self) -> bool {
        self.received == self.total
    }

    fn assemble(self) -> AssembledPayload {
        let fragments = self.total;
        let mut payload = String::new();
        let mut fill_bits = 0;
        let mut channel = None;
        let mut own_vessel = false;

        for sentence in self.slots.into_iter().flatten() {
            if channel.is_none() {
                channel = sentence.channel;
            }
            own_vessel |= sentence.own_vessel;
            payload.push_str(&sentence.payload);
            fill_bits = sentence.fill_bits;
        }

        AssembledPayload {
            payload,
            fill_bits,
            fragments,
            channel,
            own_vessel,
        }
    }
}

// ---------------------------------------------------------------------------
// FragmentBuffer
// ---------------------------------------------------------------------------

/// Per-stream reassembly state, keyed by sequential message id.
#[derive(Debug, Default)]
pub struct FragmentBuffer {
    pending: HashMap<Option<u8>, PendingMessage>,
    discarded: u64,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        FragmentBuffer::default()
    }

    /// Add one sentence. Returns the merged payload once every fragment of
    /// its message is present; single-part sentences pass straight through.
    pub fn push(&mut self, sentence: Sentence) -> Option<AssembledPayload> {
        if !sentence.is_multipart() {
            return Some(AssembledPayload::single(sentence));
        }

        if sentence.fragment_number == 0 || sentence.fragment_number > sentence.fragment_count {
            debug!(
                number = sentence.fragment_number,
                count = sentence.fragment_count,
                "ignoring fragment outside its declared count"
            );
            return None;
        }

        let key = sentence.sequence_id;
        let slot = (sentence.fragment_number - 1) as usize;

        let conflict = self.pending.get(&key).is_some_and(|entry| {
            entry.total != sentence.fragment_count || entry.slots[slot].is_some()
        });
        if conflict {
            if let Some(old) = self.pending.remove(&key) {
                self.discarded += 1;
                debug!(
                    sequence_id = ?key,
                    received = old.received,
                    total = old.total,
                    "discarding incomplete fragment set"
                );
            }
        }

        let entry = self
            .pending
            .entry(key)
            .or_insert_with(|| PendingMessage::new(sentence.fragment_count));
        entry.slots[slot] = Some(sentence);
        entry.received += 1;

        if !entry.is_complete() {
            return None;
        }
        self.pending.remove(&key).map(PendingMessage::assemble)
    }

    /// Number of incomplete messages held.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Incomplete messages dropped so far because a newer one took their id.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
