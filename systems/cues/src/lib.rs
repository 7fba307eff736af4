#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cue scheduler that turns world events into timed audio cue dispatches.
//!
//! Every accepted mode carries a fixed track of cues measured from the instant
//! the mode started. The scheduler anchors the track at that instant and
//! releases each cue to the [`CueSink`] on the first tick at or after its due
//! time. Scheduled cues are never cancelled.

use std::time::Duration;

use squirm_core::{timing::cue_track, Cue, CueSink, Event};
use tracing::trace;

pub mod voice;

pub use voice::{SampleSink, UnknownVoice, VoiceGender, VoicedSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    due: Duration,
    sequence: u64,
    cue: Cue,
}

/// Pure system that dispatches mode cue tracks as simulation time advances.
#[derive(Debug, Default)]
pub struct CueScheduler {
    now: Duration,
    next_sequence: u64,
    pending: Vec<Pending>,
}

impl CueScheduler {
    /// Creates a scheduler with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events, scheduling new tracks and releasing due cues.
    pub fn handle<S>(&mut self, events: &[Event], sink: &mut S)
    where
        S: CueSink + ?Sized,
    {
        for event in events {
            match event {
                Event::ModeStarted {
                    mode,
                    stature,
                    started_at,
                    ..
                } => {
                    for mark in cue_track(*mode, *stature) {
                        self.schedule(mark.cue(), started_at.saturating_add(mark.offset()));
                    }
                }
                Event::RuneFound { .. } => self.schedule(Cue::RuneFound, self.now),
                Event::TimeAdvanced { now, .. } => {
                    self.now = *now;
                    self.release(sink);
                }
                _ => {}
            }
        }
        self.release(sink);
    }

    /// Queues a cue to fire once simulation time reaches `due`.
    ///
    /// Cues sharing a due time fire in the order they were scheduled.
    pub fn schedule(&mut self, cue: Cue, due: Duration) {
        let entry = Pending {
            due,
            sequence: self.next_sequence,
            cue,
        };
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let index = self
            .pending
            .partition_point(|pending| (pending.due, pending.sequence) <= (due, entry.sequence));
        self.pending.insert(index, entry);
    }

    /// Number of cues waiting for their due time.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the next cue, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.first().map(|pending| pending.due)
    }

    fn release<S>(&mut self, sink: &mut S)
    where
        S: CueSink + ?Sized,
    {
        let now = self.now;
        let ready = self.pending.partition_point(|pending| pending.due <= now);
        for pending in self.pending.drain(..ready) {
            trace!(cue = pending.cue.name(), due_ms = pending.due.as_millis() as u64, "cue released");
            sink.play_cue(pending.cue);
        }
    }
}
