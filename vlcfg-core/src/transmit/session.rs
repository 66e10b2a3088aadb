//! Transmission session
//!
//! Pure bit scheduling for one light sequence. `step` only looks at the
//! session and the time it is given, which keeps the timing testable
//! without a real clock.

use vlcfg_protocol::LightSequence;

use crate::config::TransmitterConfig;

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionStep {
    /// Next bit is not due yet
    Wait,
    /// A bit was committed
    Commit {
        /// Lamp level for the committed bit
        level: bool,
        /// Fraction of the sequence sent before this bit
        progress: f32,
    },
    /// The final bit was committed
    Finished {
        /// Lamp level for the final bit
        level: bool,
    },
}

/// One light sequence in flight
#[derive(Debug, Clone)]
pub struct TransmissionSession {
    sequence: LightSequence,
    cursor: usize,
    next_bit_ms: u64,
    bit_period_ms: u32,
}

impl TransmissionSession {
    /// Start a session at `now_ms`; the first bit is due after the lead-in
    pub fn new(sequence: LightSequence, now_ms: u64, config: &TransmitterConfig) -> Self {
        Self {
            sequence,
            cursor: 0,
            next_bit_ms: now_ms + config.lead_in_ms as u64,
            bit_period_ms: config.bit_period_ms,
        }
    }

    /// Commit at most one bit if it is due
    ///
    /// A late call only delays the sequence; missed periods are never
    /// caught up by committing several bits at once.
    pub fn step(&mut self, now_ms: u64) -> SessionStep {
        if now_ms < self.next_bit_ms {
            return SessionStep::Wait;
        }

        let len = self.sequence.len();
        let Some(command) = self.sequence.get(self.cursor).copied() else {
            return SessionStep::Finished { level: false };
        };

        let progress = self.cursor as f32 / len as f32;
        self.next_bit_ms += self.bit_period_ms as u64 * command.duration as u64;
        self.cursor += 1;

        if self.cursor >= len {
            SessionStep::Finished {
                level: command.level,
            }
        } else {
            SessionStep::Commit {
                level: command.level,
                progress,
            }
        }
    }

    /// Index of the next bit to commit
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total number of commands
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// True if the sequence holds no commands
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Time the next bit is due
    pub fn next_bit_ms(&self) -> u64 {
        self.next_bit_ms
    }

    /// Sequence being sent
    pub fn sequence(&self) -> &LightSequence {
        &self.sequence
    }
}
