//! Frame synchronization: preamble and delimiter detection.
//!
//! Watches the raw byte stream with no delay and opens a capture window
//! once `PREAMBLE_LEN` preamble bytes followed by the delimiter have been
//! seen:
//! - `Idle`: hunting for the first preamble byte
//! - `Preamble(n)`: `n` consecutive preamble bytes seen
//! - `Sfd`: full preamble seen, expecting the delimiter
//! - `Capturing`: window open until the capture stage reports the end
//! - `Done`: window closed, back to `Idle` on the next tick
//!
//! Any byte that breaks the sequence sends the machine back to `Idle`
//! without partial credit. False starts are normal on a continuous stream
//! and are not reported as errors.
//!
//! # Example
//!
//! ```
//! use linkframe::protocol::{ByteEvent, FrameSync};
//!
//! let mut sync = FrameSync::new(0x55, 0xD5);
//! for _ in 0..7 {
//!     sync.tick(ByteEvent::valid(0x55), false);
//! }
//! let out = sync.tick(ByteEvent::valid(0xD5), false);
//! assert!(out.sync_found);
//! assert!(!out.capturing);
//! assert!(sync.tick(ByteEvent::idle(), false).capturing);
//! ```

use super::wire_format::{ByteEvent, PREAMBLE_LEN};

/// State of the synchronization machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Hunting for the first preamble byte.
    #[default]
    Idle,
    /// Count of consecutive preamble bytes seen (1..=6).
    Preamble(u8),
    /// Full preamble seen; expecting the delimiter.
    Sfd,
    /// Capture window open.
    Capturing,
    /// Capture window closed this tick.
    Done,
}

/// Outputs of one frame sync tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOutput {
    /// One-tick pulse on the tick the delimiter is accepted.
    pub sync_found: bool,
    /// Capture window level, driven by the state held at the start of the tick.
    pub capturing: bool,
    /// One-tick pulse when the watchdog closes a window.
    pub timed_out: bool,
    /// A partial preamble was abandoned this tick.
    pub false_start: bool,
}

/// Preamble/delimiter detector.
#[derive(Debug, Clone)]
pub struct FrameSync {
    preamble: u8,
    delimiter: u8,
    watchdog: Option<u32>,
    state: FrameState,
    /// Ticks spent in `Capturing` (watchdog only).
    window_ticks: u32,
}

impl FrameSync {
    /// Create a detector for the given preamble and delimiter bytes.
    pub fn new(preamble: u8, delimiter: u8) -> Self {
        Self {
            preamble,
            delimiter,
            watchdog: None,
            state: FrameState::Idle,
            window_ticks: 0,
        }
    }

    /// Create a detector that abandons a capture window after `ticks` ticks.
    pub fn with_watchdog(preamble: u8, delimiter: u8, ticks: Option<u32>) -> Self {
        Self {
            watchdog: ticks,
            ..Self::new(preamble, delimiter)
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Whether the capture window is currently open.
    #[inline]
    pub fn capturing(&self) -> bool {
        self.state == FrameState::Capturing
    }

    /// Advance one tick.
    ///
    /// `capture_ended` is the capture stage's end-of-frame signal from the
    /// previous tick.
    pub fn tick(&mut self, event: ByteEvent, capture_ended: bool) -> SyncOutput {
        let mut out = SyncOutput {
            capturing: self.capturing(),
            ..SyncOutput::default()
        };

        self.state = match self.state {
            FrameState::Idle => {
                if event.is(self.preamble) {
                    FrameState::Preamble(1)
                } else {
                    FrameState::Idle
                }
            }

            FrameState::Preamble(count) => match event.byte() {
                None => FrameState::Preamble(count),
                Some(b) if b == self.preamble => {
                    if count == PREAMBLE_LEN - 1 {
                        FrameState::Sfd
                    } else {
                        FrameState::Preamble(count + 1)
                    }
                }
                Some(b) => {
                    tracing::trace!(count, byte = b, "preamble broken");
                    out.false_start = true;
                    FrameState::Idle
                }
            },

            FrameState::Sfd => match event.byte() {
                None => FrameState::Sfd,
                Some(b) if b == self.delimiter => {
                    tracing::debug!("start-of-frame delimiter accepted");
                    out.sync_found = true;
                    self.window_ticks = 0;
                    FrameState::Capturing
                }
                // An extra preamble byte starts a fresh preamble.
                Some(b) if b == self.preamble => {
                    tracing::trace!("preamble overrun, restarting");
                    out.false_start = true;
                    FrameState::Preamble(1)
                }
                Some(b) => {
                    tracing::trace!(byte = b, "expected delimiter");
                    out.false_start = true;
                    FrameState::Idle
                }
            },

            FrameState::Capturing => {
                if capture_ended {
                    FrameState::Done
                } else {
                    self.window_ticks = self.window_ticks.saturating_add(1);
                    match self.watchdog {
                        Some(limit) if self.window_ticks >= limit => {
                            tracing::warn!(limit, "capture window timed out");
                            out.timed_out = true;
                            FrameState::Idle
                        }
                        _ => FrameState::Capturing,
                    }
                }
            }

            FrameState::Done => FrameState::Idle,
        };

        out
    }

    /// Return to `Idle`.
    pub fn reset(&mut self) {
        self.state = FrameState::Idle;
        self.window_ticks = 0;
    }

    /// Get the current state name for debugging.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            FrameState::Idle => "Idle",
            FrameState::Preamble(_) => "Preamble",
            FrameState::Sfd => "Sfd",
            FrameState::Capturing => "Capturing",
            FrameState::Done => "Done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DEFAULT_DELIMITER, DEFAULT_PREAMBLE};

    fn sync() -> FrameSync {
        FrameSync::new(DEFAULT_PREAMBLE, DEFAULT_DELIMITER)
    }

    /// Feed bytes and collect every output.
    fn feed(sync: &mut FrameSync, bytes: &[u8]) -> Vec<SyncOutput> {
        bytes
            .iter()
            .map(|&b| sync.tick(ByteEvent::valid(b), false))
            .collect()
    }

    fn preamble(n: usize) -> Vec<u8> {
        vec![DEFAULT_PREAMBLE; n]
    }

    #[test]
    fn test_starts_idle() {
        let sync = sync();
        assert_eq!(sync.state(), FrameState::Idle);
        assert!(!sync.capturing());
    }

    #[test]
    fn test_preamble_counts_up() {
        let mut sync = sync();

        feed(&mut sync, &preamble(1));
        assert_eq!(sync.state(), FrameState::Preamble(1));

        feed(&mut sync, &preamble(5));
        assert_eq!(sync.state(), FrameState::Preamble(6));

        feed(&mut sync, &preamble(1));
        assert_eq!(sync.state(), FrameState::Sfd);
    }

    #[test]
    fn test_sync_found_pulses_once() {
        let mut sync = sync();
        let mut bytes = preamble(7);
        bytes.push(DEFAULT_DELIMITER);

        let outputs = feed(&mut sync, &bytes);
        let pulses: Vec<usize> = outputs
            .iter()
            .enumerate()
            .filter(|(_, o)| o.sync_found)
            .map(|(i, _)| i)
            .collect();

        assert_eq!(pulses, vec![7]);
        assert!(outputs.iter().all(|o| !o.capturing));
        assert_eq!(sync.state_name(), "Capturing");

        // Level appears one tick after the pulse.
        let next = sync.tick(ByteEvent::valid(0x00), false);
        assert!(next.capturing);
        assert!(!next.sync_found);
    }

    #[test]
    fn test_broken_preamble_returns_idle() {
        let mut sync = sync();
        let mut bytes = preamble(3);
        bytes.push(0x00);

        let outputs = feed(&mut sync, &bytes);
        assert_eq!(sync.state(), FrameState::Idle);
        assert!(outputs[3].false_start);
        assert!(outputs.iter().all(|o| !o.sync_found && !o.capturing));
    }

    #[test]
    fn test_short_preamble_then_delimiter() {
        let mut sync = sync();
        let mut bytes = preamble(6);
        bytes.push(DEFAULT_DELIMITER);

        let outputs = feed(&mut sync, &bytes);
        assert_eq!(sync.state(), FrameState::Idle);
        assert!(outputs.iter().all(|o| !o.sync_found));
    }

    #[test]
    fn test_extra_preamble_restarts_count() {
        let mut sync = sync();

        feed(&mut sync, &preamble(7));
        assert_eq!(sync.state(), FrameState::Sfd);

        // Eighth preamble byte is the first of a new preamble.
        let out = sync.tick(ByteEvent::valid(DEFAULT_PREAMBLE), false);
        assert!(out.false_start);
        assert_eq!(sync.state(), FrameState::Preamble(1));

        // So the delimiter is no longer accepted.
        let out = sync.tick(ByteEvent::valid(DEFAULT_DELIMITER), false);
        assert!(!out.sync_found);
        assert_eq!(sync.state(), FrameState::Idle);
    }

    #[test]
    fn test_wrong_byte_in_sfd() {
        let mut sync = sync();
        feed(&mut sync, &preamble(7));

        let out = sync.tick(ByteEvent::valid(0x42), false);
        assert!(out.false_start);
        assert_eq!(sync.state(), FrameState::Idle);
    }

    #[test]
    fn test_invalid_bytes_hold_state() {
        let mut sync = sync();
        feed(&mut sync, &preamble(3));

        for _ in 0..5 {
            sync.tick(ByteEvent::new(0x00, false), false);
        }
        assert_eq!(sync.state(), FrameState::Preamble(3));

        feed(&mut sync, &preamble(4));
        assert_eq!(sync.state(), FrameState::Sfd);

        sync.tick(ByteEvent::new(0x00, false), false);
        assert_eq!(sync.state(), FrameState::Sfd);

        let out = sync.tick(ByteEvent::valid(DEFAULT_DELIMITER), false);
        assert!(out.sync_found);
    }

    #[test]
    fn test_invalid_delimiter_value_ignored() {
        let mut sync = sync();
        feed(&mut sync, &preamble(7));

        // Strobe low, so the delimiter value does not count.
        let out = sync.tick(ByteEvent::new(DEFAULT_DELIMITER, false), false);
        assert!(!out.sync_found);
        assert_eq!(sync.state(), FrameState::Sfd);
    }

    #[test]
    fn test_capture_ended_closes_window() {
        let mut sync = sync();
        let mut bytes = preamble(7);
        bytes.push(DEFAULT_DELIMITER);
        feed(&mut sync, &bytes);

        // Bytes inside the window are not inspected.
        for _ in 0..10 {
            let out = sync.tick(ByteEvent::valid(DEFAULT_PREAMBLE), false);
            assert!(out.capturing);
        }
        assert_eq!(sync.state(), FrameState::Capturing);

        let out = sync.tick(ByteEvent::idle(), true);
        assert!(out.capturing);
        assert_eq!(sync.state(), FrameState::Done);

        let out = sync.tick(ByteEvent::valid(DEFAULT_PREAMBLE), false);
        assert!(!out.capturing);
        assert_eq!(sync.state(), FrameState::Idle);
    }

    #[test]
    fn test_capture_ended_ignored_outside_window() {
        let mut sync = sync();
        sync.tick(ByteEvent::idle(), true);
        assert_eq!(sync.state(), FrameState::Idle);
    }

    #[test]
    fn test_resync_after_done() {
        let mut sync = sync();
        let mut bytes = preamble(7);
        bytes.push(DEFAULT_DELIMITER);

        feed(&mut sync, &bytes);
        sync.tick(ByteEvent::idle(), true);
        sync.tick(ByteEvent::idle(), false);
        assert_eq!(sync.state(), FrameState::Idle);

        let outputs = feed(&mut sync, &bytes);
        assert!(outputs[7].sync_found);
    }

    #[test]
    fn test_watchdog_aborts_window() {
        let mut sync = FrameSync::with_watchdog(DEFAULT_PREAMBLE, DEFAULT_DELIMITER, Some(4));
        let mut bytes = preamble(7);
        bytes.push(DEFAULT_DELIMITER);
        feed(&mut sync, &bytes);

        let outputs: Vec<SyncOutput> = (0..4)
            .map(|_| sync.tick(ByteEvent::valid(0x00), false))
            .collect();

        assert!(outputs[..3].iter().all(|o| !o.timed_out));
        assert!(outputs[3].timed_out);
        assert_eq!(sync.state(), FrameState::Idle);
        assert!(!sync.tick(ByteEvent::idle(), false).capturing);
    }

    #[test]
    fn test_watchdog_disabled_by_default() {
        let mut sync = sync();
        let mut bytes = preamble(7);
        bytes.push(DEFAULT_DELIMITER);
        feed(&mut sync, &bytes);

        for _ in 0..10_000 {
            assert!(!sync.tick(ByteEvent::idle(), false).timed_out);
        }
        assert!(sync.capturing());
    }

    #[test]
    fn test_reset() {
        let mut sync = sync();
        feed(&mut sync, &preamble(5));
        sync.reset();
        assert_eq!(sync.state_name(), "Idle");
    }
}
