//! Payload capture: byte counting, buffer writes and the check accumulator.
//!
//! Runs one tick behind frame sync. While the (delayed) capture window is
//! open, each valid byte is either a payload byte, which becomes a ring
//! buffer write request, or a trailer byte, which is shifted into the
//! check accumulator. The last trailer byte raises `frame_complete` and
//! `capture_ended` for one tick.
//!
//! The counter restarts on the rising edge of the window, so the byte
//! presented on that tick is payload byte 0. Once a frame completes the
//! remaining ticks of the window are ignored.

use serde::{Deserialize, Serialize};

use super::wire_format::{ByteEvent, CHECK_LEN};

/// Which accumulator value is latched as the frame's check word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckWindow {
    /// The four trailer bytes, including the one shifted in on the
    /// completion tick.
    #[default]
    Current,
    /// The accumulator as it stood before the completion tick's shift: one
    /// byte behind the trailer. Matches hardware whose check latch samples
    /// the shift register's previous-tick value.
    Stale,
}

/// Outputs of one capture tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureOutput {
    /// Ring buffer write request.
    pub write: Option<u8>,
    /// One-tick pulse on the last trailer byte.
    pub frame_complete: bool,
    /// End-of-frame signal fed back to frame sync.
    pub capture_ended: bool,
    /// Latched check word.
    pub check_value: u32,
}

/// Counts bytes inside the capture window and splits payload from trailer.
#[derive(Debug, Clone)]
pub struct PayloadCapture {
    payload_len: u32,
    /// Index of the last byte of payload plus trailer.
    last_index: u32,
    window: CheckWindow,
    counter: u32,
    accumulator: u32,
    check_value: u32,
    /// Window level seen last tick, for edge detection.
    was_capturing: bool,
    /// Frame finished; ignore the rest of this window.
    closed: bool,
}

impl PayloadCapture {
    /// Create a capture stage for `payload_len` payload bytes.
    pub fn new(payload_len: u32, window: CheckWindow) -> Self {
        Self {
            payload_len,
            last_index: payload_len.saturating_add(CHECK_LEN - 1),
            window,
            counter: 0,
            accumulator: 0,
            check_value: 0,
            was_capturing: false,
            closed: false,
        }
    }

    /// Bytes counted so far in the current window.
    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// The check shift register.
    #[inline]
    pub fn accumulator(&self) -> u32 {
        self.accumulator
    }

    /// The latched check word.
    #[inline]
    pub fn check_value(&self) -> u32 {
        self.check_value
    }

    /// Advance one tick with the delayed byte and delayed window level.
    pub fn tick(&mut self, event: ByteEvent, capturing: bool) -> CaptureOutput {
        if capturing && !self.was_capturing {
            self.counter = 0;
            self.closed = false;
        }
        self.was_capturing = capturing;

        let mut out = CaptureOutput {
            check_value: self.check_value,
            ..CaptureOutput::default()
        };

        let byte = match event.byte() {
            Some(b) if capturing && !self.closed => b,
            _ => return out,
        };

        let index = self.counter;
        if index < self.payload_len {
            out.write = Some(byte);
        } else {
            let shifted = (self.accumulator << 8) | u32::from(byte);
            self.check_value = match self.window {
                CheckWindow::Current => shifted,
                CheckWindow::Stale => self.accumulator,
            };
            self.accumulator = shifted;
            out.check_value = self.check_value;
        }
        self.counter = self.counter.saturating_add(1);

        if index == self.last_index {
            tracing::debug!(check = self.check_value, "frame complete");
            out.frame_complete = true;
            out.capture_ended = true;
            self.counter = 0;
            self.closed = true;
        }

        out
    }

    /// Clear the counter, accumulator and latched check word.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.accumulator = 0;
        self.check_value = 0;
        self.was_capturing = false;
        self.closed = false;
    }
}
