//! Protocol module - wire format and the receive stages.
//!
//! This module implements the link's framing:
//! - Wire constants and the per-tick `ByteEvent`
//! - Frame sync (preamble + delimiter detection)
//! - Payload capture and the trailing check accumulator
//! - Check validation
//! - Transmit-side frame layout for generating stimulus

mod check;
mod frame;
mod frame_sync;
mod payload_capture;
mod wire_format;

pub use check::{CheckValidator, FrameResult};
pub use frame::{interleave_idle, Frame};
pub use frame_sync::{FrameState, FrameSync, SyncOutput};
pub use payload_capture::{CaptureOutput, CheckWindow, PayloadCapture};
pub use wire_format::{
    valid_events, ByteEvent, CHECK_LEN, DEFAULT_DELIMITER, DEFAULT_EXPECTED_CHECK,
    DEFAULT_PAYLOAD_LEN, DEFAULT_PREAMBLE, INTERFRAME_GAP_TICKS, MAX_PAYLOAD_LEN, PREAMBLE_LEN,
};
