//! Transmit-side frame layout.
//!
//! [`Frame`] is the inverse of the receive pipeline: it lays a payload and
//! check word out as preamble, delimiter, payload and trailer. Hosts and
//! tests use it to generate stimulus.
//!
//! # Example
//!
//! ```
//! use linkframe::protocol::Frame;
//! use linkframe::PipelineConfig;
//!
//! let config = PipelineConfig::default().with_payload_len(2);
//! let frame = Frame::new(vec![0x01, 0x02], 0xA5A5_A5A5);
//! let wire = frame.encode(&config);
//!
//! assert_eq!(&wire[..8], &[0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0xD5]);
//! assert_eq!(&wire[8..], &[0x01, 0x02, 0xA5, 0xA5, 0xA5, 0xA5]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{ByteEvent, CHECK_LEN, INTERFRAME_GAP_TICKS, PREAMBLE_LEN};
use crate::config::PipelineConfig;

/// A frame ready to be laid out on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload bytes.
    pub payload: Bytes,
    /// Trailing check word, sent most significant byte first.
    pub check: u32,
}

impl Frame {
    /// Create a frame from a payload and check word.
    pub fn new(payload: impl Into<Bytes>, check: u32) -> Self {
        Self {
            payload: payload.into(),
            check,
        }
    }

    /// Create a frame from a payload and the four raw trailer bytes.
    pub fn with_trailer(payload: impl Into<Bytes>, trailer: [u8; 4]) -> Self {
        Self::new(payload, u32::from_be_bytes(trailer))
    }

    /// Create a frame whose trailer matches the configured constant.
    pub fn valid_for(config: &PipelineConfig, payload: impl Into<Bytes>) -> Self {
        Self::new(payload, config.expected_check)
    }

    /// Total bytes on the wire.
    #[inline]
    pub fn wire_len(&self) -> usize {
        PREAMBLE_LEN as usize + 1 + self.payload.len() + CHECK_LEN as usize
    }

    /// Lay the frame out as contiguous bytes.
    pub fn encode(&self, config: &PipelineConfig) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        buf.put_bytes(config.preamble, PREAMBLE_LEN as usize);
        buf.put_u8(config.delimiter);
        buf.put_slice(&self.payload);
        buf.put_u32(self.check);
        buf.freeze()
    }

    /// Lay the frame out as one valid event per byte, followed by the idle
    /// ticks the receiver needs before it can lock onto another frame.
    pub fn to_events(&self, config: &PipelineConfig) -> Vec<ByteEvent> {
        let mut events: Vec<ByteEvent> = self
            .encode(config)
            .iter()
            .copied()
            .map(ByteEvent::valid)
            .collect();
        events.extend(std::iter::repeat(ByteEvent::idle()).take(INTERFRAME_GAP_TICKS));
        events
    }
}

/// Insert `gap` idle ticks after every `every` events.
///
/// Models a bus that does not present a byte on every tick.
pub fn interleave_idle(events: &[ByteEvent], every: usize, gap: usize) -> Vec<ByteEvent> {
    if every == 0 || gap == 0 {
        return events.to_vec();
    }

    let mut out = Vec::with_capacity(events.len() + events.len() / every * gap);
    for chunk in events.chunks(every) {
        out.extend_from_slice(chunk);
        out.extend(std::iter::repeat(ByteEvent::idle()).take(gap));
    }
    out
}
