//! Wire format of the framed link.
//!
//! A frame on the wire is laid out as:
//! ```text
//! ┌──────────────┬───────────┬─────────────────┬──────────┐
//! │ Preamble     │ Delimiter │ Payload         │ Check    │
//! │ 7 × 0x55     │ 0xD5      │ PAYLOAD_LEN     │ 4 bytes  │
//! │              │           │ bytes           │ BE u32   │
//! └──────────────┴───────────┴─────────────────┴──────────┘
//! ```
//!
//! Bytes arrive one per tick, each paired with a validity strobe. Ticks
//! with the strobe low carry no data and are legal anywhere in the stream.

/// Number of preamble bytes that must precede the delimiter.
pub const PREAMBLE_LEN: u8 = 7;

/// Length of the trailing check value in bytes.
pub const CHECK_LEN: u32 = 4;

/// Default preamble byte.
pub const DEFAULT_PREAMBLE: u8 = 0x55;

/// Default start-of-frame delimiter.
pub const DEFAULT_DELIMITER: u8 = 0xD5;

/// Default payload length in bytes.
pub const DEFAULT_PAYLOAD_LEN: u32 = 64;

/// Largest accepted payload length (16 MiB).
pub const MAX_PAYLOAD_LEN: u32 = 16 * 1024 * 1024;

/// Default expected trailing check constant.
pub const DEFAULT_EXPECTED_CHECK: u32 = 0xA5A5_A5A5;

/// Idle ticks needed after a frame's last byte before the receiver hunts
/// for the next preamble again.
///
/// The last trailer byte reaches the capture stage one tick late, its
/// completion pulse reaches frame sync one tick after that, and frame sync
/// spends one more tick in `Done`.
pub const INTERFRAME_GAP_TICKS: usize = 3;

/// One tick of input: a byte and its validity strobe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteEvent {
    /// Byte on the bus this tick.
    pub value: u8,
    /// Strobe; when low the byte is ignored by every stage.
    pub valid: bool,
}

impl ByteEvent {
    /// Create an event with an explicit strobe.
    #[inline]
    pub const fn new(value: u8, valid: bool) -> Self {
        Self { value, valid }
    }

    /// A byte with the strobe high.
    #[inline]
    pub const fn valid(value: u8) -> Self {
        Self { value, valid: true }
    }

    /// A padding tick with the strobe low.
    #[inline]
    pub const fn idle() -> Self {
        Self {
            value: 0,
            valid: false,
        }
    }

    /// The byte, if the strobe is high.
    #[inline]
    pub fn byte(&self) -> Option<u8> {
        self.valid.then_some(self.value)
    }

    /// Whether this is a valid byte equal to `value`.
    #[inline]
    pub fn is(&self, value: u8) -> bool {
        self.valid && self.value == value
    }
}

impl From<u8> for ByteEvent {
    fn from(value: u8) -> Self {
        Self::valid(value)
    }
}

/// Wrap a byte slice as a run of valid events.
pub fn valid_events(bytes: &[u8]) -> Vec<ByteEvent> {
    bytes.iter().copied().map(ByteEvent::valid).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_event_constructors() {
        assert_eq!(ByteEvent::valid(0x12), ByteEvent::new(0x12, true));
        assert_eq!(ByteEvent::idle(), ByteEvent::new(0, false));
        assert_eq!(ByteEvent::from(0x34), ByteEvent::valid(0x34));
    }

    #[test]
    fn test_byte_only_when_valid() {
        assert_eq!(ByteEvent::valid(0xAB).byte(), Some(0xAB));
        assert_eq!(ByteEvent::new(0xAB, false).byte(), None);
    }

    #[test]
    fn test_is_requires_strobe() {
        assert!(ByteEvent::valid(DEFAULT_PREAMBLE).is(DEFAULT_PREAMBLE));
        assert!(!ByteEvent::new(DEFAULT_PREAMBLE, false).is(DEFAULT_PREAMBLE));
        assert!(!ByteEvent::valid(DEFAULT_DELIMITER).is(DEFAULT_PREAMBLE));
    }

    #[test]
    fn test_valid_events() {
        let events = valid_events(&[1, 2, 3]);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.valid));
        assert_eq!(events[2].value, 3);
    }
}
