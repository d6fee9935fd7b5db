//! Trailing check validation.
//!
//! The check word is compared for equality against a configured constant;
//! no checksum is computed over the payload.

use serde::Serialize;

/// Verdict for one completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameResult {
    /// Check word matched the expected constant.
    pub ok: bool,
    /// Check word that was compared.
    pub check: u32,
}

/// Compares the latched check word on each completion pulse and holds the
/// verdict until the next one.
#[derive(Debug, Clone)]
pub struct CheckValidator {
    expected: u32,
    ok: bool,
}

impl CheckValidator {
    /// Create a validator for the given constant.
    pub fn new(expected: u32) -> Self {
        Self {
            expected,
            ok: false,
        }
    }

    /// Verdict for the most recent completed frame.
    #[inline]
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// The expected constant.
    #[inline]
    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// Advance one tick. Returns a result only on a completion pulse.
    pub fn tick(&mut self, frame_complete: bool, check_value: u32) -> Option<FrameResult> {
        if !frame_complete {
            return None;
        }

        self.ok = check_value == self.expected;
        if !self.ok {
            tracing::warn!(
                expected = self.expected,
                actual = check_value,
                "frame check mismatch"
            );
        }

        Some(FrameResult {
            ok: self.ok,
            check: check_value,
        })
    }

    /// Clear the held verdict.
    pub fn reset(&mut self) {
        self.ok = false;
    }
}
