//! Pipeline configuration.
//!
//! All parameters are fixed for the lifetime of a [`Pipeline`](crate::Pipeline).
//! The defaults describe a 64-byte payload link with an Ethernet-style
//! preamble and delimiter:
//!
//! | field             | default        |
//! |-------------------|----------------|
//! | `payload_len`     | 64             |
//! | `buffer_capacity` | 256            |
//! | `preamble`        | `0x55`         |
//! | `delimiter`       | `0xD5`         |
//! | `expected_check`  | `0xA5A5A5A5`   |
//! | `check_window`    | `current`      |
//! | `overflow_policy` | `drop_on_full` |
//! | `watchdog_ticks`  | none           |
//!
//! # Example
//!
//! ```
//! use linkframe::PipelineConfig;
//!
//! let config = PipelineConfig::from_json(r#"{ "payload_len": 16, "buffer_capacity": 32 }"#).unwrap();
//! assert_eq!(config.payload_len, 16);
//! assert_eq!(config.preamble, 0x55);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LinkFrameError, Result};
use crate::protocol::{
    CheckWindow, DEFAULT_DELIMITER, DEFAULT_EXPECTED_CHECK, DEFAULT_PAYLOAD_LEN, DEFAULT_PREAMBLE,
    MAX_PAYLOAD_LEN,
};
use crate::ring_buffer::{OverflowPolicy, DEFAULT_CAPACITY, MAX_CAPACITY};

/// Configuration for a receive pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of payload bytes per frame.
    pub payload_len: u32,
    /// Ring buffer capacity in bytes.
    pub buffer_capacity: usize,
    /// Byte value repeated to form the preamble.
    pub preamble: u8,
    /// Start-of-frame delimiter following the preamble.
    pub delimiter: u8,
    /// Constant the trailing check word must equal.
    pub expected_check: u32,
    /// Which accumulator value is latched for validation.
    pub check_window: CheckWindow,
    /// What happens to payload writes into a full ring buffer.
    pub overflow_policy: OverflowPolicy,
    /// Abort a capture window after this many ticks without completion.
    pub watchdog_ticks: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            payload_len: DEFAULT_PAYLOAD_LEN,
            buffer_capacity: DEFAULT_CAPACITY,
            preamble: DEFAULT_PREAMBLE,
            delimiter: DEFAULT_DELIMITER,
            expected_check: DEFAULT_EXPECTED_CHECK,
            check_window: CheckWindow::default(),
            overflow_policy: OverflowPolicy::default(),
            watchdog_ticks: None,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload length.
    pub fn with_payload_len(mut self, payload_len: u32) -> Self {
        self.payload_len = payload_len;
        self
    }

    /// Set the ring buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the preamble and delimiter bytes.
    pub fn with_sync_bytes(mut self, preamble: u8, delimiter: u8) -> Self {
        self.preamble = preamble;
        self.delimiter = delimiter;
        self
    }

    /// Set the expected trailing check constant.
    pub fn with_expected_check(mut self, expected_check: u32) -> Self {
        self.expected_check = expected_check;
        self
    }

    /// Select the check window interpretation.
    pub fn with_check_window(mut self, window: CheckWindow) -> Self {
        self.check_window = window;
        self
    }

    /// Select the overflow policy.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Enable the capture watchdog.
    pub fn with_watchdog(mut self, ticks: u32) -> Self {
        self.watchdog_ticks = Some(ticks);
        self
    }

    /// Check the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.payload_len == 0 {
            return Err(LinkFrameError::InvalidConfig(
                "payload_len must be at least 1".to_string(),
            ));
        }

        if self.payload_len > MAX_PAYLOAD_LEN {
            return Err(LinkFrameError::InvalidConfig(format!(
                "payload_len {} exceeds maximum {}",
                self.payload_len, MAX_PAYLOAD_LEN
            )));
        }

        if self.buffer_capacity == 0 {
            return Err(LinkFrameError::InvalidConfig(
                "buffer_capacity must be at least 1".to_string(),
            ));
        }

        if self.buffer_capacity > MAX_CAPACITY {
            return Err(LinkFrameError::InvalidConfig(format!(
                "buffer_capacity {} exceeds maximum {}",
                self.buffer_capacity, MAX_CAPACITY
            )));
        }

        if self.preamble == self.delimiter {
            return Err(LinkFrameError::InvalidConfig(format!(
                "preamble and delimiter must differ (both 0x{:02X})",
                self.preamble
            )));
        }

        if self.watchdog_ticks == Some(0) {
            return Err(LinkFrameError::InvalidConfig(
                "watchdog_ticks must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
