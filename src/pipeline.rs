//! Receive pipeline: tick ordering and stage alignment.
//!
//! [`Pipeline`] owns every stage and the delay registers between them. On
//! each tick all stages read values committed on the previous tick, compute,
//! and then the registers latch the new values:
//!
//! ```text
//!            raw byte ─────────────────┬──────────────► FrameSync
//!                                      │                   │ capturing
//!                                 [byte delay]      [capturing delay]
//!                                      │                   │
//!                                      └───► PayloadCapture ◄┘
//!                                                │
//!                                         [capture delay]
//!                        ┌───────────────────────┼──────────────────┐
//!                        ▼                       ▼                  ▼
//!               FrameSync (capture_ended)   RingBuffer (write)   CheckValidator
//! ```
//!
//! Frame sync sees the raw stream undelayed. The capture stage sees the
//! byte stream one tick late and frame sync's `capturing` level one tick
//! late, which lines the first payload byte up with the first tick of the
//! window. Everything the capture stage produces reaches its consumers one
//! tick later.
//!
//! # Example
//!
//! ```
//! use linkframe::protocol::Frame;
//! use linkframe::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default().with_payload_len(4);
//! let mut pipeline = Pipeline::new(config.clone()).unwrap();
//!
//! let frame = Frame::valid_for(&config, vec![1, 2, 3, 4]);
//! let results = pipeline.feed(&frame.to_events(&config));
//!
//! assert_eq!(results.len(), 1);
//! assert!(results[0].ok);
//! assert_eq!(&pipeline.drain_buffer()[..], &[1, 2, 3, 4]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::delay::Delay;
use crate::error::Result;
use crate::protocol::{
    ByteEvent, CaptureOutput, CheckValidator, FrameResult, FrameState, FrameSync, PayloadCapture,
    INTERFRAME_GAP_TICKS,
};
use crate::ring_buffer::RingBuffer;

/// Idle ticks that carry the last input byte through every stage.
pub const DRAIN_TICKS: usize = INTERFRAME_GAP_TICKS;

/// Observable outputs after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutput {
    /// Delimiter accepted this tick.
    pub sync_found: bool,
    /// Frame sync's capture window level.
    pub capturing: bool,
    /// Capture stage saw the last trailer byte this tick.
    pub frame_complete: bool,
    /// Validator verdict for the most recent completed frame.
    pub ok: bool,
    /// Verdict produced this tick, if any.
    pub frame: Option<FrameResult>,
    /// Watchdog closed the window this tick.
    pub timed_out: bool,
    /// Ring buffer full.
    pub full: bool,
    /// Ring buffer empty.
    pub empty: bool,
}

/// Running counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PipelineStats {
    /// Ticks since the last reset.
    pub ticks: u64,
    /// Delimiters accepted.
    pub syncs: u64,
    /// Partial preambles abandoned.
    pub false_starts: u64,
    /// Frames that reached the validator.
    pub frames_completed: u64,
    /// Completed frames whose check matched.
    pub frames_ok: u64,
    /// Completed frames whose check did not match.
    pub frames_failed: u64,
    /// Capture windows closed by the watchdog.
    pub watchdog_aborts: u64,
    /// Payload bytes lost to ring buffer overflow.
    pub overflows: u64,
}

/// The complete receive pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    frame_sync: FrameSync,
    capture: PayloadCapture,
    ring: RingBuffer,
    validator: CheckValidator,
    /// Raw stream, one tick late, for the capture stage.
    byte_delay: Delay<ByteEvent>,
    /// Frame sync's `capturing`, one tick late, for the capture stage.
    capturing_delay: Delay<bool>,
    /// Capture stage outputs, one tick late, for everyone downstream.
    capture_delay: Delay<CaptureOutput>,
    stats: PipelineStats,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let mut pipeline = Self {
            frame_sync: FrameSync::with_watchdog(
                config.preamble,
                config.delimiter,
                config.watchdog_ticks,
            ),
            capture: PayloadCapture::new(config.payload_len, config.check_window),
            ring: RingBuffer::new(config.buffer_capacity, config.overflow_policy),
            validator: CheckValidator::new(config.expected_check),
            byte_delay: Delay::new(),
            capturing_delay: Delay::new(),
            capture_delay: Delay::new(),
            stats: PipelineStats::default(),
            config,
        };
        pipeline.reset();
        Ok(pipeline)
    }

    /// Advance every stage by one tick.
    pub fn tick(&mut self, event: ByteEvent) -> TickOutput {
        // Everything read here was committed on the previous tick.
        let captured = self.capture_delay.get();
        let aligned_byte = self.byte_delay.get();
        let aligned_capturing = self.capturing_delay.get();

        let sync = self.frame_sync.tick(event, captured.capture_ended);
        let capture = self.capture.tick(aligned_byte, aligned_capturing);
        if let Some(byte) = captured.write {
            self.ring.write(byte);
        }
        let buffer = self.ring.tick();
        let frame = self
            .validator
            .tick(captured.frame_complete, captured.check_value);

        self.byte_delay.push(event);
        self.capturing_delay.push(sync.capturing);
        self.capture_delay.push(capture);

        self.stats.ticks += 1;
        self.stats.syncs += u64::from(sync.sync_found);
        self.stats.false_starts += u64::from(sync.false_start);
        self.stats.watchdog_aborts += u64::from(sync.timed_out);
        self.stats.overflows = self.ring.overflow_count();
        if let Some(result) = frame {
            self.stats.frames_completed += 1;
            if result.ok {
                self.stats.frames_ok += 1;
            } else {
                self.stats.frames_failed += 1;
            }
        }

        TickOutput {
            sync_found: sync.sync_found,
            capturing: sync.capturing,
            frame_complete: capture.frame_complete,
            ok: self.validator.ok(),
            frame,
            timed_out: sync.timed_out,
            full: buffer.full,
            empty: buffer.empty,
        }
    }

    /// Tick once per event, returning the frame verdicts produced.
    pub fn feed(&mut self, events: &[ByteEvent]) -> Vec<FrameResult> {
        events
            .iter()
            .filter_map(|&event| self.tick(event).frame)
            .collect()
    }

    /// Tick once per byte with the strobe high.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<FrameResult> {
        bytes
            .iter()
            .filter_map(|&b| self.tick(ByteEvent::valid(b)).frame)
            .collect()
    }

    /// Run idle ticks until the last input byte has passed every stage.
    pub fn flush(&mut self) -> Vec<FrameResult> {
        (0..DRAIN_TICKS)
            .filter_map(|_| self.tick(ByteEvent::idle()).frame)
            .collect()
    }

    /// Read one byte using the host read protocol.
    ///
    /// Asserts the read request, then runs two idle ticks before sampling.
    /// Returns `None` if the buffer was empty. The idle ticks reach frame
    /// sync too, so only call this between frames; a read while
    /// [`in_frame`](Self::in_frame) is logged as a warning.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.in_frame() {
            tracing::warn!(
                state = ?self.frame_sync.state(),
                "host read inside a frame; idle ticks enter the input stream"
            );
        }
        self.ring.begin_read();
        self.tick(ByteEvent::idle());
        self.tick(ByteEvent::idle());
        self.ring.take_available()
    }

    /// Read until the ring buffer is empty.
    ///
    /// Each byte costs two idle ticks, so draining mid-frame can shift or
    /// time out the frame in progress. Check [`in_frame`](Self::in_frame)
    /// first.
    pub fn drain_buffer(&mut self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.ring.len());
        while !self.ring.is_empty() {
            match self.read_byte() {
                Some(b) => out.put_u8(b),
                None => break,
            }
        }
        out.freeze()
    }

    /// Return every stage and delay register to its initial state.
    pub fn reset(&mut self) {
        self.frame_sync.reset();
        self.capture.reset();
        self.ring.reset();
        self.validator.reset();
        self.byte_delay.reset();
        self.capturing_delay.reset();
        self.capture_delay.reset();
        self.stats = PipelineStats::default();
    }

    /// The configuration this pipeline was built with.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Running counters.
    #[inline]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Frame sync state.
    #[inline]
    pub fn frame_state(&self) -> FrameState {
        self.frame_sync.state()
    }

    /// Frame sync is past `Idle`: a preamble, delimiter or capture is in
    /// progress.
    #[inline]
    pub fn in_frame(&self) -> bool {
        self.frame_sync.state() != FrameState::Idle
    }

    /// Validator verdict for the most recent completed frame.
    #[inline]
    pub fn ok(&self) -> bool {
        self.validator.ok()
    }

    /// The capture stage.
    #[inline]
    pub fn capture(&self) -> &PayloadCapture {
        &self.capture
    }

    /// The ring buffer.
    #[inline]
    pub fn ring_buffer(&self) -> &RingBuffer {
        &self.ring
    }

    /// The ring buffer, for hosts driving the read protocol themselves.
    #[inline]
    pub fn ring_buffer_mut(&mut self) -> &mut RingBuffer {
        &mut self.ring
    }
}
