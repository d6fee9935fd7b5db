//! # linkframe
//!
//! Tick-synchronous receive side of a minimal link-layer framer.
//!
//! A byte stream arrives one byte per tick with a validity strobe. The
//! pipeline hunts for a preamble and start-of-frame delimiter, captures a
//! fixed-length payload into a ring buffer, and validates the trailing
//! check word against a configured constant.
//!
//! ## Architecture
//!
//! - **Frame sync**: preamble/delimiter state machine on the raw stream
//! - **Payload capture**: byte counter and check accumulator, one tick behind
//! - **Ring buffer**: FIFO with flow-control flags and a registered read port
//! - **Check validator**: equality against the expected constant
//!
//! Each stage exposes `tick` and `reset` and never calls another stage;
//! [`Pipeline`] wires them together through one-tick delay registers.
//!
//! ## Example
//!
//! ```
//! use linkframe::protocol::Frame;
//! use linkframe::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let mut pipeline = Pipeline::new(config.clone()).unwrap();
//!
//! let payload: Vec<u8> = (0..64).collect();
//! let frame = Frame::valid_for(&config, payload.clone());
//! let results = pipeline.feed(&frame.to_events(&config));
//!
//! assert!(results[0].ok);
//! assert_eq!(&pipeline.drain_buffer()[..], &payload[..]);
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod ring_buffer;

mod delay;
mod pipeline;

pub use config::PipelineConfig;
pub use error::LinkFrameError;
pub use pipeline::{Pipeline, PipelineStats, TickOutput, DRAIN_TICKS};
pub use protocol::{ByteEvent, CheckWindow, FrameResult};
pub use ring_buffer::{BufferStatus, OverflowPolicy, RingBuffer};
