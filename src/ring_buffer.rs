//! Fixed-capacity byte FIFO with flow-control flags.
//!
//! The ring buffer sits between the capture stage (single producer) and the
//! host (single consumer). Like every other stage it only changes state in
//! [`RingBuffer::tick`]; `write` and `begin_read` just stage requests.
//!
//! # Read protocol
//!
//! Reads use a registered output. A read requested for tick N pops the
//! head entry on tick N and the value lands on the output on tick N+1:
//!
//! ```text
//! begin_read()   tick N         tick N+1        sample
//!      │           │ pop head      │ output <= head  │
//!      └──────────►└──────────────►└────────────────►take_available()
//! ```
//!
//! Sampling after only one tick yields the previous output value, so
//! [`take_available`](RingBuffer::take_available) returns `None` until a new
//! value has landed.
//!
//! # Overflow
//!
//! Writes into a full buffer are governed by [`OverflowPolicy`]. Every
//! overflow increments a monotonic counter.
//!
//! # Example
//!
//! ```
//! use linkframe::{OverflowPolicy, RingBuffer};
//!
//! let mut ring = RingBuffer::new(4, OverflowPolicy::DropOnFull);
//! ring.write(0x42);
//! ring.tick();
//! assert_eq!(ring.len(), 1);
//!
//! ring.begin_read();
//! ring.tick();
//! assert_eq!(ring.take_available(), None);
//! ring.tick();
//! assert_eq!(ring.take_available(), Some(0x42));
//! ```

use serde::{Deserialize, Serialize};

/// Default ring buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 256;

/// Largest accepted capacity (64 MiB).
pub const MAX_CAPACITY: usize = 64 * 1024 * 1024;

/// What happens to a write that arrives while the buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the incoming byte; stored content is unchanged.
    #[default]
    DropOnFull,
    /// Discard the oldest stored byte to make room for the incoming one.
    DropOldest,
}

/// Flags and occupancy after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferStatus {
    /// Occupancy equals capacity.
    pub full: bool,
    /// Occupancy is zero.
    pub empty: bool,
    /// Occupancy.
    pub len: usize,
}

/// Single-producer/single-consumer ring buffer advanced once per tick.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    storage: Box<[u8]>,
    write_index: usize,
    read_index: usize,
    len: usize,
    policy: OverflowPolicy,
    overflow_count: u64,
    /// Inside an overflow burst (for logging).
    dropping: bool,
    /// Write request for the next tick.
    pending_write: Option<u8>,
    /// Read request for the next tick.
    read_request: bool,
    /// Popped byte waiting to land on the output.
    staged: Option<u8>,
    /// Registered output.
    data_out: u8,
    /// Output holds a value not yet taken.
    fresh: bool,
}

impl RingBuffer {
    /// Create a buffer with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. [`PipelineConfig::validate`](crate::PipelineConfig::validate)
    /// rejects that before a pipeline is built.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            write_index: 0,
            read_index: 0,
            len: 0,
            policy,
            overflow_count: 0,
            dropping: false,
            pending_write: None,
            read_request: false,
            staged: None,
            data_out: 0,
            fresh: false,
        }
    }

    /// Capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Occupancy as of the last tick.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer held no bytes after the last tick.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the buffer was full after the last tick.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Number of writes lost to overflow since the last reset.
    #[inline]
    pub fn overflow_count(&self) -> u64 {
        self.overflow_count
    }

    /// The overflow policy.
    #[inline]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Flags and occupancy as of the last tick.
    #[inline]
    pub fn status(&self) -> BufferStatus {
        BufferStatus {
            full: self.is_full(),
            empty: self.is_empty(),
            len: self.len,
        }
    }

    /// Stage a write for the next tick. A second call before the tick
    /// replaces the first; there is one write port.
    #[inline]
    pub fn write(&mut self, byte: u8) {
        self.pending_write = Some(byte);
    }

    /// Assert the read request for the next tick.
    #[inline]
    pub fn begin_read(&mut self) {
        self.read_request = true;
    }

    /// Whether a read request is waiting for the next tick.
    #[inline]
    pub fn read_pending(&self) -> bool {
        self.read_request
    }

    /// Take the value on the output if one landed since the last call.
    #[inline]
    pub fn take_available(&mut self) -> Option<u8> {
        if std::mem::take(&mut self.fresh) {
            Some(self.data_out)
        } else {
            None
        }
    }

    /// Raw registered output. Holds its last value until a new one lands.
    #[inline]
    pub fn data_out(&self) -> u8 {
        self.data_out
    }

    /// Stored bytes in FIFO order, without consuming them.
    pub fn snapshot(&self) -> Vec<u8> {
        (0..self.len)
            .map(|i| self.storage[(self.read_index + i) % self.capacity()])
            .collect()
    }

    /// Commit staged requests.
    ///
    /// Read and write are both decided against the flags as they stood at
    /// the start of the tick.
    pub fn tick(&mut self) -> BufferStatus {
        if let Some(byte) = self.staged.take() {
            self.data_out = byte;
            self.fresh = true;
        }

        let was_full = self.is_full();
        let was_empty = self.is_empty();

        let mut read_accepted = false;
        if std::mem::take(&mut self.read_request) {
            if was_empty {
                tracing::trace!("read from empty buffer ignored");
            } else {
                self.staged = Some(self.pop());
                read_accepted = true;
            }
        }

        if let Some(byte) = self.pending_write.take() {
            if !was_full {
                self.push(byte);
                self.dropping = false;
            } else {
                match self.policy {
                    OverflowPolicy::DropOnFull => self.record_overflow(byte),
                    OverflowPolicy::DropOldest => {
                        // A read this tick already made room.
                        if !read_accepted {
                            let oldest = self.pop();
                            self.record_overflow(oldest);
                        }
                        self.push(byte);
                    }
                }
            }
        }

        self.status()
    }

    fn push(&mut self, byte: u8) {
        self.storage[self.write_index] = byte;
        self.write_index = (self.write_index + 1) % self.capacity();
        self.len += 1;
    }

    fn pop(&mut self) -> u8 {
        let byte = self.storage[self.read_index];
        self.read_index = (self.read_index + 1) % self.capacity();
        self.len -= 1;
        byte
    }

    fn record_overflow(&mut self, lost: u8) {
        self.overflow_count += 1;
        if self.dropping {
            tracing::trace!(byte = lost, "ring buffer overflow");
        } else {
            tracing::warn!(
                capacity = self.capacity(),
                policy = ?self.policy,
                "ring buffer full, dropping bytes"
            );
            self.dropping = true;
        }
    }

    /// Clear contents, requests, output and the overflow counter.
    pub fn reset(&mut self) {
        self.storage.fill(0);
        self.write_index = 0;
        self.read_index = 0;
        self.len = 0;
        self.overflow_count = 0;
        self.dropping = false;
        self.pending_write = None;
        self.read_request = false;
        self.staged = None;
        self.data_out = 0;
        self.fresh = false;
    }
}
