//! Property tests for the ring buffer and the framing pipeline.

use linkframe::protocol::{valid_events, ByteEvent, Frame, FrameState};
use linkframe::{OverflowPolicy, Pipeline, PipelineConfig, RingBuffer};
use proptest::prelude::*;

const PREAMBLE: u8 = 0x55;

fn read(ring: &mut RingBuffer) -> Option<u8> {
    ring.begin_read();
    ring.tick();
    ring.tick();
    ring.take_available()
}

proptest! {
    #[test]
    fn prop_fifo_order(capacity in 1usize..64, data in prop::collection::vec(any::<u8>(), 0..64)) {
        let data: Vec<u8> = data.into_iter().take(capacity).collect();
        let mut ring = RingBuffer::new(capacity, OverflowPolicy::DropOnFull);

        for &b in &data {
            ring.write(b);
            ring.tick();
        }
        prop_assert_eq!(ring.len(), data.len());

        let out: Vec<u8> = (0..data.len()).filter_map(|_| read(&mut ring)).collect();
        prop_assert_eq!(out, data);
        prop_assert!(ring.is_empty());
    }

    #[test]
    fn prop_write_to_full_is_noop(capacity in 1usize..32, extra in prop::collection::vec(any::<u8>(), 1..16)) {
        let mut ring = RingBuffer::new(capacity, OverflowPolicy::DropOnFull);
        for i in 0..capacity {
            ring.write(i as u8);
            ring.tick();
        }
        let before = ring.snapshot();

        for &b in &extra {
            ring.write(b);
            ring.tick();
        }

        prop_assert_eq!(ring.snapshot(), before);
        prop_assert_eq!(ring.len(), capacity);
        prop_assert_eq!(ring.overflow_count(), extra.len() as u64);
    }

    #[test]
    fn prop_read_empty_is_noop(reads in 1usize..8) {
        let mut ring = RingBuffer::new(4, OverflowPolicy::DropOnFull);
        for _ in 0..reads {
            prop_assert_eq!(read(&mut ring), None);
            prop_assert_eq!(ring.len(), 0);
        }
    }

    #[test]
    fn prop_interrupted_preamble_never_captures(
        count in 1usize..7,
        breaker in any::<u8>().prop_filter("not preamble", |b| *b != PREAMBLE),
        tail in prop::collection::vec(any::<u8>().prop_filter("not preamble", |b| *b != PREAMBLE), 0..32),
    ) {
        let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

        let mut stream = vec![PREAMBLE; count];
        stream.push(breaker);
        stream.extend(tail);

        for &b in &stream {
            let out = pipeline.tick(ByteEvent::valid(b));
            prop_assert!(!out.capturing);
            prop_assert!(!out.sync_found);
        }
        pipeline.flush();
        prop_assert_eq!(pipeline.frame_state(), FrameState::Idle);
        prop_assert!(pipeline.ring_buffer().is_empty());
    }

    #[test]
    fn prop_frame_completes_once_and_validates(
        payload in prop::collection::vec(any::<u8>(), 16),
        check in prop_oneof![Just(0xA5A5_A5A5u32), any::<u32>()],
        noise in prop::collection::vec(any::<u8>().prop_filter("not preamble", |b| *b != PREAMBLE), 0..24),
    ) {
        let config = PipelineConfig::default().with_payload_len(16);
        let mut pipeline = Pipeline::new(config.clone()).unwrap();

        let mut events = valid_events(&noise);
        events.extend(Frame::new(payload.clone(), check).to_events(&config));
        events.extend(vec![ByteEvent::idle(); 20]);

        let mut pulses = 0;
        let mut results = Vec::new();
        for &e in &events {
            let out = pipeline.tick(e);
            pulses += usize::from(out.frame_complete);
            results.extend(out.frame);
        }

        prop_assert_eq!(pulses, 1);
        prop_assert_eq!(results.len(), 1);
        prop_assert_eq!(results[0].ok, check == config.expected_check);
        prop_assert_eq!(results[0].check, check);
        prop_assert_eq!(&pipeline.drain_buffer()[..], &payload[..]);
    }
}
