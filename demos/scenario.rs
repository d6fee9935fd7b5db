//! Scenario runner - feeds a good frame, a corrupted frame and some line
//! noise through the receive pipeline.
//!
//! This example demonstrates:
//! - Building a pipeline from the default configuration
//! - Generating stimulus with `Frame`
//! - Draining the ring buffer with the host read protocol
//! - Reporting verdicts and counters as JSON
//! - Watching the pipeline through `tracing`
//!
//! # Running
//!
//! ```text
//! RUST_LOG=linkframe=debug cargo run --example scenario
//! ```

use linkframe::protocol::{valid_events, Frame};
use linkframe::{Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = PipelineConfig::default();
    let mut pipeline = Pipeline::new(config.clone())?;
    let payload: Vec<u8> = (0x00..=0x3F).collect();

    // Noise with a false start in it
    let noise = valid_events(&[0x13, 0x55, 0x55, 0x55, 0x00, 0x7F]);
    pipeline.feed(&noise);

    for (name, frame) in [
        ("good", Frame::valid_for(&config, payload.clone())),
        ("corrupted", Frame::with_trailer(payload.clone(), [0, 0, 0, 0])),
    ] {
        for result in pipeline.feed(&frame.to_events(&config)) {
            println!("{name}: {}", serde_json::to_string(&result)?);
        }
        let received = pipeline.drain_buffer();
        println!("{name}: {} payload bytes, first={:02X?}", received.len(), received.first());
    }

    println!("{}", serde_json::to_string_pretty(&pipeline.stats())?);
    Ok(())
}
