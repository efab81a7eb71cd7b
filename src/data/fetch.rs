use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rand::Rng;

use super::generate::generate_snapshot;
use super::snapshot::GraphSnapshot;

/// Knobs for the simulated backend. A real deployment replaces the generator
/// with an HTTP call; everything downstream of the channel stays as-is.
#[derive(Clone, Copy, Debug)]
pub struct FetchConfig {
    pub seed: Option<u64>,
    pub failure_rate: f32,
    pub delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            failure_rate: 0.1,
            delay_ms: 2000,
        }
    }
}

/// Produces one graph snapshot, injecting a synthetic failure at the
/// configured rate. The snapshot is round-tripped through the JSON wire shape
/// a real backend would serve, then validated before the view sees it.
pub fn fetch_snapshot(config: FetchConfig) -> Result<GraphSnapshot> {
    let mut rng = rand::rng();
    if rng.random::<f32>() < config.failure_rate {
        return Err(anyhow!("Failed to load knowledge graph. Please try again."));
    }

    let seed = config.seed.unwrap_or_else(|| rng.random());
    let snapshot = generate_snapshot(seed);

    let body = serde_json::to_string(&snapshot).context("failed to encode graph snapshot")?;
    let decoded: GraphSnapshot =
        serde_json::from_str(&body).context("failed to decode graph snapshot")?;
    decoded
        .validate()
        .context("fetched graph snapshot is malformed")?;

    Ok(decoded)
}

/// Runs the simulated fetch on a worker thread. Dropping the receiver cancels
/// delivery, so a disposed view can never be mutated by a late result.
pub fn spawn_fetch(config: FetchConfig) -> Receiver<Result<GraphSnapshot, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        thread::sleep(Duration::from_millis(config.delay_ms));
        let result = fetch_snapshot(config).map_err(|error| error.to_string());
        if tx.send(result).is_err() {
            log::debug!("graph fetch finished after its view was disposed");
        }
    });

    rx
}
