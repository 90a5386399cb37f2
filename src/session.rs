//! Time-bounded acquisition of samples from a line source.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::data::{parse, Sample};
use crate::source::LineSource;

/// Sleep between polls when the source has nothing to read.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of one acquisition session.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Accepted samples in arrival order.
    pub samples: Vec<Sample>,
    /// Lines read from the source, accepted or not.
    pub lines_read: usize,
    /// Lines that did not match the telemetry format.
    pub lines_rejected: usize,
    /// Read attempts that failed.
    pub read_errors: usize,
    /// Wall-clock time spent collecting.
    pub elapsed: Duration,
    /// True if collection stopped early because of a cancel request.
    pub interrupted: bool,
}

/// Collect samples from `source` for `duration`.
pub async fn collect(source: &mut dyn LineSource, duration: Duration) -> Vec<Sample> {
    collect_until(source, duration, &CancelFlag::new())
        .await
        .samples
}

/// Collect samples from `source` until `duration` elapses, `cancel` is
/// set, or the source is exhausted.
///
/// Unparseable lines are dropped and read errors are logged; neither
/// stops the session. Samples gathered before a cancellation are kept.
pub async fn collect_until(
    source: &mut dyn LineSource,
    duration: Duration,
    cancel: &CancelFlag,
) -> Collection {
    let mut collection = Collection::default();
    let start = Instant::now();

    info!(
        "Collecting from {} for {:.1}s",
        source.description(),
        duration.as_secs_f64()
    );

    while start.elapsed() < duration {
        if cancel.is_cancelled() {
            collection.interrupted = true;
            break;
        }

        if !source.is_data_available() {
            if source.is_exhausted() {
                info!("{} has no more data", source.description());
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            continue;
        }

        match source.read_line() {
            Ok(line) => {
                collection.lines_read += 1;
                match parse(&line) {
                    Some(sample) => {
                        debug!(
                            "Sample: state={}, temp={:.1}°C, fan={}%, time={}",
                            sample.state, sample.temperature, sample.fan_speed, sample.timestamp
                        );
                        collection.samples.push(sample);
                    }
                    None => collection.lines_rejected += 1,
                }
            }
            Err(e) => {
                collection.read_errors += 1;
                warn!("Error reading from {}: {}", source.description(), e);
                // Give the source a chance to recover
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }

    collection.elapsed = start.elapsed();
    info!(
        "Collection finished: {} samples from {} lines ({} rejected, {} read errors) in {:.1}s",
        collection.samples.len(),
        collection.lines_read,
        collection.lines_rejected,
        collection.read_errors,
        collection.elapsed.as_secs_f64()
    );

    collection
}
