//! Timing analysis over a collected sample sequence.
//!
//! Turns the samples of one session into an [`AnalysisRecord`]: interval
//! statistics, state histogram, temperature statistics, and pass/fail
//! verdicts against the timing requirements.
//!
//! Statistics that are undefined for the available data (the standard
//! deviation of a single value, the mean of no intervals) are `NaN`. A
//! verdict computed from a `NaN` statistic is always `false`.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use super::requirements::RequirementsConfig;
use super::sample::Sample;

/// Allowed absolute deviation of the mean interval from the target period.
pub const TIMING_TOLERANCE_MS: f64 = 100.0;

/// Interval standard deviation must stay below this.
pub const MAX_JITTER_MS: f64 = 50.0;

/// Any interval at or above this counts as a missed deadline.
pub const DEADLINE_MISS_MS: f64 = 1500.0;

pub const COMMUNICATION_TIMING: &str = "communication_timing";
pub const JITTER_ACCEPTABLE: &str = "jitter_acceptable";
pub const NO_MISSED_DEADLINES: &str = "no_missed_deadlines";

/// Statistics over the intervals between consecutive device timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Configured communication period, for reference.
    pub target: u64,
}

/// Statistics over the reported temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// Summary of one collection session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub total_samples: usize,
    pub communication_intervals: IntervalStats,
    /// Sample count per raw state code.
    pub state_transitions: BTreeMap<u32, usize>,
    pub temperature_range: TemperatureStats,
    /// Verdict per requirement name.
    pub requirements_check: BTreeMap<String, bool>,
}

impl AnalysisRecord {
    /// Verdict for a named requirement, `false` if unknown.
    pub fn passed(&self, requirement: &str) -> bool {
        self.requirements_check.get(requirement).copied().unwrap_or(false)
    }

    /// True if every checked requirement passed.
    pub fn all_requirements_met(&self) -> bool {
        self.requirements_check.values().all(|&ok| ok)
    }
}

/// Analyze a session's samples.
///
/// Returns `None` if there are no samples to analyze.
pub fn analyze(samples: &[Sample], requirements: &RequirementsConfig) -> Option<AnalysisRecord> {
    if samples.is_empty() {
        return None;
    }

    let intervals: Vec<f64> = intervals(samples).into_iter().map(|i| i as f64).collect();
    let moments = Moments::of(&intervals);
    let communication_intervals = IntervalStats {
        mean: moments.mean,
        std: moments.std,
        min: moments.min,
        max: moments.max,
        target: requirements.communication_period,
    };

    let mut state_transitions = BTreeMap::new();
    for sample in samples {
        *state_transitions.entry(sample.state).or_insert(0) += 1;
    }

    let temperatures: Vec<f64> = samples.iter().map(|s| s.temperature).collect();
    let moments = Moments::of(&temperatures);
    let temperature_range = TemperatureStats {
        min: moments.min,
        max: moments.max,
        mean: moments.mean,
        std: moments.std,
    };

    let target = requirements.communication_period as f64;
    let mut requirements_check = BTreeMap::new();
    requirements_check.insert(
        COMMUNICATION_TIMING.to_string(),
        (communication_intervals.mean - target).abs() < TIMING_TOLERANCE_MS,
    );
    requirements_check.insert(
        JITTER_ACCEPTABLE.to_string(),
        communication_intervals.std < MAX_JITTER_MS,
    );
    requirements_check.insert(
        NO_MISSED_DEADLINES.to_string(),
        communication_intervals.max < DEADLINE_MISS_MS,
    );

    Some(AnalysisRecord {
        total_samples: samples.len(),
        communication_intervals,
        state_transitions,
        temperature_range,
        requirements_check,
    })
}

/// Differences between consecutive device timestamps, in sample order.
///
/// A timestamp lower than its predecessor (device reset, counter wrap)
/// yields a negative interval; it is reported but kept. Differences beyond
/// the `i64` range saturate.
pub fn intervals(samples: &[Sample]) -> Vec<i64> {
    samples
        .windows(2)
        .map(|pair| {
            let diff = i128::from(pair[1].timestamp) - i128::from(pair[0].timestamp);
            let interval = diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
            if interval < 0 {
                warn!(
                    "Device timestamp went backwards: {} -> {} ({} ms)",
                    pair[0].timestamp, pair[1].timestamp, interval
                );
            }
            interval
        })
        .collect()
}

/// Mean, sample standard deviation, min and max of a series.
#[derive(Debug, Clone, Copy)]
struct Moments {
    mean: f64,
    std: f64,
    min: f64,
    max: f64,
}

impl Moments {
    fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() < 2 {
            f64::NAN
        } else {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (n - 1.0)).sqrt()
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            mean,
            std,
            min,
            max,
        }
    }
}
