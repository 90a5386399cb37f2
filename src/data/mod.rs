//! Data models and processing for device telemetry.
//!
//! ## Submodules
//!
//! - [`sample`]: The [`Sample`] model and the device line parser
//! - [`requirements`]: Timing requirements ([`RequirementsConfig`]) and their loading
//! - [`analysis`]: Statistics and requirement verdicts ([`AnalysisRecord`])
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "60s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! device line (text)
//!        │
//!        ▼
//! sample::parse()  ──▶ Sample (or rejected)
//!        │
//!        ▼
//! Vec<Sample> (one session)
//!        │
//!        ▼
//! analysis::analyze(&samples, &RequirementsConfig)
//!        │
//!        └──▶ AnalysisRecord (intervals, states, temperature, verdicts)
//! ```

pub mod analysis;
pub mod duration;
pub mod requirements;
pub mod sample;

pub use analysis::{
    analyze, intervals, AnalysisRecord, IntervalStats, TemperatureStats, COMMUNICATION_TIMING,
    DEADLINE_MISS_MS, JITTER_ACCEPTABLE, MAX_JITTER_MS, NO_MISSED_DEADLINES, TIMING_TOLERANCE_MS,
};
pub use requirements::RequirementsConfig;
pub use sample::{parse, state_label, Sample, SystemState};
