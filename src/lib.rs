//! # timing-doctor
//!
//! A diagnostic tool and library for verifying the real-time behaviour of
//! an embedded device from the status lines it prints on its serial port.
//!
//! The device sends one line per communication period:
//!
//! ```text
//! Estado: 0, Temp: 23.5°C, Fan: 40%, Time: 120345
//! ```
//!
//! `timing-doctor` collects these lines for a fixed window, derives interval
//! and temperature statistics, and checks them against the timing
//! requirements (period, jitter, deadline misses).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Orchestrator                            │
//! │  ┌─────────┐    ┌─────────┐    ┌──────────┐    ┌──────────────┐  │
//! │  │ source  │───▶│ session │───▶│   data   │───▶│    render    │  │
//! │  │ (lines) │    │(collect)│    │(analyze) │    │(report/chart)│  │
//! │  └────┬────┘    └─────────┘    └──────────┘    └──────────────┘  │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  StreamSource (serial, TCP) | FileSource | ChannelSource         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Line source abstraction ([`LineSource`] trait) with
//!   implementations for async streams, capture files and channels
//! - **[`session`]**: The time-bounded acquisition loop
//! - **[`data`]**: The sample parser, timing requirements, and the analyzer
//!   producing an [`AnalysisRecord`]
//! - **[`render`]**: Text report, SVG chart and JSON export
//! - **[`run`]**: The [`Orchestrator`] tying it together
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Collect for 60 seconds from the default serial port
//! timing-doctor --port /dev/ttyACM0 --baudrate 115200 --duration 60
//!
//! # Analyze a captured log without charts
//! timing-doctor --replay capture.log --no-plots
//! ```
//!
//! ### As a library
//!
//! ```
//! use timing_doctor::{analyze, parse, RequirementsConfig};
//!
//! let samples: Vec<_> = [
//!     "Estado: 0, Temp: 20.0°C, Fan: 10%, Time: 1000",
//!     "Estado: 0, Temp: 20.5°C, Fan: 10%, Time: 2000",
//!     "garbage",
//! ]
//! .iter()
//! .filter_map(|line| parse(line))
//! .collect();
//!
//! let record = analyze(&samples, &RequirementsConfig::default()).unwrap();
//! assert_eq!(record.communication_intervals.mean, 1000.0);
//! ```
//!
//! ### Driving a full run
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use timing_doctor::{CancelFlag, Orchestrator, RequirementsConfig, RunOptions, SourceSpec};
//!
//! # tokio_test::block_on(async {
//! let spec = SourceSpec::Tcp { addr: "localhost:4000".to_string() };
//! let orchestrator = Orchestrator::from_options(RequirementsConfig::default(), &RunOptions::default());
//! let _summary = orchestrator
//!     .run(&spec, Duration::from_secs(10), Path::new("."), &CancelFlag::new())
//!     .await;
//! # });
//! ```

pub mod cancel;
pub mod data;
pub mod error;
pub mod render;
pub mod run;
pub mod session;
pub mod source;

// Re-export main types for convenience
pub use cancel::CancelFlag;
pub use data::{
    analyze, parse, state_label, AnalysisRecord, IntervalStats, RequirementsConfig, Sample,
    SystemState, TemperatureStats,
};
pub use error::{RenderError, RunError};
pub use render::{ChartRenderer, JsonExporter, RenderContext, Renderer, ReportRenderer};
pub use run::{Orchestrator, RunOptions, RunSummary};
pub use session::{collect, collect_until, Collection};
pub use source::{
    ChannelSource, FileSource, LineSource, SourceGuard, SourceOpener, SourceSpec, StreamSource,
};
