//! Presentation of an analysis as files on disk.
//!
//! Each renderer consumes the [`AnalysisRecord`] of one run (and, where it
//! needs the time series, the raw samples) and writes one artifact.
//!
//! - [`report`]: human-readable text report
//! - [`chart`]: four-panel SVG chart
//! - [`export`]: machine-readable JSON

pub mod chart;
pub mod export;
pub mod report;

pub use chart::ChartRenderer;
pub use export::JsonExporter;
pub use report::{format_report, ReportRenderer};

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::data::{AnalysisRecord, Sample};
use crate::error::RenderError;

/// Everything a renderer may draw from.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub record: &'a AnalysisRecord,
    pub samples: &'a [Sample],
    /// Wall-clock time the run started, used in titles and file names.
    pub started_at: DateTime<Local>,
    /// How long collection actually ran.
    pub collection_time: Duration,
    /// Directory artifacts are written to.
    pub output_dir: &'a Path,
}

impl RenderContext<'_> {
    /// File name stamp, e.g. `20240315_142501`.
    pub fn file_stamp(&self) -> String {
        self.started_at.format("%Y%m%d_%H%M%S").to_string()
    }
}

/// A consumer of the analysis that writes one artifact.
pub trait Renderer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Write the artifact and return its path.
    fn render(&self, ctx: &RenderContext<'_>) -> Result<PathBuf, RenderError>;
}

/// Write `contents` to `path`, mapping failures to [`RenderError::Io`].
pub(crate) fn write_artifact(path: &Path, contents: &[u8]) -> Result<(), RenderError> {
    std::fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
