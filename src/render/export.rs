//! JSON export of an analysis.

use std::path::PathBuf;

use serde::Serialize;

use super::{write_artifact, RenderContext, Renderer};
use crate::data::{AnalysisRecord, RequirementsConfig};
use crate::error::RenderError;

/// Writes the analysis as pretty-printed JSON.
///
/// Undefined statistics (`NaN`) are written as `null`.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    path: PathBuf,
    requirements: RequirementsConfig,
}

#[derive(Serialize)]
struct Export<'a> {
    generated_at: String,
    collection_time_secs: f64,
    requirements: &'a RequirementsConfig,
    analysis: &'a AnalysisRecord,
}

impl JsonExporter {
    /// Export to `path`. Relative paths are resolved against the run's
    /// output directory.
    pub fn new(path: impl Into<PathBuf>, requirements: RequirementsConfig) -> Self {
        Self {
            path: path.into(),
            requirements,
        }
    }
}

impl Renderer for JsonExporter {
    fn name(&self) -> &str {
        "json export"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<PathBuf, RenderError> {
        let path = ctx.output_dir.join(&self.path);
        let export = Export {
            generated_at: ctx.started_at.to_rfc3339(),
            collection_time_secs: ctx.collection_time.as_secs_f64(),
            requirements: &self.requirements,
            analysis: ctx.record,
        };
        let json = serde_json::to_string_pretty(&export)?;
        write_artifact(&path, json.as_bytes())?;
        Ok(path)
    }
}
