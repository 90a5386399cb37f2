//! Run orchestration: open, collect, analyze, render, release.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::info;

use crate::cancel::CancelFlag;
use crate::data::{analyze, AnalysisRecord, RequirementsConfig};
use crate::error::RunError;
use crate::render::{ChartRenderer, JsonExporter, RenderContext, Renderer, ReportRenderer};
use crate::session::{collect_until, Collection};
use crate::source::{SourceGuard, SourceOpener};

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// How long to collect.
    pub duration: Duration,
    /// Directory for report, chart and export files.
    pub output_dir: PathBuf,
    /// Write the SVG chart.
    pub charts: bool,
    /// Also export the analysis as JSON to this path.
    pub export: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            output_dir: PathBuf::from("."),
            charts: true,
            export: None,
        }
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub record: AnalysisRecord,
    pub collection: Collection,
    /// Files written by the renderers, in order.
    pub artifacts: Vec<PathBuf>,
}

/// Sequences one analysis run.
///
/// The line source is held by a [`SourceGuard`] for the whole run, so it
/// is released on success, on insufficient data, on a render failure, on
/// cancellation and on panic.
pub struct Orchestrator {
    requirements: RequirementsConfig,
    renderers: Vec<Box<dyn Renderer>>,
}

impl Orchestrator {
    /// Create an orchestrator with no renderers.
    pub fn new(requirements: RequirementsConfig) -> Self {
        Self {
            requirements,
            renderers: Vec::new(),
        }
    }

    /// Create an orchestrator with the renderers selected by `options`:
    /// the text report always, the chart and JSON export on request.
    pub fn from_options(requirements: RequirementsConfig, options: &RunOptions) -> Self {
        let mut orchestrator = Self::new(requirements).with_renderer(ReportRenderer);
        if options.charts {
            orchestrator = orchestrator.with_renderer(ChartRenderer);
        }
        if let Some(ref export) = options.export {
            orchestrator = orchestrator.with_renderer(JsonExporter::new(export, requirements));
        }
        orchestrator
    }

    /// Add a renderer to run after a successful analysis.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderers.push(Box::new(renderer));
        self
    }

    pub fn requirements(&self) -> &RequirementsConfig {
        &self.requirements
    }

    /// Run the full pipeline against the source produced by `opener`.
    pub async fn run<O>(
        &self,
        opener: &O,
        duration: Duration,
        output_dir: &Path,
        cancel: &CancelFlag,
    ) -> Result<RunSummary, RunError>
    where
        O: SourceOpener + ?Sized,
    {
        let started_at = Local::now();
        let source_desc = opener.describe();

        info!("Starting timing analysis on {}", source_desc);
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancelled while opening {}", source_desc);
                return Err(RunError::Cancelled { source_desc });
            }
            opened = opener.open() => opened,
        };
        let source = opened.map_err(|reason| RunError::Connection {
            source_desc: source_desc.clone(),
            reason,
        })?;
        let mut source = SourceGuard::new(source);

        let collection = collect_until(&mut *source, duration, cancel).await;
        if collection.interrupted {
            info!(
                "Collection interrupted, analyzing {} samples collected so far",
                collection.samples.len()
            );
        }

        let record = analyze(&collection.samples, &self.requirements).ok_or(
            RunError::InsufficientData {
                lines_read: collection.lines_read,
            },
        )?;

        let ctx = RenderContext {
            record: &record,
            samples: &collection.samples,
            started_at,
            collection_time: collection.elapsed,
            output_dir,
        };
        let mut artifacts = Vec::with_capacity(self.renderers.len());
        for renderer in &self.renderers {
            let path = renderer.render(&ctx)?;
            info!("Wrote {}: {}", renderer.name(), path.display());
            artifacts.push(path);
        }

        Ok(RunSummary {
            started_at,
            record,
            collection,
            artifacts,
        })
    }
}
