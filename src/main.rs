use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use timing_doctor::data::duration::parse_duration;
use timing_doctor::render::format_report;
use timing_doctor::source::DEFAULT_SERIAL_SETTLE;
use timing_doctor::{CancelFlag, Orchestrator, RequirementsConfig, RunError, RunOptions, SourceSpec};

#[derive(Parser, Debug)]
#[command(name = "timing-doctor")]
#[command(about = "Verify the real-time communication timing of an embedded device")]
struct Args {
    /// Serial port of the device
    #[arg(short, long, default_value = "/dev/ttyACM0", conflicts_with_all = ["connect", "replay"])]
    port: String,

    /// Serial baud rate
    #[arg(short, long, default_value = "115200")]
    baudrate: u32,

    /// Collection window in seconds, or with a unit (e.g. "90s", "2min")
    #[arg(short, long, default_value = "60")]
    duration: String,

    /// Do not generate the chart
    #[arg(long)]
    no_plots: bool,

    /// Read from a TCP serial bridge instead of a local port (host:port)
    #[arg(short, long, conflicts_with_all = ["port", "replay"])]
    connect: Option<String>,

    /// Analyze a captured device log instead of a live device
    #[arg(short, long, conflicts_with_all = ["port", "connect"])]
    replay: Option<PathBuf>,

    /// Directory for the report and chart files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Also export the analysis as JSON to this file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Requirements file (TOML, JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wait after opening the serial port before collecting (e.g. "500ms"),
    /// defaults to the board boot time
    #[arg(long)]
    settle: Option<String>,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match try_main(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.downcast_ref::<RunError>().map_or(1, RunError::exit_code);
            error!("{:#}", e);
            ExitCode::from(code as u8)
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level: {}", level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to initialize logging")?;
    Ok(())
}

/// Select the line source from the command line.
fn source_spec(args: &Args) -> Result<SourceSpec> {
    if let Some(ref addr) = args.connect {
        return Ok(SourceSpec::Tcp { addr: addr.clone() });
    }
    if let Some(ref path) = args.replay {
        return Ok(SourceSpec::Replay { path: path.clone() });
    }

    let settle = match args.settle {
        Some(ref raw) => {
            parse_duration(raw).with_context(|| format!("invalid --settle {:?}", raw))?
        }
        None => DEFAULT_SERIAL_SETTLE,
    };
    Ok(SourceSpec::Serial {
        port: args.port.clone(),
        baud_rate: args.baudrate,
        settle,
    })
}

fn try_main(args: Args) -> Result<()> {
    let duration = parse_duration(&args.duration)
        .with_context(|| format!("invalid --duration {:?}", args.duration))?;
    let requirements = RequirementsConfig::load(args.config.as_deref())
        .context("failed to load requirements")?;
    let spec = source_spec(&args)?;

    let options = RunOptions {
        duration,
        output_dir: args.output_dir,
        charts: !args.no_plots,
        export: args.export,
    };
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    // Single-threaded: the stream reader and the collection loop share one thread
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let summary = rt.block_on(async {
        let cancel = CancelFlag::new();
        cancel.cancel_on_ctrl_c();

        let orchestrator = Orchestrator::from_options(requirements, &options);
        orchestrator
            .run(&spec, options.duration, &options.output_dir, &cancel)
            .await
    })?;

    println!(
        "{}",
        format_report(
            &summary.record,
            summary.started_at,
            Some(summary.collection.elapsed)
        )
    );
    for path in &summary.artifacts {
        println!("Saved: {}", path.display());
    }

    if !summary.record.all_requirements_met() {
        warn!("One or more timing requirements were not met");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("timing-doctor").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_serial_settle_defaults_to_boot_time() {
        match source_spec(&args(&[])).unwrap() {
            SourceSpec::Serial {
                port,
                baud_rate,
                settle,
            } => {
                assert_eq!(port, "/dev/ttyACM0");
                assert_eq!(baud_rate, 115200);
                assert_eq!(settle, DEFAULT_SERIAL_SETTLE);
            }
            other => panic!("expected serial source, got {:?}", other),
        }
    }

    #[test]
    fn test_serial_settle_override() {
        let spec = source_spec(&args(&["--settle", "500ms"])).unwrap();
        assert!(matches!(
            spec,
            SourceSpec::Serial { settle, .. } if settle == Duration::from_millis(500)
        ));
        assert!(source_spec(&args(&["--settle", "soon"])).is_err());
    }

    #[test]
    fn test_connect_and_replay_select_source() {
        let spec = source_spec(&args(&["--connect", "localhost:4000"])).unwrap();
        assert_eq!(
            spec,
            SourceSpec::Tcp {
                addr: "localhost:4000".to_string()
            }
        );

        let spec = source_spec(&args(&["--replay", "capture.log"])).unwrap();
        assert_eq!(
            spec,
            SourceSpec::Replay {
                path: PathBuf::from("capture.log")
            }
        );
        assert!(Args::try_parse_from(["timing-doctor", "--connect", "a:1", "--replay", "b"]).is_err());
    }
}
