//! Opening line sources from a connection description.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio_serial::SerialPortBuilderExt;
use tracing::info;

use super::{FileSource, LineSource, StreamSource};

/// Time to wait after opening a serial port. Many boards reset when the
/// port is opened and print nothing useful until they have booted.
pub const DEFAULT_SERIAL_SETTLE: Duration = Duration::from_secs(2);

/// Something that can produce an open [`LineSource`].
///
/// The orchestrator acquires its source through this trait so that
/// connection failures can be told apart from everything that happens
/// after the source is open.
#[async_trait]
pub trait SourceOpener: Send + Sync {
    /// Human-readable description used in logs and errors.
    fn describe(&self) -> String;

    /// Open the source.
    async fn open(&self) -> io::Result<Box<dyn LineSource>>;
}

/// Where the device telemetry comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// A local serial port.
    Serial {
        port: String,
        baud_rate: u32,
        settle: Duration,
    },
    /// A TCP bridge to the serial line (e.g. ser2net), `host:port`.
    Tcp { addr: String },
    /// A captured log file.
    Replay { path: PathBuf },
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Serial {
                port, baud_rate, ..
            } => write!(f, "serial {} @ {} baud", port, baud_rate),
            SourceSpec::Tcp { addr } => write!(f, "tcp {}", addr),
            SourceSpec::Replay { path } => write!(f, "replay {}", path.display()),
        }
    }
}

#[async_trait]
impl SourceOpener for SourceSpec {
    fn describe(&self) -> String {
        self.to_string()
    }

    async fn open(&self) -> io::Result<Box<dyn LineSource>> {
        match self {
            SourceSpec::Serial {
                port,
                baud_rate,
                settle,
            } => {
                let stream = tokio_serial::new(port.as_str(), *baud_rate)
                    .timeout(Duration::from_secs(1))
                    .open_native_async()
                    .map_err(io::Error::other)?;
                info!("Connected to {} at {} baud", port, baud_rate);
                if !settle.is_zero() {
                    tokio::time::sleep(*settle).await;
                }
                Ok(Box::new(StreamSource::spawn(stream, port)))
            }
            SourceSpec::Tcp { addr } => {
                let stream = TcpStream::connect(addr.as_str()).await?;
                info!("Connected to {}", addr);
                Ok(Box::new(StreamSource::spawn(stream, addr)))
            }
            SourceSpec::Replay { path } => {
                let source = FileSource::open(path)?;
                info!("Replaying {}", path.display());
                Ok(Box::new(source))
            }
        }
    }
}
