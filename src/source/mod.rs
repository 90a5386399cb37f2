//! Line source abstraction for receiving device telemetry.
//!
//! This module provides a trait-based abstraction over the byte streams
//! the device talks through (serial port, TCP bridge, captured log file,
//! in-memory channel), plus the scoped handle the orchestrator uses to
//! guarantee the source is released.

mod channel;
mod connect;
mod file;
mod guard;
mod stream;

pub use channel::ChannelSource;
pub use connect::{SourceOpener, SourceSpec, DEFAULT_SERIAL_SETTLE};
pub use file::FileSource;
pub use guard::SourceGuard;
pub use stream::StreamSource;

use std::fmt::Debug;
use std::io;

/// Trait for pulling text lines out of a device byte stream.
///
/// Implementations decode bytes permissively: invalid UTF-8 is replaced,
/// never reported as an error.
///
/// # Example
///
/// ```
/// use timing_doctor::{ChannelSource, LineSource};
///
/// let (tx, mut source) = ChannelSource::create("bench");
/// tx.send(b"Estado: 0, Temp: 20.0\xC2\xB0C, Fan: 10%, Time: 1000\n".to_vec()).unwrap();
///
/// if source.is_data_available() {
///     let line = source.read_line().unwrap();
///     assert!(line.starts_with("Estado: 0"));
/// }
/// ```
pub trait LineSource: Send + Debug {
    /// Check whether a line can be read without waiting.
    ///
    /// This method must be non-blocking.
    fn is_data_available(&mut self) -> bool;

    /// Read the next line, including its terminator if one was received.
    ///
    /// Errors are transient from the caller's point of view; the caller
    /// may keep polling afterwards.
    fn read_line(&mut self) -> io::Result<String>;

    /// Release the underlying device or stream. Must be idempotent.
    fn close(&mut self);

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// True once the source can never produce another line: end of a
    /// replayed file, a closed channel, or any source after `close()`.
    /// Live streams stay open until closed.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Error returned by `read_line` when called with nothing buffered.
pub(crate) fn no_data_error() -> io::Error {
    io::Error::new(io::ErrorKind::WouldBlock, "no line available")
}
