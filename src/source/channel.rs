//! Channel-based line source.
//!
//! Receives raw device lines via a tokio unbounded channel. Useful when
//! another component already owns the transport (a bus bridge, a test
//! harness) and pushes lines rather than exposing a byte stream.

use std::io;

use tokio::sync::mpsc;

use super::{no_data_error, LineSource};

/// A line source fed through a channel.
///
/// Each message is one line of raw bytes, decoded lossily on read.
///
/// # Example
///
/// ```
/// use timing_doctor::ChannelSource;
///
/// // Create a channel pair
/// let (tx, source) = ChannelSource::create("bench rig");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
    description: String,
    disconnected: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of an unbounded channel
    /// * `source_description` - A description of where lines come from
    pub fn new(receiver: mpsc::UnboundedReceiver<Vec<u8>>, source_description: &str) -> Self {
        Self {
            receiver,
            pending: None,
            description: format!("channel: {}", source_description),
            disconnected: false,
        }
    }

    /// Create a channel pair for sending lines to a ChannelSource.
    pub fn create(source_description: &str) -> (mpsc::UnboundedSender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, source_description))
    }

    fn fill_pending(&mut self) {
        if self.pending.is_some() || self.disconnected {
            return;
        }
        match self.receiver.try_recv() {
            Ok(bytes) => self.pending = Some(bytes),
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => self.disconnected = true,
        }
    }
}

impl LineSource for ChannelSource {
    fn is_data_available(&mut self) -> bool {
        self.fill_pending();
        self.pending.is_some()
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.fill_pending();
        self.pending
            .take()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .ok_or_else(no_data_error)
    }

    fn close(&mut self) {
        self.receiver.close();
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_exhausted(&self) -> bool {
        self.disconnected && self.pending.is_none()
    }
}
