//! Stream-based line source.
//!
//! Reads device lines from an async byte stream. This backs both the
//! serial port and TCP bridges.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::debug;

use super::{no_data_error, LineSource};

/// Capacity of the line buffer between the reader task and the session.
const LINE_BUFFER: usize = 256;

/// Pause after a non-transient read error before reading again.
pub const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

/// A line source that reads from an async stream.
///
/// This source spawns a task on the current tokio runtime that splits the
/// stream on `\n`, decodes each line lossily and makes it available via
/// [`LineSource::read_line`]. Read errors are forwarded to the consumer and
/// the task keeps reading, pausing [`READ_RETRY_DELAY`] after errors that
/// are not transient.
///
/// A live stream is never exhausted: after the peer hangs up the source just
/// stays silent until it is closed.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use timing_doctor::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"Estado: 0, Temp: 20.0\xC2\xB0C, Fan: 10%, Time: 1000\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<io::Result<String>>,
    pending: Option<io::Result<String>>,
    description: String,
    task: Option<JoinHandle<()>>,
    disconnected: bool,
}

impl StreamSource {
    /// Spawn a background task that reads lines from the given async reader.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let desc = description.to_string();

        let task = tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => {
                        debug!("Stream {} reached end of input", desc);
                        break;
                    }
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf).into_owned();
                        if tx.send(Ok(line)).await.is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Err(e) => {
                        let transient = is_transient(&e);
                        if tx.send(Err(e)).await.is_err() {
                            break;
                        }
                        if !transient {
                            tokio::time::sleep(READ_RETRY_DELAY).await;
                        }
                    }
                }
            }
        });

        Self {
            receiver: rx,
            pending: None,
            description: format!("stream: {}", description),
            task: Some(task),
            disconnected: false,
        }
    }

    fn fill_pending(&mut self) {
        if self.pending.is_some() || self.disconnected {
            return;
        }
        match self.receiver.try_recv() {
            Ok(item) => self.pending = Some(item),
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => self.disconnected = true,
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

impl LineSource for StreamSource {
    fn is_data_available(&mut self) -> bool {
        self.fill_pending();
        self.pending.is_some()
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.fill_pending();
        self.pending.take().unwrap_or_else(|| Err(no_data_error()))
    }

    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.receiver.close();
            self.pending = None;
            self.disconnected = true;
            debug!("Closed {}", self.description);
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_exhausted(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for StreamSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    async fn settle() {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_stream_source_reads_lines() {
        let data = "Estado: 0, Temp: 20.0°C, Fan: 10%, Time: 1000\r\nsecond\n";
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        assert!(source.is_data_available());
        let first = source.read_line().unwrap();
        assert_eq!(first, "Estado: 0, Temp: 20.0°C, Fan: 10%, Time: 1000\r\n");
        assert_eq!(source.read_line().unwrap(), "second\n");

        assert!(!source.is_data_available());
        assert!(!source.is_exhausted());
    }

    #[tokio::test]
    async fn test_stream_source_keeps_unterminated_tail() {
        let mut source = StreamSource::spawn(Cursor::new("partial"), "test");
        settle().await;

        assert_eq!(source.read_line().unwrap(), "partial");
    }

    #[tokio::test]
    async fn test_stream_source_lossy_decode() {
        let data: Vec<u8> = vec![b'a', 0xFF, 0xFE, b'b', b'\n'];
        let mut source = StreamSource::spawn(Cursor::new(data), "test");
        settle().await;

        let line = source.read_line().unwrap();
        assert!(line.starts_with('a'));
        assert!(line.contains('\u{FFFD}'));
        assert!(line.ends_with("b\n"));
    }

    #[tokio::test]
    async fn test_stream_source_read_without_data() {
        let (_client, server) = tokio::io::duplex(64);
        let mut source = StreamSource::spawn(server, "idle");
        settle().await;

        assert!(!source.is_data_available());
        let err = source.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert!(!source.is_exhausted());
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:9090");
        assert_eq!(source.description(), "stream: tcp://localhost:9090");
    }

    #[tokio::test]
    async fn test_stream_source_close_is_idempotent() {
        let mut source = StreamSource::spawn(Cursor::new("line\n"), "test");
        source.close();
        source.close();

        assert!(!source.is_data_available());
        assert!(source.is_exhausted());
    }

    /// Reader that fails once with a transient error, then yields data.
    struct FlakyReader {
        failed: bool,
        data: Cursor<Vec<u8>>,
    }

    impl AsyncRead for FlakyReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if !self.failed {
                self.failed = true;
                return Poll::Ready(Err(io::Error::new(io::ErrorKind::TimedOut, "timeout")));
            }
            Pin::new(&mut self.data).poll_read(cx, buf)
        }
    }

    #[tokio::test]
    async fn test_stream_source_forwards_transient_errors() {
        let reader = FlakyReader {
            failed: false,
            data: Cursor::new(b"after\n".to_vec()),
        };
        let mut source = StreamSource::spawn(reader, "flaky");
        settle().await;

        let err = source.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(source.read_line().unwrap(), "after\n");
    }

    /// Reader that fails once with a hard error, then yields data.
    struct BrokenOnceReader {
        failed: bool,
        data: Cursor<Vec<u8>>,
    }

    impl AsyncRead for BrokenOnceReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if !self.failed {
                self.failed = true;
                return Poll::Ready(Err(io::Error::other("framing error")));
            }
            Pin::new(&mut self.data).poll_read(cx, buf)
        }
    }

    #[tokio::test]
    async fn test_stream_source_keeps_reading_after_hard_error() {
        let reader = BrokenOnceReader {
            failed: false,
            data: Cursor::new(b"Estado: 0, Temp: 20.0\xC2\xB0C, Fan: 10%, Time: 1000\n".to_vec()),
        };
        let mut source = StreamSource::spawn(reader, "broken once");
        settle().await;

        let err = source.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(!source.is_exhausted());

        tokio::time::sleep(READ_RETRY_DELAY * 2).await;
        assert!(source.read_line().unwrap().ends_with("Time: 1000\n"));
        assert!(!source.is_exhausted());
    }
}
