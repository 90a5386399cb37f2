//! File-based line source.
//!
//! Replays a captured device log (for example the output of
//! `cat /dev/ttyACM0 > capture.log`) so a session can be analyzed offline.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{no_data_error, LineSource};

/// A line source that reads device lines from a file.
///
/// The whole file is available immediately; the source reports itself
/// exhausted once the last line has been read.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    reader: Option<BufReader<File>>,
    at_eof: bool,
}

impl FileSource {
    /// Open a capture file for replay.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let description = format!("file: {}", path.display());
        Ok(Self {
            path,
            description,
            reader: Some(BufReader::new(file)),
            at_eof: false,
        })
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    fn is_data_available(&mut self) -> bool {
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        match reader.fill_buf() {
            Ok(buf) if buf.is_empty() => {
                self.at_eof = true;
                false
            }
            Ok(_) => true,
            // Let read_line surface the error
            Err(_) => true,
        }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let reader = self.reader.as_mut().ok_or_else(no_data_error)?;
        let mut buf = Vec::new();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            self.at_eof = true;
            return Err(no_data_error());
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn close(&mut self) {
        self.reader = None;
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_exhausted(&self) -> bool {
        self.at_eof || self.reader.is_none()
    }
}
