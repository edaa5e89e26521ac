//! Line input for NMEA data.
//!
//! Input modes:
//! - File:  a recorded feed, one sentence per line
//! - Stdin: `-` as the path, for piping from `nc`, `rtl_ais` or similar
//!
//! Lines are cleaned (trimmed, blanks and `#` comments dropped) and yielded
//! lazily so a large recording is never held in memory.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::error;

/// Where lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    File(PathBuf),
    Stdin,
}

impl LineSource {
    /// `-` means standard input.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            LineSource::Stdin
        } else {
            LineSource::File(arg.to_path_buf())
        }
    }

    pub fn describe(&self) -> String {
        match self {
            LineSource::File(path) => path.display().to_string(),
            LineSource::Stdin => "<stdin>".into(),
        }
    }
}

/// Extract a candidate sentence from a raw input line.
///
/// Handles surrounding whitespace and CR/LF; comment and blank lines give
/// `None`. Validation is left to the sentence parser.
pub fn clean_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line)
}

/// Lazily yields cleaned lines. A read error ends the iteration and is
/// logged; non-UTF-8 lines are skipped.
pub struct LineReader {
    inner: Box<dyn BufRead + Send>,
    buf: Vec<u8>,
    lines_read: u64,
}

impl LineReader {
    pub fn open(source: &LineSource) -> io::Result<Self> {
        let inner: Box<dyn BufRead + Send> = match source {
            LineSource::File(path) => Box::new(BufReader::new(File::open(path)?)),
            LineSource::Stdin => Box::new(BufReader::new(io::stdin())),
        };
        Ok(LineReader::from_reader(inner))
    }

    pub fn from_reader(inner: Box<dyn BufRead + Send>) -> Self {
        LineReader {
            inner,
            buf: Vec::new(),
            lines_read: 0,
        }
    }

    /// Raw lines consumed so far, including skipped ones.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }
}

impl Iterator for LineReader {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            self.buf.clear();
            match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.lines_read += 1;
                    let Ok(text) = std::str::from_utf8(&self.buf) else {
                        continue;
                    };
                    if let Some(line) = clean_line(text) {
                        return Some(line.to_string());
                    }
                }
                Err(e) => {
                    error!(error = %e, "read failed");
                    return None;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
