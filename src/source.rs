//! Line providers for the two passes.
//!
//! Both passes read the same source front to back; Pass II rewinds first.

use crate::error::{QuackError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Sequential, rewindable access to source lines.
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>>;

    /// Go back to the first line.
    fn rewind(&mut self) -> Result<()>;
}

/// Source held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    lines: Vec<String>,
    cursor: usize,
}

impl MemorySource {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            cursor: 0,
        }
    }
}

impl LineSource for MemorySource {
    fn next_line(&mut self) -> Result<Option<String>> {
        let line = self.lines.get(self.cursor).cloned();
        if line.is_some() {
            self.cursor += 1;
        }
        Ok(line)
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }
}

/// Source read lazily from a file.
#[derive(Debug)]
pub struct FileSource {
    reader: BufReader<File>,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| QuackError::io(path, e))?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }
}

impl LineSource for FileSource {
    /// Bytes that are not UTF-8 are replaced rather than rejected.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut buf)
            .map_err(QuackError::Read)?;
        if read == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    fn rewind(&mut self) -> Result<()> {
        self.reader
            .seek(SeekFrom::Start(0))
            .map(|_| ())
            .map_err(QuackError::Read)
    }
}
