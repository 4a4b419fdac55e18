//! Streaming reader for mapped read locations.
//!
//! The mapped file is BED6: `chrom start end name score strand`, one line per
//! read, in the same order as the reads file. The score column carries the
//! mismatch count of the alignment.

use crate::error::{MethError, Result};
use crate::interval::{GenomicInterval, Strand};
use crate::streaming::buffers::DEFAULT_INPUT_BUFFER;
use crate::streaming::parsing::{
    parse_score, parse_u64_fast, should_skip_line, split_tabs, trim_line_end,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A streaming reader of mapped locations.
pub struct MappedReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: Vec<u8>,
}

impl MappedReader<File> {
    /// Open a mapped-locations file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::with_capacity(file, DEFAULT_INPUT_BUFFER))
    }
}

impl<R: Read> MappedReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_INPUT_BUFFER)
    }

    /// Create a reader with custom buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Read the next mapped location.
    pub fn read_interval(&mut self) -> Result<Option<GenomicInterval>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = trim_line_end(&self.buffer);
            if should_skip_line(line) {
                continue;
            }

            return self.parse_line(line).map(Some);
        }
    }

    fn parse_line(&self, line: &[u8]) -> Result<GenomicInterval> {
        let mut fields: [&[u8]; 6] = [&[]; 6];
        let n = split_tabs(line, &mut fields);
        if n < 6 {
            return Err(self.error(format!("Expected 6 fields, got {}", n)));
        }

        let chrom = std::str::from_utf8(fields[0])
            .map_err(|_| self.error("Chromosome name is not valid UTF-8".to_string()))?;
        let start = parse_u64_fast(fields[1]).ok_or_else(|| {
            self.error(format!(
                "Invalid start position: '{}'",
                String::from_utf8_lossy(fields[1])
            ))
        })?;
        let end = parse_u64_fast(fields[2]).ok_or_else(|| {
            self.error(format!(
                "Invalid end position: '{}'",
                String::from_utf8_lossy(fields[2])
            ))
        })?;
        if start > end {
            return Err(self.error(format!("Start ({}) > end ({})", start, end)));
        }

        let score = parse_score(fields[4]).ok_or_else(|| {
            self.error(format!(
                "Invalid score (expected a non-negative number): '{}'",
                String::from_utf8_lossy(fields[4])
            ))
        })?;
        let strand = fields[5]
            .first()
            .map(|&b| Strand::from_char(b as char))
            .unwrap_or(Strand::Unknown);

        Ok(GenomicInterval::new(chrom, start, end, score, strand))
    }

    fn error(&self, message: String) -> MethError {
        MethError::Parse {
            line: self.line_number,
            message,
        }
    }

    /// Get an iterator over all intervals.
    pub fn intervals(self) -> MappedIntervalIter<R> {
        MappedIntervalIter { reader: self }
    }
}

/// Iterator over mapped locations.
pub struct MappedIntervalIter<R: Read> {
    reader: MappedReader<R>,
}

impl<R: Read> Iterator for MappedIntervalIter<R> {
    type Item = Result<GenomicInterval>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_interval().transpose()
    }
}

/// Parse mapped locations from a string (useful for testing).
pub fn parse_mapped(content: &str) -> Result<Vec<GenomicInterval>> {
    MappedReader::new(content.as_bytes()).intervals().collect()
}
