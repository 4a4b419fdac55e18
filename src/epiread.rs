//! Epiread text format: one read per line, `chrom  pos  calls`.
//!
//! `pos` is the index of the read's first CpG and `calls` holds one
//! methylation call per consecutive CpG, so a read spans `[pos, pos + len)`
//! in CpG coordinates.
//!
//! Parsing is strict about fields and lenient about spacing: a line must hold
//! exactly three fields (a fourth column is an error, not ignored), while
//! blank lines between records are skipped by [`EpireadReader`].

use crate::error::{MethError, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Lines checked by [`validate_epiread_file`].
pub const MAX_LINES_TO_VALIDATE: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epiread {
    pub chrom: String,
    pub pos: usize,
    pub seq: String,
}

impl Epiread {
    pub fn new(chrom: impl Into<String>, pos: usize, seq: impl Into<String>) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            seq: seq.into(),
        }
    }

    /// One past the last CpG covered.
    #[inline]
    pub fn end(&self) -> usize {
        self.pos + self.seq.len()
    }
}

/// Split a line into exactly three whitespace-separated fields.
fn split_fields(line: &str) -> Option<(&str, usize, &str)> {
    let mut fields = line.split_whitespace();
    let chrom = fields.next()?;
    let pos = fields.next()?.parse().ok()?;
    let seq = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    Some((chrom, pos, seq))
}

impl FromStr for Epiread {
    type Err = MethError;

    fn from_str(line: &str) -> Result<Self> {
        split_fields(line)
            .map(|(chrom, pos, seq)| Epiread::new(chrom, pos, seq))
            .ok_or_else(|| MethError::Epiread(format!("malformed epiread line:\n{}", line)))
    }
}

impl fmt::Display for Epiread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.pos, self.seq)
    }
}

/// Streaming epiread reader. Blank lines are skipped.
pub struct EpireadReader<R: Read> {
    reader: BufReader<R>,
    buffer: String,
}

impl EpireadReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> EpireadReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: String::with_capacity(256),
        }
    }

    pub fn read_epiread(&mut self) -> Result<Option<Epiread>> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            let line = self.buffer.trim_end();
            if line.is_empty() {
                continue;
            }
            return line.parse().map(Some);
        }
    }
}

impl<R: Read> Iterator for EpireadReader<R> {
    type Item = Result<Epiread>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_epiread().transpose()
    }
}

/// Write epireads one per line.
pub fn write_epireads<W: Write>(writer: &mut W, reads: &[Epiread]) -> io::Result<()> {
    for er in reads {
        writeln!(writer, "{}", er)?;
    }
    Ok(())
}

/// Check that the first lines of a file are well-formed epireads.
///
/// Returns `Ok(false)` on the first malformed line and an error only if the
/// file cannot be read.
pub fn validate_epiread_file<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        MethError::Epiread(format!("failed to open file: {} ({})", path.display(), e))
    })?;

    for line in BufReader::new(file).lines().take(MAX_LINES_TO_VALIDATE) {
        if split_fields(&line?).is_none() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Shift reads so the leftmost starts at 0; returns the shift.
pub fn adjust_read_offsets(reads: &mut [Epiread]) -> usize {
    let first = reads.iter().map(|r| r.pos).min().unwrap_or(0);
    for r in reads.iter_mut() {
        r.pos -= first;
    }
    first
}

/// Number of CpGs spanned by the reads (largest end).
pub fn get_n_cpgs(reads: &[Epiread]) -> usize {
    reads.iter().map(Epiread::end).max().unwrap_or(0)
}
