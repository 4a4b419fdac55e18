//! Base-call records paired with mapped locations.
//!
//! Reads are stored as called, in their own orientation. Sequence-only
//! (FASTA) and sequence+quality (FASTQ) reads both implement
//! [`ReadEvidence`], so the scanning code is written once for either kind.

use crate::error::{MethError, Result};
use crate::quality::{detect_score_type, FastqScoreType, QualityCutoff, SCORE_TYPE_SAMPLE};
use crate::streaming::buffers::DEFAULT_INPUT_BUFFER;
use bio::io::{fasta, fastq};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Per-base access used by the contribution accumulator.
pub trait ReadEvidence {
    /// Number of called bases.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Called base at `offset`. `offset` must be `< len()`.
    fn base_at(&self, offset: usize) -> u8;

    /// Whether the base at `offset` passes the optional quality cutoff.
    /// With no cutoff every base passes.
    fn is_high_quality(&self, offset: usize, cutoff: Option<&QualityCutoff>) -> bool;
}

/// A read without quality information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRead {
    pub seq: Vec<u8>,
}

impl SequenceRead {
    pub fn new(seq: impl Into<Vec<u8>>) -> Self {
        Self { seq: seq.into() }
    }
}

impl ReadEvidence for SequenceRead {
    #[inline]
    fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    fn base_at(&self, offset: usize) -> u8 {
        self.seq[offset]
    }

    #[inline]
    fn is_high_quality(&self, _offset: usize, _cutoff: Option<&QualityCutoff>) -> bool {
        true
    }
}

/// A read with a quality string of the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityRead {
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl QualityRead {
    pub fn new(seq: impl Into<Vec<u8>>, qual: impl Into<Vec<u8>>) -> Self {
        Self {
            seq: seq.into(),
            qual: qual.into(),
        }
    }
}

impl ReadEvidence for QualityRead {
    #[inline]
    fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    fn base_at(&self, offset: usize) -> u8 {
        self.seq[offset]
    }

    #[inline]
    fn is_high_quality(&self, offset: usize, cutoff: Option<&QualityCutoff>) -> bool {
        match cutoff {
            Some(qc) => qc.passes(self.qual[offset]),
            None => true,
        }
    }
}

/// True if the file looks like FASTQ (first non-blank byte is `@`).
pub fn is_fastq<P: AsRef<Path>>(path: P) -> Result<bool> {
    let mut reader = BufReader::new(File::open(path)?);
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(false);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(i) => return Ok(buf[i] == b'@'),
            None => {
                let n = buf.len();
                reader.consume(n);
            }
        }
    }
}

/// Detect the quality encoding of a FASTQ file from its first records.
pub fn fastq_score_type<P: AsRef<Path>>(path: P) -> Result<FastqScoreType> {
    let reader = fastq::Reader::new(File::open(path)?);
    let mut quals = Vec::new();
    for record in reader.records().take(SCORE_TYPE_SAMPLE) {
        quals.push(record?.qual().to_vec());
    }
    Ok(detect_score_type(quals.iter().map(|q| q.as_slice())))
}

/// Streaming FASTA reads.
pub struct FastaReads<R: Read> {
    records: fasta::Records<BufReader<R>>,
}

impl FastaReads<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> FastaReads<R> {
    pub fn new(reader: R) -> Self {
        let reader = fasta::Reader::from_bufread(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER,
            reader,
        ));
        Self {
            records: reader.records(),
        }
    }
}

impl<R: Read> Iterator for FastaReads<R> {
    type Item = Result<SequenceRead>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|r| SequenceRead::new(r.seq().to_vec()))
                .map_err(MethError::Io),
        )
    }
}

/// Streaming FASTQ reads.
pub struct FastqReads<R: Read> {
    records: fastq::Records<BufReader<R>>,
}

impl FastqReads<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> FastqReads<R> {
    pub fn new(reader: R) -> Self {
        let reader = fastq::Reader::from_bufread(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER,
            reader,
        ));
        Self {
            records: reader.records(),
        }
    }
}

impl<R: Read> Iterator for FastqReads<R> {
    type Item = Result<QualityRead>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(r) => r,
            Err(e) => return Some(Err(MethError::Fastq(e))),
        };
        if record.seq().len() != record.qual().len() {
            return Some(Err(MethError::InvalidFormat(format!(
                "read '{}' has {} bases but {} quality values",
                record.id(),
                record.seq().len(),
                record.qual().len()
            ))));
        }
        Some(Ok(QualityRead::new(record.seq(), record.qual())))
    }
}
