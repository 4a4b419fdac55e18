//! Error type shared by every stage of a methcounts run.

use std::io;
use thiserror::Error;

/// Errors that can occur while reading inputs or scanning chromosomes.
#[derive(Error, Debug)]
pub enum MethError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("FASTQ error: {0}")]
    Fastq(#[from] bio::io::fastq::Error),

    /// One of the paired inputs ended while the other still had records.
    #[error(
        "read and map files seem out of sync: {exhausted} file ended at record {index} \
         while the other still had data"
    )]
    Desynchronized { index: usize, exhausted: &'static str },

    /// A read offset computed for a site fell outside the read sequence.
    #[error(
        "read offset {offset} out of range for read of length {len} at {chrom}:{position} \
         (inputs are not consistently sorted or paired)"
    )]
    OffsetOutOfRange {
        chrom: String,
        position: u64,
        offset: i64,
        len: usize,
    },

    #[error("{0}")]
    Epiread(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("could not allocate memory")]
    OutOfMemory,
}

pub type Result<T> = std::result::Result<T, MethError>;
