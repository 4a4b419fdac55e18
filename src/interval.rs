//! Core interval types for mapped read locations.

use std::cmp::Ordering;
use std::fmt;

/// Strand orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unknown,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// The mapped location of one read.
/// Uses 0-based, half-open coordinates (BED format).
///
/// `score` is the alignment mismatch count reported by the mapper and may be
/// fractional.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomicInterval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub score: f64,
    pub strand: Strand,
}

impl GenomicInterval {
    /// Create a new interval.
    #[inline]
    pub fn new(chrom: impl Into<String>, start: u64, end: u64, score: f64, strand: Strand) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            score,
            strand,
        }
    }

    #[inline]
    pub fn same_chrom(&self, chrom: &str) -> bool {
        self.chrom == chrom
    }

    /// True if the interval lies on a chromosome scanned before `chrom`.
    ///
    /// Chromosomes are compared byte-lexicographically, which is the order
    /// reference sequences are processed in.
    #[inline]
    pub fn chrom_before(&self, chrom: &str) -> bool {
        self.chrom.as_str() < chrom
    }

    /// The interval ends at or before `position`.
    #[inline]
    pub fn precedes(&self, position: u64) -> bool {
        self.end <= position
    }

    /// The interval starts after `position`.
    #[inline]
    pub fn succeeds(&self, position: u64) -> bool {
        self.start > position
    }

    /// Overlap test against the closed scan range `[first, last]`.
    #[inline]
    pub fn overlaps_range(&self, first: u64, last: u64) -> bool {
        !self.succeeds(last) && !self.precedes(first)
    }

    #[inline]
    pub fn is_plus(&self) -> bool {
        self.strand == Strand::Plus
    }

    #[inline]
    pub fn is_minus(&self) -> bool {
        self.strand == Strand::Minus
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}({}) score={}",
            self.chrom, self.start, self.end, self.strand, self.score
        )
    }
}

impl PartialOrd for GenomicInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(
            self.chrom
                .cmp(&other.chrom)
                .then(self.start.cmp(&other.start))
                .then(self.end.cmp(&other.end)),
        )
    }
}
