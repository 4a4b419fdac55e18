//! Run configuration for a methylation scan.

use crate::error::{MethError, Result};
use crate::streaming::buffers::DEFAULT_PAIR_BUFFER;

/// Which sites are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// One row per CpG dinucleotide.
    #[default]
    CpG,
    /// One row per reference C (plus-strand evidence) and per reference G
    /// (minus-strand evidence).
    AllCytosines,
}

/// Settings shared by every chromosome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub mode: ScanMode,
    /// Reads whose mismatch score exceeds this are ignored.
    pub max_mismatches: f64,
    /// Error probability a base must beat to be counted. Requires FASTQ reads.
    pub quality_cutoff: Option<f64>,
    /// Mapped-read pairs buffered per refill.
    pub buffer_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::CpG,
            max_mismatches: f64::MAX,
            quality_cutoff: None,
            buffer_size: DEFAULT_PAIR_BUFFER,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject settings that cannot produce a meaningful scan.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(MethError::Usage("buffer size must be at least 1".to_string()));
        }
        if self.max_mismatches.is_nan() || self.max_mismatches < 0.0 {
            return Err(MethError::Usage(format!(
                "max mismatches must be non-negative, got {}",
                self.max_mismatches
            )));
        }
        if let Some(p) = self.quality_cutoff {
            if !(p > 0.0 && p < 1.0) {
                return Err(MethError::Usage(format!(
                    "quality cutoff is an error probability in (0, 1), got {}",
                    p
                )));
            }
        }
        Ok(())
    }
}
