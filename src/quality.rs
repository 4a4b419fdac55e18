//! FASTQ quality encodings and the high-quality base cutoff.
//!
//! A cutoff is given on the command line as an error probability. It is
//! converted into a quality score in the encoding the reads file uses, then
//! into the ASCII character that a base's quality must reach.

use std::fmt;

/// Number of records inspected when guessing the quality encoding.
pub const SCORE_TYPE_SAMPLE: usize = 10_000;

/// Lowest quality byte that only a Phred+33 file can contain.
const SOLEXA_MIN_CHAR: u8 = b';';

/// Quality score encoding of a FASTQ file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastqScoreType {
    /// Phred scores, ASCII offset 33.
    Phred,
    /// Solexa scores, ASCII offset 64.
    Solexa,
}

impl fmt::Display for FastqScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FastqScoreType::Phred => write!(f, "Phred"),
            FastqScoreType::Solexa => write!(f, "Solexa"),
        }
    }
}

#[inline]
pub fn error_probability_to_phred(p: f64) -> f64 {
    -10.0 * p.log10()
}

#[inline]
pub fn error_probability_to_solexa(p: f64) -> f64 {
    -10.0 * (p / (1.0 - p)).log10()
}

#[inline]
pub fn phred_to_quality_character(q: f64) -> u8 {
    to_quality_character(q, 33.0)
}

#[inline]
pub fn solexa_to_quality_character(q: f64) -> u8 {
    to_quality_character(q, 64.0)
}

/// Round to the nearest score and clamp into printable ASCII.
fn to_quality_character(q: f64, offset: f64) -> u8 {
    let c = (q + offset).round();
    if c.is_nan() {
        return b'!';
    }
    c.clamp(b'!' as f64, b'~' as f64) as u8
}

/// Guess the encoding from a sample of quality strings.
///
/// Any byte below `;` can only come from a Phred+33 file; otherwise the file
/// is treated as Solexa.
pub fn detect_score_type<'a, I>(qualities: I) -> FastqScoreType
where
    I: IntoIterator<Item = &'a [u8]>,
{
    for qual in qualities.into_iter().take(SCORE_TYPE_SAMPLE) {
        if qual.iter().any(|&q| q < SOLEXA_MIN_CHAR) {
            return FastqScoreType::Phred;
        }
    }
    FastqScoreType::Solexa
}

/// Minimum quality character a base must reach to be counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityCutoff {
    cutoff: u8,
}

impl QualityCutoff {
    /// Derive the cutoff character from an error probability.
    pub fn new(score_type: FastqScoreType, error_probability: f64) -> Self {
        let cutoff = match score_type {
            FastqScoreType::Phred => {
                phred_to_quality_character(error_probability_to_phred(error_probability))
            }
            FastqScoreType::Solexa => {
                solexa_to_quality_character(error_probability_to_solexa(error_probability))
            }
        };
        Self { cutoff }
    }

    /// Use a raw quality character as the cutoff.
    pub fn from_char(cutoff: u8) -> Self {
        Self { cutoff }
    }

    #[inline]
    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    #[inline]
    pub fn passes(&self, quality: u8) -> bool {
        quality >= self.cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phred_conversion() {
        assert!((error_probability_to_phred(0.01) - 20.0).abs() < 1e-9);
        assert_eq!(phred_to_quality_character(20.0), b'5');
        assert_eq!(phred_to_quality_character(0.0), b'!');
    }

    #[test]
    fn test_solexa_conversion() {
        // p / (1 - p) = 1/99 for p = 0.01
        let q = error_probability_to_solexa(0.01);
        assert!((q - 19.956).abs() < 1e-3);
        assert_eq!(solexa_to_quality_character(q), b'T');
    }

    #[test]
    fn test_cutoff_boundary() {
        let qc = QualityCutoff::new(FastqScoreType::Phred, 0.01);
        assert_eq!(qc.cutoff(), b'5');
        assert!(qc.passes(b'5'));
        assert!(qc.passes(b'I'));
        assert!(!qc.passes(b'4'));
    }

    #[test]
    fn test_cutoff_rounds_to_nearest() {
        // -10 log10(0.02) = 16.99: rounds up to 17, not down to 16
        let qc = QualityCutoff::new(FastqScoreType::Phred, 0.02);
        assert_eq!(qc.cutoff(), b'2');
        assert!(qc.passes(b'2'));
        assert!(!qc.passes(b'1'));

        // -10 log10(0.02 / 0.98) = 16.90 -> 17 + 64
        let qc = QualityCutoff::new(FastqScoreType::Solexa, 0.02);
        assert_eq!(qc.cutoff(), b'Q');

        // 0.3 -> 5.23: rounds down to 5
        assert_eq!(QualityCutoff::new(FastqScoreType::Phred, 0.3).cutoff(), b'&');
    }

    #[test]
    fn test_detect_score_type() {
        let phred: Vec<&[u8]> = vec![b"IIII", b"II#I"];
        assert_eq!(detect_score_type(phred), FastqScoreType::Phred);

        let solexa: Vec<&[u8]> = vec![b"hhhh", b"@BCh"];
        assert_eq!(detect_score_type(solexa), FastqScoreType::Solexa);
    }

    #[test]
    fn test_clamp_extremes() {
        assert_eq!(phred_to_quality_character(500.0), b'~');
        assert_eq!(solexa_to_quality_character(-100.0), b'!');
    }
}
