//! Methylation evidence from reads overlapping a site.
//!
//! After bisulfite treatment an unmethylated cytosine is read as thymine
//! while a methylated one stays cytosine. For each read overlapping a site
//! the accumulator finds the read base that sits on the site's cytosine and
//! counts it as methylated (`C`), unmethylated (`T`) or not at all.
//!
//! Reads are stored as called, so a minus-strand read is the reverse
//! complement of the reference: its base for reference position `p` is at
//! `len - 1 - (p - start)`, and the reference `G` of a CpG carries the
//! evidence for the opposite-strand cytosine.

use crate::error::{MethError, Result};
use crate::interval::GenomicInterval;
use crate::quality::QualityCutoff;
use crate::reads::ReadEvidence;
use std::fmt;

#[inline]
pub fn is_cytosine(b: u8) -> bool {
    b == b'C' || b == b'c'
}

#[inline]
pub fn is_guanine(b: u8) -> bool {
    b == b'G' || b == b'g'
}

#[inline]
pub fn is_thymine(b: u8) -> bool {
    b == b'T' || b == b't'
}

/// True if `seq[i..i + 2]` is a CpG dinucleotide.
#[inline]
pub fn is_cpg(seq: &[u8], i: usize) -> bool {
    i + 1 < seq.len() && is_cytosine(seq[i]) && is_guanine(seq[i + 1])
}

/// Kind of site a row reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// CpG dinucleotide; evidence from both strands.
    CpG,
    /// Reference cytosine; plus-strand evidence.
    C,
    /// Reference guanine; minus-strand evidence.
    G,
}

impl SiteKind {
    pub fn label(self) -> &'static str {
        match self {
            SiteKind::CpG => "CpG",
            SiteKind::C => "C",
            SiteKind::G => "G",
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Methylated and unmethylated base counts at one site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteCounts {
    pub meth: u64,
    pub unmeth: u64,
}

impl SiteCounts {
    /// Coverage: reads that gave a `C` or a `T`.
    #[inline]
    pub fn total(&self) -> u64 {
        self.meth + self.unmeth
    }

    /// Methylation level `meth / max(1, total)`; 0 for an uncovered site.
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.meth as f64 / self.total().max(1) as f64
    }

    #[inline]
    fn add_base(&mut self, base: u8) {
        if is_cytosine(base) {
            self.meth += 1;
        } else if is_thymine(base) {
            self.unmeth += 1;
        }
    }
}

/// Decides which reads count at a site and tallies their evidence.
#[derive(Debug, Clone, Copy)]
pub struct ContributionAccumulator {
    max_mismatches: f64,
    cutoff: Option<QualityCutoff>,
}

impl ContributionAccumulator {
    pub fn new(max_mismatches: f64, cutoff: Option<QualityCutoff>) -> Self {
        Self {
            max_mismatches,
            cutoff,
        }
    }

    /// Reads with more mismatches than the maximum are ignored.
    #[inline]
    pub fn is_eligible(&self, interval: &GenomicInterval) -> bool {
        interval.score <= self.max_mismatches
    }

    /// Sum the evidence of `pairs` at `position` on `chrom`.
    pub fn accumulate<'a, R, It>(
        &self,
        kind: SiteKind,
        chrom: &str,
        position: u64,
        pairs: It,
    ) -> Result<SiteCounts>
    where
        R: ReadEvidence + 'a,
        It: IntoIterator<Item = (&'a GenomicInterval, &'a R)>,
    {
        let mut counts = SiteCounts::default();
        for (interval, read) in pairs {
            if self.is_eligible(interval) {
                self.add_contribution(kind, chrom, position, interval, read, &mut counts)?;
            }
        }
        Ok(counts)
    }

    /// Add one read's evidence at `position`.
    pub fn add_contribution<R: ReadEvidence>(
        &self,
        kind: SiteKind,
        chrom: &str,
        position: u64,
        interval: &GenomicInterval,
        read: &R,
        counts: &mut SiteCounts,
    ) -> Result<()> {
        let offset = match kind {
            SiteKind::CpG => cpg_offset(position, interval, read.len()),
            SiteKind::C => {
                if !interval.is_plus() {
                    return Ok(());
                }
                Some(forward_offset(chrom, position, interval, read.len())?)
            }
            SiteKind::G => {
                if !interval.is_minus() {
                    return Ok(());
                }
                Some(reverse_offset(chrom, position, interval, read.len())?)
            }
        };

        if let Some(offset) = offset {
            if read.is_high_quality(offset, self.cutoff.as_ref()) {
                counts.add_base(read.base_at(offset));
            }
        }
        Ok(())
    }
}

/// Read offset of the evidence for the CpG whose `C` is at `position`.
///
/// Plus-strand reads are read at the `C`, minus-strand reads at the `G`.
/// Reads that do not reach the relevant base contribute nothing.
fn cpg_offset(position: u64, interval: &GenomicInterval, len: usize) -> Option<usize> {
    let len = len as u64;
    if interval.is_plus() && interval.start <= position {
        let offset = position - interval.start;
        return (offset < len).then_some(offset as usize);
    }
    if interval.is_minus()
        && interval.start <= position + 1
        && position + 2 <= interval.start + len
    {
        return Some(((len - 1) - (position + 1 - interval.start)) as usize);
    }
    None
}

fn forward_offset(chrom: &str, position: u64, interval: &GenomicInterval, len: usize) -> Result<usize> {
    let offset = position as i64 - interval.start as i64;
    if offset < 0 || offset as u64 >= len as u64 {
        return Err(out_of_range(chrom, position, offset, len));
    }
    Ok(offset as usize)
}

fn reverse_offset(chrom: &str, position: u64, interval: &GenomicInterval, len: usize) -> Result<usize> {
    let offset = len as i64 - 1 - (position as i64 - interval.start as i64);
    if offset < 0 || offset as u64 >= len as u64 {
        return Err(out_of_range(chrom, position, offset, len));
    }
    Ok(offset as usize)
}

fn out_of_range(chrom: &str, position: u64, offset: i64, len: usize) -> MethError {
    MethError::OffsetOutOfRange {
        chrom: chrom.to_string(),
        position,
        offset,
        len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Strand;
    use crate::reads::{QualityRead, SequenceRead};

    fn plus(start: u64, end: u64) -> GenomicInterval {
        GenomicInterval::new("chr1", start, end, 0.0, Strand::Plus)
    }

    fn minus(start: u64, end: u64) -> GenomicInterval {
        GenomicInterval::new("chr1", start, end, 0.0, Strand::Minus)
    }

    fn unfiltered() -> ContributionAccumulator {
        ContributionAccumulator::new(f64::MAX, None)
    }

    #[test]
    fn test_is_cpg() {
        let seq = b"ACGCGT";
        assert!(!is_cpg(seq, 0));
        assert!(is_cpg(seq, 1));
        assert!(is_cpg(seq, 3));
        assert!(!is_cpg(seq, 5));
        assert!(is_cpg(b"acgt", 1));
    }

    #[test]
    fn test_fraction() {
        let c = SiteCounts { meth: 1, unmeth: 3 };
        assert_eq!(c.total(), 4);
        assert_eq!(c.fraction(), 0.25);
        assert_eq!(SiteCounts::default().fraction(), 0.0);
    }

    #[test]
    fn test_cpg_plus_strand() {
        let acc = unfiltered();
        let iv = plus(1, 5);
        let meth = SequenceRead::new(b"CGCG".to_vec());
        let unmeth = SequenceRead::new(b"TGCG".to_vec());

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 1, [(&iv, &meth), (&iv, &unmeth)])
            .unwrap();
        assert_eq!(counts, SiteCounts { meth: 1, unmeth: 1 });
        assert_eq!(counts.fraction(), 0.5);
    }

    #[test]
    fn test_cpg_plus_read_starting_at_g_is_ignored() {
        let acc = unfiltered();
        // Plus read covers only the G of the CpG at 1
        let iv = plus(2, 6);
        let read = SequenceRead::new(b"CCCC".to_vec());

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 1, [(&iv, &read)])
            .unwrap();
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_cpg_plus_short_read_is_ignored() {
        let acc = unfiltered();
        let iv = plus(0, 10);
        let read = SequenceRead::new(b"CC".to_vec());

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 5, [(&iv, &read)])
            .unwrap();
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_cpg_minus_strand() {
        let acc = unfiltered();
        // Reference CpG at 3..5; read covers [2, 6), stored reverse complemented.
        // G at 4 maps to offset (4 - 1) - (4 - 2) = 1.
        let iv = minus(2, 6);
        let read = SequenceRead::new(b"ACAA".to_vec());

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 3, [(&iv, &read)])
            .unwrap();
        assert_eq!(counts, SiteCounts { meth: 1, unmeth: 0 });
    }

    #[test]
    fn test_cpg_minus_read_starting_at_g() {
        let acc = unfiltered();
        // Read starts on the G at 4: its last base carries the evidence
        let iv = minus(4, 8);
        let read = SequenceRead::new(b"AAAT".to_vec());

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 3, [(&iv, &read)])
            .unwrap();
        assert_eq!(counts, SiteCounts { meth: 0, unmeth: 1 });
    }

    #[test]
    fn test_cpg_minus_read_ending_at_c_is_ignored() {
        let acc = unfiltered();
        // Covers the C at 3 but not the G at 4
        let iv = minus(0, 4);
        let read = SequenceRead::new(b"CCCC".to_vec());

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 3, [(&iv, &read)])
            .unwrap();
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_single_c_and_g() {
        let acc = unfiltered();
        let fwd = plus(10, 14);
        let rev = minus(10, 14);
        let read = SequenceRead::new(b"TACG".to_vec());

        // C at 10 on the plus read: offset 0 -> T
        let c = acc
            .accumulate(SiteKind::C, "chr1", 10, [(&fwd, &read), (&rev, &read)])
            .unwrap();
        assert_eq!(c, SiteCounts { meth: 0, unmeth: 1 });

        // G at 11 on the minus read: offset 3 - 1 = 2 -> C
        let g = acc
            .accumulate(SiteKind::G, "chr1", 11, [(&fwd, &read), (&rev, &read)])
            .unwrap();
        assert_eq!(g, SiteCounts { meth: 1, unmeth: 0 });
    }

    #[test]
    fn test_ambiguous_bases_excluded() {
        let acc = unfiltered();
        let iv = plus(0, 4);
        let read = SequenceRead::new(b"NAGC".to_vec());

        let counts = acc
            .accumulate(SiteKind::C, "chr1", 0, [(&iv, &read)])
            .unwrap();
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.fraction(), 0.0);
    }

    #[test]
    fn test_mismatch_filter_boundary() {
        let acc = ContributionAccumulator::new(2.0, None);
        let at_max = GenomicInterval::new("chr1", 0, 2, 2.0, Strand::Plus);
        let over = GenomicInterval::new("chr1", 0, 2, 2.5, Strand::Plus);
        let read = SequenceRead::new(b"CG".to_vec());

        assert!(acc.is_eligible(&at_max));
        assert!(!acc.is_eligible(&over));

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 0, [(&at_max, &read), (&over, &read)])
            .unwrap();
        assert_eq!(counts.total(), 1);
    }

    #[test]
    fn test_quality_filter_boundary() {
        let acc = ContributionAccumulator::new(f64::MAX, Some(QualityCutoff::from_char(b'5')));
        let iv = plus(0, 2);
        let at_cutoff = QualityRead::new(b"CG".to_vec(), b"5I".to_vec());
        let below = QualityRead::new(b"CG".to_vec(), b"4I".to_vec());

        let counts = acc
            .accumulate(SiteKind::CpG, "chr1", 0, [(&iv, &at_cutoff), (&iv, &below)])
            .unwrap();
        assert_eq!(counts, SiteCounts { meth: 1, unmeth: 0 });

        let no_cutoff = unfiltered()
            .accumulate(SiteKind::CpG, "chr1", 0, [(&iv, &at_cutoff), (&iv, &below)])
            .unwrap();
        assert_eq!(no_cutoff.total(), 2);
    }

    #[test]
    fn test_offset_out_of_range_is_fatal() {
        let acc = unfiltered();
        // Interval claims 10 bases but the read only has 3
        let iv = plus(0, 10);
        let read = SequenceRead::new(b"CCC".to_vec());

        let err = acc
            .accumulate(SiteKind::C, "chr1", 5, [(&iv, &read)])
            .unwrap_err();
        assert!(matches!(
            err,
            MethError::OffsetOutOfRange {
                position: 5,
                offset: 5,
                len: 3,
                ..
            }
        ));

        let rev = minus(0, 10);
        assert!(acc
            .accumulate(SiteKind::G, "chr1", 5, [(&rev, &read)])
            .is_err());
    }

    #[test]
    fn test_unknown_strand_contributes_nothing() {
        let acc = unfiltered();
        let iv = GenomicInterval::new("chr1", 0, 2, 0.0, Strand::Unknown);
        let read = SequenceRead::new(b"CG".to_vec());

        for kind in [SiteKind::CpG, SiteKind::C, SiteKind::G] {
            let counts = acc.accumulate(kind, "chr1", 0, [(&iv, &read)]).unwrap();
            assert_eq!(counts.total(), 0);
        }
    }
}
