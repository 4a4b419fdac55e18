//! Methylation counting - single pass over reference and mapped reads.
//!
//! Memory: one chromosome plus the dual-stream cursor buffer.
//! Every reference base is visited once and every mapped read enters and
//! leaves the window once.
//!
//! REQUIREMENT: the mapped file is sorted by (chrom, start) with chromosomes
//! in byte order, and the reads file lists the same reads in the same order.

use crate::config::{ScanConfig, ScanMode};
use crate::contribution::{is_cpg, is_cytosine, is_guanine, ContributionAccumulator, SiteKind};
use crate::error::{MethError, Result};
use crate::interval::GenomicInterval;
use crate::mapped::MappedReader;
use crate::quality::QualityCutoff;
use crate::reads::{fastq_score_type, is_fastq, FastaReads, FastqReads, ReadEvidence};
use crate::reference::{identify_chromosome_files, load_chromosomes, ChromosomeSequence};
use crate::streaming::cursor::DualStreamCursor;
use crate::streaming::output::SiteWriter;
use crate::streaming::window::WindowManager;
use log::{info, warn};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Statistics from a methcounts run.
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub chromosomes: usize,
    pub sites: u64,
    /// Mapped reads dropped from the window (fully consumed).
    pub pairs_consumed: usize,
    /// Largest number of reads in the window at once.
    pub max_window: usize,
    /// Largest number of read pairs held in the cursor buffer at once.
    pub max_buffered: usize,
}

impl fmt::Display for ScanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chromosomes={} sites={} reads_consumed={} max_window={} max_buffered={}",
            self.chromosomes, self.sites, self.pairs_consumed, self.max_window, self.max_buffered
        )
    }
}

/// Inputs of a run.
#[derive(Debug, Clone)]
pub struct MethcountsInputs {
    /// FASTA file, or directory of FASTA files.
    pub chrom_path: PathBuf,
    /// Suffix selecting reference files when `chrom_path` is a directory.
    pub fasta_suffix: String,
    pub mapped_path: PathBuf,
    pub reads_path: PathBuf,
    /// Output file; standard output when `None`.
    pub output: Option<PathBuf>,
}

/// Methylation counting command.
#[derive(Debug, Clone, Default)]
pub struct MethcountsCommand {
    pub config: ScanConfig,
}

impl MethcountsCommand {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Run on files, writing to the configured output.
    pub fn run_paths(&self, inputs: &MethcountsInputs) -> Result<ScanStats> {
        self.config.validate()?;
        info!("max mismatches={}", self.config.max_mismatches);

        let fastq = is_fastq(&inputs.reads_path)?;
        info!("reads file format: {}", if fastq { "FASTQ" } else { "FASTA" });

        let cutoff = match self.config.quality_cutoff {
            Some(p) if fastq => {
                let score_type = fastq_score_type(&inputs.reads_path)?;
                info!("score format: {}", score_type);
                Some(QualityCutoff::new(score_type, p))
            }
            Some(_) => {
                return Err(MethError::Usage(
                    "a quality cutoff requires FASTQ reads".to_string(),
                ))
            }
            None => None,
        };

        let chrom_files = identify_chromosome_files(&inputs.chrom_path, &inputs.fasta_suffix)?;
        let intervals = MappedReader::from_path(&inputs.mapped_path)?.intervals();

        // Sink chosen once; BufWriter flushes on drop if an error unwinds the run.
        let sink: Box<dyn Write> = match &inputs.output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout().lock()),
        };
        let mut writer = SiteWriter::new(sink);

        let stats = if fastq {
            let reads = FastqReads::from_path(&inputs.reads_path)?;
            let window = self.window(intervals, reads);
            self.scan_files(&chrom_files, window, cutoff, &mut writer)?
        } else {
            let reads = FastaReads::from_path(&inputs.reads_path)?;
            let window = self.window(intervals, reads);
            self.scan_files(&chrom_files, window, cutoff, &mut writer)?
        };

        writer.flush()?;
        info!("methcounts stats: {}", stats);
        Ok(stats)
    }

    fn window<I, S, R>(&self, intervals: I, reads: S) -> WindowManager<I, S, R>
    where
        I: Iterator<Item = Result<GenomicInterval>>,
        S: Iterator<Item = Result<R>>,
    {
        WindowManager::new(DualStreamCursor::new(
            intervals,
            reads,
            self.config.buffer_size,
        ))
    }

    /// Scan every sequence of every reference file in order.
    pub fn scan_files<I, S, R, W>(
        &self,
        chrom_files: &[PathBuf],
        mut window: WindowManager<I, S, R>,
        cutoff: Option<QualityCutoff>,
        writer: &mut SiteWriter<W>,
    ) -> Result<ScanStats>
    where
        I: Iterator<Item = Result<GenomicInterval>>,
        S: Iterator<Item = Result<R>>,
        R: ReadEvidence,
        W: Write,
    {
        let mut stats = ScanStats::default();
        for path in chrom_files {
            info!("loading chrom file {}", display_stem(path));
            let chroms = load_chromosomes(path)?;
            self.scan_chromosomes(&chroms, &mut window, cutoff, writer, &mut stats)?;
        }

        if window.has_pending()? {
            warn!(
                "mapped reads remain after the last reference sequence \
                 (chromosome missing from the reference or not sorted)"
            );
        }
        stats.pairs_consumed = window.head();
        stats.max_window = window.max_window();
        stats.max_buffered = window.max_buffered();
        Ok(stats)
    }

    /// Scan already-loaded sequences.
    pub fn scan_chromosomes<I, S, R, W>(
        &self,
        chroms: &[ChromosomeSequence],
        window: &mut WindowManager<I, S, R>,
        cutoff: Option<QualityCutoff>,
        writer: &mut SiteWriter<W>,
        stats: &mut ScanStats,
    ) -> Result<()>
    where
        I: Iterator<Item = Result<GenomicInterval>>,
        S: Iterator<Item = Result<R>>,
        R: ReadEvidence,
        W: Write,
    {
        let acc = ContributionAccumulator::new(self.config.max_mismatches, cutoff);
        for chrom in chroms {
            info!("scanning {}", chrom.name);
            window.advance_chromosome(&chrom.name)?;
            stats.sites += match self.config.mode {
                ScanMode::CpG => scan_chromosome_cpg(&acc, chrom, window, writer)?,
                ScanMode::AllCytosines => scan_chromosome_all(&acc, chrom, window, writer)?,
            };
            stats.chromosomes += 1;
        }
        Ok(())
    }
}

/// Report every CpG of `chrom`. The window spans both bases of the CpG so
/// minus-strand reads covering only the `G` are included.
fn scan_chromosome_cpg<I, S, R, W>(
    acc: &ContributionAccumulator,
    chrom: &ChromosomeSequence,
    window: &mut WindowManager<I, S, R>,
    writer: &mut SiteWriter<W>,
) -> Result<u64>
where
    I: Iterator<Item = Result<GenomicInterval>>,
    S: Iterator<Item = Result<R>>,
    R: ReadEvidence,
    W: Write,
{
    let name = chrom.name.as_str();
    let seq = &chrom.seq;
    let mut sites = 0;

    for i in 0..seq.len().saturating_sub(1) {
        if !window.head_is_valid()? {
            break;
        }
        if !is_cpg(seq, i) {
            continue;
        }
        let pos = i as u64;
        window.advance_window(pos, pos + 1, name)?;
        let counts = acc.accumulate(SiteKind::CpG, name, pos, window.active())?;
        writer.write_site(name, pos, SiteKind::CpG, &counts)?;
        sites += 1;
    }
    Ok(sites)
}

/// Report every C (plus-strand evidence) and every G (minus-strand evidence).
fn scan_chromosome_all<I, S, R, W>(
    acc: &ContributionAccumulator,
    chrom: &ChromosomeSequence,
    window: &mut WindowManager<I, S, R>,
    writer: &mut SiteWriter<W>,
) -> Result<u64>
where
    I: Iterator<Item = Result<GenomicInterval>>,
    S: Iterator<Item = Result<R>>,
    R: ReadEvidence,
    W: Write,
{
    let name = chrom.name.as_str();
    let seq = &chrom.seq;
    let mut sites = 0;

    for i in 0..seq.len().saturating_sub(1) {
        if !window.head_is_valid()? {
            break;
        }
        let pos = i as u64;
        window.advance_window(pos, pos, name)?;
        for kind in [SiteKind::C, SiteKind::G] {
            let hit = match kind {
                SiteKind::C => is_cytosine(seq[i]),
                _ => is_guanine(seq[i]),
            };
            if hit {
                let counts = acc.accumulate(kind, name, pos, window.active())?;
                writer.write_site(name, pos, kind, &counts)?;
                sites += 1;
            }
        }
    }
    Ok(sites)
}

fn display_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
