//! methcounts: count methylated and unmethylated reads over each CpG or C.
//!
//! Usage: methcounts -c <chroms> -m <mapped> [OPTIONS] <READS>

use clap::Parser;
use std::path::PathBuf;
use std::process;

use bsmeth::commands::{MethcountsCommand, MethcountsInputs};
use bsmeth::config::{ScanConfig, ScanMode};
use bsmeth::streaming::buffers::DEFAULT_PAIR_BUFFER;
use bsmeth::MethError;

#[derive(Parser)]
#[command(name = "methcounts")]
#[command(version)]
#[command(
    about = "a program for counting the methylated and unmethylated reads mapping over each CpG or C",
    long_about = None
)]
struct Cli {
    /// Reads file (FASTA or FASTQ), in the same order as the mapped file
    reads: PathBuf,

    /// Name of output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// FASTA file or dir containing chromosome(s)
    #[arg(short, long)]
    chrom: PathBuf,

    /// Suffix of FASTA files (assumes -c indicates dir)
    #[arg(short, long, default_value = "fa")]
    suffix: String,

    /// File of mapped locations (BED6, sorted by chrom and start)
    #[arg(short, long)]
    mapped: PathBuf,

    /// Process non-CpG cytosines
    #[arg(short = 'N', long)]
    non: bool,

    /// Buffer size (in records, not bytes)
    #[arg(short = 'B', long, default_value_t = DEFAULT_PAIR_BUFFER)]
    buffer: usize,

    /// Max mismatches (can be fractional)
    #[arg(short = 'M', long)]
    max: Option<f64>,

    /// Cutoff for high-quality bases, as an error probability (assumes FASTQ reads)
    #[arg(short = 'C', long)]
    cutoff: Option<f64>,

    /// Print more run info
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ScanConfig {
        mode: if cli.non {
            ScanMode::AllCytosines
        } else {
            ScanMode::CpG
        },
        max_mismatches: cli.max.unwrap_or(f64::MAX),
        quality_cutoff: cli.cutoff,
        buffer_size: cli.buffer,
    };
    let inputs = MethcountsInputs {
        chrom_path: cli.chrom,
        fasta_suffix: cli.suffix,
        mapped_path: cli.mapped,
        reads_path: cli.reads,
        output: cli.output,
    };

    let result = MethcountsCommand::new(config).run_paths(&inputs);

    if let Err(e) = result {
        match e {
            MethError::OutOfMemory => eprintln!("ERROR: could not allocate memory"),
            e => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}
