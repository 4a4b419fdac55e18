// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! bsmeth: methylation counts from bisulfite-sequencing reads.
//!
//! This library scans a reference genome once, left to right, while
//! streaming sorted mapped reads alongside it, and reports for each CpG (or
//! each C and G) how many overlapping reads show a methylated cytosine and
//! how many show a converted one.
//!
//! # Features
//!
//! - **Streaming I/O**: bounded memory regardless of read count
//! - **Strand aware**: plus- and minus-strand reads counted at the right base
//! - **Filtering**: mismatch and base-quality cutoffs
//!
//! # Example
//!
//! ```rust,no_run
//! use bsmeth::commands::{MethcountsCommand, MethcountsInputs};
//! use bsmeth::config::ScanConfig;
//!
//! let inputs = MethcountsInputs {
//!     chrom_path: "hg19/".into(),
//!     fasta_suffix: "fa".to_string(),
//!     mapped_path: "reads.mapped.bed".into(),
//!     reads_path: "reads.fq".into(),
//!     output: Some("methcounts.txt".into()),
//! };
//! let stats = MethcountsCommand::new(ScanConfig::default())
//!     .run_paths(&inputs)
//!     .unwrap();
//! println!("{}", stats);
//! ```

pub mod commands;
pub mod config;
pub mod contribution;
pub mod epiread;
pub mod error;
pub mod interval;
pub mod mapped;
pub mod quality;
pub mod reads;
pub mod reference;
pub mod streaming;

// Re-export commonly used types
pub use error::{MethError, Result};
pub use interval::{GenomicInterval, Strand};
pub use mapped::MappedReader;
pub use reads::{QualityRead, ReadEvidence, SequenceRead};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{MethcountsCommand, MethcountsInputs, ScanStats};
    pub use crate::config::{ScanConfig, ScanMode};
    pub use crate::contribution::{ContributionAccumulator, SiteCounts, SiteKind};
    pub use crate::error::{MethError, Result};
    pub use crate::interval::{GenomicInterval, Strand};
    pub use crate::reads::{QualityRead, ReadEvidence, SequenceRead};
    pub use crate::reference::ChromosomeSequence;
    pub use crate::streaming::{DualStreamCursor, SiteWriter, WindowManager};
}
