//! Reference chromosome discovery and loading.
//!
//! The reference is either a single FASTA file or a directory of FASTA files
//! selected by suffix. Files are scanned in sorted path order, and the
//! sequences of one file in sorted name order, one file in memory at a time.

use crate::error::{MethError, Result};
use crate::streaming::buffers::DEFAULT_INPUT_BUFFER;
use bio::io::fasta;
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// One named reference sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeSequence {
    pub name: String,
    pub seq: Vec<u8>,
}

impl ChromosomeSequence {
    pub fn new(name: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            seq: seq.into(),
        }
    }
}

/// List the FASTA files making up the reference.
///
/// A directory yields its files ending in `.<suffix>`; a file yields itself.
/// The result is sorted.
pub fn identify_chromosome_files<P: AsRef<Path>>(path: P, suffix: &str) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let mut files = Vec::new();

    if path.is_dir() {
        let wanted = format!(".{}", suffix.trim_start_matches('.'));
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();
            let matches = file_path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&wanted));
            if matches && file_path.is_file() {
                files.push(file_path);
            }
        }
        if files.is_empty() {
            return Err(MethError::Usage(format!(
                "no files ending in '{}' found in {}",
                wanted,
                path.display()
            )));
        }
    } else {
        files.push(path.to_path_buf());
    }

    files.sort();

    for f in &files {
        let size = fs::metadata(f).map(|m| m.len()).unwrap_or(0);
        info!("chromosome file {} ({} Mbp)", f.display(), (size as f64 / 1e6).round());
    }
    Ok(files)
}

/// Load every sequence of a FASTA file, sorted by name and uppercased.
pub fn load_chromosomes<P: AsRef<Path>>(path: P) -> Result<Vec<ChromosomeSequence>> {
    let file = File::open(path)?;
    read_chromosomes(file)
}

/// Read sequences from any FASTA source.
pub fn read_chromosomes<R: Read>(reader: R) -> Result<Vec<ChromosomeSequence>> {
    let reader = fasta::Reader::from_bufread(BufReader::with_capacity(DEFAULT_INPUT_BUFFER, reader));
    let mut chroms = Vec::new();

    for record in reader.records() {
        let record = record?;
        let mut seq = Vec::new();
        seq.try_reserve_exact(record.seq().len())
            .map_err(|_| MethError::OutOfMemory)?;
        seq.extend(record.seq().iter().map(|b| b.to_ascii_uppercase()));
        chroms.push(ChromosomeSequence::new(record.id(), seq));
    }

    chroms.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(chroms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_chromosomes_sorted_and_uppercased() {
        let fasta = ">chr2 second\nacgt\nNN\n>chr1\nCGCG\n";
        let chroms = read_chromosomes(fasta.as_bytes()).unwrap();

        assert_eq!(chroms.len(), 2);
        assert_eq!(chroms[0].name, "chr1");
        assert_eq!(chroms[1].name, "chr2");
        assert_eq!(chroms[1].seq, b"ACGTNN");
    }

    #[test]
    fn test_identify_files_in_directory() {
        let dir = tempdir().unwrap();
        for name in ["chr2.fa", "chr1.fa", "notes.txt"] {
            let mut f = File::create(dir.path().join(name)).unwrap();
            writeln!(f, ">x\nACGT").unwrap();
        }

        let files = identify_chromosome_files(dir.path(), "fa").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["chr1.fa", "chr2.fa"]);
    }

    #[test]
    fn test_identify_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genome.fasta");
        File::create(&path).unwrap();

        let files = identify_chromosome_files(&path, "fa").unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_empty_directory_is_usage_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            identify_chromosome_files(dir.path(), "fa"),
            Err(MethError::Usage(_))
        ));
    }
}
