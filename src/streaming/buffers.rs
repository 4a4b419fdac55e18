//! Buffer size constants for streaming operations.
//!
//! These constants control memory usage vs I/O throughput tradeoffs.

/// Default output buffer size (2 MB).
pub const DEFAULT_OUTPUT_BUFFER: usize = 2 * 1024 * 1024;

/// Default input buffer size (256 KB).
/// Used for the mapped file, the reads file and reference FASTA files.
pub const DEFAULT_INPUT_BUFFER: usize = 256 * 1024;

/// Default number of mapped-read pairs held by the dual-stream cursor.
pub const DEFAULT_PAIR_BUFFER: usize = 100_000;
