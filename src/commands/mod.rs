//! Command implementations for bsmeth.

pub mod methcounts;

pub use methcounts::{MethcountsCommand, MethcountsInputs, ScanStats};
