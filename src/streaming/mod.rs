//! Streaming machinery shared by the methcounts scan.
//!
//! This module provides:
//! - A bounded cursor pairing the mapped-locations stream with the reads stream
//! - The coordinate window built on that cursor
//! - Zero-allocation field parsing
//! - Efficient output formatting
//!
//! Memory stays O(B + k) where B = cursor capacity and k = max overlapping reads.

pub mod buffers;
pub mod cursor;
pub mod output;
pub mod parsing;
pub mod window;

pub use cursor::DualStreamCursor;
pub use output::SiteWriter;
pub use parsing::{parse_score, parse_u64_fast, should_skip_line};
pub use window::WindowManager;
