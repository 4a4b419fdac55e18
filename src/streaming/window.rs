//! Coordinate window over the mapped-read stream.
//!
//! The window tracks, for a scan position moving left to right along one
//! chromosome, which mapped reads can overlap it. Reads enter at the tail
//! once the scan reaches their start and leave at the head once the scan
//! passes their end. Both ends only move forward, so the whole chromosome
//! costs O(length + reads).

use crate::error::Result;
use crate::interval::GenomicInterval;
use crate::streaming::cursor::DualStreamCursor;

/// Window of mapped reads overlapping the current scan range.
pub struct WindowManager<I, S, R> {
    cursor: DualStreamCursor<I, S, R>,
    first: u64,
    last: u64,
    max_window: usize,
}

impl<I, S, R> WindowManager<I, S, R>
where
    I: Iterator<Item = Result<GenomicInterval>>,
    S: Iterator<Item = Result<R>>,
{
    pub fn new(cursor: DualStreamCursor<I, S, R>) -> Self {
        Self {
            cursor,
            first: 0,
            last: 0,
            max_window: 0,
        }
    }

    /// Skip every read on a chromosome that sorts before `chrom`.
    ///
    /// Returns the number of reads dropped from the head.
    pub fn advance_chromosome(&mut self, chrom: &str) -> Result<usize> {
        self.cursor.advance_tail_while(|iv| iv.chrom_before(chrom))?;
        let dropped = self.cursor.advance_head_while(|iv| iv.chrom_before(chrom))?;
        self.first = 0;
        self.last = 0;
        Ok(dropped)
    }

    /// Move the window to the closed scan range `[first, last]` on `chrom`.
    ///
    /// Reads starting at or before `last` are pulled in at the tail; reads
    /// ending at or before `first` are dropped from the head.
    pub fn advance_window(&mut self, first: u64, last: u64, chrom: &str) -> Result<()> {
        self.cursor
            .advance_tail_while(|iv| iv.same_chrom(chrom) && !iv.succeeds(last))?;
        self.cursor
            .advance_head_while(|iv| iv.same_chrom(chrom) && iv.precedes(first))?;
        self.first = first;
        self.last = last;
        self.max_window = self.max_window.max(self.cursor.tail() - self.cursor.head());
        Ok(())
    }

    /// Reads overlapping the current scan range.
    ///
    /// The head only drops reads in start order, so a short read behind a
    /// long one may linger in `[head, tail)` after it has ended; it is
    /// filtered out here.
    pub fn active(&self) -> impl Iterator<Item = (&GenomicInterval, &R)> {
        let (first, last) = (self.first, self.last);
        self.cursor
            .range()
            .filter(move |(iv, _)| iv.overlaps_range(first, last))
    }

    /// False once every mapped read has been dropped.
    pub fn head_is_valid(&mut self) -> Result<bool> {
        self.cursor.head_is_valid()
    }

    /// True while reads remain that have not yet entered the window.
    pub fn has_pending(&mut self) -> Result<bool> {
        self.cursor.tail_is_valid()
    }

    /// Stream index of the first read still in the window.
    pub fn head(&self) -> usize {
        self.cursor.head()
    }

    /// Stream index one past the last read pulled into the window.
    pub fn tail(&self) -> usize {
        self.cursor.tail()
    }

    /// Largest `[head, tail)` span seen.
    pub fn max_window(&self) -> usize {
        self.max_window
    }

    pub fn max_buffered(&self) -> usize {
        self.cursor.max_buffered()
    }
}
