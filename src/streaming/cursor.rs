//! Bounded dual-stream cursor over mapped locations and their reads.
//!
//! The mapped file and the reads file are two parallel streams: record `k`
//! of one belongs to record `k` of the other. The cursor pulls both in
//! lock-step into a single deque of pairs, so the two can never drift apart
//! in memory, and exposes a head and a tail index over it.
//!
//! Indices are absolute stream positions. The deque always starts at the
//! head; pairs behind the head are released as soon as the head moves past
//! them.
//!
//! # Memory Complexity
//!
//! O(B) where B is the configured capacity, plus any excess of the active
//! window over B (the window is never truncated).

use crate::error::{MethError, Result};
use crate::interval::GenomicInterval;
use log::debug;
use std::collections::VecDeque;

/// Cursor over two index-aligned streams.
pub struct DualStreamCursor<I, S, R> {
    intervals: I,
    records: S,
    /// Pairs `[head, head + buffer.len())`.
    buffer: VecDeque<(GenomicInterval, R)>,
    head: usize,
    tail: usize,
    capacity: usize,
    exhausted: bool,
    /// Largest number of pairs held at once (for statistics).
    max_buffered: usize,
    refills: usize,
}

impl<I, S, R> DualStreamCursor<I, S, R>
where
    I: Iterator<Item = Result<GenomicInterval>>,
    S: Iterator<Item = Result<R>>,
{
    /// Create a cursor that buffers up to `capacity` pairs per refill.
    pub fn new(intervals: I, records: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            intervals,
            records,
            buffer: VecDeque::new(),
            head: 0,
            tail: 0,
            capacity,
            exhausted: false,
            max_buffered: 0,
            refills: 0,
        }
    }

    /// One past the last stream index currently buffered.
    #[inline]
    fn loaded(&self) -> usize {
        self.head + self.buffer.len()
    }

    /// Make sure `index` is buffered if the inputs still have it.
    #[inline]
    fn ensure(&mut self, index: usize) -> Result<bool> {
        while index >= self.loaded() && !self.exhausted {
            self.refill()?;
        }
        Ok(index < self.loaded())
    }

    /// Read the next block of pairs from both sources.
    ///
    /// Reads until the buffer holds `capacity` pairs, or a single pair when
    /// the active window has already filled it.
    fn refill(&mut self) -> Result<()> {
        let wanted = self.capacity.saturating_sub(self.buffer.len()).max(1);
        if self.buffer.len() >= self.capacity {
            debug!(
                "active window of {} pairs exceeds buffer capacity {}",
                self.buffer.len(),
                self.capacity
            );
        }
        self.buffer
            .try_reserve(wanted)
            .map_err(|_| MethError::OutOfMemory)?;

        for _ in 0..wanted {
            match (self.intervals.next(), self.records.next()) {
                (Some(interval), Some(record)) => {
                    self.buffer.push_back((interval?, record?));
                }
                (None, None) => {
                    self.exhausted = true;
                    break;
                }
                (Some(_), None) => {
                    return Err(MethError::Desynchronized {
                        index: self.loaded(),
                        exhausted: "reads",
                    });
                }
                (None, Some(_)) => {
                    return Err(MethError::Desynchronized {
                        index: self.loaded(),
                        exhausted: "mapped",
                    });
                }
            }
        }

        self.refills += 1;
        self.max_buffered = self.max_buffered.max(self.buffer.len());
        debug!(
            "cursor refill #{}: {} pairs buffered from index {}",
            self.refills,
            self.buffer.len(),
            self.head
        );
        Ok(())
    }

    /// False only once the head has passed the end of both inputs.
    pub fn head_is_valid(&mut self) -> Result<bool> {
        self.ensure(self.head)
    }

    /// False only once the tail has passed the end of both inputs.
    pub fn tail_is_valid(&mut self) -> Result<bool> {
        self.ensure(self.tail)
    }

    pub fn peek_at_head(&mut self) -> Result<Option<(&GenomicInterval, &R)>> {
        if !self.ensure(self.head)? {
            return Ok(None);
        }
        Ok(self.buffer.front().map(|(iv, r)| (iv, r)))
    }

    pub fn peek_at_tail(&mut self) -> Result<Option<(&GenomicInterval, &R)>> {
        if !self.ensure(self.tail)? {
            return Ok(None);
        }
        let offset = self.tail - self.head;
        Ok(self.buffer.get(offset).map(|(iv, r)| (iv, r)))
    }

    /// Drop the head pair. The tail is pulled along if the head catches up.
    pub fn advance_head(&mut self) -> Result<()> {
        if self.ensure(self.head)? {
            self.buffer.pop_front();
            self.head += 1;
            if self.tail < self.head {
                self.tail = self.head;
            }
        }
        Ok(())
    }

    /// Include the tail pair in `[head, tail)`.
    pub fn advance_tail(&mut self) -> Result<()> {
        if self.ensure(self.tail)? {
            self.tail += 1;
        }
        Ok(())
    }

    /// Advance the tail while `condition` holds for the tail interval.
    ///
    /// Returns the number of pairs included.
    pub fn advance_tail_while<F>(&mut self, mut condition: F) -> Result<usize>
    where
        F: FnMut(&GenomicInterval) -> bool,
    {
        let start = self.tail;
        loop {
            let take = match self.peek_at_tail()? {
                Some((iv, _)) => condition(iv),
                None => false,
            };
            if !take {
                break;
            }
            self.tail += 1;
        }
        Ok(self.tail - start)
    }

    /// Advance the head while `condition` holds for the head interval.
    ///
    /// Returns the number of pairs dropped.
    pub fn advance_head_while<F>(&mut self, mut condition: F) -> Result<usize>
    where
        F: FnMut(&GenomicInterval) -> bool,
    {
        let start = self.head;
        loop {
            let drop = match self.peek_at_head()? {
                Some((iv, _)) => condition(iv),
                None => false,
            };
            if !drop {
                break;
            }
            self.advance_head()?;
        }
        Ok(self.head - start)
    }

    /// Pairs in `[head, tail)`, in stream order.
    pub fn range(&self) -> impl Iterator<Item = (&GenomicInterval, &R)> {
        self.buffer
            .range(..self.tail - self.head)
            .map(|(iv, r)| (iv, r))
    }

    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Number of pairs currently held in memory.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn max_buffered(&self) -> usize {
        self.max_buffered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Strand;

    fn iv(start: u64, end: u64) -> GenomicInterval {
        GenomicInterval::new("chr1", start, end, 0.0, Strand::Plus)
    }

    fn cursor(
        intervals: Vec<GenomicInterval>,
        records: Vec<u32>,
        capacity: usize,
    ) -> DualStreamCursor<
        std::vec::IntoIter<Result<GenomicInterval>>,
        std::vec::IntoIter<Result<u32>>,
        u32,
    > {
        let a: Vec<Result<GenomicInterval>> = intervals.into_iter().map(Ok).collect();
        let b: Vec<Result<u32>> = records.into_iter().map(Ok).collect();
        DualStreamCursor::new(a.into_iter(), b.into_iter(), capacity)
    }

    #[test]
    fn test_pairs_stay_aligned_across_refills() {
        let intervals: Vec<_> = (0..10).map(|i| iv(i, i + 5)).collect();
        let records: Vec<u32> = (0..10).collect();
        let mut c = cursor(intervals, records, 3);

        for k in 0..10u32 {
            let (interval, record) = c.peek_at_head().unwrap().unwrap();
            assert_eq!(interval.start, k as u64);
            assert_eq!(*record, k);
            c.advance_head().unwrap();
        }
        assert!(!c.head_is_valid().unwrap());
        assert!(!c.tail_is_valid().unwrap());
    }

    #[test]
    fn test_buffer_is_bounded() {
        let intervals: Vec<_> = (0..100).map(|i| iv(i, i + 1)).collect();
        let records: Vec<u32> = (0..100).collect();
        let mut c = cursor(intervals, records, 8);

        while c.head_is_valid().unwrap() {
            c.advance_tail().unwrap();
            c.advance_head().unwrap();
            assert!(c.buffered() <= 8);
        }
        assert!(c.max_buffered() <= 8);
    }

    #[test]
    fn test_window_larger_than_capacity_grows() {
        let intervals: Vec<_> = (0..6).map(|i| iv(i, 100)).collect();
        let records: Vec<u32> = (0..6).collect();
        let mut c = cursor(intervals, records, 2);

        let taken = c.advance_tail_while(|_| true).unwrap();
        assert_eq!(taken, 6);
        assert_eq!(c.range().count(), 6);
        assert_eq!(c.range().map(|(_, r)| *r).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_head_pulls_tail() {
        let mut c = cursor(vec![iv(0, 1), iv(1, 2)], vec![7, 8], 4);

        c.advance_head().unwrap();
        assert_eq!(c.head(), 1);
        assert_eq!(c.tail(), 1);
        assert_eq!(*c.peek_at_tail().unwrap().unwrap().1, 8);
    }

    #[test]
    fn test_desynchronized_reads_short() {
        let mut c = cursor(vec![iv(0, 1), iv(1, 2), iv(2, 3)], vec![1, 2], 10);

        let err = c.head_is_valid().unwrap_err();
        match err {
            MethError::Desynchronized { index, exhausted } => {
                assert_eq!(index, 2);
                assert_eq!(exhausted, "reads");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_desynchronized_mapped_short() {
        let mut c = cursor(vec![iv(0, 1)], vec![1, 2], 10);

        assert!(matches!(
            c.tail_is_valid(),
            Err(MethError::Desynchronized {
                exhausted: "mapped",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_inputs() {
        let mut c = cursor(vec![], vec![], 10);
        assert!(!c.head_is_valid().unwrap());
        assert!(c.peek_at_head().unwrap().is_none());
        c.advance_head().unwrap();
        assert_eq!(c.head(), 0);
    }
}
