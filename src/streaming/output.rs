//! Efficient output formatting for methylation rows.
//!
//! Uses itoa for integer formatting and ryu for float formatting
//! to avoid allocation in the hot path.

use crate::contribution::{SiteCounts, SiteKind};
use crate::error::Result;
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;
use std::io::{BufWriter, Write};

/// Buffered writer for site rows:
/// `chrom  start  start+1  KIND:total  fraction  +`.
///
/// The strand column is always `+`: positions are reported on the forward
/// reference strand whichever strand the evidence came from.
pub struct SiteWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
    rows: u64,
}

impl<W: Write> SiteWriter<W> {
    /// Create a new SiteWriter with the default 2MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
            rows: 0,
        }
    }

    /// Write one site row.
    #[inline]
    pub fn write_site(
        &mut self,
        chrom: &str,
        position: u64,
        kind: SiteKind,
        counts: &SiteCounts,
    ) -> Result<()> {
        let w = &mut self.writer;
        w.write_all(chrom.as_bytes())?;
        w.write_all(b"\t")?;
        w.write_all(self.itoa_buf.format(position).as_bytes())?;
        w.write_all(b"\t")?;
        w.write_all(self.itoa_buf.format(position + 1).as_bytes())?;
        w.write_all(b"\t")?;
        w.write_all(kind.label().as_bytes())?;
        w.write_all(b":")?;
        w.write_all(self.itoa_buf.format(counts.total()).as_bytes())?;
        w.write_all(b"\t")?;
        w.write_all(self.ryu_buf.format(counts.fraction()).as_bytes())?;
        w.write_all(b"\t+\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_site() {
        let mut output = Vec::new();
        {
            let mut writer = SiteWriter::new(&mut output);
            writer
                .write_site("chr1", 1, SiteKind::CpG, &SiteCounts { meth: 1, unmeth: 0 })
                .unwrap();
            writer
                .write_site("chr1", 7, SiteKind::G, &SiteCounts { meth: 1, unmeth: 1 })
                .unwrap();
            writer
                .write_site("chr2", 0, SiteKind::C, &SiteCounts::default())
                .unwrap();
            assert_eq!(writer.rows(), 3);
            writer.flush().unwrap();
        }
        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "chr1\t1\t2\tCpG:1\t1.0\t+\nchr1\t7\t8\tG:2\t0.5\t+\nchr2\t0\t1\tC:0\t0.0\t+\n"
        );
    }
}
