//! zstd-compressed annotation blobs
//!
//! A compressed blob is a single zstd frame wrapping the output of [`crate::write_annot`].
//! Decompression stops once the reader's `max_decompressed_length` is exceeded.

use std::io::{Read, Write};
use std::path::Path;

use zstd::stream::{copy_encode, read::Decoder};

use crate::snp::write_annot;
use crate::{Result, SnpTable, SnpTableReader, error::ReadError};

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Writes the annotation blob of `table` as one zstd frame
pub fn write_compressed_annot<W: Write>(writer: &mut W, table: &SnpTable, level: i32) -> Result<()> {
    let mut ubuf = Vec::new();
    write_annot(&mut ubuf, table)?;

    let mut zbuf = Vec::new();
    copy_encode(ubuf.as_slice(), &mut zbuf, level)?;
    writer.write_all(&zbuf)?;

    tracing::debug!(
        uncompressed = ubuf.len(),
        compressed = zbuf.len(),
        level,
        "wrote compressed annotation"
    );
    Ok(())
}

impl SnpTable {
    /// Serializes the table and its complex features into a compressed buffer
    pub fn to_compressed_annot_bytes(&self, level: i32) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        write_compressed_annot(&mut buf, self, level)?;
        Ok(buf)
    }
}

impl SnpTableReader {
    /// Reads a blob written by [`write_compressed_annot`]
    pub fn read_compressed_annot<R: Read>(&self, reader: R) -> Result<SnpTable> {
        let max_length = self.max_decompressed_length;
        let limit = u64::try_from(max_length).map_or(u64::MAX, |limit| limit.saturating_add(1));

        let mut ubuf = Vec::new();
        Decoder::new(reader)?.take(limit).read_to_end(&mut ubuf)?;
        if ubuf.len() > max_length {
            return Err(ReadError::DecompressedTooLarge {
                field: "compressed annotation",
                max_length,
            }
            .into());
        }
        self.read_annot_bytes(&ubuf)
    }

    /// Reads a compressed annotation blob from a file by memory mapping it
    pub fn read_compressed_annot_path<P: AsRef<Path>>(&self, path: P) -> Result<SnpTable> {
        let mmap = crate::snp::map_file(path)?;
        self.read_compressed_annot(&mmap[..])
    }
}
