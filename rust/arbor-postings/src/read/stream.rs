//! Block stream decoder: parses the header, trailer and block index of a
//! sealed sub-stream resource and hands out pull-based cursors.

use std::{ops::Range, sync::Arc};

use arbor_common::{Result, error::Error, verify_arg, verify_data};
use arbor_encodings::{
    block_codec::{BlockDecompressor, CompressorId},
    varint,
};
use arbor_io::ReadAt;
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use log::debug;

use crate::{HEADER_SIZE, TRAILER_SIZE, index::BlockIndex};

/// Decoded view over one sealed sub-stream resource.
///
/// The reader owns the parsed header and block index; it is immutable and may
/// be shared across threads. Each consumer obtains its own [`BlockCursor`],
/// which carries the per-consumer decompression state.
pub struct BlockStreamReader {
    resource: Arc<dyn ReadAt>,
    block_size: usize,
    compressor_id: CompressorId,
    index: BlockIndex,
}

impl BlockStreamReader {
    /// Opens a sealed resource: reads the fixed trailer to locate the block
    /// index, then the header for the writer-side configuration.
    ///
    /// Any framing inconsistency (short resource, index out of bounds,
    /// unrecognized compressor id) is a format violation.
    pub fn open(resource: Arc<dyn ReadAt>) -> Result<Arc<BlockStreamReader>> {
        let size = resource.size().map_err(|e| Error::io("resource size", e))?;
        verify_data!("stream", size >= HEADER_SIZE + TRAILER_SIZE);

        let trailer = read_exact(&resource, size - TRAILER_SIZE..size)?;
        let index_offset = LittleEndian::read_u64(&trailer[0..8]);
        let block_count = LittleEndian::read_u32(&trailer[8..12]);
        verify_data!("stream trailer", index_offset >= HEADER_SIZE);
        verify_data!("stream trailer", index_offset <= size - TRAILER_SIZE);

        let header = read_exact(&resource, 0..HEADER_SIZE)?;
        let block_size = LittleEndian::read_u32(&header[0..4]) as usize;
        verify_data!("stream header", block_size > 0);
        verify_data!("stream header", block_size <= u16::MAX as usize);
        let compressor_id = CompressorId::from_u8(header[4])?;

        let encoded_index = read_exact(&resource, index_offset..size - TRAILER_SIZE)?;
        let index = BlockIndex::parse(&encoded_index, block_count, index_offset)?;

        Ok(Arc::new(BlockStreamReader {
            resource,
            block_size,
            compressor_id,
            index,
        }))
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn compressor_id(&self) -> CompressorId {
        self.compressor_id
    }

    pub fn block_count(&self) -> u32 {
        self.index.block_count()
    }

    /// Creates a cursor positioned before the first block. Cursors are
    /// independent: each owns its decompression buffer and may be driven from
    /// its own thread.
    pub fn cursor(self: &Arc<Self>) -> BlockCursor {
        BlockCursor {
            reader: self.clone(),
            decompressor: self.compressor_id.decompressor(),
            raw: Bytes::new(),
            values: Vec::with_capacity(self.block_size),
            value_pos: 0,
            decoded: true,
            next_ordinal: 0,
        }
    }
}

/// Pull-based consumer of one sub-stream.
///
/// The consumption loop is: `if cursor.is_exhausted() { cursor.next_block()?; }
/// let v = cursor.next_value()?;`. Calling [`next_value`] while exhausted
/// without first advancing is a caller bug and fails rather than repairing
/// itself; decompression failures are fatal for the cursor.
///
/// [`next_value`]: BlockCursor::next_value
pub struct BlockCursor {
    reader: Arc<BlockStreamReader>,
    decompressor: Box<dyn BlockDecompressor>,
    /// Undecoded payload of the current block (shrinks when values are
    /// skipped before decoding).
    raw: Bytes,
    /// Decompression buffer, reused across blocks, owned by this cursor only.
    values: Vec<u32>,
    value_pos: usize,
    decoded: bool,
    next_ordinal: u32,
}

impl BlockCursor {
    /// True when all values of the currently loaded block have been consumed
    /// (and immediately after creation, before any block is loaded).
    pub fn is_exhausted(&self) -> bool {
        if self.decoded {
            self.value_pos >= self.values.len()
        } else {
            self.raw.is_empty()
        }
    }

    /// Ordinal of the next block a sequential [`next_block`] will load.
    ///
    /// [`next_block`]: BlockCursor::next_block
    pub fn next_ordinal(&self) -> u32 {
        self.next_ordinal
    }

    /// Loads and positions on the next block in sequence. Advancing past the
    /// last block is an error: the stream has no trailing block beyond what
    /// the index records.
    pub fn next_block(&mut self) -> Result<()> {
        if self.next_ordinal >= self.reader.block_count() {
            return Err(Error::invalid_operation("next_block past the last block"));
        }
        self.load_block(self.next_ordinal)
    }

    /// Seeks directly to the block with the given ordinal using the block
    /// index, skipping decompression of all preceding blocks.
    pub fn seek_block(&mut self, ordinal: u32) -> Result<()> {
        verify_arg!(ordinal, ordinal < self.reader.block_count());
        debug!("seek to block {ordinal}");
        self.load_block(ordinal)
    }

    /// Returns the next raw integer of the current block.
    pub fn next_value(&mut self) -> Result<u32> {
        self.ensure_decoded()?;
        if self.value_pos >= self.values.len() {
            return Err(Error::invalid_operation("next_value on an exhausted block"));
        }
        let value = self.values[self.value_pos];
        self.value_pos += 1;
        Ok(value)
    }

    /// Skips up to `n` values within the current block, returning how many
    /// were skipped. When the block has not been decoded yet, codecs that can
    /// address values in their encoded form avoid decompressing the skipped
    /// prefix.
    pub fn skip(&mut self, n: usize) -> Result<usize> {
        if n == 0 || self.is_exhausted() {
            return Ok(0);
        }
        let mut skipped = 0;
        if !self.decoded {
            let (s, pos) = self.decompressor.skip(&self.raw, n)?;
            self.raw = self.raw.slice(pos..);
            skipped = s;
        }
        if skipped < n && !self.is_exhausted() {
            self.ensure_decoded()?;
            let rest = (n - skipped).min(self.values.len() - self.value_pos);
            self.value_pos += rest;
            skipped += rest;
        }
        Ok(skipped)
    }

    fn load_block(&mut self, ordinal: u32) -> Result<()> {
        let extent = self.reader.index.block_extent(ordinal)?;
        let block = read_exact(&self.reader.resource, extent)?;

        // Per-block framing: [compressed_len vint][payload].
        let mut pos = 0;
        let compressed_len = varint::read_vu64(&block, &mut pos)? as usize;
        verify_data!("block framing", pos + compressed_len == block.len());

        self.raw = block.slice(pos..);
        self.values.clear();
        self.value_pos = 0;
        self.decoded = false;
        self.next_ordinal = ordinal + 1;
        Ok(())
    }

    fn ensure_decoded(&mut self) -> Result<()> {
        if self.decoded {
            return Ok(());
        }
        self.values.clear();
        self.decompressor.decompress(&self.raw, &mut self.values)?;
        verify_data!("block", self.values.len() <= self.reader.block_size);
        self.value_pos = 0;
        self.decoded = true;
        self.raw = Bytes::new();
        Ok(())
    }
}

/// Reads a byte range that must be fully present; a short read means the
/// resource was truncated and is surfaced as a format violation.
fn read_exact(resource: &Arc<dyn ReadAt>, range: Range<u64>) -> Result<Bytes> {
    let len = (range.end - range.start) as usize;
    let bytes = resource
        .read_at(range)
        .map_err(|e| Error::io("read_at", e))?;
    verify_data!("resource", bytes.len() == len);
    Ok(bytes)
}
