//! Block stream encoder: accumulates one sub-stream's integers into a
//! fixed-capacity block buffer, compresses full blocks, and maintains the
//! block index.

use arbor_common::{Result, error::Error, verify_arg};
use arbor_encodings::{
    block_codec::{BlockCompressor, CompressorId},
    varint,
};
use arbor_io::SealingWrite;
use log::debug;

use crate::{HEADER_SIZE, index::BlockIndexEncoder};

/// `BlockStreamWriter` drives a single sub-stream (docs, frequencies, node
/// ids or positions) of a posting list.
///
/// Callers push integers one at a time and flush when [`is_full`] reports the
/// block buffer has reached capacity; a shorter buffer is only flushed by
/// [`close`], producing the stream's terminal partial block. The per-block
/// buffer goes through `EMPTY -> ACCUMULATING -> FULL -> (flush) -> EMPTY`.
///
/// One writer exclusively owns its output resource; concurrent writers to the
/// same resource are prevented by the indexing pipeline above this layer.
///
/// [`is_full`]: BlockStreamWriter::is_full
/// [`close`]: BlockStreamWriter::close
pub struct BlockStreamWriter {
    sink: Box<dyn SealingWrite>,
    block_size: usize,
    compressor: Box<dyn BlockCompressor>,
    /// Raw integers of the block being accumulated.
    buffer: Vec<u32>,
    /// Compression scratch, sized once from `max_compressed_size` and reused
    /// across flushes.
    scratch: Vec<u8>,
    index: BlockIndexEncoder,
    /// Current write position in the resource.
    pos: u64,
    /// Total values accepted over the stream's lifetime.
    value_count: u64,
}

impl BlockStreamWriter {
    /// Creates a writer over a fresh resource and writes the stream header, so
    /// a reader can later be opened without the writer-side configuration.
    pub fn new(
        mut sink: Box<dyn SealingWrite>,
        block_size: usize,
        compressor_id: CompressorId,
    ) -> Result<BlockStreamWriter> {
        verify_arg!(block_size, block_size > 0);
        verify_arg!(block_size, block_size <= u16::MAX as usize);

        let mut header = Vec::with_capacity(HEADER_SIZE as usize);
        header.extend_from_slice(&(block_size as u32).to_le_bytes());
        header.push(compressor_id.as_u8());
        sink.write_all(&header)
            .map_err(|e| Error::io("stream header", e))?;

        let compressor = compressor_id.compressor();
        let scratch = Vec::with_capacity(compressor.max_compressed_size(block_size));
        Ok(BlockStreamWriter {
            sink,
            block_size,
            compressor,
            buffer: Vec::with_capacity(block_size),
            scratch,
            index: BlockIndexEncoder::new(),
            pos: HEADER_SIZE,
            value_count: 0,
        })
    }

    /// True once the accumulated count equals the configured block size.
    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.block_size
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of values currently accumulated in the block buffer.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total values accepted so far, flushed or pending.
    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    /// Appends one integer to the current block.
    ///
    /// Calling this while [`is_full`](Self::is_full) is a contract violation:
    /// the caller must flush first.
    pub fn write(&mut self, value: u32) -> Result<()> {
        if self.is_full() {
            return Err(Error::invalid_operation("write on a full block buffer"));
        }
        self.buffer.push(value);
        self.value_count += 1;
        Ok(())
    }

    /// Compresses the accumulated block, appends it to the resource and
    /// records a block index entry. Flushing an empty buffer is a no-op, so
    /// the terminal flush in [`close`](Self::close) is idempotent.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.scratch.clear();
        self.compressor.compress(&self.buffer, &mut self.scratch)?;
        let bound = self.compressor.max_compressed_size(self.block_size);
        if self.scratch.len() > bound {
            // Compressor contract violation, not recoverable.
            return Err(Error::invalid_operation(
                "compressed block exceeds max_compressed_size",
            ));
        }

        let mut framing = Vec::with_capacity(10);
        varint::write_vu64(&mut framing, self.scratch.len() as u64);

        self.index.add_block(self.pos)?;
        self.sink
            .write_all(&framing)
            .map_err(|e| Error::io("block framing", e))?;
        self.sink
            .write_all(&self.scratch)
            .map_err(|e| Error::io("block data", e))?;
        self.pos += framing.len() as u64 + self.scratch.len() as u64;

        debug!(
            "flushed block {} ({} values, {} bytes)",
            self.index.block_count() - 1,
            self.buffer.len(),
            self.scratch.len()
        );
        self.buffer.clear();
        Ok(())
    }

    /// Flushes any trailing partial block, writes the block index and trailer,
    /// and seals the resource.
    pub fn close(mut self) -> Result<StreamStats> {
        self.flush()?;

        let index_offset = self.pos;
        let block_count = self.index.block_count() as u32;
        let encoded_index = std::mem::take(&mut self.index).finish();
        self.sink
            .write_all(&encoded_index)
            .map_err(|e| Error::io("block index", e))?;

        let mut trailer = Vec::with_capacity(crate::TRAILER_SIZE as usize);
        trailer.extend_from_slice(&index_offset.to_le_bytes());
        trailer.extend_from_slice(&block_count.to_le_bytes());
        self.sink
            .write_all(&trailer)
            .map_err(|e| Error::io("stream trailer", e))?;
        self.sink.seal().map_err(|e| Error::io("seal", e))?;

        debug!(
            "closed stream: {} blocks, {} values",
            block_count, self.value_count
        );
        Ok(StreamStats {
            block_count,
            value_count: self.value_count,
            size: index_offset + encoded_index.len() as u64 + crate::TRAILER_SIZE,
        })
    }
}

/// Summary of a closed stream, reported by [`BlockStreamWriter::close`].
#[derive(Debug, Clone, Copy)]
pub struct StreamStats {
    pub block_count: u32,
    pub value_count: u64,
    /// Total size of the sealed resource in bytes.
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use arbor_encodings::block_codec::CompressorId;
    use arbor_io::{Directory, IoContext, MemoryDirectory};

    use super::BlockStreamWriter;

    fn new_writer(dir: &MemoryDirectory, block_size: usize) -> BlockStreamWriter {
        let sink = dir.create_output("stream", IoContext::Default).unwrap();
        BlockStreamWriter::new(sink, block_size, CompressorId::VInt).unwrap()
    }

    #[test]
    fn test_empty_stream() {
        let dir = MemoryDirectory::new();
        let writer = new_writer(&dir, 64);
        let stats = writer.close().unwrap();
        assert_eq!(stats.block_count, 0);
        assert_eq!(stats.value_count, 0);
        // Header plus trailer only.
        assert_eq!(stats.size, 17);
        assert_eq!(
            dir.open_input("stream", IoContext::Default)
                .unwrap()
                .size()
                .unwrap(),
            17
        );
    }

    #[test]
    fn test_write_flush_cycle() {
        let dir = MemoryDirectory::new();
        let mut writer = new_writer(&dir, 4);
        for i in 0..10 {
            if writer.is_full() {
                writer.flush().unwrap();
            }
            writer.write(i).unwrap();
        }
        assert_eq!(writer.pending(), 2);
        let stats = writer.close().unwrap();
        // Two full blocks plus the terminal partial one.
        assert_eq!(stats.block_count, 3);
        assert_eq!(stats.value_count, 10);
    }

    #[test]
    fn test_write_on_full_buffer_is_an_error() {
        let dir = MemoryDirectory::new();
        let mut writer = new_writer(&dir, 2);
        writer.write(1).unwrap();
        writer.write(2).unwrap();
        assert!(writer.is_full());
        let err = writer.write(3).unwrap_err();
        assert!(matches!(
            err.kind(),
            arbor_common::error::ErrorKind::InvalidOperation { .. }
        ));
        // Flushing recovers the buffer for further writes.
        writer.flush().unwrap();
        writer.write(3).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let dir = MemoryDirectory::new();
        let mut writer = new_writer(&dir, 8);
        writer.flush().unwrap();
        writer.write(42).unwrap();
        writer.flush().unwrap();
        writer.flush().unwrap();
        let stats = writer.close().unwrap();
        assert_eq!(stats.block_count, 1);
    }

    #[test]
    fn test_rejects_zero_block_size() {
        let dir = MemoryDirectory::new();
        let sink = dir.create_output("bad", IoContext::Default).unwrap();
        assert!(BlockStreamWriter::new(sink, 0, CompressorId::VInt).is_err());
    }
}
