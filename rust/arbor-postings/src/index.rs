//! Encoder and decoder for the block index: the per-sub-stream table mapping
//! block ordinal to byte offset, recorded at flush time and read back to seek
//! directly to a block without decompressing its predecessors.

use std::ops::Range;

use arbor_common::{Result, verify_arg, verify_data};
use byteorder::{ByteOrder, LittleEndian};

use crate::HEADER_SIZE;

/// Size of one serialized entry: `(ordinal: u32 LE, offset: u64 LE)`.
pub const INDEX_ENTRY_SIZE: u64 = 12;

/// Accumulates block index entries on the write path.
///
/// Ordinals are assigned densely from zero; offsets must be strictly
/// increasing, which holds by construction since every flushed block is
/// non-empty.
#[derive(Default)]
pub struct BlockIndexEncoder {
    offsets: Vec<u64>,
}

impl BlockIndexEncoder {
    pub fn new() -> BlockIndexEncoder {
        Default::default()
    }

    pub fn block_count(&self) -> u64 {
        self.offsets.len() as u64
    }

    /// Records the next block, located at `offset` in the resource.
    pub fn add_block(&mut self, offset: u64) -> Result<()> {
        verify_arg!(offset, self.offsets.last().is_none_or(|&last| offset > last));
        verify_arg!("block count", self.offsets.len() < u32::MAX as usize);
        self.offsets.push(offset);
        Ok(())
    }

    /// Serializes the table as `block_count` entries of
    /// `(ordinal: u32 LE, offset: u64 LE)`.
    pub fn finish(self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(self.offsets.len() * INDEX_ENTRY_SIZE as usize);
        for (ordinal, &offset) in self.offsets.iter().enumerate() {
            encoded.extend_from_slice(&(ordinal as u32).to_le_bytes());
            encoded.extend_from_slice(&offset.to_le_bytes());
        }
        encoded
    }
}

/// The decoded block index of one sub-stream resource.
pub struct BlockIndex {
    offsets: Vec<u64>,
    /// End of the data section (start of the serialized index).
    data_end: u64,
}

impl BlockIndex {
    /// Parses a serialized index of exactly `block_count` entries, verifying
    /// dense ordinals and strictly increasing offsets within the data section.
    pub fn parse(encoded: &[u8], block_count: u32, data_end: u64) -> Result<BlockIndex> {
        verify_data!(
            "block index",
            encoded.len() as u64 == block_count as u64 * INDEX_ENTRY_SIZE
        );
        let mut offsets = Vec::with_capacity(block_count as usize);
        let mut prev = HEADER_SIZE;
        for (i, entry) in encoded.chunks_exact(INDEX_ENTRY_SIZE as usize).enumerate() {
            let ordinal = LittleEndian::read_u32(&entry[0..4]);
            let offset = LittleEndian::read_u64(&entry[4..12]);
            verify_data!("block index", ordinal as usize == i);
            verify_data!("block index", offset >= prev);
            verify_data!("block index", i == 0 || offset > prev);
            verify_data!("block index", offset < data_end);
            offsets.push(offset);
            prev = offset;
        }
        Ok(BlockIndex { offsets, data_end })
    }

    pub fn block_count(&self) -> u32 {
        self.offsets.len() as u32
    }

    /// Byte extent of the block with the given ordinal: from its recorded
    /// offset to the next block's offset (or the end of the data section).
    pub fn block_extent(&self, ordinal: u32) -> Result<Range<u64>> {
        verify_arg!(ordinal, (ordinal as usize) < self.offsets.len());
        let start = self.offsets[ordinal as usize];
        let end = self
            .offsets
            .get(ordinal as usize + 1)
            .copied()
            .unwrap_or(self.data_end);
        Ok(start..end)
    }
}
