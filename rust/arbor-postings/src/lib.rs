//! Block-oriented compressed postings streams.
//!
//! A posting list for a (field, term) pair consists of four parallel integer
//! sub-streams: document ids, per-document frequencies, node ids and node
//! positions. Each sub-stream is accumulated into fixed-capacity blocks,
//! compressed block by block through a pluggable codec
//! ([`CompressorId`](arbor_encodings::block_codec::CompressorId)) and written
//! to its own named resource together with a block index that supports
//! random-access seeks.
//!
//! The write side is driven value by value ([`BlockStreamWriter`]); the read
//! side is a pull-based cursor ([`BlockCursor`]) that decompresses one block at
//! a time. [`PostingsFormat`](format::PostingsFormat) binds codecs to the four
//! sub-streams and opens matched writer/reader sets against a
//! [`Directory`](arbor_io::Directory).

pub mod format;
pub mod index;
pub mod read;
pub mod write;

pub use format::{PostingsFormat, PostingsFormatConfig, PostingsReader, PostingsWriter};
pub use read::{BlockCursor, BlockStreamReader};
pub use write::BlockStreamWriter;

/// Per-sub-stream resource header: `[block_size: u32 LE][compressor_id: u8]`.
pub(crate) const HEADER_SIZE: u64 = 5;

/// Fixed-size footer locating the block index:
/// `[index_offset: u64 LE][block_count: u32 LE]`.
pub(crate) const TRAILER_SIZE: u64 = 12;
