//! Block codecs for the postings format: stateless transforms between a run of
//! integers and a compressed byte buffer, selected per sub-stream through
//! [`CompressorId`](block_codec::CompressorId).

pub mod block_codec;
pub mod delta;
pub mod packed;
pub mod varint;
pub mod vint;
