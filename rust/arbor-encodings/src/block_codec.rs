//! The two-operation codec capability that every block compressor implements,
//! and the closed registry of shipped codecs.

use arbor_common::{Result, error::Error};

use crate::{packed::PackedCompressor, vint::VIntCompressor};

/// Compresses one block of integers into a byte buffer.
///
/// Implementations are pure transforms over the provided buffers: no internal
/// state, no side effects. The caller supplies the exact valid length of the
/// block (which may be shorter than the nominal block size for the terminal
/// partial block); the encoding must never make padding visible to a reader.
pub trait BlockCompressor: Send + Sync + 'static {
    /// The maximum size in bytes of a compressed block of `block_size` values.
    ///
    /// Callers size their scratch buffers from this bound once per stream;
    /// an encoding that exceeds it is a fatal contract violation on the
    /// compressor's side.
    fn max_compressed_size(&self, block_size: usize) -> usize;

    /// Compresses `values` and appends the encoding to `out`.
    ///
    /// The encoding must be self-delimiting with respect to the codec's own
    /// framing: given exactly these bytes back, the matching decompressor
    /// reproduces `values` exactly (content and count).
    fn compress(&self, values: &[u32], out: &mut Vec<u8>) -> Result<()>;
}

/// Decompresses one block of bytes back into integers.
pub trait BlockDecompressor: Send + Sync + 'static {
    /// Decodes a single block payload, appending the values to `out`.
    ///
    /// `encoded` must span exactly one block; malformed or truncated input is
    /// a format violation, never a short result.
    fn decompress(&self, encoded: &[u8], out: &mut Vec<u32>) -> Result<()>;

    /// Skips up to the first `n` values of the block, returning the number of
    /// values actually skipped and the byte offset where decoding resumes.
    ///
    /// Codecs that cannot address individual values may skip fewer than `n`
    /// (including zero); the caller decodes the remainder.
    fn skip(&self, encoded: &[u8], n: usize) -> Result<(usize, usize)>;
}

/// Identity of a block codec, persisted in the stream header so a reader can
/// be opened without the writer-side configuration.
///
/// New codecs are admitted by extending this enum and the two constructors
/// below; there is no open-ended registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressorId {
    /// Variable-byte encoding, one to five bytes per value, full u32 domain.
    #[default]
    VInt = 0,
    /// Frame-of-reference bit packing: per-block minimum plus packed deltas.
    Packed = 1,
}

impl CompressorId {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Resolves a persisted codec id. Unrecognized ids are a format violation:
    /// the resource was written by a codec this build does not know.
    pub fn from_u8(id: u8) -> Result<CompressorId> {
        match id {
            0 => Ok(CompressorId::VInt),
            1 => Ok(CompressorId::Packed),
            _ => Err(Error::invalid_format(
                "compressor id",
                format!("unrecognized compressor id {id}"),
            )),
        }
    }

    pub fn compressor(&self) -> Box<dyn BlockCompressor> {
        match self {
            CompressorId::VInt => Box::new(VIntCompressor),
            CompressorId::Packed => Box::new(PackedCompressor),
        }
    }

    pub fn decompressor(&self) -> Box<dyn BlockDecompressor> {
        match self {
            CompressorId::VInt => Box::new(crate::vint::VIntDecompressor),
            CompressorId::Packed => Box::new(crate::packed::PackedDecompressor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompressorId;

    #[test]
    fn test_compressor_id_round_trip() {
        for id in [CompressorId::VInt, CompressorId::Packed] {
            assert_eq!(CompressorId::from_u8(id.as_u8()).unwrap(), id);
        }
        let err = CompressorId::from_u8(250).unwrap_err();
        assert!(matches!(
            err.kind(),
            arbor_common::error::ErrorKind::InvalidFormat { .. }
        ));
    }
}
