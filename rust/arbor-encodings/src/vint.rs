//! Variable-byte reference codec.
//!
//! Each value is stored as one to five bytes, 7 bits per byte. There is no
//! per-block header: the value count of a block falls out of consuming the
//! block's byte extent, which the stream framing delimits exactly.

use arbor_common::{Result, verify_data};

use crate::{
    block_codec::{BlockCompressor, BlockDecompressor},
    varint,
};

pub struct VIntCompressor;

impl BlockCompressor for VIntCompressor {
    fn max_compressed_size(&self, block_size: usize) -> usize {
        // Worst case: five bytes per value.
        5 * block_size
    }

    fn compress(&self, values: &[u32], out: &mut Vec<u8>) -> Result<()> {
        for &value in values {
            varint::write_vu32(out, value);
        }
        Ok(())
    }
}

pub struct VIntDecompressor;

impl BlockDecompressor for VIntDecompressor {
    fn decompress(&self, encoded: &[u8], out: &mut Vec<u32>) -> Result<()> {
        let mut pos = 0;
        while pos < encoded.len() {
            out.push(varint::read_vu32(encoded, &mut pos)?);
        }
        Ok(())
    }

    fn skip(&self, encoded: &[u8], n: usize) -> Result<(usize, usize)> {
        let mut pos = 0;
        let mut skipped = 0;
        while pos < encoded.len() && skipped < n {
            while encoded[pos] & 0x80 != 0 {
                pos += 1;
                verify_data!(vint, pos < encoded.len());
            }
            pos += 1;
            skipped += 1;
        }
        Ok((skipped, pos))
    }
}

#[cfg(test)]
mod tests {
    use crate::block_codec::{BlockCompressor, BlockDecompressor};

    use super::{VIntCompressor, VIntDecompressor};

    #[test]
    fn test_vint_round_trip() {
        let values: Vec<u32> = (0..1000)
            .map(|_| fastrand::u32(..))
            .chain([0, 1, 127, 128, u32::MAX])
            .collect();
        let mut encoded = Vec::new();
        VIntCompressor.compress(&values, &mut encoded).unwrap();
        assert!(encoded.len() <= VIntCompressor.max_compressed_size(values.len()));

        let mut decoded = Vec::new();
        VIntDecompressor.decompress(&encoded, &mut decoded).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_vint_truncated_block() {
        let mut encoded = Vec::new();
        VIntCompressor.compress(&[u32::MAX; 4], &mut encoded).unwrap();
        encoded.truncate(encoded.len() - 2);
        let mut decoded = Vec::new();
        assert!(VIntDecompressor.decompress(&encoded, &mut decoded).is_err());
    }

    #[test]
    fn test_vint_skip() {
        let values = [5u32, 300, 70000, 2, u32::MAX];
        let mut encoded = Vec::new();
        VIntCompressor.compress(&values, &mut encoded).unwrap();

        let (skipped, pos) = VIntDecompressor.skip(&encoded, 3).unwrap();
        assert_eq!(skipped, 3);
        let mut rest = Vec::new();
        VIntDecompressor.decompress(&encoded[pos..], &mut rest).unwrap();
        assert_eq!(rest, [2, u32::MAX]);

        // Skipping past the end stops at the block boundary.
        let (skipped, pos) = VIntDecompressor.skip(&encoded, 100).unwrap();
        assert_eq!(skipped, 5);
        assert_eq!(pos, encoded.len());
    }
}
