//! Frame-of-reference bit-packing codec.
//!
//! Each block is framed as `[count: u16][reference: u32][width: u8]` followed
//! by `count` deltas of `width` bits each, packed little-endian. The reference
//! is the block minimum and the width is derived from the actual contents, so
//! the codec handles the full u32 domain: values past any nominal bit-width
//! boundary simply widen the frame.

use arbor_common::{Result, verify_arg, verify_data};
use byteorder::{ByteOrder, LittleEndian};

use crate::block_codec::{BlockCompressor, BlockDecompressor};

const HEADER_SIZE: usize = 7;

pub struct PackedCompressor;

impl BlockCompressor for PackedCompressor {
    fn max_compressed_size(&self, block_size: usize) -> usize {
        // Width never exceeds 32 bits per value.
        HEADER_SIZE + 4 * block_size
    }

    fn compress(&self, values: &[u32], out: &mut Vec<u8>) -> Result<()> {
        verify_arg!(values, !values.is_empty());
        verify_arg!(values, values.len() <= u16::MAX as usize);

        let min = values.iter().min().copied().unwrap_or(0);
        let max = values.iter().max().copied().unwrap_or(0);
        let width = bits_needed(max - min);

        out.extend_from_slice(&(values.len() as u16).to_le_bytes());
        out.extend_from_slice(&min.to_le_bytes());
        out.push(width);

        let mut bit_buf = 0u64;
        let mut bit_count = 0u32;
        for &value in values {
            bit_buf |= ((value - min) as u64) << bit_count;
            bit_count += width as u32;
            while bit_count >= 8 {
                out.push(bit_buf as u8);
                bit_buf >>= 8;
                bit_count -= 8;
            }
        }
        if bit_count > 0 {
            out.push(bit_buf as u8);
        }
        Ok(())
    }
}

pub struct PackedDecompressor;

impl BlockDecompressor for PackedDecompressor {
    fn decompress(&self, encoded: &[u8], out: &mut Vec<u32>) -> Result<()> {
        verify_data!(packed, encoded.len() >= HEADER_SIZE);
        let count = LittleEndian::read_u16(&encoded[0..2]) as usize;
        let min = LittleEndian::read_u32(&encoded[2..6]);
        let width = encoded[6] as u32;
        verify_data!(packed, width <= 32);
        verify_data!(packed, count > 0);

        let payload = &encoded[HEADER_SIZE..];
        let expected = (count * width as usize).div_ceil(8);
        verify_data!(packed, payload.len() == expected);

        let mask = (1u64 << width) - 1;
        let mut pos = 0;
        let mut bit_buf = 0u64;
        let mut bit_count = 0u32;
        for _ in 0..count {
            while bit_count < width {
                bit_buf |= (payload[pos] as u64) << bit_count;
                pos += 1;
                bit_count += 8;
            }
            let value = min as u64 + (bit_buf & mask);
            verify_data!(packed, value <= u32::MAX as u64);
            out.push(value as u32);
            bit_buf >>= width;
            bit_count -= width;
        }
        Ok(())
    }

    fn skip(&self, _encoded: &[u8], _n: usize) -> Result<(usize, usize)> {
        // Packed frames are not byte-addressable per value; the caller decodes
        // and discards instead.
        Ok((0, 0))
    }
}

fn bits_needed(value: u32) -> u8 {
    (32 - value.leading_zeros()) as u8
}

#[cfg(test)]
mod tests {
    use crate::block_codec::{BlockCompressor, BlockDecompressor};

    use super::{PackedCompressor, PackedDecompressor, bits_needed};

    fn round_trip(values: &[u32]) {
        let mut encoded = Vec::new();
        PackedCompressor.compress(values, &mut encoded).unwrap();
        assert!(encoded.len() <= PackedCompressor.max_compressed_size(values.len()));
        let mut decoded = Vec::new();
        PackedDecompressor
            .decompress(&encoded, &mut decoded)
            .unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_bits_needed() {
        assert_eq!(bits_needed(0), 0);
        assert_eq!(bits_needed(1), 1);
        assert_eq!(bits_needed(255), 8);
        assert_eq!(bits_needed(256), 9);
        assert_eq!(bits_needed(u32::MAX), 32);
    }

    #[test]
    fn test_packed_round_trip() {
        round_trip(&[42]);
        round_trip(&[7; 128]);
        round_trip(&[0; 512]);
        round_trip(&[0, 1, 2, 3, u32::MAX]);
        let values: Vec<u32> = (0..2048).map(|_| fastrand::u32(1000..2000)).collect();
        round_trip(&values);
    }

    #[test]
    fn test_packed_constant_block_is_tiny() {
        let mut encoded = Vec::new();
        PackedCompressor.compress(&[9999; 2048], &mut encoded).unwrap();
        // Width zero: header only.
        assert_eq!(encoded.len(), 7);
    }

    #[test]
    fn test_packed_truncated_block() {
        let values: Vec<u32> = (0..100).map(|_| fastrand::u32(..)).collect();
        let mut encoded = Vec::new();
        PackedCompressor.compress(&values, &mut encoded).unwrap();
        encoded.truncate(encoded.len() - 1);
        let mut decoded = Vec::new();
        assert!(
            PackedDecompressor
                .decompress(&encoded, &mut decoded)
                .is_err()
        );
    }

    #[test]
    fn test_packed_bad_width() {
        let mut encoded = Vec::new();
        PackedCompressor.compress(&[1, 2, 3], &mut encoded).unwrap();
        encoded[6] = 40;
        let mut decoded = Vec::new();
        assert!(
            PackedDecompressor
                .decompress(&encoded, &mut decoded)
                .is_err()
        );
    }
}
