//! D-gap helpers for strictly increasing sequences (document ids).
//!
//! The postings writer above this layer gaps document ids before handing them
//! to the block codec, so that range-exploiting codecs see small values.

use arbor_common::{Result, verify_arg, verify_data};

/// Rewrites a strictly increasing sequence in place as gaps: the first value
/// is kept, every following value becomes the difference to its predecessor.
pub fn encode_gaps(values: &mut [u32]) -> Result<()> {
    let mut prev = 0u32;
    for (i, value) in values.iter_mut().enumerate() {
        let v = *value;
        verify_arg!(values, i == 0 || v > prev);
        *value = v - prev;
        prev = v;
    }
    Ok(())
}

/// Inverse of [`encode_gaps`]: prefix-sums the gaps back into absolute values.
pub fn decode_gaps(values: &mut [u32]) -> Result<()> {
    let mut prev = 0u64;
    for (i, value) in values.iter_mut().enumerate() {
        let v = prev + *value as u64;
        verify_data!(gaps, v <= u32::MAX as u64);
        verify_data!(gaps, i == 0 || *value > 0);
        *value = v as u32;
        prev = v;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_gaps, encode_gaps};

    #[test]
    fn test_gap_round_trip() {
        let mut values = vec![3u32, 5, 6, 100, 101, 4000];
        let original = values.clone();
        encode_gaps(&mut values).unwrap();
        assert_eq!(values, [3, 2, 1, 94, 1, 3899]);
        decode_gaps(&mut values).unwrap();
        assert_eq!(values, original);
    }

    #[test]
    fn test_gap_rejects_non_increasing() {
        let mut values = vec![3u32, 3];
        assert!(encode_gaps(&mut values).is_err());
        let mut values = vec![5u32, 2];
        assert!(encode_gaps(&mut values).is_err());
    }

    #[test]
    fn test_gap_decode_overflow() {
        let mut values = vec![u32::MAX, 1];
        assert!(decode_gaps(&mut values).is_err());
    }
}
