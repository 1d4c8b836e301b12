//! LEB128-style unsigned varints, shared by the VInt codec and the block
//! framing of the stream layer.

use arbor_common::{Result, verify_data};

/// Appends `value` as a varint: 7 bits per byte, low groups first, high bit
/// set on every byte but the last.
pub fn write_vu64(out: &mut Vec<u8>, mut value: u64) {
    while value & !0x7F != 0 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

pub fn write_vu32(out: &mut Vec<u8>, value: u32) {
    write_vu64(out, value as u64);
}

/// Reads one varint starting at `*pos`, advancing `*pos` past it.
///
/// Running off the end of `buf` mid-value, or a value wider than 64 bits,
/// is a format violation.
pub fn read_vu64(buf: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        verify_data!(varint, *pos < buf.len());
        verify_data!(varint, shift < 64);
        let b = buf[*pos];
        *pos += 1;
        value |= ((b & 0x7F) as u64) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
}

pub fn read_vu32(buf: &[u8], pos: &mut usize) -> Result<u32> {
    let value = read_vu64(buf, pos)?;
    verify_data!(varint, value <= u32::MAX as u64);
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::{read_vu64, write_vu64};

    #[test]
    fn test_vu64_round_trip() {
        let samples = [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX];
        let mut buf = Vec::new();
        for &v in &samples {
            write_vu64(&mut buf, v);
        }
        let mut pos = 0;
        for &v in &samples {
            assert_eq!(read_vu64(&buf, &mut pos).unwrap(), v);
        }
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn test_vu64_truncated() {
        let mut buf = Vec::new();
        write_vu64(&mut buf, 1 << 40);
        buf.truncate(buf.len() - 1);
        let mut pos = 0;
        assert!(read_vu64(&buf, &mut pos).is_err());
    }
}
