//! MySQL wire field primitives.
//!
//! All reads operate on a `&mut &[u8]` cursor and advance it monotonically;
//! integers are little-endian and assembled byte-by-byte, strings are raw
//! bytes. Packet models are built exclusively on top of these functions.

use std::io;

use bytes::BufMut;

use crate::{
    error::{NullError, ParseError},
    utils::invalid_data,
};

// There is no Buf method for this as Buf handles discontinuous buffers
#[inline]
fn read_and_advance<'a>(buf: &mut &'a [u8], len: usize) -> io::Result<&'a [u8]> {
    if len > buf.len() {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    let (a, b) = buf.split_at(len);
    *buf = b;
    Ok(a)
}

pub fn read_int1(buf: &mut &[u8]) -> io::Result<u8> {
    Ok(read_and_advance(buf, 1)?[0])
}

pub fn read_int2(buf: &mut &[u8]) -> io::Result<u16> {
    Ok(read_int1(buf)? as u16 | (read_int1(buf)? as u16) << 8)
}

pub fn read_int3(buf: &mut &[u8]) -> io::Result<u32> {
    Ok(read_int1(buf)? as u32 | (read_int1(buf)? as u32) << 8 | (read_int1(buf)? as u32) << 16)
}

pub fn read_int4(buf: &mut &[u8]) -> io::Result<u32> {
    Ok(read_int2(buf)? as u32 | (read_int2(buf)? as u32) << 16)
}

pub fn read_int6(buf: &mut &[u8]) -> io::Result<u64> {
    Ok(read_int4(buf)? as u64 | (read_int2(buf)? as u64) << 32)
}

pub fn read_int8(buf: &mut &[u8]) -> io::Result<u64> {
    Ok(read_int4(buf)? as u64 | (read_int4(buf)? as u64) << 32)
}

/// Length-encoded integer. The leading tag selects the encoding: values below
/// 0xFB are inline, 0xFC/0xFD/0xFE are followed by 2/3/8 bytes, and the
/// reserved 0xFB tag signals a null value.
pub fn read_length_encoded_int(buf: &mut &[u8]) -> Result<u64, ParseError> {
    match read_int1(buf)? {
        tag @ 0..=0xFA => Ok(tag as u64),
        0xFB => Err(NullError.into()),
        0xFC => Ok(read_int2(buf)? as u64),
        0xFD => Ok(read_int3(buf)? as u64),
        0xFE => Ok(read_int8(buf)?),
        0xFF => Err(invalid_data("Invalid length-encoded integer tag").into()),
    }
}

pub fn read_fixed_bytes<'a>(buf: &mut &'a [u8], len: usize) -> io::Result<&'a [u8]> {
    read_and_advance(buf, len)
}

/// Bytes up to (not including) the first zero byte; the cursor skips past the
/// terminator. Fails if the buffer ends before a terminator is found.
pub fn read_null_terminated<'a>(buf: &mut &'a [u8]) -> io::Result<&'a [u8]> {
    let end = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or("Missing null terminator")
        .map_err(invalid_data)?;
    let bytes = read_and_advance(buf, end)?;
    read_and_advance(buf, 1)?;
    Ok(bytes)
}

pub fn read_length_encoded_bytes<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], ParseError> {
    let len = read_length_encoded_int(buf)?;
    Ok(read_and_advance(buf, len as usize)?)
}

/// All bytes from the current position to the end of the buffer.
pub fn read_remaining<'a>(buf: &mut &'a [u8]) -> &'a [u8] {
    let (bytes, rest) = buf.split_at(buf.len());
    *buf = rest;
    bytes
}

pub fn read_string(buf: &mut &[u8]) -> io::Result<String> {
    let bytes = read_null_terminated(buf)?;
    String::from_utf8(bytes.to_vec()).map_err(invalid_data)
}

pub fn write_int1(buf: &mut impl BufMut, value: u8) {
    buf.put_u8(value);
}

pub fn write_int2(buf: &mut impl BufMut, value: u16) {
    buf.put_u16_le(value);
}

pub fn write_int3(buf: &mut impl BufMut, value: u32) {
    buf.put_slice(&value.to_le_bytes()[..3]);
}

pub fn write_int4(buf: &mut impl BufMut, value: u32) {
    buf.put_u32_le(value);
}

pub fn write_length_encoded_int(buf: &mut impl BufMut, value: u64) {
    match value {
        0..=0xFA => write_int1(buf, value as u8),
        0xFB..=0xFFFF => {
            write_int1(buf, 0xFC);
            write_int2(buf, value as u16);
        }
        0x1_0000..=0xFF_FFFF => {
            write_int1(buf, 0xFD);
            write_int3(buf, value as u32);
        }
        _ => {
            write_int1(buf, 0xFE);
            buf.put_u64_le(value);
        }
    }
}

pub fn write_null_terminated(buf: &mut impl BufMut, bytes: &[u8]) {
    buf.put_slice(bytes);
    buf.put_u8(0);
}

pub fn write_length_encoded_bytes(buf: &mut impl BufMut, bytes: &[u8]) {
    write_length_encoded_int(buf, bytes.len() as u64);
    buf.put_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ints_are_little_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(read_int1(&mut &bytes[..]).unwrap(), 0x01);
        assert_eq!(read_int2(&mut &bytes[..]).unwrap(), 0x0201);
        assert_eq!(read_int3(&mut &bytes[..]).unwrap(), 0x030201);
        assert_eq!(read_int4(&mut &bytes[..]).unwrap(), 0x04030201);
        assert_eq!(read_int6(&mut &bytes[..]).unwrap(), 0x060504030201);
        assert_eq!(read_int8(&mut &bytes[..]).unwrap(), 0x0807060504030201);
    }

    #[test]
    fn reads_advance_the_cursor() {
        let bytes = [0x2A, 0x00, 0x01];
        let buf = &mut &bytes[..];
        read_int1(buf).unwrap();
        assert_eq!(buf.len(), 2);
        read_int2(buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(
            read_int1(buf).unwrap_err().kind(),
            std::io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn length_encoded_int_inline() {
        assert_eq!(read_length_encoded_int(&mut &[10u8][..]).unwrap(), 10);
        assert_eq!(read_length_encoded_int(&mut &[0xFAu8][..]).unwrap(), 0xFA);
    }

    #[test]
    fn length_encoded_int_prefixed() {
        assert_eq!(
            read_length_encoded_int(&mut &[0xFCu8, 0x2A, 0x00][..]).unwrap(),
            42
        );
        assert_eq!(
            read_length_encoded_int(&mut &[0xFDu8, 0x01, 0x00, 0x01][..]).unwrap(),
            0x010001
        );
        assert_eq!(
            read_length_encoded_int(&mut &[0xFEu8, 1, 0, 0, 0, 0, 0, 0, 0][..]).unwrap(),
            1
        );
    }

    #[test]
    fn length_encoded_int_null_tag() {
        assert!(matches!(
            read_length_encoded_int(&mut &[0xFBu8][..]),
            Err(ParseError::Null(_))
        ));
    }

    #[test]
    fn null_terminated_requires_terminator() {
        let buf = &mut &b"user\0rest"[..];
        assert_eq!(read_null_terminated(buf).unwrap(), b"user");
        assert_eq!(*buf, b"rest");
        assert!(read_null_terminated(&mut &b"no terminator"[..]).is_err());
    }

    #[test]
    fn remainder_consumes_everything() {
        let buf = &mut &b"tail"[..];
        assert_eq!(read_remaining(buf), b"tail");
        assert!(buf.is_empty());
        assert_eq!(read_remaining(buf), b"");
    }

    #[test]
    fn length_encoded_int_round_trip() {
        for value in [0u64, 250, 251, 42_000, 0xFF_FFFF - 1, 1 << 30] {
            let mut bytes = Vec::new();
            write_length_encoded_int(&mut bytes, value);
            assert_eq!(read_length_encoded_int(&mut &bytes[..]).unwrap(), value);
        }
    }

    #[test]
    fn length_encoded_bytes_round_trip() {
        let mut bytes = Vec::new();
        write_length_encoded_bytes(&mut bytes, b"scramble");
        assert_eq!(
            read_length_encoded_bytes(&mut &bytes[..]).unwrap(),
            b"scramble"
        );
    }
}
