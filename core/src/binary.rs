//! Big-endian binary codec.
//!
//! Every persisted artifact in this crate (trie, CSR matrix, graph, CRF
//! model) is serialized big-endian. This module provides the shared
//! primitive/array read and write helpers plus a magic-number gate used at
//! the start of each file format. The codec does not own the stream: callers
//! pass in a `Read`/`Write` + `Seek` reference and keep the file handle.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::CodecError;

/// Read `u8`, failing with [`CodecError::EndOfData`] if the stream is short.
pub fn read_u8<R: Read>(r: &mut R) -> Result<u8, CodecError> {
    r.read_u8().map_err(|e| map_eof(e, 1))
}

/// Read a big-endian `u16`.
pub fn read_u16<R: Read>(r: &mut R) -> Result<u16, CodecError> {
    r.read_u16::<BigEndian>().map_err(|e| map_eof(e, 2))
}

/// Read a big-endian `u32`.
pub fn read_u32<R: Read>(r: &mut R) -> Result<u32, CodecError> {
    r.read_u32::<BigEndian>().map_err(|e| map_eof(e, 4))
}

/// Read a big-endian `u64`.
pub fn read_u64<R: Read>(r: &mut R) -> Result<u64, CodecError> {
    r.read_u64::<BigEndian>().map_err(|e| map_eof(e, 8))
}

/// Read a big-endian `i32`.
pub fn read_i32<R: Read>(r: &mut R) -> Result<i32, CodecError> {
    r.read_i32::<BigEndian>().map_err(|e| map_eof(e, 4))
}

/// Read a big-endian `f64`.
pub fn read_f64<R: Read>(r: &mut R) -> Result<f64, CodecError> {
    r.read_f64::<BigEndian>().map_err(|e| map_eof(e, 8))
}

/// Read `len` raw bytes.
pub fn read_bytes<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>, CodecError> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)
        .map_err(|e| map_eof(e, len))?;
    Ok(buf)
}

/// Read a length-prefixed UTF-8 string: a `u32` byte length followed by
/// exactly that many UTF-8 bytes.
pub fn read_string<R: Read>(r: &mut R) -> Result<String, CodecError> {
    let len = read_u32(r)? as usize;
    let bytes = read_bytes(r, len)?;
    String::from_utf8(bytes).map_err(|e| CodecError::CorruptModel(format!("invalid utf8: {e}")))
}

/// Read `n` big-endian `u32`s.
pub fn read_u32_array<R: Read>(r: &mut R, n: usize) -> Result<Vec<u32>, CodecError> {
    (0..n).map(|_| read_u32(r)).collect()
}

/// Read `n` big-endian `f64`s.
pub fn read_f64_array<R: Read>(r: &mut R, n: usize) -> Result<Vec<f64>, CodecError> {
    (0..n).map(|_| read_f64(r)).collect()
}

fn map_eof(e: std::io::Error, needed: usize) -> CodecError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        CodecError::EndOfData {
            needed,
            available: 0,
        }
    } else {
        CodecError::Io(e)
    }
}

/// Validate a file's magic number.
///
/// On seekable inputs the stream position is restored after the check; on
/// non-seekable inputs (anything that only implements `Read`, use
/// [`check_signature_forward`] instead) the position is left just past the
/// signature.
pub fn check_signature<R: Read + Seek>(r: &mut R, expected: u32) -> Result<(), CodecError> {
    let start = r
        .stream_position()
        .map_err(CodecError::Io)?;
    let found = read_u32(r)?;
    if found != expected {
        return Err(CodecError::BadSignature { expected, found });
    }
    r.seek(SeekFrom::Start(start)).map_err(CodecError::Io)?;
    Ok(())
}

/// Validate a file's magic number on a non-seekable stream, leaving the
/// cursor just past the signature on success.
pub fn check_signature_forward<R: Read>(r: &mut R, expected: u32) -> Result<(), CodecError> {
    let found = read_u32(r)?;
    if found != expected {
        return Err(CodecError::BadSignature { expected, found });
    }
    Ok(())
}

/// Write a big-endian `u8`.
pub fn write_u8<W: Write>(w: &mut W, v: u8) -> std::io::Result<()> {
    w.write_u8(v)
}

/// Write a big-endian `u16`.
pub fn write_u16<W: Write>(w: &mut W, v: u16) -> std::io::Result<()> {
    w.write_u16::<BigEndian>(v)
}

/// Write a big-endian `u32`.
pub fn write_u32<W: Write>(w: &mut W, v: u32) -> std::io::Result<()> {
    w.write_u32::<BigEndian>(v)
}

/// Write a big-endian `u64`.
pub fn write_u64<W: Write>(w: &mut W, v: u64) -> std::io::Result<()> {
    w.write_u64::<BigEndian>(v)
}

/// Write a big-endian `i32`.
pub fn write_i32<W: Write>(w: &mut W, v: i32) -> std::io::Result<()> {
    w.write_i32::<BigEndian>(v)
}

/// Write a big-endian `f64`.
pub fn write_f64<W: Write>(w: &mut W, v: f64) -> std::io::Result<()> {
    w.write_f64::<BigEndian>(v)
}

/// Write a length-prefixed UTF-8 string.
pub fn write_string<W: Write>(w: &mut W, s: &str) -> std::io::Result<()> {
    write_u32(w, s.len() as u32)?;
    w.write_all(s.as_bytes())
}

/// Write a slice of `u32`s with no length prefix.
pub fn write_u32_array<W: Write>(w: &mut W, values: &[u32]) -> std::io::Result<()> {
    for &v in values {
        write_u32(w, v)?;
    }
    Ok(())
}

/// Write a slice of `f64`s with no length prefix.
pub fn write_f64_array<W: Write>(w: &mut W, values: &[f64]) -> std::io::Result<()> {
    for &v in values {
        write_f64(w, v)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_primitives() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0xDEAD_BEEF).unwrap();
        write_f64(&mut buf, std::f64::consts::PI).unwrap();
        write_string(&mut buf, "hello").unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(read_u32(&mut cur).unwrap(), 0xDEAD_BEEF);
        assert_eq!(read_f64(&mut cur).unwrap(), std::f64::consts::PI);
        assert_eq!(read_string(&mut cur).unwrap(), "hello");
    }

    #[test]
    fn short_read_is_end_of_data() {
        let mut cur = Cursor::new(vec![0u8, 1]);
        let err = read_u32(&mut cur).unwrap_err();
        assert!(matches!(err, CodecError::EndOfData { .. }));
    }

    #[test]
    fn signature_check_restores_position_on_seekable_stream() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0xABAB_ABAB).unwrap();
        write_u32(&mut buf, 42).unwrap();
        let mut cur = Cursor::new(buf);

        check_signature(&mut cur, 0xABAB_ABAB).unwrap();
        assert_eq!(cur.stream_position().unwrap(), 0);
        // still readable from the start afterwards
        assert_eq!(read_u32(&mut cur).unwrap(), 0xABAB_ABAB);
        assert_eq!(read_u32(&mut cur).unwrap(), 42);
    }

    #[test]
    fn signature_mismatch_reports_both_values() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 0x1234_5678).unwrap();
        let mut cur = Cursor::new(buf);
        let err = check_signature(&mut cur, 0xABAB_ABAB).unwrap_err();
        match err {
            CodecError::BadSignature { expected, found } => {
                assert_eq!(expected, 0xABAB_ABAB);
                assert_eq!(found, 0x1234_5678);
            }
            _ => panic!("wrong error kind"),
        }
    }
}
