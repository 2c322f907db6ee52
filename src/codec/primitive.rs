//! Scalar field codec
//!
//! These routines define the handful of wire formats reused throughout the SNP table stream:
//! - fixed-width big-endian 32-bit unsigned integers
//! - 64-bit signed gi values (big-endian, high word first)
//! - self-delimiting variable-length sizes (7 data bits per byte, low group first)
//! - length-prefixed byte strings and textual sequence identifiers
//!
//! Every read either yields a complete, well-formed value or fails with a typed error.
//! There is no partial success at this layer.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{CodecError, Error, Result};

/// The wire width of a variable-length size
pub type VarSize = u32;

/// Maximum number of bytes in a variable-length size encoding
pub const MAX_VARSIZE_BYTES: usize = 5;

/// Native width of gi values on the reading host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GiWidth {
    /// Only 32-bit gi values are representable
    Bits32,
    /// Full 64-bit gi values (default)
    #[default]
    Bits64,
}

/// Converts an unexpected end-of-stream into a truncation error tagged with the field name
pub(crate) fn truncated(field: &'static str) -> impl FnOnce(io::Error) -> Error {
    move |err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated { field }.into()
        } else {
            err.into()
        }
    }
}

/// Writes a 4-byte big-endian unsigned integer
///
/// Fails if `value` does not fit in 32 bits rather than silently truncating it.
pub fn write_fixed_u32<W: Write>(writer: &mut W, value: u64, field: &'static str) -> Result<()> {
    let value = u32::try_from(value).map_err(|_| CodecError::ValueTooLarge { field, value })?;
    writer.write_u32::<BigEndian>(value)?;
    Ok(())
}

/// Reads a 4-byte big-endian unsigned integer
pub fn read_fixed_u32<R: Read>(reader: &mut R, field: &'static str) -> Result<u32> {
    reader.read_u32::<BigEndian>().map_err(truncated(field))
}

/// Writes a gi as 8 bytes: the high 32 bits first, the low 32 bits at offset 4
pub fn write_gi<W: Write>(writer: &mut W, gi: i64) -> Result<()> {
    writer.write_i64::<BigEndian>(gi)?;
    Ok(())
}

/// Reads a gi written by [`write_gi`]
///
/// With [`GiWidth::Bits32`] the high word must be a sign-extension of the low word,
/// otherwise the value was produced by a 64-bit-gi writer and cannot be represented.
pub fn read_gi<R: Read>(reader: &mut R, width: GiWidth, field: &'static str) -> Result<i64> {
    let value = reader.read_i64::<BigEndian>().map_err(truncated(field))?;
    if width == GiWidth::Bits32 && i64::from(value as i32) != value {
        return Err(CodecError::GiOverflow { field, value }.into());
    }
    Ok(value)
}

/// Writes a variable-length size: 7 data bits per byte, low group first,
/// with the top bit set on every byte except the last
pub fn write_varsize<W: Write>(writer: &mut W, size: usize, field: &'static str) -> Result<()> {
    let mut size = VarSize::try_from(size).map_err(|_| CodecError::ValueTooLarge {
        field,
        value: size as u64,
    })?;
    while size >= 0x80 {
        writer.write_u8((size & 0x7f) as u8 | 0x80)?;
        size >>= 7;
    }
    writer.write_u8(size as u8)?;
    Ok(())
}

/// Reads a variable-length size written by [`write_varsize`]
///
/// Fails if the encoded value does not fit in [`VarSize`].
pub fn read_varsize<R: Read>(reader: &mut R, field: &'static str) -> Result<usize> {
    // 5 groups of 7 bits always fit in a u64 accumulator
    let mut size: u64 = 0;
    for i in 0..MAX_VARSIZE_BYTES {
        let byte = reader.read_u8().map_err(truncated(field))?;
        size |= u64::from(byte & 0x7f) << (7 * i);
        if size > u64::from(VarSize::MAX) {
            return Err(CodecError::SizeOverflow { field }.into());
        }
        if byte & 0x80 == 0 {
            return Ok(size as usize);
        }
    }
    Err(CodecError::SizeOverflow { field }.into())
}

/// Writes a varsize length followed by the raw bytes
pub fn write_length_prefixed_bytes<W: Write>(
    writer: &mut W,
    data: &[u8],
    field: &'static str,
) -> Result<()> {
    write_varsize(writer, data.len(), field)?;
    writer.write_all(data)?;
    Ok(())
}

/// Reads a varsize length followed by that many raw bytes
///
/// The length is checked against `max_length` before any storage is allocated.
pub fn read_length_prefixed_bytes<R: Read>(
    reader: &mut R,
    max_length: usize,
    field: &'static str,
) -> Result<Vec<u8>> {
    let length = read_varsize(reader, field)?;
    if length > max_length {
        return Err(CodecError::LengthTooLarge {
            field,
            length,
            max_length,
        }
        .into());
    }
    let mut data = vec![0; length];
    reader.read_exact(&mut data).map_err(truncated(field))?;
    Ok(data)
}

/// Reads a length-prefixed UTF-8 string
pub fn read_length_prefixed_string<R: Read>(
    reader: &mut R,
    max_length: usize,
    field: &'static str,
) -> Result<String> {
    let data = read_length_prefixed_bytes(reader, max_length, field)?;
    Ok(String::from_utf8(data)?)
}

/// Writes the canonical text form of a sequence identifier
pub fn write_seq_id<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(CodecError::EmptySeqId.into());
    }
    write_length_prefixed_bytes(writer, text.as_bytes(), "seq-id")
}

/// Reads the canonical text form of a sequence identifier
pub fn read_seq_id<R: Read>(reader: &mut R, max_length: usize) -> Result<String> {
    let text = read_length_prefixed_string(reader, max_length, "seq-id")?;
    if text.is_empty() {
        return Err(CodecError::EmptySeqId.into());
    }
    Ok(text)
}
