use bytes::BufMut;

use crate::error::{DecodeError, Result};

/// Longest legal varint for a 32-bit value.
pub const MAX_VARINT_LEN: usize = 5;

/// Protobuf wire types understood by this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Wire type from the low three bits of a tag.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }
}

/// Split a decoded tag into field number and raw wire-type bits.
pub fn split_tag(tag: u32) -> (u32, u8) {
    (tag >> 3, (tag & 0x07) as u8)
}

/// Number of bytes `encode_varint` writes for `value`.
pub fn varint_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Base-128 little-endian varint, minimal length.
pub fn encode_varint(mut value: u32, dst: &mut impl BufMut) {
    while value >= 0x80 {
        dst.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    dst.put_u8(value as u8);
}

pub fn encode_tag(field: u32, wire_type: WireType, dst: &mut impl BufMut) {
    encode_varint((field << 3) | wire_type as u32, dst);
}

pub fn encode_field_varint(field: u32, value: u32, dst: &mut impl BufMut) {
    encode_tag(field, WireType::Varint, dst);
    encode_varint(value, dst);
}

/// Tag followed by four little-endian bytes.
pub fn encode_field_fixed32(field: u32, value: u32, dst: &mut impl BufMut) {
    encode_tag(field, WireType::Fixed32, dst);
    dst.put_u32_le(value);
}

/// Tag, varint length, then the raw bytes.
pub fn encode_field_bytes(field: u32, data: &[u8], dst: &mut impl BufMut) {
    encode_tag(field, WireType::LengthDelimited, dst);
    encode_varint(data.len() as u32, dst);
    dst.put_slice(data);
}

/// Decode a varint at `*pos`, never reading at or past `limit`.
///
/// `limit` is clamped to the buffer length. A fifth group carrying bits above
/// bit 31 is an overflow. On error `*pos` is left where the varint started.
pub fn decode_varint(buf: &[u8], pos: &mut usize, limit: usize) -> Result<u32> {
    let limit = limit.min(buf.len());
    let start = *pos;
    let mut cursor = start;
    let mut value: u32 = 0;

    for group in 0..MAX_VARINT_LEN {
        if cursor >= limit {
            return Err(DecodeError::Truncated { offset: cursor });
        }
        let byte = buf[cursor];
        if group == MAX_VARINT_LEN - 1 && byte & 0x70 != 0 {
            return Err(DecodeError::VarintOverflow { offset: start });
        }
        cursor += 1;
        value |= u32::from(byte & 0x7F) << (7 * group);
        if byte & 0x80 == 0 {
            *pos = cursor;
            return Ok(value);
        }
    }
    Err(DecodeError::VarintOverflow { offset: start })
}

/// Decode four little-endian bytes at `*pos`.
pub fn decode_fixed32(buf: &[u8], pos: &mut usize, limit: usize) -> Result<u32> {
    let bytes = take(buf, pos, limit, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Decode eight little-endian bytes at `*pos`.
pub fn decode_fixed64(buf: &[u8], pos: &mut usize, limit: usize) -> Result<u64> {
    let bytes = take(buf, pos, limit, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

/// Decode a length prefix and return the bytes it covers.
pub fn decode_length_delimited<'a>(buf: &'a [u8], pos: &mut usize, limit: usize) -> Result<&'a [u8]> {
    let limit = limit.min(buf.len());
    let start = *pos;
    let len = decode_varint(buf, pos, limit)? as usize;
    let remaining = limit - *pos;
    if len > remaining {
        *pos = start;
        return Err(DecodeError::LengthOverflow { len, remaining });
    }
    let data = &buf[*pos..*pos + len];
    *pos += len;
    Ok(data)
}

/// Advance past one field value of the given wire type.
pub fn skip_field(buf: &[u8], pos: &mut usize, limit: usize, wire_type: u8) -> Result<()> {
    match WireType::from_bits(wire_type) {
        Some(WireType::Varint) => decode_varint(buf, pos, limit).map(drop),
        Some(WireType::Fixed64) => take(buf, pos, limit, 8).map(drop),
        Some(WireType::LengthDelimited) => decode_length_delimited(buf, pos, limit).map(drop),
        Some(WireType::Fixed32) => take(buf, pos, limit, 4).map(drop),
        None => Err(DecodeError::UnsupportedWireType(wire_type)),
    }
}

fn take<'a>(buf: &'a [u8], pos: &mut usize, limit: usize, n: usize) -> Result<&'a [u8]> {
    let limit = limit.min(buf.len());
    if *pos > limit || limit - *pos < n {
        return Err(DecodeError::Truncated { offset: limit });
    }
    let bytes = &buf[*pos..*pos + n];
    *pos += n;
    Ok(bytes)
}

/// A decoded field value, borrowing length-delimited data from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireValue<'a> {
    Varint(u32),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

impl WireValue<'_> {
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::Fixed64,
            Self::Bytes(_) => WireType::LengthDelimited,
            Self::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// One `(field number, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub number: u32,
    pub value: WireValue<'a>,
}

/// Iterator over the fields of a single message.
///
/// Stops at the end of the buffer. The first decode error is yielded once and
/// ends iteration, since the position of any following field is unknown.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            failed: false,
        }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_field(&mut self) -> Result<Field<'a>> {
        let limit = self.buf.len();
        let tag = decode_varint(self.buf, &mut self.pos, limit)?;
        let (number, bits) = split_tag(tag);
        let value = match WireType::from_bits(bits) {
            Some(WireType::Varint) => WireValue::Varint(decode_varint(self.buf, &mut self.pos, limit)?),
            Some(WireType::Fixed64) => WireValue::Fixed64(decode_fixed64(self.buf, &mut self.pos, limit)?),
            Some(WireType::LengthDelimited) => {
                WireValue::Bytes(decode_length_delimited(self.buf, &mut self.pos, limit)?)
            }
            Some(WireType::Fixed32) => WireValue::Fixed32(decode_fixed32(self.buf, &mut self.pos, limit)?),
            None => return Err(DecodeError::UnsupportedWireType(bits)),
        };
        Ok(Field { number, value })
    }
}

impl<'a> Iterator for FieldReader<'a> {
    type Item = Result<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.buf.len() {
            return None;
        }
        let field = self.read_field();
        self.failed = field.is_err();
        Some(field)
    }
}
