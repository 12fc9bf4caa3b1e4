//! Order-preserving tuple encoding
//!
//! Every element is a one-byte type tag followed by its payload. Byte-wise
//! comparison of two encoded tuples matches element-wise comparison of the
//! values, provided both tuples share the same kind sequence.
//!
//! | kind   | tag           | payload                                        |
//! |--------|---------------|------------------------------------------------|
//! | Bytes  | `0x01`        | `0x00` escaped as `0x00 0xFF`, `0x00` terminator |
//! | String | `0x02`        | UTF-8, same escaping and terminator            |
//! | I32    | `0x10`        | big-endian, sign bit flipped                   |
//! | I64    | `0x11`        | big-endian, sign bit flipped                   |
//! | U32    | `0x12`        | big-endian                                     |
//! | U64    | `0x13`        | big-endian                                     |
//! | F32    | `0x20`        | positive: sign bit flipped, negative: all bits flipped |
//! | F64    | `0x21`        | as F32                                         |
//! | Bool   | `0x26`/`0x27` | none                                           |
//!
//! Elements are self-delimiting, so a tuple can be decoded from the front of
//! a longer key (`decode_prefix`) without knowing what follows.

use byteorder::{BigEndian, ByteOrder};
use strata_core::{Error, Result, Scalar, ScalarKind, Tuple};

/// Type tags
pub mod tag {
    /// Opaque bytes
    pub const BYTES: u8 = 0x01;
    /// UTF-8 string
    pub const STRING: u8 = 0x02;
    /// 32-bit signed integer
    pub const I32: u8 = 0x10;
    /// 64-bit signed integer
    pub const I64: u8 = 0x11;
    /// 32-bit unsigned integer
    pub const U32: u8 = 0x12;
    /// 64-bit unsigned integer
    pub const U64: u8 = 0x13;
    /// 32-bit float
    pub const F32: u8 = 0x20;
    /// 64-bit float
    pub const F64: u8 = 0x21;
    /// Boolean false
    pub const FALSE: u8 = 0x26;
    /// Boolean true
    pub const TRUE: u8 = 0x27;
}

const TERMINATOR: u8 = 0x00;
const ESCAPE: u8 = 0xFF;

// ============================================================================
// Encoding
// ============================================================================

/// Encode a sequence of scalars
pub fn encode(values: &[Scalar]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 9);
    encode_into(&mut out, values);
    out
}

/// Append the encoding of `values` to `out`
pub fn encode_into(out: &mut Vec<u8>, values: &[Scalar]) {
    for value in values {
        encode_scalar(out, value);
    }
}

/// Append one tagged element
pub fn encode_scalar(out: &mut Vec<u8>, value: &Scalar) {
    match value {
        Scalar::Bytes(b) => {
            out.push(tag::BYTES);
            push_terminated_bytes(out, b);
        }
        Scalar::String(s) => {
            out.push(tag::STRING);
            push_terminated_bytes(out, s.as_bytes());
        }
        Scalar::I32(v) => {
            out.push(tag::I32);
            let mut buf = [0u8; 4];
            BigEndian::write_u32(&mut buf, (*v as u32) ^ (1 << 31));
            out.extend_from_slice(&buf);
        }
        Scalar::I64(v) => {
            out.push(tag::I64);
            let mut buf = [0u8; 8];
            BigEndian::write_u64(&mut buf, (*v as u64) ^ (1 << 63));
            out.extend_from_slice(&buf);
        }
        Scalar::U32(v) => {
            out.push(tag::U32);
            let mut buf = [0u8; 4];
            BigEndian::write_u32(&mut buf, *v);
            out.extend_from_slice(&buf);
        }
        Scalar::U64(v) => {
            out.push(tag::U64);
            let mut buf = [0u8; 8];
            BigEndian::write_u64(&mut buf, *v);
            out.extend_from_slice(&buf);
        }
        Scalar::F32(v) => {
            out.push(tag::F32);
            let mut buf = [0u8; 4];
            BigEndian::write_u32(&mut buf, ordered_f32_bits(*v));
            out.extend_from_slice(&buf);
        }
        Scalar::F64(v) => {
            out.push(tag::F64);
            let mut buf = [0u8; 8];
            BigEndian::write_u64(&mut buf, ordered_f64_bits(*v));
            out.extend_from_slice(&buf);
        }
        Scalar::Bool(false) => out.push(tag::FALSE),
        Scalar::Bool(true) => out.push(tag::TRUE),
    }
}

fn push_terminated_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        out.push(b);
        if b == TERMINATOR {
            out.push(ESCAPE);
        }
    }
    out.push(TERMINATOR);
}

fn ordered_f32_bits(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & (1 << 31) == 0 {
        bits ^ (1 << 31)
    } else {
        !bits
    }
}

fn ordered_f64_bits(value: f64) -> u64 {
    let bits = value.to_bits();
    if bits & (1 << 63) == 0 {
        bits ^ (1 << 63)
    } else {
        !bits
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode exactly `kinds.len()` elements; trailing bytes are an error
pub fn decode(bytes: &[u8], kinds: &[ScalarKind]) -> Result<Tuple> {
    let (tuple, rest) = decode_prefix(bytes, kinds)?;
    if !rest.is_empty() {
        return Err(Error::decoding(format!(
            "{} trailing byte(s) after {}-element tuple",
            rest.len(),
            kinds.len()
        )));
    }
    Ok(tuple)
}

/// Decode `kinds.len()` elements from the front of `bytes`
///
/// Returns the decoded tuple and the unconsumed tail.
pub fn decode_prefix<'a>(bytes: &'a [u8], kinds: &[ScalarKind]) -> Result<(Tuple, &'a [u8])> {
    let mut rest = bytes;
    let mut values = Vec::with_capacity(kinds.len());
    for (position, kind) in kinds.iter().enumerate() {
        let (value, tail) = decode_element(rest).map_err(|e| at_position(e, position))?;
        if value.kind() != *kind {
            return Err(Error::decoding(format!(
                "element {}: expected {}, found {}",
                position,
                kind,
                value.kind()
            )));
        }
        values.push(value);
        rest = tail;
    }
    Ok((Tuple::from(values), rest))
}

/// Decode every element, letting the tags decide the kinds
pub fn unpack(bytes: &[u8]) -> Result<Tuple> {
    let mut rest = bytes;
    let mut values = Vec::new();
    while !rest.is_empty() {
        let (value, tail) = decode_element(rest).map_err(|e| at_position(e, values.len()))?;
        values.push(value);
        rest = tail;
    }
    Ok(Tuple::from(values))
}

fn at_position(err: Error, position: usize) -> Error {
    match err {
        Error::Decoding(msg) => Error::decoding(format!("element {}: {}", position, msg)),
        other => other,
    }
}

fn decode_element(bytes: &[u8]) -> Result<(Scalar, &[u8])> {
    let (&tag, payload) = bytes
        .split_first()
        .ok_or_else(|| Error::decoding("unexpected end of key"))?;

    match tag {
        tag::BYTES => {
            let (raw, rest) = take_terminated(payload)?;
            Ok((Scalar::Bytes(raw), rest))
        }
        tag::STRING => {
            let (raw, rest) = take_terminated(payload)?;
            let s = String::from_utf8(raw)
                .map_err(|e| Error::decoding(format!("invalid UTF-8 in string: {}", e)))?;
            Ok((Scalar::String(s), rest))
        }
        tag::I32 => {
            let (raw, rest) = take_fixed(payload, 4)?;
            let v = (BigEndian::read_u32(raw) ^ (1 << 31)) as i32;
            Ok((Scalar::I32(v), rest))
        }
        tag::I64 => {
            let (raw, rest) = take_fixed(payload, 8)?;
            let v = (BigEndian::read_u64(raw) ^ (1 << 63)) as i64;
            Ok((Scalar::I64(v), rest))
        }
        tag::U32 => {
            let (raw, rest) = take_fixed(payload, 4)?;
            Ok((Scalar::U32(BigEndian::read_u32(raw)), rest))
        }
        tag::U64 => {
            let (raw, rest) = take_fixed(payload, 8)?;
            Ok((Scalar::U64(BigEndian::read_u64(raw)), rest))
        }
        tag::F32 => {
            let (raw, rest) = take_fixed(payload, 4)?;
            let bits = BigEndian::read_u32(raw);
            let bits = if bits & (1 << 31) != 0 {
                bits ^ (1 << 31)
            } else {
                !bits
            };
            Ok((Scalar::F32(f32::from_bits(bits)), rest))
        }
        tag::F64 => {
            let (raw, rest) = take_fixed(payload, 8)?;
            let bits = BigEndian::read_u64(raw);
            let bits = if bits & (1 << 63) != 0 {
                bits ^ (1 << 63)
            } else {
                !bits
            };
            Ok((Scalar::F64(f64::from_bits(bits)), rest))
        }
        tag::FALSE => Ok((Scalar::Bool(false), payload)),
        tag::TRUE => Ok((Scalar::Bool(true), payload)),
        other => Err(Error::decoding(format!("unknown type tag 0x{:02x}", other))),
    }
}

fn take_fixed(bytes: &[u8], width: usize) -> Result<(&[u8], &[u8])> {
    if bytes.len() < width {
        return Err(Error::decoding(format!(
            "truncated payload: need {} bytes, have {}",
            width,
            bytes.len()
        )));
    }
    Ok(bytes.split_at(width))
}

fn take_terminated(bytes: &[u8]) -> Result<(Vec<u8>, &[u8])> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == TERMINATOR {
            if bytes.get(i + 1) == Some(&ESCAPE) {
                out.push(TERMINATOR);
                i += 2;
                continue;
            }
            return Ok((out, &bytes[i + 1..]));
        }
        out.push(bytes[i]);
        i += 1;
    }
    Err(Error::decoding("missing terminator"))
}
