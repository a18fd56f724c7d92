//! Primitive content codecs and their application/context tagged wrappers.
//!
//! Content encoders emit the minimum-length big-endian form the standard
//! requires; every encoder has a matching `*_encoded_len` so callers can
//! size buffers exactly before writing.

use crate::encoding::{
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{BitString, CharacterString, Date, ObjectId, Time};
use crate::{DecodeError, EncodeError};

/// Number of content octets a minimum-length unsigned encoding needs.
pub const fn unsigned_encoded_len(value: u64) -> usize {
    match value {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        0x100_0000..=0xFFFF_FFFF => 4,
        0x1_0000_0000..=0xFF_FFFF_FFFF => 5,
        0x100_0000_0000..=0xFFFF_FFFF_FFFF => 6,
        0x1_0000_0000_0000..=0xFF_FFFF_FFFF_FFFF => 7,
        _ => 8,
    }
}

pub fn encode_unsigned(w: &mut Writer<'_>, value: u64) -> Result<usize, EncodeError> {
    let len = unsigned_encoded_len(value);
    let bytes = value.to_be_bytes();
    w.write_all(&bytes[8 - len..])?;
    Ok(len)
}

pub fn decode_unsigned(r: &mut Reader<'_>, len: usize) -> Result<u64, DecodeError> {
    if len == 0 || len > 8 {
        return Err(DecodeError::InvalidLength);
    }
    let mut value = 0u64;
    for _ in 0..len {
        value = (value << 8) | r.read_u8()? as u64;
    }
    Ok(value)
}

/// Number of content octets a minimum-length two's-complement encoding needs.
pub const fn signed_encoded_len(value: i64) -> usize {
    let mut len = 1usize;
    while len < 8 {
        let shift = (len * 8 - 1) as u32;
        if value >= -(1i64 << shift) && value < (1i64 << shift) {
            return len;
        }
        len += 1;
    }
    8
}

pub fn encode_signed(w: &mut Writer<'_>, value: i64) -> Result<usize, EncodeError> {
    let len = signed_encoded_len(value);
    let bytes = value.to_be_bytes();
    w.write_all(&bytes[8 - len..])?;
    Ok(len)
}

pub fn decode_signed(r: &mut Reader<'_>, len: usize) -> Result<i64, DecodeError> {
    if len == 0 || len > 8 {
        return Err(DecodeError::InvalidLength);
    }
    let bytes = r.read_exact(len)?;
    let fill = if (bytes[0] & 0x80) != 0 { 0xFF } else { 0x00 };
    let mut out = [fill; 8];
    out[8 - len..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(out))
}

pub fn decode_real_content(r: &mut Reader<'_>) -> Result<f32, DecodeError> {
    let b = r.read_exact(4)?;
    Ok(f32::from_bits(u32::from_be_bytes([b[0], b[1], b[2], b[3]])))
}

pub fn decode_double_content(r: &mut Reader<'_>) -> Result<f64, DecodeError> {
    let b = r.read_exact(8)?;
    Ok(f64::from_bits(u64::from_be_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ])))
}

pub fn decode_date_content(r: &mut Reader<'_>) -> Result<Date, DecodeError> {
    let b = r.read_exact(4)?;
    Ok(Date {
        year_since_1900: b[0],
        month: b[1],
        day: b[2],
        weekday: b[3],
    })
}

pub fn decode_time_content(r: &mut Reader<'_>) -> Result<Time, DecodeError> {
    let b = r.read_exact(4)?;
    Ok(Time {
        hour: b[0],
        minute: b[1],
        second: b[2],
        hundredths: b[3],
    })
}

pub fn decode_object_id_content(r: &mut Reader<'_>) -> Result<ObjectId, DecodeError> {
    Ok(ObjectId::from_raw(r.read_be_u32()?))
}

pub fn decode_character_string_content<'a>(
    r: &mut Reader<'a>,
    len: usize,
) -> Result<CharacterString<'a>, DecodeError> {
    if len == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let raw = r.read_exact(len)?;
    Ok(CharacterString {
        encoding: raw[0],
        bytes: &raw[1..],
    })
}

pub fn decode_bit_string_content<'a>(
    r: &mut Reader<'a>,
    len: usize,
) -> Result<BitString<'a>, DecodeError> {
    if len == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let raw = r.read_exact(len)?;
    if raw[0] > 7 {
        return Err(DecodeError::InvalidValue);
    }
    Ok(BitString {
        unused_bits: raw[0],
        data: &raw[1..],
    })
}

// --- application-tagged wrappers ---

pub fn encode_app_null(w: &mut Writer<'_>) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Null,
        len: 0,
    }
    .encode(w)
}

pub fn encode_app_boolean(w: &mut Writer<'_>, value: bool) -> Result<(), EncodeError> {
    // The value rides in the length field; there is no payload.
    Tag::Application {
        tag: AppTag::Boolean,
        len: u32::from(value),
    }
    .encode(w)
}

pub fn encode_app_unsigned(w: &mut Writer<'_>, value: u64) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::UnsignedInt,
        len: unsigned_encoded_len(value) as u32,
    }
    .encode(w)?;
    encode_unsigned(w, value).map(|_| ())
}

pub fn encode_app_signed(w: &mut Writer<'_>, value: i64) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::SignedInt,
        len: signed_encoded_len(value) as u32,
    }
    .encode(w)?;
    encode_signed(w, value).map(|_| ())
}

pub fn encode_app_enumerated(w: &mut Writer<'_>, value: u32) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Enumerated,
        len: unsigned_encoded_len(value as u64) as u32,
    }
    .encode(w)?;
    encode_unsigned(w, value as u64).map(|_| ())
}

pub fn encode_app_real(w: &mut Writer<'_>, value: f32) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Real,
        len: 4,
    }
    .encode(w)?;
    w.write_all(&value.to_bits().to_be_bytes())
}

pub fn encode_app_double(w: &mut Writer<'_>, value: f64) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Double,
        len: 8,
    }
    .encode(w)?;
    w.write_all(&value.to_bits().to_be_bytes())
}

pub fn encode_app_octet_string(w: &mut Writer<'_>, data: &[u8]) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::OctetString,
        len: u32_len(data.len())?,
    }
    .encode(w)?;
    w.write_all(data)
}

pub fn encode_app_character_string(
    w: &mut Writer<'_>,
    value: &CharacterString<'_>,
) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::CharacterString,
        len: u32_len(value.bytes.len() + 1)?,
    }
    .encode(w)?;
    w.write_u8(value.encoding)?;
    w.write_all(value.bytes)
}

pub fn encode_app_bit_string(w: &mut Writer<'_>, value: &BitString<'_>) -> Result<(), EncodeError> {
    if value.unused_bits > 7 {
        return Err(EncodeError::ValueOutOfRange);
    }
    Tag::Application {
        tag: AppTag::BitString,
        len: u32_len(value.data.len() + 1)?,
    }
    .encode(w)?;
    w.write_u8(value.unused_bits)?;
    w.write_all(value.data)
}

pub fn encode_app_date(w: &mut Writer<'_>, value: &Date) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Date,
        len: 4,
    }
    .encode(w)?;
    w.write_all(&[value.year_since_1900, value.month, value.day, value.weekday])
}

pub fn encode_app_time(w: &mut Writer<'_>, value: &Time) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Time,
        len: 4,
    }
    .encode(w)?;
    w.write_all(&[value.hour, value.minute, value.second, value.hundredths])
}

pub fn encode_app_object_id(w: &mut Writer<'_>, value: ObjectId) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::ObjectId,
        len: 4,
    }
    .encode(w)?;
    w.write_be_u32(value.raw())
}

// --- strict application-tag decoders ---

fn expect_app(r: &mut Reader<'_>, expected: AppTag) -> Result<u32, DecodeError> {
    match Tag::decode(r)? {
        Tag::Application { tag, len } if tag == expected => Ok(len),
        _ => Err(DecodeError::TypeMismatch),
    }
}

pub fn decode_app_boolean(r: &mut Reader<'_>) -> Result<bool, DecodeError> {
    let len = expect_app(r, AppTag::Boolean)?;
    Ok(len != 0)
}

pub fn decode_app_unsigned(r: &mut Reader<'_>) -> Result<u64, DecodeError> {
    let len = expect_app(r, AppTag::UnsignedInt)?;
    decode_unsigned(r, len as usize)
}

pub fn decode_app_signed(r: &mut Reader<'_>) -> Result<i64, DecodeError> {
    let len = expect_app(r, AppTag::SignedInt)?;
    decode_signed(r, len as usize)
}

pub fn decode_app_enumerated(r: &mut Reader<'_>) -> Result<u32, DecodeError> {
    let len = expect_app(r, AppTag::Enumerated)?;
    let value = decode_unsigned(r, len as usize)?;
    u32::try_from(value).map_err(|_| DecodeError::ValueOutOfRange)
}

pub fn decode_app_real(r: &mut Reader<'_>) -> Result<f32, DecodeError> {
    match expect_app(r, AppTag::Real)? {
        4 => decode_real_content(r),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_app_double(r: &mut Reader<'_>) -> Result<f64, DecodeError> {
    match expect_app(r, AppTag::Double)? {
        8 => decode_double_content(r),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_app_date(r: &mut Reader<'_>) -> Result<Date, DecodeError> {
    match expect_app(r, AppTag::Date)? {
        4 => decode_date_content(r),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_app_time(r: &mut Reader<'_>) -> Result<Time, DecodeError> {
    match expect_app(r, AppTag::Time)? {
        4 => decode_time_content(r),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_app_object_id(r: &mut Reader<'_>) -> Result<ObjectId, DecodeError> {
    match expect_app(r, AppTag::ObjectId)? {
        4 => decode_object_id_content(r),
        _ => Err(DecodeError::InvalidLength),
    }
}

pub fn decode_app_character_string<'a>(
    r: &mut Reader<'a>,
) -> Result<CharacterString<'a>, DecodeError> {
    let len = expect_app(r, AppTag::CharacterString)?;
    decode_character_string_content(r, len as usize)
}

pub fn decode_app_bit_string<'a>(r: &mut Reader<'a>) -> Result<BitString<'a>, DecodeError> {
    let len = expect_app(r, AppTag::BitString)?;
    decode_bit_string_content(r, len as usize)
}

// --- context-tagged wrappers ---

pub fn encode_ctx_null(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 0 }.encode(w)
}

/// Context booleans carry one payload octet, unlike the application form.
pub fn encode_ctx_boolean(w: &mut Writer<'_>, tag_num: u8, value: bool) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 1 }.encode(w)?;
    w.write_u8(u8::from(value))
}

pub fn encode_ctx_unsigned(w: &mut Writer<'_>, tag_num: u8, value: u64) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: unsigned_encoded_len(value) as u32,
    }
    .encode(w)?;
    encode_unsigned(w, value).map(|_| ())
}

pub fn encode_ctx_signed(w: &mut Writer<'_>, tag_num: u8, value: i64) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: signed_encoded_len(value) as u32,
    }
    .encode(w)?;
    encode_signed(w, value).map(|_| ())
}

pub fn encode_ctx_enumerated(
    w: &mut Writer<'_>,
    tag_num: u8,
    value: u32,
) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: unsigned_encoded_len(value as u64) as u32,
    }
    .encode(w)?;
    encode_unsigned(w, value as u64).map(|_| ())
}

pub fn encode_ctx_real(w: &mut Writer<'_>, tag_num: u8, value: f32) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_all(&value.to_bits().to_be_bytes())
}

pub fn encode_ctx_double(w: &mut Writer<'_>, tag_num: u8, value: f64) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 8 }.encode(w)?;
    w.write_all(&value.to_bits().to_be_bytes())
}

pub fn encode_ctx_date(w: &mut Writer<'_>, tag_num: u8, value: &Date) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_all(&[value.year_since_1900, value.month, value.day, value.weekday])
}

pub fn encode_ctx_time(w: &mut Writer<'_>, tag_num: u8, value: &Time) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_all(&[value.hour, value.minute, value.second, value.hundredths])
}

pub fn encode_ctx_object_id(
    w: &mut Writer<'_>,
    tag_num: u8,
    value: ObjectId,
) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_be_u32(value.raw())
}

pub fn encode_ctx_octet_string(
    w: &mut Writer<'_>,
    tag_num: u8,
    data: &[u8],
) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: u32_len(data.len())?,
    }
    .encode(w)?;
    w.write_all(data)
}

pub fn encode_ctx_character_string(
    w: &mut Writer<'_>,
    tag_num: u8,
    value: &CharacterString<'_>,
) -> Result<(), EncodeError> {
    Tag::Context {
        tag_num,
        len: u32_len(value.bytes.len() + 1)?,
    }
    .encode(w)?;
    w.write_u8(value.encoding)?;
    w.write_all(value.bytes)
}

pub fn encode_opening_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Opening { tag_num }.encode(w)
}

pub fn encode_closing_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Closing { tag_num }.encode(w)
}

// --- strict context-tag decoders used by the constructed-type codecs ---

/// Decodes the next tag and demands a data-class context tag with `tag_num`.
pub fn expect_ctx(r: &mut Reader<'_>, tag_num: u8) -> Result<u32, DecodeError> {
    match Tag::decode(r)? {
        Tag::Context { tag_num: n, len } if n == tag_num => Ok(len),
        _ => Err(DecodeError::TypeMismatch),
    }
}

pub fn expect_opening(r: &mut Reader<'_>, tag_num: u8) -> Result<(), DecodeError> {
    match Tag::decode(r)? {
        Tag::Opening { tag_num: n } if n == tag_num => Ok(()),
        _ => Err(DecodeError::MalformedTag),
    }
}

pub fn expect_closing(r: &mut Reader<'_>, tag_num: u8) -> Result<(), DecodeError> {
    match Tag::decode(r)? {
        Tag::Closing { tag_num: n } if n == tag_num => Ok(()),
        _ => Err(DecodeError::MalformedTag),
    }
}

/// Decodes the next tag without consuming it.
pub fn peek_tag(r: &Reader<'_>) -> Result<Tag, DecodeError> {
    let mut probe = *r;
    Tag::decode(&mut probe)
}

pub fn decode_ctx_unsigned(r: &mut Reader<'_>, tag_num: u8) -> Result<u64, DecodeError> {
    let len = expect_ctx(r, tag_num)?;
    decode_unsigned(r, len as usize)
}

pub fn decode_ctx_enumerated(r: &mut Reader<'_>, tag_num: u8) -> Result<u32, DecodeError> {
    let len = expect_ctx(r, tag_num)?;
    let value = decode_unsigned(r, len as usize)?;
    u32::try_from(value).map_err(|_| DecodeError::ValueOutOfRange)
}

pub fn decode_ctx_object_id(r: &mut Reader<'_>, tag_num: u8) -> Result<ObjectId, DecodeError> {
    match expect_ctx(r, tag_num)? {
        4 => decode_object_id_content(r),
        _ => Err(DecodeError::InvalidLength),
    }
}

fn u32_len(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::ValueOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{reader::Reader, writer::Writer};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn unsigned_roundtrip(v in any::<u64>()) {
            let mut b = [0u8; 16];
            let mut w = Writer::new(&mut b);
            let len = encode_unsigned(&mut w, v).unwrap();
            prop_assert_eq!(len, unsigned_encoded_len(v));
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(decode_unsigned(&mut r, len).unwrap(), v);
        }

        #[test]
        fn signed_roundtrip(v in any::<i64>()) {
            let mut b = [0u8; 16];
            let mut w = Writer::new(&mut b);
            let len = encode_signed(&mut w, v).unwrap();
            prop_assert_eq!(len, signed_encoded_len(v));
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(decode_signed(&mut r, len).unwrap(), v);
        }

        #[test]
        fn app_unsigned_roundtrip(v in any::<u64>()) {
            let mut b = [0u8; 16];
            let mut w = Writer::new(&mut b);
            encode_app_unsigned(&mut w, v).unwrap();
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(decode_app_unsigned(&mut r).unwrap(), v);
        }

        #[test]
        fn app_signed_roundtrip(v in any::<i64>()) {
            let mut b = [0u8; 16];
            let mut w = Writer::new(&mut b);
            encode_app_signed(&mut w, v).unwrap();
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(decode_app_signed(&mut r).unwrap(), v);
        }
    }

    #[test]
    fn minimum_length_boundaries() {
        assert_eq!(unsigned_encoded_len(0), 1);
        assert_eq!(unsigned_encoded_len(255), 1);
        assert_eq!(unsigned_encoded_len(256), 2);
        assert_eq!(signed_encoded_len(127), 1);
        assert_eq!(signed_encoded_len(128), 2);
        assert_eq!(signed_encoded_len(-128), 1);
        assert_eq!(signed_encoded_len(-129), 2);
    }

    #[test]
    fn boolean_value_lives_in_the_length_field() {
        let mut b = [0u8; 2];
        let mut w = Writer::new(&mut b);
        encode_app_boolean(&mut w, true).unwrap();
        assert_eq!(w.as_written(), &[0x11]);

        let mut r = Reader::new(&[0x10]);
        assert!(!decode_app_boolean(&mut r).unwrap());
    }

    #[test]
    fn context_boolean_carries_a_payload_octet() {
        let mut b = [0u8; 2];
        let mut w = Writer::new(&mut b);
        encode_ctx_boolean(&mut w, 7, true).unwrap();
        assert_eq!(w.as_written(), &[0x79, 0x01]);
    }

    #[test]
    fn mismatched_app_tag_is_a_type_error() {
        // Real tag where an unsigned is demanded.
        let mut r = Reader::new(&[0x44, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(
            decode_app_unsigned(&mut r).unwrap_err(),
            crate::DecodeError::TypeMismatch
        );
    }
}
