//! BACnetDateTime, BACnetDateRange, and BACnetTimeStamp wire codecs.
//!
//! A DateTime is two application tags (Date then Time) back to back; the
//! context form brackets the same content with an opening/closing pair.

use crate::encoding::{primitives as prim, reader::Reader, tag::Tag, writer::Writer};
use crate::types::{Date, DateTime, Time};
use crate::{DecodeError, EncodeError};

/// Application encoding of a DateTime: 10 octets.
pub const DATETIME_ENCODED_LEN: usize = 10;

pub fn encode_datetime(w: &mut Writer<'_>, value: &DateTime) -> Result<(), EncodeError> {
    prim::encode_app_date(w, &value.date)?;
    prim::encode_app_time(w, &value.time)
}

pub fn decode_datetime(r: &mut Reader<'_>) -> Result<DateTime, DecodeError> {
    let date = prim::decode_app_date(r)?;
    let time = prim::decode_app_time(r)?;
    Ok(DateTime::new(date, time))
}

pub fn encode_ctx_datetime(
    w: &mut Writer<'_>,
    tag_num: u8,
    value: &DateTime,
) -> Result<(), EncodeError> {
    prim::encode_opening_tag(w, tag_num)?;
    encode_datetime(w, value)?;
    prim::encode_closing_tag(w, tag_num)
}

pub fn decode_ctx_datetime(r: &mut Reader<'_>, tag_num: u8) -> Result<DateTime, DecodeError> {
    prim::expect_opening(r, tag_num)?;
    let value = decode_datetime(r)?;
    prim::expect_closing(r, tag_num)?;
    Ok(value)
}

/// BACnetDateRange: start and end Date as two application tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub const ENCODED_LEN: usize = 10;

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_app_date(w, &self.start)?;
        prim::encode_app_date(w, &self.end)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            start: prim::decode_app_date(r)?,
            end: prim::decode_app_date(r)?,
        })
    }
}

/// BACnetTimeStamp CHOICE: `[0]` Time, `[1]` sequence number, `[2]`
/// bracketed DateTime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStamp {
    Time(Time),
    Sequence(u32),
    DateTime(DateTime),
}

impl TimeStamp {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Time(time) => prim::encode_ctx_time(w, 0, time),
            Self::Sequence(seq) => prim::encode_ctx_unsigned(w, 1, *seq as u64),
            Self::DateTime(dt) => encode_ctx_datetime(w, 2, dt),
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        match prim::peek_tag(r)? {
            Tag::Context { tag_num: 0, .. } => {
                let len = prim::expect_ctx(r, 0)?;
                if len != 4 {
                    return Err(DecodeError::InvalidLength);
                }
                Ok(Self::Time(prim::decode_time_content(r)?))
            }
            Tag::Context { tag_num: 1, .. } => {
                let seq = prim::decode_ctx_unsigned(r, 1)?;
                let seq = u32::try_from(seq).map_err(|_| DecodeError::ValueOutOfRange)?;
                Ok(Self::Sequence(seq))
            }
            Tag::Opening { tag_num: 2 } => Ok(Self::DateTime(decode_ctx_datetime(r, 2)?)),
            _ => Err(DecodeError::MalformedTag),
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Time(_) => 5,
            Self::Sequence(seq) => 1 + prim::unsigned_encoded_len(*seq as u64),
            Self::DateTime(_) => 2 + DATETIME_ENCODED_LEN,
        }
    }
}
