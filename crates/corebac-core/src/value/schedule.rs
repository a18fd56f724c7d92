//! Schedule-related constructed types: time/value pairs, weekly schedules,
//! calendar entries, and special (exception) events.

use crate::encoding::{primitives as prim, reader::Reader, tag::AppTag, tag::Tag, writer::Writer};
use crate::types::{Date, ObjectId, Time};
use crate::value::timestamp::DateRange;
use crate::{DecodeError, EncodeError};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// The primitive subset allowed inside a BACnetTimeValue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
    Null,
    Boolean(bool),
    Unsigned(u64),
    Signed(i64),
    Real(f32),
    Double(f64),
    Enumerated(u32),
}

impl PrimitiveValue {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Null => prim::encode_app_null(w),
            Self::Boolean(v) => prim::encode_app_boolean(w, *v),
            Self::Unsigned(v) => prim::encode_app_unsigned(w, *v),
            Self::Signed(v) => prim::encode_app_signed(w, *v),
            Self::Real(v) => prim::encode_app_real(w, *v),
            Self::Double(v) => prim::encode_app_double(w, *v),
            Self::Enumerated(v) => prim::encode_app_enumerated(w, *v),
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        match Tag::decode(r)? {
            Tag::Application {
                tag: AppTag::Null, ..
            } => Ok(Self::Null),
            Tag::Application {
                tag: AppTag::Boolean,
                len,
            } => Ok(Self::Boolean(len != 0)),
            Tag::Application {
                tag: AppTag::UnsignedInt,
                len,
            } => Ok(Self::Unsigned(prim::decode_unsigned(r, len as usize)?)),
            Tag::Application {
                tag: AppTag::SignedInt,
                len,
            } => Ok(Self::Signed(prim::decode_signed(r, len as usize)?)),
            Tag::Application {
                tag: AppTag::Real,
                len: 4,
            } => Ok(Self::Real(prim::decode_real_content(r)?)),
            Tag::Application {
                tag: AppTag::Double,
                len: 8,
            } => Ok(Self::Double(prim::decode_double_content(r)?)),
            Tag::Application {
                tag: AppTag::Enumerated,
                len,
            } => {
                let v = prim::decode_unsigned(r, len as usize)?;
                let v = u32::try_from(v).map_err(|_| DecodeError::ValueOutOfRange)?;
                Ok(Self::Enumerated(v))
            }
            _ => Err(DecodeError::TypeMismatch),
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Null | Self::Boolean(_) => 1,
            Self::Unsigned(v) => 1 + prim::unsigned_encoded_len(*v),
            Self::Signed(v) => 1 + prim::signed_encoded_len(*v),
            Self::Real(_) => 5,
            Self::Double(_) => 10,
            Self::Enumerated(v) => 1 + prim::unsigned_encoded_len(*v as u64),
        }
    }
}

/// BACnetTimeValue: an application-tagged Time followed by a primitive value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeValue {
    pub time: Time,
    pub value: PrimitiveValue,
}

impl TimeValue {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_app_time(w, &self.time)?;
        self.value.encode(w)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            time: prim::decode_app_time(r)?,
            value: PrimitiveValue::decode(r)?,
        })
    }

    pub fn encoded_len(&self) -> usize {
        5 + self.value.encoded_len()
    }
}

/// BACnetWeeklySchedule: seven `[0]`-bracketed daily time/value lists,
/// Monday first.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeeklySchedule {
    pub days: [Vec<TimeValue>; 7],
}

#[cfg(feature = "alloc")]
impl WeeklySchedule {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        for day in &self.days {
            prim::encode_opening_tag(w, 0)?;
            for tv in day {
                tv.encode(w)?;
            }
            prim::encode_closing_tag(w, 0)?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let mut days: [Vec<TimeValue>; 7] = Default::default();
        for day in &mut days {
            prim::expect_opening(r, 0)?;
            while prim::peek_tag(r)? != (Tag::Closing { tag_num: 0 }) {
                day.push(TimeValue::decode(r)?);
            }
            prim::expect_closing(r, 0)?;
        }
        Ok(Self { days })
    }

    pub fn encoded_len(&self) -> usize {
        self.days
            .iter()
            .map(|day| 2 + day.iter().map(TimeValue::encoded_len).sum::<usize>())
            .sum()
    }
}

/// BACnetWeekNDay: month, week of month, and day of week selectors with
/// 255 meaning "any".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekNDay {
    pub month: u8,
    pub week_of_month: u8,
    pub weekday: u8,
}

/// BACnetCalendarEntry CHOICE: `[0]` Date, `[1]` bracketed DateRange, `[2]`
/// WeekNDay octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarEntry {
    Date(Date),
    DateRange(DateRange),
    WeekNDay(WeekNDay),
}

impl CalendarEntry {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Date(date) => prim::encode_ctx_date(w, 0, date),
            Self::DateRange(range) => {
                prim::encode_opening_tag(w, 1)?;
                range.encode(w)?;
                prim::encode_closing_tag(w, 1)
            }
            Self::WeekNDay(wnd) => {
                prim::encode_ctx_octet_string(w, 2, &[wnd.month, wnd.week_of_month, wnd.weekday])
            }
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        match prim::peek_tag(r)? {
            Tag::Context { tag_num: 0, .. } => {
                let len = prim::expect_ctx(r, 0)?;
                if len != 4 {
                    return Err(DecodeError::InvalidLength);
                }
                Ok(Self::Date(prim::decode_date_content(r)?))
            }
            Tag::Opening { tag_num: 1 } => {
                prim::expect_opening(r, 1)?;
                let range = DateRange::decode(r)?;
                prim::expect_closing(r, 1)?;
                Ok(Self::DateRange(range))
            }
            Tag::Context { tag_num: 2, .. } => {
                let len = prim::expect_ctx(r, 2)?;
                if len != 3 {
                    return Err(DecodeError::InvalidLength);
                }
                let b = r.read_exact(3)?;
                Ok(Self::WeekNDay(WeekNDay {
                    month: b[0],
                    week_of_month: b[1],
                    weekday: b[2],
                }))
            }
            _ => Err(DecodeError::MalformedTag),
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Date(_) => 5,
            Self::DateRange(_) => 2 + DateRange::ENCODED_LEN,
            Self::WeekNDay(_) => 4,
        }
    }
}

/// The period alternative of a BACnetSpecialEvent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialEventPeriod {
    /// `[0]`-bracketed calendar entry.
    Calendar(CalendarEntry),
    /// `[1]` reference to a Calendar object.
    CalendarReference(ObjectId),
}

/// BACnetSpecialEvent: a period, a `[2]`-bracketed time/value list, and a
/// `[3]` event priority.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialEvent {
    pub period: SpecialEventPeriod,
    pub time_values: Vec<TimeValue>,
    pub priority: u8,
}

#[cfg(feature = "alloc")]
impl SpecialEvent {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match &self.period {
            SpecialEventPeriod::Calendar(entry) => {
                prim::encode_opening_tag(w, 0)?;
                entry.encode(w)?;
                prim::encode_closing_tag(w, 0)?;
            }
            SpecialEventPeriod::CalendarReference(id) => {
                prim::encode_ctx_object_id(w, 1, *id)?;
            }
        }
        prim::encode_opening_tag(w, 2)?;
        for tv in &self.time_values {
            tv.encode(w)?;
        }
        prim::encode_closing_tag(w, 2)?;
        prim::encode_ctx_unsigned(w, 3, self.priority as u64)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let period = match prim::peek_tag(r)? {
            Tag::Opening { tag_num: 0 } => {
                prim::expect_opening(r, 0)?;
                let entry = CalendarEntry::decode(r)?;
                prim::expect_closing(r, 0)?;
                SpecialEventPeriod::Calendar(entry)
            }
            Tag::Context { tag_num: 1, .. } => {
                SpecialEventPeriod::CalendarReference(prim::decode_ctx_object_id(r, 1)?)
            }
            _ => return Err(DecodeError::MalformedTag),
        };

        prim::expect_opening(r, 2)?;
        let mut time_values = Vec::new();
        while prim::peek_tag(r)? != (Tag::Closing { tag_num: 2 }) {
            time_values.push(TimeValue::decode(r)?);
        }
        prim::expect_closing(r, 2)?;

        let priority = prim::decode_ctx_unsigned(r, 3)?;
        let priority = u8::try_from(priority).map_err(|_| DecodeError::ValueOutOfRange)?;

        Ok(Self {
            period,
            time_values,
            priority,
        })
    }

    pub fn encoded_len(&self) -> usize {
        let period = match &self.period {
            SpecialEventPeriod::Calendar(entry) => 2 + entry.encoded_len(),
            SpecialEventPeriod::CalendarReference(_) => 5,
        };
        let values: usize = self.time_values.iter().map(TimeValue::encoded_len).sum();
        period + 2 + values + 1 + prim::unsigned_encoded_len(self.priority as u64)
    }
}
