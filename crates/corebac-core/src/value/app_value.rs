//! The application-layer value union.
//!
//! One variant per BACnet application tag plus the constructed types that
//! only ever ride inside property-specific context encodings. Structural
//! equality is `PartialEq` (floats compare ordered, so NaN never equals
//! NaN) and deep copy is `Clone`.

use crate::encoding::{
    primitives as prim,
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{BitString, CharacterString, Date, DateTime, ObjectId, Time};
use crate::value::host_port::{BdtEntry, FdtEntry, HostNPort};
use crate::value::lighting::{ColorCommand, LightingCommand, XyColor};
use crate::value::reference::{
    Destination, DeviceObjectPropertyReference, DeviceObjectReference, ObjectPropertyReference,
};
use crate::value::schedule::CalendarEntry;
#[cfg(feature = "alloc")]
use crate::value::schedule::{SpecialEvent, WeeklySchedule};
use crate::value::timestamp::{self, DateRange, TimeStamp, DATETIME_ENCODED_LEN};
use crate::{DecodeError, EncodeError};

/// A decoded BACnet application-layer value.
///
/// Borrows octet-level payloads (octet strings, character strings, bit
/// strings, addresses) from the input buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum AppValue<'a> {
    Null,
    Boolean(bool),
    Unsigned(u64),
    Signed(i64),
    Real(f32),
    Double(f64),
    OctetString(&'a [u8]),
    CharacterString(CharacterString<'a>),
    BitString(BitString<'a>),
    Enumerated(u32),
    Date(Date),
    Time(Time),
    ObjectId(ObjectId),
    DateTime(DateTime),
    DateRange(DateRange),
    TimeStamp(TimeStamp),
    LightingCommand(LightingCommand),
    XyColor(XyColor),
    ColorCommand(ColorCommand),
    #[cfg(feature = "alloc")]
    WeeklySchedule(WeeklySchedule),
    CalendarEntry(CalendarEntry),
    #[cfg(feature = "alloc")]
    SpecialEvent(SpecialEvent),
    HostNPort(HostNPort<'a>),
    DeviceObjectPropertyReference(DeviceObjectPropertyReference),
    DeviceObjectReference(DeviceObjectReference),
    ObjectPropertyReference(ObjectPropertyReference),
    Destination(Destination<'a>),
    BdtEntry(BdtEntry<'a>),
    FdtEntry(FdtEntry<'a>),
    /// An opening tag immediately followed by its closing tag.
    EmptyList,
}

impl<'a> AppValue<'a> {
    /// Encodes this value in its application form: primitive variants get
    /// their application tag, constructed variants emit their sequence
    /// encoding, and `EmptyList` emits nothing.
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Null => prim::encode_app_null(w),
            Self::Boolean(v) => prim::encode_app_boolean(w, *v),
            Self::Unsigned(v) => prim::encode_app_unsigned(w, *v),
            Self::Signed(v) => prim::encode_app_signed(w, *v),
            Self::Real(v) => prim::encode_app_real(w, *v),
            Self::Double(v) => prim::encode_app_double(w, *v),
            Self::OctetString(v) => prim::encode_app_octet_string(w, v),
            Self::CharacterString(v) => prim::encode_app_character_string(w, v),
            Self::BitString(v) => prim::encode_app_bit_string(w, v),
            Self::Enumerated(v) => prim::encode_app_enumerated(w, *v),
            Self::Date(v) => prim::encode_app_date(w, v),
            Self::Time(v) => prim::encode_app_time(w, v),
            Self::ObjectId(v) => prim::encode_app_object_id(w, *v),
            Self::DateTime(v) => timestamp::encode_datetime(w, v),
            Self::DateRange(v) => v.encode(w),
            Self::TimeStamp(v) => v.encode(w),
            Self::LightingCommand(v) => v.encode(w),
            Self::XyColor(v) => v.encode(w),
            Self::ColorCommand(v) => v.encode(w),
            #[cfg(feature = "alloc")]
            Self::WeeklySchedule(v) => v.encode(w),
            Self::CalendarEntry(v) => v.encode(w),
            #[cfg(feature = "alloc")]
            Self::SpecialEvent(v) => v.encode(w),
            Self::HostNPort(v) => v.encode(w),
            Self::DeviceObjectPropertyReference(v) => v.encode(w),
            Self::DeviceObjectReference(v) => v.encode(w),
            Self::ObjectPropertyReference(v) => v.encode(w),
            Self::Destination(v) => v.encode(w),
            Self::BdtEntry(v) => v.encode(w),
            Self::FdtEntry(v) => v.encode(w),
            Self::EmptyList => Ok(()),
        }
    }

    /// Exact number of octets [`encode`](Self::encode) will emit.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Null | Self::Boolean(_) => 1,
            Self::Unsigned(v) => 1 + prim::unsigned_encoded_len(*v),
            Self::Signed(v) => 1 + prim::signed_encoded_len(*v),
            Self::Real(_) => 5,
            Self::Double(_) => 10,
            Self::OctetString(v) => {
                Tag::Application {
                    tag: AppTag::OctetString,
                    len: v.len() as u32,
                }
                .encoded_len()
                    + v.len()
            }
            Self::CharacterString(v) => {
                let content = v.bytes.len() + 1;
                Tag::Application {
                    tag: AppTag::CharacterString,
                    len: content as u32,
                }
                .encoded_len()
                    + content
            }
            Self::BitString(v) => {
                let content = v.data.len() + 1;
                Tag::Application {
                    tag: AppTag::BitString,
                    len: content as u32,
                }
                .encoded_len()
                    + content
            }
            Self::Enumerated(v) => 1 + prim::unsigned_encoded_len(*v as u64),
            Self::Date(_) | Self::Time(_) | Self::ObjectId(_) => 5,
            Self::DateTime(_) => DATETIME_ENCODED_LEN,
            Self::DateRange(_) => DateRange::ENCODED_LEN,
            Self::TimeStamp(v) => v.encoded_len(),
            Self::LightingCommand(v) => v.encoded_len(),
            Self::XyColor(_) => XyColor::ENCODED_LEN,
            Self::ColorCommand(v) => v.encoded_len(),
            #[cfg(feature = "alloc")]
            Self::WeeklySchedule(v) => v.encoded_len(),
            Self::CalendarEntry(v) => v.encoded_len(),
            #[cfg(feature = "alloc")]
            Self::SpecialEvent(v) => v.encoded_len(),
            Self::HostNPort(v) => v.encoded_len(),
            Self::DeviceObjectPropertyReference(v) => v.encoded_len(),
            Self::DeviceObjectReference(v) => v.encoded_len(),
            Self::ObjectPropertyReference(v) => v.encoded_len(),
            Self::Destination(v) => v.encoded_len(),
            Self::BdtEntry(v) => v.encoded_len(),
            Self::FdtEntry(v) => v.encoded_len(),
            Self::EmptyList => 0,
        }
    }

    /// Decodes one application-tagged primitive value.
    ///
    /// Context-class or bracket tags are not valid here; complex property
    /// values go through
    /// [`decode_known_property`](crate::value::decode_known_property).
    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        match Tag::decode(r)? {
            Tag::Application { tag, len } => Self::decode_app_payload(r, tag, len),
            _ => Err(DecodeError::TypeMismatch),
        }
    }

    pub(crate) fn decode_app_payload(
        r: &mut Reader<'a>,
        tag: AppTag,
        len: u32,
    ) -> Result<Self, DecodeError> {
        match tag {
            AppTag::Null => Ok(Self::Null),
            AppTag::Boolean => Ok(Self::Boolean(len != 0)),
            AppTag::UnsignedInt => Ok(Self::Unsigned(prim::decode_unsigned(r, len as usize)?)),
            AppTag::SignedInt => Ok(Self::Signed(prim::decode_signed(r, len as usize)?)),
            AppTag::Real => {
                if len != 4 {
                    return Err(DecodeError::InvalidLength);
                }
                Ok(Self::Real(prim::decode_real_content(r)?))
            }
            AppTag::Double => {
                if len != 8 {
                    return Err(DecodeError::InvalidLength);
                }
                Ok(Self::Double(prim::decode_double_content(r)?))
            }
            AppTag::OctetString => Ok(Self::OctetString(r.read_exact(len as usize)?)),
            AppTag::CharacterString => Ok(Self::CharacterString(
                prim::decode_character_string_content(r, len as usize)?,
            )),
            AppTag::BitString => Ok(Self::BitString(prim::decode_bit_string_content(
                r,
                len as usize,
            )?)),
            AppTag::Enumerated => {
                let v = prim::decode_unsigned(r, len as usize)?;
                let v = u32::try_from(v).map_err(|_| DecodeError::ValueOutOfRange)?;
                Ok(Self::Enumerated(v))
            }
            AppTag::Date => {
                if len != 4 {
                    return Err(DecodeError::InvalidLength);
                }
                Ok(Self::Date(prim::decode_date_content(r)?))
            }
            AppTag::Time => {
                if len != 4 {
                    return Err(DecodeError::InvalidLength);
                }
                Ok(Self::Time(prim::decode_time_content(r)?))
            }
            AppTag::ObjectId => {
                if len != 4 {
                    return Err(DecodeError::InvalidLength);
                }
                Ok(Self::ObjectId(prim::decode_object_id_content(r)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppValue;
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::{BitString, CharacterString, Date, ObjectId, ObjectType, Time};
    use crate::DecodeError;

    fn roundtrip(value: AppValue<'_>) {
        let mut buf = [0u8; 64];
        let mut w = Writer::new(&mut buf);
        value.encode(&mut w).unwrap();
        assert_eq!(w.position(), value.encoded_len(), "{value:?}");
        let mut r = Reader::new(w.as_written());
        let decoded = AppValue::decode(&mut r).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(r.position(), value.encoded_len());
    }

    #[test]
    fn primitive_roundtrips() {
        roundtrip(AppValue::Null);
        roundtrip(AppValue::Boolean(true));
        roundtrip(AppValue::Unsigned(0));
        roundtrip(AppValue::Unsigned(u64::MAX));
        roundtrip(AppValue::Signed(-40));
        roundtrip(AppValue::Real(20.5));
        roundtrip(AppValue::Double(-2.25e5));
        roundtrip(AppValue::OctetString(&[1, 2, 3]));
        roundtrip(AppValue::CharacterString(CharacterString::ansi("pump 1")));
        roundtrip(AppValue::BitString(BitString::new(2, &[0b1010_1100])));
        roundtrip(AppValue::Enumerated(98));
        roundtrip(AppValue::Date(Date::from_ymd(2024, 1, 24)));
        roundtrip(AppValue::Time(Time::new(17, 0, 59, 10)));
        roundtrip(AppValue::ObjectId(ObjectId::new(ObjectType::Device, 1)));
    }

    #[test]
    fn float_equality_is_strict_about_nan() {
        assert_ne!(AppValue::Real(f32::NAN), AppValue::Real(f32::NAN));
        assert_ne!(AppValue::Double(f64::NAN), AppValue::Double(f64::NAN));
        assert_eq!(AppValue::Real(1.0), AppValue::Real(1.0));
    }

    #[test]
    fn clone_preserves_discriminant_and_content() {
        let original = AppValue::CharacterString(CharacterString::ansi("boiler"));
        let copy = original.clone();
        assert_eq!(copy, original);
    }

    #[test]
    fn context_tag_is_not_application_data() {
        // Context tag 0, length 1.
        let mut r = Reader::new(&[0x09, 0x64]);
        assert_eq!(
            AppValue::decode(&mut r).unwrap_err(),
            DecodeError::TypeMismatch
        );
    }

    #[test]
    fn truncated_payload_is_refused() {
        // Unsigned claiming 2 content octets with only 1 present.
        let mut r = Reader::new(&[0x22, 0x01]);
        assert_eq!(
            AppValue::decode(&mut r).unwrap_err(),
            DecodeError::UnexpectedEof
        );
    }
}
