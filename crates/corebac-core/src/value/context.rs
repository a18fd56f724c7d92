//! Context-tagged decoding.
//!
//! Context tag numbers do not carry a type; the enclosing property does.
//! This module owns the property-to-type table, the context
//! encoder/decoder built on it, the dispatcher-facing known-property
//! decoder for complex values, and the bracket-measuring length walker
//! used to skip well-formed but unknown constructed data.

use crate::encoding::{
    primitives as prim,
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{ObjectType, PropertyId};
use crate::value::app_value::AppValue;
use crate::value::host_port::{BdtEntry, FdtEntry, HostNPort};
use crate::value::lighting::{ColorCommand, LightingCommand, XyColor};
use crate::value::reference::{
    Destination, DeviceObjectPropertyReference, DeviceObjectReference, ObjectPropertyReference,
};
use crate::value::schedule::{CalendarEntry, WeekNDay};
#[cfg(feature = "alloc")]
use crate::value::schedule::{SpecialEvent, WeeklySchedule};
use crate::value::timestamp::{self, DateRange, TimeStamp};
use crate::{DecodeError, EncodeError};

/// The resolved type of a tagged value, covering both the thirteen wire
/// application tags and the constructed types that only exist inside
/// property-specific encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Unsigned,
    Signed,
    Real,
    Double,
    OctetString,
    CharacterString,
    BitString,
    Enumerated,
    Date,
    Time,
    ObjectId,
    DateTime,
    DateRange,
    TimeStamp,
    LightingCommand,
    XyColor,
    ColorCommand,
    WeeklySchedule,
    CalendarEntry,
    SpecialEvent,
    HostNPort,
    DeviceObjectPropertyReference,
    DeviceObjectReference,
    ObjectPropertyReference,
    Destination,
    BdtEntry,
    FdtEntry,
    WeekNDay,
}

/// A context-tagged value together with the tag number that selected its
/// type.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextValue<'a> {
    pub tag: u8,
    pub value: AppValue<'a>,
}

/// Resolves `(property, context tag)` to the type of the tagged payload.
///
/// Pairs absent from the table decode generically: a data tag at face
/// value, a constructed tag as a measured opaque span.
pub fn context_tag_type(property: PropertyId, tag_number: u8) -> Option<ValueKind> {
    use PropertyId as P;
    use ValueKind as K;

    match property {
        // BACnetCalendarEntry CHOICE { date [0], date-range [1], weekNDay [2] }
        P::DateList => match tag_number {
            0 => Some(K::Date),
            1 => Some(K::DateRange),
            2 => Some(K::WeekNDay),
            _ => None,
        },
        // BACnetShedLevel CHOICE { percent [0], level [1], amount [2] }
        P::ActualShedLevel | P::RequestedShedLevel | P::ExpectedShedLevel => match tag_number {
            0 | 1 => Some(K::Unsigned),
            2 => Some(K::Real),
            _ => None,
        },
        // BACnetActionCommand; [4] is abstract syntax and stays untyped.
        P::Action => match tag_number {
            0 | 1 => Some(K::ObjectId),
            2 => Some(K::Enumerated),
            3 | 5 | 6 => Some(K::Unsigned),
            7 | 8 => Some(K::Boolean),
            _ => None,
        },
        P::ListOfGroupMembers => match tag_number {
            0 => Some(K::ObjectId),
            _ => None,
        },
        // BACnetSpecialEvent members with fixed types; [0] and [2] are
        // abstract-syntax content.
        P::ExceptionSchedule => match tag_number {
            1 => Some(K::ObjectId),
            3 => Some(K::Unsigned),
            _ => None,
        },
        P::LogDeviceObjectProperty | P::ObjectPropertyReference => match tag_number {
            0 | 3 => Some(K::ObjectId),
            1 => Some(K::Enumerated),
            2 => Some(K::Unsigned),
            _ => None,
        },
        P::SubordinateList => match tag_number {
            0 | 1 => Some(K::ObjectId),
            _ => None,
        },
        P::RecipientList => match tag_number {
            0 => Some(K::ObjectId),
            _ => None,
        },
        P::ActiveCovSubscriptions => match tag_number {
            1 => Some(K::ObjectPropertyReference),
            2 => Some(K::Boolean),
            3 => Some(K::Unsigned),
            4 => Some(K::Real),
            _ => None,
        },
        P::SetpointReference => match tag_number {
            0 => Some(K::ObjectPropertyReference),
            _ => None,
        },
        P::FdBbmdAddress | P::BacnetIpGlobalAddress => match tag_number {
            0 => Some(K::HostNPort),
            _ => None,
        },
        P::LightingCommand => match tag_number {
            0 => Some(K::LightingCommand),
            _ => None,
        },
        P::ColorCommand => match tag_number {
            0 => Some(K::ColorCommand),
            _ => None,
        },
        P::ListOfObjectPropertyReferences => match tag_number {
            0 => Some(K::DeviceObjectPropertyReference),
            _ => None,
        },
        // BACnetTimeStamp CHOICE { time [0], sequence-number [1],
        // datetime [2] }
        P::EventTimeStamps => match tag_number {
            0 => Some(K::Time),
            1 => Some(K::Unsigned),
            2 => Some(K::DateTime),
            _ => None,
        },
        // BACnetScale CHOICE { float-scale [0], integer-scale [1] }
        P::Scale => match tag_number {
            0 => Some(K::Real),
            1 => Some(K::Signed),
            _ => None,
        },
        // BACnetPrescale { multiplier [0], modulo-divide [1] }
        P::Prescale => match tag_number {
            0 | 1 => Some(K::Unsigned),
            _ => None,
        },
        _ => None,
    }
}

/// The fixed complex type of a property, when it has one.
///
/// Properties not listed here are "simple": their values are self-described
/// application data or table-resolved context data.
pub fn known_property_kind(object_type: ObjectType, property: PropertyId) -> Option<ValueKind> {
    use PropertyId as P;
    use ValueKind as K;

    match property {
        P::SubordinateList => Some(K::DeviceObjectReference),
        P::ChangeOfStateTime
        | P::TimeOfActiveTimeReset
        | P::TimeOfStateCountReset
        | P::StartTime
        | P::StopTime
        | P::ModificationDate
        | P::UpdateTime => Some(K::DateTime),
        P::ObjectPropertyReference | P::LogDeviceObjectProperty | P::ListOfObjectPropertyReferences => {
            Some(K::DeviceObjectPropertyReference)
        }
        P::ManipulatedVariableReference | P::ControlledVariableReference | P::InputReference => {
            Some(K::ObjectPropertyReference)
        }
        P::EventTimeStamps | P::LastRestoreTime | P::TimeOfDeviceRestart => Some(K::TimeStamp),
        P::DefaultColor => Some(K::XyColor),
        P::TrackingValue | P::PresentValue if object_type == ObjectType::Color => Some(K::XyColor),
        P::ColorCommand => Some(K::ColorCommand),
        P::LightingCommand => Some(K::LightingCommand),
        #[cfg(feature = "alloc")]
        P::WeeklySchedule => Some(K::WeeklySchedule),
        #[cfg(feature = "alloc")]
        P::ExceptionSchedule => Some(K::SpecialEvent),
        P::DateList => Some(K::CalendarEntry),
        P::EffectivePeriod => Some(K::DateRange),
        P::RecipientList => Some(K::Destination),
        P::FdBbmdAddress | P::BacnetIpGlobalAddress => Some(K::HostNPort),
        P::BbmdBroadcastDistributionTable => Some(K::BdtEntry),
        P::BbmdForeignDeviceTable => Some(K::FdtEntry),
        _ => None,
    }
}

/// Decodes one context-tagged value of `property`.
///
/// A leading closing tag means "end of enclosing list" and yields
/// [`AppValue::EmptyList`] without consuming the tag. A tag number outside
/// the property table decodes generically; zero-length unknown data tags
/// are refused since nothing distinguishes them from a misplaced header.
pub fn decode_context<'a>(
    r: &mut Reader<'a>,
    property: PropertyId,
) -> Result<ContextValue<'a>, DecodeError> {
    let tag = prim::peek_tag(r)?;
    let tag_num = match tag {
        Tag::Closing { tag_num } => {
            return Ok(ContextValue {
                tag: tag_num,
                value: AppValue::EmptyList,
            })
        }
        Tag::Application { .. } => return Err(DecodeError::TypeMismatch),
        Tag::Context { tag_num, .. } | Tag::Opening { tag_num } => tag_num,
    };

    if let Some(kind) = context_tag_type(property, tag_num) {
        let value = decode_context_kind(r, kind, tag_num)?;
        return Ok(ContextValue {
            tag: tag_num,
            value,
        });
    }

    match tag {
        Tag::Context { len, .. } => {
            Tag::decode(r)?;
            if len == 0 {
                return Err(DecodeError::MalformedTag);
            }
            Ok(ContextValue {
                tag: tag_num,
                value: AppValue::OctetString(r.read_exact(len as usize)?),
            })
        }
        Tag::Opening { .. } => {
            let content_len = value_len(r.rest())?;
            prim::expect_opening(r, tag_num)?;
            let content = r.read_exact(content_len)?;
            prim::expect_closing(r, tag_num)?;
            Ok(ContextValue {
                tag: tag_num,
                value: AppValue::OctetString(content),
            })
        }
        _ => Err(DecodeError::MalformedTag),
    }
}

fn decode_context_kind<'a>(
    r: &mut Reader<'a>,
    kind: ValueKind,
    tag_num: u8,
) -> Result<AppValue<'a>, DecodeError> {
    use ValueKind as K;

    // Constructed kinds own their leading tag; everything else is one data
    // tag plus payload.
    match kind {
        K::DateTime => return Ok(AppValue::DateTime(timestamp::decode_ctx_datetime(r, tag_num)?)),
        K::DateRange => {
            prim::expect_opening(r, tag_num)?;
            let range = DateRange::decode(r)?;
            prim::expect_closing(r, tag_num)?;
            return Ok(AppValue::DateRange(range));
        }
        K::ObjectPropertyReference => {
            prim::expect_opening(r, tag_num)?;
            let reference = ObjectPropertyReference::decode(r)?;
            prim::expect_closing(r, tag_num)?;
            return Ok(AppValue::ObjectPropertyReference(reference));
        }
        K::DeviceObjectPropertyReference => {
            prim::expect_opening(r, tag_num)?;
            let reference = DeviceObjectPropertyReference::decode(r)?;
            prim::expect_closing(r, tag_num)?;
            return Ok(AppValue::DeviceObjectPropertyReference(reference));
        }
        K::HostNPort => return Ok(AppValue::HostNPort(HostNPort::decode(r)?)),
        K::LightingCommand => return Ok(AppValue::LightingCommand(LightingCommand::decode(r)?)),
        K::ColorCommand => return Ok(AppValue::ColorCommand(ColorCommand::decode(r)?)),
        _ => {}
    }

    let len = prim::expect_ctx(r, tag_num)? as usize;
    match kind {
        K::Null => {
            if len != 0 {
                return Err(DecodeError::InvalidLength);
            }
            Ok(AppValue::Null)
        }
        K::Boolean => {
            if len != 1 {
                return Err(DecodeError::InvalidLength);
            }
            Ok(AppValue::Boolean(r.read_u8()? != 0))
        }
        K::Unsigned => Ok(AppValue::Unsigned(prim::decode_unsigned(r, len)?)),
        K::Signed => Ok(AppValue::Signed(prim::decode_signed(r, len)?)),
        K::Real => {
            if len != 4 {
                return Err(DecodeError::InvalidLength);
            }
            Ok(AppValue::Real(prim::decode_real_content(r)?))
        }
        K::Double => {
            if len != 8 {
                return Err(DecodeError::InvalidLength);
            }
            Ok(AppValue::Double(prim::decode_double_content(r)?))
        }
        K::Enumerated => {
            let v = prim::decode_unsigned(r, len)?;
            let v = u32::try_from(v).map_err(|_| DecodeError::ValueOutOfRange)?;
            Ok(AppValue::Enumerated(v))
        }
        K::Date => {
            if len != 4 {
                return Err(DecodeError::InvalidLength);
            }
            Ok(AppValue::Date(prim::decode_date_content(r)?))
        }
        K::Time => {
            if len != 4 {
                return Err(DecodeError::InvalidLength);
            }
            Ok(AppValue::Time(prim::decode_time_content(r)?))
        }
        K::ObjectId => {
            if len != 4 {
                return Err(DecodeError::InvalidLength);
            }
            Ok(AppValue::ObjectId(prim::decode_object_id_content(r)?))
        }
        K::OctetString => Ok(AppValue::OctetString(r.read_exact(len)?)),
        K::CharacterString => Ok(AppValue::CharacterString(
            prim::decode_character_string_content(r, len)?,
        )),
        K::BitString => Ok(AppValue::BitString(prim::decode_bit_string_content(r, len)?)),
        K::WeekNDay => {
            if len != 3 {
                return Err(DecodeError::InvalidLength);
            }
            let b = r.read_exact(3)?;
            Ok(AppValue::CalendarEntry(CalendarEntry::WeekNDay(WeekNDay {
                month: b[0],
                week_of_month: b[1],
                weekday: b[2],
            })))
        }
        _ => Err(DecodeError::Unsupported),
    }
}

/// Encodes `value` in context-tagged position `tag_num`.
///
/// The wire carries only the tag number; the value's type is implied by
/// the property being written, so the inverse is
/// [`decode_context`] with that property.
pub fn encode_context(
    w: &mut Writer<'_>,
    tag_num: u8,
    value: &AppValue<'_>,
) -> Result<(), EncodeError> {
    match value {
        AppValue::Null => prim::encode_ctx_null(w, tag_num),
        AppValue::Boolean(v) => prim::encode_ctx_boolean(w, tag_num, *v),
        AppValue::Unsigned(v) => prim::encode_ctx_unsigned(w, tag_num, *v),
        AppValue::Signed(v) => prim::encode_ctx_signed(w, tag_num, *v),
        AppValue::Real(v) => prim::encode_ctx_real(w, tag_num, *v),
        AppValue::Double(v) => prim::encode_ctx_double(w, tag_num, *v),
        AppValue::OctetString(v) => prim::encode_ctx_octet_string(w, tag_num, v),
        AppValue::CharacterString(v) => prim::encode_ctx_character_string(w, tag_num, v),
        AppValue::Enumerated(v) => prim::encode_ctx_enumerated(w, tag_num, *v),
        AppValue::Date(v) => prim::encode_ctx_date(w, tag_num, v),
        AppValue::Time(v) => prim::encode_ctx_time(w, tag_num, v),
        AppValue::ObjectId(v) => prim::encode_ctx_object_id(w, tag_num, *v),
        AppValue::DateTime(v) => timestamp::encode_ctx_datetime(w, tag_num, v),
        AppValue::DateRange(v) => {
            prim::encode_opening_tag(w, tag_num)?;
            v.encode(w)?;
            prim::encode_closing_tag(w, tag_num)
        }
        AppValue::ObjectPropertyReference(v) => {
            prim::encode_opening_tag(w, tag_num)?;
            v.encode(w)?;
            prim::encode_closing_tag(w, tag_num)
        }
        AppValue::DeviceObjectPropertyReference(v) => {
            prim::encode_opening_tag(w, tag_num)?;
            v.encode(w)?;
            prim::encode_closing_tag(w, tag_num)
        }
        // These three carry their own leading [0] member, which is also
        // their only table position.
        AppValue::HostNPort(v) => v.encode(w),
        AppValue::LightingCommand(v) => v.encode(w),
        AppValue::ColorCommand(v) => v.encode(w),
        // The entry's discriminant picks the context tag itself.
        AppValue::CalendarEntry(v) => v.encode(w),
        AppValue::EmptyList => {
            prim::encode_opening_tag(w, tag_num)?;
            prim::encode_closing_tag(w, tag_num)
        }
        _ => Err(EncodeError::Message("value has no context-tagged form")),
    }
}

/// Dispatcher entry point: decodes a property value that may be complex,
/// recursive, or context-resolved.
pub fn decode_known_property<'a>(
    r: &mut Reader<'a>,
    object_type: ObjectType,
    property: PropertyId,
) -> Result<AppValue<'a>, DecodeError> {
    if property == PropertyId::PriorityArray {
        return decode_priority_value(r, property);
    }
    match known_property_kind(object_type, property) {
        Some(kind) => decode_known_kind(r, kind),
        None => decode_generic_property(r, property),
    }
}

/// Context or application tagged simple data, selected by the class bit of
/// the leading tag.
pub fn decode_generic_property<'a>(
    r: &mut Reader<'a>,
    property: PropertyId,
) -> Result<AppValue<'a>, DecodeError> {
    match prim::peek_tag(r)? {
        Tag::Application { .. } => AppValue::decode(r),
        _ => decode_context(r, property).map(|cv| cv.value),
    }
}

/// BACnetPriorityValue: an abstract value optionally wrapped in a `[0]`
/// bracket pair.
fn decode_priority_value<'a>(
    r: &mut Reader<'a>,
    property: PropertyId,
) -> Result<AppValue<'a>, DecodeError> {
    if prim::peek_tag(r)? == (Tag::Opening { tag_num: 0 }) {
        prim::expect_opening(r, 0)?;
        let value = decode_generic_property(r, property)?;
        prim::expect_closing(r, 0)?;
        Ok(value)
    } else {
        decode_generic_property(r, property)
    }
}

fn decode_known_kind<'a>(r: &mut Reader<'a>, kind: ValueKind) -> Result<AppValue<'a>, DecodeError> {
    use ValueKind as K;

    match kind {
        K::DateTime => Ok(AppValue::DateTime(timestamp::decode_datetime(r)?)),
        K::DateRange => Ok(AppValue::DateRange(DateRange::decode(r)?)),
        K::TimeStamp => Ok(AppValue::TimeStamp(TimeStamp::decode(r)?)),
        K::DeviceObjectReference => Ok(AppValue::DeviceObjectReference(
            DeviceObjectReference::decode(r)?,
        )),
        K::DeviceObjectPropertyReference => Ok(AppValue::DeviceObjectPropertyReference(
            DeviceObjectPropertyReference::decode(r)?,
        )),
        K::ObjectPropertyReference => Ok(AppValue::ObjectPropertyReference(
            ObjectPropertyReference::decode(r)?,
        )),
        K::XyColor => Ok(AppValue::XyColor(XyColor::decode(r)?)),
        K::ColorCommand => Ok(AppValue::ColorCommand(ColorCommand::decode(r)?)),
        K::LightingCommand => Ok(AppValue::LightingCommand(LightingCommand::decode(r)?)),
        #[cfg(feature = "alloc")]
        K::WeeklySchedule => Ok(AppValue::WeeklySchedule(WeeklySchedule::decode(r)?)),
        #[cfg(feature = "alloc")]
        K::SpecialEvent => Ok(AppValue::SpecialEvent(SpecialEvent::decode(r)?)),
        K::CalendarEntry => Ok(AppValue::CalendarEntry(CalendarEntry::decode(r)?)),
        K::Destination => Ok(AppValue::Destination(Destination::decode(r)?)),
        K::HostNPort => Ok(AppValue::HostNPort(HostNPort::decode(r)?)),
        K::BdtEntry => Ok(AppValue::BdtEntry(BdtEntry::decode(r)?)),
        K::FdtEntry => Ok(AppValue::FdtEntry(FdtEntry::decode(r)?)),
        _ => Err(DecodeError::Unsupported),
    }
}

/// Measures the content between a leading opening tag and its matching
/// closing tag, without interpreting the values inside.
///
/// Returns the number of octets strictly between the outer bracket pair.
/// Nested brackets with the same number are tracked with a counter; running
/// out of buffer before the brackets balance is a [`DecodeError::MalformedTag`].
pub fn value_len(buf: &[u8]) -> Result<usize, DecodeError> {
    let mut r = Reader::new(buf);
    let opening_number = match prim::peek_tag(&r)? {
        Tag::Opening { tag_num } => tag_num,
        _ => return Err(DecodeError::MalformedTag),
    };

    let mut depth: u32 = 0;
    let mut total = 0usize;
    loop {
        let item_start = r.position();
        let tag = Tag::decode(&mut r).map_err(|_| DecodeError::MalformedTag)?;
        match tag {
            Tag::Opening { tag_num } => {
                if depth == 0 {
                    // The outer bracket itself is not part of the content.
                    depth = 1;
                    continue;
                }
                if tag_num == opening_number {
                    depth += 1;
                }
            }
            Tag::Closing { tag_num } => {
                if tag_num == opening_number {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(total);
                    }
                }
            }
            Tag::Application {
                tag: AppTag::Boolean,
                ..
            } => {
                // Length field holds the value; no payload follows.
            }
            Tag::Application { len, .. } | Tag::Context { len, .. } => {
                r.skip(len as usize)?;
            }
        }
        total += r.position() - item_start;
    }
}
