//! Core BACnet data types shared by every codec layer.

/// BACnet date, time, and combined date-time with calendar arithmetic.
pub mod date_time;
/// Packed object identifier (type + instance).
pub mod object_id;
/// BACnet object type enumeration.
pub mod object_type;
/// BACnet property identifier enumeration.
pub mod property_id;
/// Protocol-level enumerations (segmentation, max APDU, errors, aborts).
pub mod spec;
/// Borrowed character-string and bit-string types.
pub mod strings;

pub use date_time::{Date, DateTime, Time};
pub use object_id::{ObjectId, MAX_INSTANCE};
pub use object_type::ObjectType;
pub use property_id::PropertyId;
pub use spec::{AbortReason, ErrorClass, ErrorCode, MaxApdu, RejectReason, Segmentation};
pub use strings::{BitString, CharacterString, CHARSET_UTF8};
