//! The tagged application-value codec.
//!
//! [`AppValue`] is the discriminated union spanning every application tag
//! plus the constructed types that only occur inside property-specific
//! encodings. [`decode_context`] resolves context tag numbers through the
//! property table, and [`decode_known_property`] is the dispatcher-facing
//! entry point for complex, possibly recursive property values.

pub mod app_value;
pub mod context;
pub mod host_port;
pub mod lighting;
pub mod reference;
pub mod schedule;
pub mod timestamp;

pub use app_value::AppValue;
pub use context::{
    context_tag_type, decode_context, decode_generic_property, decode_known_property,
    encode_context, known_property_kind, value_len, ContextValue, ValueKind,
};
pub use host_port::{BdtEntry, FdtEntry, HostAddress, HostNPort};
pub use lighting::{ColorCommand, LightingCommand, XyColor};
pub use reference::{
    Destination, DeviceObjectPropertyReference, DeviceObjectReference, ObjectPropertyReference,
    Recipient,
};
#[cfg(feature = "alloc")]
pub use schedule::{SpecialEvent, WeeklySchedule};
pub use schedule::{CalendarEntry, PrimitiveValue, SpecialEventPeriod, TimeValue, WeekNDay};
pub use timestamp::{
    decode_ctx_datetime, decode_datetime, encode_ctx_datetime, encode_datetime, DateRange,
    TimeStamp, DATETIME_ENCODED_LEN,
};
