//! Server-side BACnet application objects built on `corebac-core`.
//!
//! The crate provides the Load Control shed state machine, the
//! commandable Analog Output bank it actuates, and the property
//! dispatcher that routes ReadProperty/WriteProperty payloads to them.
//! Time is injected through the [`clock::Clock`] capability so the state
//! machines stay deterministic under test.

/// Commandable Analog Output objects and the actuation trait.
pub mod analog_output;
/// Injected wall-clock capability.
pub mod clock;
/// Dispatch-layer error type and its BACnet error/abort translation.
pub mod error;
/// Load Control objects and the shed state machine.
pub mod load_control;

mod dispatch;

pub use analog_output::{AnalogOutputBank, CommandableOutput};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatch::{ObjectDatabase, PropertyRef};
pub use error::PropertyError;
pub use load_control::{LoadControl, ShedLevel, ShedState, MAX_SHED_LEVELS, SHED_PRIORITY};
