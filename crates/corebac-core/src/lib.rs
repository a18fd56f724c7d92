//! BACnet protocol core in pure Rust.
//!
//! `corebac-core` provides zero-copy, `no_std`-compatible encoding and
//! decoding of the BACnet network-layer header and the tagged
//! application-layer value stream. It is the foundation of the corebac
//! crate family and usable standalone in embedded or constrained
//! environments: every codec is a pure function over caller-provided
//! buffers driven through an explicit [`encoding::Reader`] /
//! [`encoding::Writer`] cursor pair.
//!
//! # Feature flags
//!
//! - **`std`** (default) — enables `std::error::Error` implementations.
//! - **`alloc`** (default) — enables the list-shaped constructed values
//!   (weekly schedules, special events) and the loopback test link.
//! - **`serde`** — derives `Serialize`/`Deserialize` on plain core types.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// APDU type classification; service parsing lives above this crate.
pub mod apdu;
/// Binary encoding primitives, tag framing, and zero-copy reader/writer.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// Data-link collaborator traits.
pub mod link;
/// NPDU (network-layer header) encoding and decoding.
pub mod npdu;
/// Core BACnet data types: identifiers, dates, strings, protocol enums.
pub mod types;
/// The tagged application-value codec and property-driven context tables.
pub mod value;

pub use error::{DecodeError, EncodeError};

/// Array index addressing a whole array rather than one element.
pub const BACNET_ARRAY_ALL: u32 = 0xFFFF_FFFF;

/// "No priority active" marker for commandable-property bookkeeping.
pub const BACNET_NO_PRIORITY: u8 = 0;

/// Highest (numerically largest, lowest-precedence) command priority.
pub const BACNET_MAX_PRIORITY: u8 = 16;
