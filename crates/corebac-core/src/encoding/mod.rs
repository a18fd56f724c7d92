//! Binary encoding layer: tag framing, primitive content codecs, and the
//! zero-copy reader/writer cursors every codec in this crate builds on.

pub mod primitives;
pub mod reader;
pub mod tag;
pub mod writer;

pub use reader::Reader;
pub use tag::{AppTag, Tag};
pub use writer::Writer;
