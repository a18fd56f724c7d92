use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// BACnet application tag numbers.
///
/// Only the primitive tags 0..=12 exist on the wire; constructed types are
/// conveyed through context brackets and never carry their own application
/// tag number.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTag {
    Null = 0,
    Boolean = 1,
    UnsignedInt = 2,
    SignedInt = 3,
    Real = 4,
    Double = 5,
    OctetString = 6,
    CharacterString = 7,
    BitString = 8,
    Enumerated = 9,
    Date = 10,
    Time = 11,
    ObjectId = 12,
}

impl AppTag {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Null),
            1 => Ok(Self::Boolean),
            2 => Ok(Self::UnsignedInt),
            3 => Ok(Self::SignedInt),
            4 => Ok(Self::Real),
            5 => Ok(Self::Double),
            6 => Ok(Self::OctetString),
            7 => Ok(Self::CharacterString),
            8 => Ok(Self::BitString),
            9 => Ok(Self::Enumerated),
            10 => Ok(Self::Date),
            11 => Ok(Self::Time),
            12 => Ok(Self::ObjectId),
            _ => Err(DecodeError::MalformedTag),
        }
    }
}

/// One decoded BACnet tag header.
///
/// `len` is a byte count for data tags, except for application Boolean
/// where the standard stores the value itself in the length field and no
/// payload follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Application { tag: AppTag, len: u32 },
    Context { tag_num: u8, len: u32 },
    Opening { tag_num: u8 },
    Closing { tag_num: u8 },
}

impl Tag {
    pub fn encode(self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Tag::Application { tag, len } => encode_with_meta(w, tag as u8, false, len),
            Tag::Context { tag_num, len } => encode_with_meta(w, tag_num, true, len),
            Tag::Opening { tag_num } => encode_open_close(w, tag_num, true),
            Tag::Closing { tag_num } => encode_open_close(w, tag_num, false),
        }
    }

    /// Exact number of header octets [`encode`](Self::encode) will emit.
    pub fn encoded_len(self) -> usize {
        let (tag_num, len) = match self {
            Tag::Application { tag, len } => (tag as u8, len),
            Tag::Context { tag_num, len } => (tag_num, len),
            Tag::Opening { tag_num } | Tag::Closing { tag_num } => {
                return if tag_num > 14 { 2 } else { 1 }
            }
        };
        let number = if tag_num > 14 { 2 } else { 1 };
        let length = if len <= 4 {
            0
        } else if len <= 253 {
            1
        } else if len <= 65_535 {
            3
        } else {
            5
        };
        number + length
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let first = r.read_u8()?;
        let class_context = (first & 0b0000_1000) != 0;

        let mut tag_num = (first >> 4) & 0x0F;
        if tag_num == 0x0F {
            tag_num = r.read_u8()?;
            if tag_num == 255 {
                // 255 is reserved in the extended tag number octet.
                return Err(DecodeError::MalformedTag);
            }
        }

        let len_code = first & 0x07;
        if class_context && len_code == 6 {
            return Ok(Tag::Opening { tag_num });
        }
        if class_context && len_code == 7 {
            return Ok(Tag::Closing { tag_num });
        }

        let len = decode_len(r, len_code)?;
        if class_context {
            Ok(Tag::Context { tag_num, len })
        } else {
            Ok(Tag::Application {
                tag: AppTag::from_u8(tag_num)?,
                len,
            })
        }
    }

    pub const fn is_opening(self) -> bool {
        matches!(self, Tag::Opening { .. })
    }

    pub const fn is_closing(self) -> bool {
        matches!(self, Tag::Closing { .. })
    }
}

fn encode_with_meta(
    w: &mut Writer<'_>,
    tag_num: u8,
    is_context: bool,
    len: u32,
) -> Result<(), EncodeError> {
    let mut first: u8 = 0;

    if tag_num <= 14 {
        first |= tag_num << 4;
    } else {
        first |= 0xF0;
    }
    if is_context {
        first |= 0b0000_1000;
    }

    let len_code = if len <= 4 { len as u8 } else { 5 };
    first |= len_code;
    w.write_u8(first)?;

    if tag_num > 14 {
        w.write_u8(tag_num)?;
    }

    if len_code == 5 {
        if len <= 253 {
            w.write_u8(len as u8)?;
        } else if len <= 65_535 {
            w.write_u8(254)?;
            w.write_be_u16(len as u16)?;
        } else {
            w.write_u8(255)?;
            w.write_be_u32(len)?;
        }
    }

    Ok(())
}

fn encode_open_close(w: &mut Writer<'_>, tag_num: u8, opening: bool) -> Result<(), EncodeError> {
    let mut first: u8 = 0b0000_1000;

    if tag_num <= 14 {
        first |= tag_num << 4;
    } else {
        first |= 0xF0;
    }
    first |= if opening { 6 } else { 7 };
    w.write_u8(first)?;

    if tag_num > 14 {
        w.write_u8(tag_num)?;
    }

    Ok(())
}

fn decode_len(r: &mut Reader<'_>, len_code: u8) -> Result<u32, DecodeError> {
    match len_code {
        0..=4 => Ok(len_code as u32),
        5 => {
            let v = r.read_u8()?;
            if v <= 253 {
                Ok(v as u32)
            } else if v == 254 {
                Ok(r.read_be_u16()? as u32)
            } else {
                r.read_be_u32()
            }
        }
        _ => Err(DecodeError::MalformedTag),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppTag, Tag};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::DecodeError;

    fn roundtrip(tag: Tag) -> (Tag, usize) {
        let mut buf = [0u8; 8];
        let mut w = Writer::new(&mut buf);
        tag.encode(&mut w).unwrap();
        let written = w.position();
        assert_eq!(written, tag.encoded_len());
        let mut r = Reader::new(w.as_written());
        (Tag::decode(&mut r).unwrap(), written)
    }

    #[test]
    fn roundtrip_application_tag() {
        let tag = Tag::Application {
            tag: AppTag::UnsignedInt,
            len: 3,
        };
        assert_eq!(roundtrip(tag), (tag, 1));
    }

    #[test]
    fn roundtrip_extended_tag_number_and_length() {
        let tag = Tag::Context {
            tag_num: 30,
            len: 300,
        };
        assert_eq!(roundtrip(tag), (tag, 5));
    }

    #[test]
    fn roundtrip_32_bit_length() {
        let tag = Tag::Context {
            tag_num: 1,
            len: 70_000,
        };
        assert_eq!(roundtrip(tag), (tag, 6));
    }

    #[test]
    fn opening_and_closing_brackets() {
        assert_eq!(roundtrip(Tag::Opening { tag_num: 3 }).0, Tag::Opening { tag_num: 3 });
        assert_eq!(roundtrip(Tag::Closing { tag_num: 3 }).0, Tag::Closing { tag_num: 3 });
    }

    #[test]
    fn rejects_unknown_application_tag_number() {
        // Application class, tag number 13, length 0.
        let mut r = Reader::new(&[0xD0]);
        assert_eq!(Tag::decode(&mut r).unwrap_err(), DecodeError::MalformedTag);
    }

    #[test]
    fn rejects_reserved_extended_number() {
        let mut r = Reader::new(&[0xF8, 0xFF]);
        assert_eq!(Tag::decode(&mut r).unwrap_err(), DecodeError::MalformedTag);
    }

    #[test]
    fn refuses_truncated_header() {
        // Extended length escape with no following octet.
        let mut r = Reader::new(&[0x25]);
        assert_eq!(Tag::decode(&mut r).unwrap_err(), DecodeError::UnexpectedEof);
    }
}
