//! BACnetHostNPort and the BBMD broadcast/foreign-device table entries.

use crate::encoding::{primitives as prim, reader::Reader, tag::Tag, writer::Writer};
use crate::types::CharacterString;
use crate::{DecodeError, EncodeError};

/// BACnetHostAddress CHOICE: `[0]` absent, `[1]` raw IP octets, `[2]` a
/// resolvable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAddress<'a> {
    None,
    IpAddress(&'a [u8]),
    Name(CharacterString<'a>),
}

/// BACnetHostNPort: a `[0]`-bracketed host choice followed by a `[1]` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostNPort<'a> {
    pub host: HostAddress<'a>,
    pub port: u16,
}

impl<'a> HostNPort<'a> {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_opening_tag(w, 0)?;
        match &self.host {
            HostAddress::None => prim::encode_ctx_null(w, 0)?,
            HostAddress::IpAddress(octets) => prim::encode_ctx_octet_string(w, 1, octets)?,
            HostAddress::Name(name) => prim::encode_ctx_character_string(w, 2, name)?,
        }
        prim::encode_closing_tag(w, 0)?;
        prim::encode_ctx_unsigned(w, 1, self.port as u64)
    }

    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        prim::expect_opening(r, 0)?;
        let host = match Tag::decode(r)? {
            Tag::Context { tag_num: 0, len: 0 } => HostAddress::None,
            Tag::Context { tag_num: 1, len } => HostAddress::IpAddress(r.read_exact(len as usize)?),
            Tag::Context { tag_num: 2, len } => {
                HostAddress::Name(prim::decode_character_string_content(r, len as usize)?)
            }
            _ => return Err(DecodeError::MalformedTag),
        };
        prim::expect_closing(r, 0)?;
        let port = prim::decode_ctx_unsigned(r, 1)?;
        let port = u16::try_from(port).map_err(|_| DecodeError::ValueOutOfRange)?;
        Ok(Self { host, port })
    }

    pub fn encoded_len(&self) -> usize {
        let host = match &self.host {
            HostAddress::None => 1,
            HostAddress::IpAddress(octets) => 1 + octets.len(),
            HostAddress::Name(name) => 1 + 1 + name.bytes.len(),
        };
        2 + host + 1 + prim::unsigned_encoded_len(self.port as u64)
    }
}

/// BACnetBDTEntry: a `[0]`-bracketed BBMD address plus an optional `[1]`
/// broadcast distribution mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BdtEntry<'a> {
    pub address: HostNPort<'a>,
    pub broadcast_mask: Option<&'a [u8]>,
}

impl<'a> BdtEntry<'a> {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_opening_tag(w, 0)?;
        self.address.encode(w)?;
        prim::encode_closing_tag(w, 0)?;
        if let Some(mask) = self.broadcast_mask {
            prim::encode_ctx_octet_string(w, 1, mask)?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        prim::expect_opening(r, 0)?;
        let address = HostNPort::decode(r)?;
        prim::expect_closing(r, 0)?;
        let broadcast_mask = match prim::peek_tag(r) {
            Ok(Tag::Context { tag_num: 1, len }) => {
                Tag::decode(r)?;
                Some(r.read_exact(len as usize)?)
            }
            _ => None,
        };
        Ok(Self {
            address,
            broadcast_mask,
        })
    }

    pub fn encoded_len(&self) -> usize {
        2 + self.address.encoded_len() + self.broadcast_mask.map_or(0, |mask| 1 + mask.len())
    }
}

/// BACnetFDTEntry: `[0]` address octets, `[1]` TTL, `[2]` seconds remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdtEntry<'a> {
    pub address: &'a [u8],
    pub ttl: u16,
    pub remaining: u16,
}

impl<'a> FdtEntry<'a> {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_ctx_octet_string(w, 0, self.address)?;
        prim::encode_ctx_unsigned(w, 1, self.ttl as u64)?;
        prim::encode_ctx_unsigned(w, 2, self.remaining as u64)
    }

    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let address = match Tag::decode(r)? {
            Tag::Context { tag_num: 0, len } => r.read_exact(len as usize)?,
            _ => return Err(DecodeError::TypeMismatch),
        };
        let ttl = prim::decode_ctx_unsigned(r, 1)?;
        let remaining = prim::decode_ctx_unsigned(r, 2)?;
        Ok(Self {
            address,
            ttl: u16::try_from(ttl).map_err(|_| DecodeError::ValueOutOfRange)?,
            remaining: u16::try_from(remaining).map_err(|_| DecodeError::ValueOutOfRange)?,
        })
    }

    pub fn encoded_len(&self) -> usize {
        1 + self.address.len()
            + 1
            + prim::unsigned_encoded_len(self.ttl as u64)
            + 1
            + prim::unsigned_encoded_len(self.remaining as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::{BdtEntry, FdtEntry, HostAddress, HostNPort};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::CharacterString;

    #[test]
    fn host_n_port_choices_roundtrip() {
        let hosts = [
            HostAddress::None,
            HostAddress::IpAddress(&[192, 168, 0, 10]),
            HostAddress::Name(CharacterString::ansi("bbmd.example")),
        ];
        for host in hosts {
            let hnp = HostNPort { host, port: 47808 };
            let mut buf = [0u8; 48];
            let mut w = Writer::new(&mut buf);
            hnp.encode(&mut w).unwrap();
            assert_eq!(w.position(), hnp.encoded_len());
            let mut r = Reader::new(w.as_written());
            assert_eq!(HostNPort::decode(&mut r).unwrap(), hnp);
        }
    }

    #[test]
    fn bdt_entry_roundtrip() {
        let entry = BdtEntry {
            address: HostNPort {
                host: HostAddress::IpAddress(&[10, 0, 0, 1]),
                port: 47808,
            },
            broadcast_mask: Some(&[255, 255, 255, 255]),
        };
        let mut buf = [0u8; 48];
        let mut w = Writer::new(&mut buf);
        entry.encode(&mut w).unwrap();
        assert_eq!(w.position(), entry.encoded_len());
        let mut r = Reader::new(w.as_written());
        assert_eq!(BdtEntry::decode(&mut r).unwrap(), entry);
    }

    #[test]
    fn fdt_entry_roundtrip() {
        let entry = FdtEntry {
            address: &[10, 0, 0, 2, 0xBA, 0xC0],
            ttl: 600,
            remaining: 442,
        };
        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        entry.encode(&mut w).unwrap();
        assert_eq!(w.position(), entry.encoded_len());
        let mut r = Reader::new(w.as_written());
        assert_eq!(FdtEntry::decode(&mut r).unwrap(), entry);
    }
}
