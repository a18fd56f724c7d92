//! Network-layer PDU header codec.
//!
//! The control octet packs five flags and the two priority bits; every
//! other field is conditional on it. Field order on the wire: protocol
//! version, control, DNET/DLEN/DADR, SNET/SLEN/SADR, hop count, network
//! message type, vendor id.

use crate::apdu::PDU_TYPE_CONFIRMED_SERVICE_REQUEST;
use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// BACnet network layer protocol version (always `0x01`).
pub const BACNET_PROTOCOL_VERSION: u8 = 0x01;

/// Longest MAC address any supported medium carries (B/IP: 4-octet address
/// plus 2-octet port).
pub const MAX_MAC_LEN: usize = 6;

/// Initial hop count for frames entering a routed network.
pub const HOP_COUNT_DEFAULT: u8 = 255;

/// DNET value addressing every network.
pub const BACNET_BROADCAST_NETWORK: u16 = 0xFFFF;

/// Largest NPDU a B/IP link hands to the network layer.
pub const MAX_NPDU: usize = 1497;

/// Network priority from bits 1..0 of the control octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NetworkPriority {
    #[default]
    Normal = 0,
    Urgent = 1,
    CriticalEquipment = 2,
    LifeSafety = 3,
}

impl NetworkPriority {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => Self::Urgent,
            2 => Self::CriticalEquipment,
            3 => Self::LifeSafety,
            _ => Self::Normal,
        }
    }
}

/// A routed network-layer address: network number plus a medium-specific
/// MAC of up to [`MAX_MAC_LEN`] octets.
///
/// A zero-length MAC with a non-zero network number is a broadcast on that
/// network; network `0xFFFF` is the global broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    pub net: u16,
    pub mac: [u8; MAX_MAC_LEN],
    pub mac_len: u8,
}

impl Address {
    pub fn new(net: u16, mac: &[u8]) -> Result<Self, EncodeError> {
        if mac.len() > MAX_MAC_LEN {
            return Err(EncodeError::InvalidLength);
        }
        let mut addr = Self {
            net,
            mac: [0; MAX_MAC_LEN],
            mac_len: mac.len() as u8,
        };
        addr.mac[..mac.len()].copy_from_slice(mac);
        Ok(addr)
    }

    /// Broadcast on one remote network (no MAC).
    pub const fn remote_broadcast(net: u16) -> Self {
        Self {
            net,
            mac: [0; MAX_MAC_LEN],
            mac_len: 0,
        }
    }

    /// Broadcast on every network.
    pub const fn global_broadcast() -> Self {
        Self::remote_broadcast(BACNET_BROADCAST_NETWORK)
    }

    pub fn mac(&self) -> &[u8] {
        &self.mac[..self.mac_len as usize]
    }

    pub const fn is_global_broadcast(&self) -> bool {
        self.net == BACNET_BROADCAST_NETWORK
    }

    pub const fn is_network_broadcast(&self) -> bool {
        self.net != 0 && self.mac_len == 0
    }
}

/// The network-layer message fields present when control bit 7 is set.
/// A vendor id is carried only for proprietary message types (>= 0x80).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkMessage {
    pub message_type: u8,
    pub vendor_id: u16,
}

/// A decoded NPDU header. When `network_message` is `None` the octets that
/// follow the header on the wire are an APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Npdu {
    pub protocol_version: u8,
    pub priority: NetworkPriority,
    pub data_expecting_reply: bool,
    pub hop_count: u8,
    pub network_message: Option<NetworkMessage>,
    pub destination: Option<Address>,
    pub source: Option<Address>,
}

impl Default for Npdu {
    fn default() -> Self {
        Self::application(false, NetworkPriority::Normal)
    }
}

impl Npdu {
    /// Header for an ordinary APDU-bearing frame.
    pub const fn application(data_expecting_reply: bool, priority: NetworkPriority) -> Self {
        Self {
            protocol_version: BACNET_PROTOCOL_VERSION,
            priority,
            data_expecting_reply,
            hop_count: HOP_COUNT_DEFAULT,
            network_message: None,
            destination: None,
            source: None,
        }
    }

    /// Header for a network-layer message of `message_type`.
    pub const fn network_message(
        message_type: u8,
        vendor_id: u16,
        data_expecting_reply: bool,
        priority: NetworkPriority,
    ) -> Self {
        Self {
            protocol_version: BACNET_PROTOCOL_VERSION,
            priority,
            data_expecting_reply,
            hop_count: HOP_COUNT_DEFAULT,
            network_message: Some(NetworkMessage {
                message_type,
                vendor_id,
            }),
            destination: None,
            source: None,
        }
    }

    fn source_present(&self) -> bool {
        matches!(self.source, Some(src) if src.mac_len > 0)
    }

    fn control(&self) -> u8 {
        let mut control = 0u8;
        if self.network_message.is_some() {
            control |= 1 << 7;
        }
        if self.destination.is_some() {
            control |= 1 << 5;
        }
        if self.source_present() {
            control |= 1 << 3;
        }
        if self.data_expecting_reply {
            control |= 1 << 2;
        }
        control | self.priority as u8
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        w.write_u8(self.protocol_version)?;
        w.write_u8(self.control())?;

        if let Some(dest) = self.destination {
            encode_addr(w, &dest)?;
        }
        if self.source_present() {
            if let Some(src) = self.source {
                encode_addr(w, &src)?;
            }
        }
        if self.destination.is_some() {
            w.write_u8(self.hop_count)?;
        }
        if let Some(message) = self.network_message {
            w.write_u8(message.message_type)?;
            if message.message_type >= 0x80 {
                w.write_be_u16(message.vendor_id)?;
            }
        }
        Ok(())
    }

    /// Exact number of octets [`encode`](Self::encode) will emit.
    pub fn encoded_len(&self) -> usize {
        let mut len = 2;
        if let Some(dest) = self.destination {
            len += 3 + dest.mac_len as usize + 1;
        }
        if let Some(src) = self.source {
            if src.mac_len > 0 {
                len += 3 + src.mac_len as usize;
            }
        }
        if let Some(message) = self.network_message {
            len += 1;
            if message.message_type >= 0x80 {
                len += 2;
            }
        }
        len
    }

    /// Decodes an NPDU header, leaving the cursor at the first octet of
    /// the payload (APDU or network-message body).
    ///
    /// Address fields are read strictly; a truncated hop count decodes as
    /// 0 and a truncated vendor id as 0, matching fielded stacks that
    /// tolerate routers which omit the tail of the header.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.remaining() < 2 {
            return Err(DecodeError::UnexpectedEof);
        }
        let protocol_version = r.read_u8()?;
        let control = r.read_u8()?;
        if control & 0b0101_0000 != 0 {
            // Bits 6 and 4 shall be zero.
            return Err(DecodeError::MalformedTag);
        }

        let destination = if control & (1 << 5) != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };
        let source = if control & (1 << 3) != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };

        let hop_count = if destination.is_some() {
            r.read_u8().unwrap_or(0)
        } else {
            0
        };

        let network_message = if control & (1 << 7) != 0 {
            let message_type = r.read_u8()?;
            let vendor_id = if message_type >= 0x80 {
                if r.remaining() >= 2 {
                    r.read_be_u16()?
                } else {
                    0
                }
            } else {
                0
            };
            Some(NetworkMessage {
                message_type,
                vendor_id,
            })
        } else {
            None
        };

        Ok(Self {
            protocol_version,
            priority: NetworkPriority::from_bits(control),
            data_expecting_reply: control & (1 << 2) != 0,
            hop_count,
            network_message,
            destination,
            source,
        })
    }

    /// Whether `pdu` is a version-1 APDU frame whose first APDU octet is a
    /// Confirmed-Request. Used by data links that must answer before the
    /// application layer sees the frame.
    pub fn is_confirmed_service(pdu: &[u8]) -> bool {
        if pdu.first() != Some(&BACNET_PROTOCOL_VERSION) {
            return false;
        }
        let mut r = Reader::new(pdu);
        let Ok(header) = Self::decode(&mut r) else {
            return false;
        };
        if header.network_message.is_some() {
            return false;
        }
        match pdu.get(r.position()) {
            Some(apdu_octet) => (apdu_octet & 0xF0) == PDU_TYPE_CONFIRMED_SERVICE_REQUEST,
            None => false,
        }
    }
}

fn encode_addr(w: &mut Writer<'_>, addr: &Address) -> Result<(), EncodeError> {
    if addr.mac_len as usize > MAX_MAC_LEN {
        return Err(EncodeError::InvalidLength);
    }
    w.write_be_u16(addr.net)?;
    w.write_u8(addr.mac_len)?;
    w.write_all(addr.mac())
}

fn decode_addr(r: &mut Reader<'_>) -> Result<Address, DecodeError> {
    let net = r.read_be_u16()?;
    let mac_len = r.read_u8()?;
    if mac_len as usize > MAX_MAC_LEN {
        return Err(DecodeError::MalformedTag);
    }
    let mut mac = [0u8; MAX_MAC_LEN];
    let src = r.read_exact(mac_len as usize)?;
    mac[..mac_len as usize].copy_from_slice(src);
    Ok(Address { net, mac, mac_len })
}

#[cfg(test)]
mod tests {
    use super::{Address, NetworkMessage, NetworkPriority, Npdu};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::DecodeError;

    fn roundtrip(header: Npdu) -> Npdu {
        let mut buf = [0u8; 64];
        let mut w = Writer::new(&mut buf);
        header.encode(&mut w).unwrap();
        assert_eq!(w.position(), header.encoded_len());
        let mut r = Reader::new(w.as_written());
        let decoded = Npdu::decode(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        decoded
    }

    #[test]
    fn routed_header_roundtrip() {
        let mut header = Npdu::application(true, NetworkPriority::Urgent);
        header.destination = Some(Address::new(1, &[0xC0, 0xA8, 0x01, 0x02, 0xBA, 0xC0]).unwrap());
        header.source = Some(Address::new(2, &[0x7A]).unwrap());
        assert_eq!(roundtrip(header), header);
    }

    #[test]
    fn vendor_id_only_for_proprietary_message_types() {
        let proprietary = Npdu::network_message(0x80, 260, false, NetworkPriority::Normal);
        assert_eq!(roundtrip(proprietary), proprietary);
        assert_eq!(proprietary.encoded_len(), 5);

        // A standard message type never carries a vendor id, even if set.
        let standard = Npdu::network_message(0x10, 260, false, NetworkPriority::Normal);
        let decoded = roundtrip(standard);
        assert_eq!(decoded.network_message.unwrap().vendor_id, 0);
        assert_eq!(standard.encoded_len(), 3);
    }

    #[test]
    fn source_with_empty_mac_is_not_encoded() {
        let mut header = Npdu::default();
        header.source = Some(Address::remote_broadcast(9));
        assert_eq!(header.encoded_len(), 2);
        let decoded = roundtrip(header);
        assert_eq!(decoded.source, None);
    }

    #[test]
    fn refuses_short_buffers_and_reserved_bits() {
        let mut r = Reader::new(&[0x01]);
        assert_eq!(Npdu::decode(&mut r).unwrap_err(), DecodeError::UnexpectedEof);

        let mut r = Reader::new(&[0x01, 0x40]);
        assert_eq!(Npdu::decode(&mut r).unwrap_err(), DecodeError::MalformedTag);
    }

    #[test]
    fn refuses_oversized_or_truncated_mac() {
        // DLEN 7 exceeds the MAC limit.
        let mut r = Reader::new(&[0x01, 0x20, 0x00, 0x01, 0x07, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(Npdu::decode(&mut r).unwrap_err(), DecodeError::MalformedTag);

        // DLEN 3 with only two octets behind it.
        let mut r = Reader::new(&[0x01, 0x20, 0x00, 0x01, 0x03, 1, 2]);
        assert_eq!(Npdu::decode(&mut r).unwrap_err(), DecodeError::UnexpectedEof);
    }

    #[test]
    fn truncated_hop_count_decodes_as_zero() {
        // Destination present, buffer ends right after the address.
        let mut r = Reader::new(&[0x01, 0x20, 0x00, 0x01, 0x00]);
        let header = Npdu::decode(&mut r).unwrap();
        assert_eq!(header.hop_count, 0);
        assert!(header.destination.unwrap().is_network_broadcast());
    }

    #[test]
    fn truncated_vendor_id_decodes_as_zero() {
        let mut r = Reader::new(&[0x01, 0x80, 0x81, 0x00]);
        let header = Npdu::decode(&mut r).unwrap();
        assert_eq!(
            header.network_message,
            Some(NetworkMessage {
                message_type: 0x81,
                vendor_id: 0
            })
        );
    }

    #[test]
    fn confirmed_service_predicate() {
        // Version 1, plain header, confirmed-request APDU nibble.
        assert!(Npdu::is_confirmed_service(&[0x01, 0x04, 0x00, 0x05, 0x01]));
        // Unconfirmed-request nibble.
        assert!(!Npdu::is_confirmed_service(&[0x01, 0x00, 0x10, 0x08]));
        // Network-layer message.
        assert!(!Npdu::is_confirmed_service(&[0x01, 0x80, 0x00]));
        // Wrong protocol version.
        assert!(!Npdu::is_confirmed_service(&[0x02, 0x00, 0x00]));
        // Header only, no APDU octet.
        assert!(!Npdu::is_confirmed_service(&[0x01, 0x00]));
    }
}
