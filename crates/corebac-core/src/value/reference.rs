//! Object and device reference types, plus the notification Destination.

use crate::encoding::{primitives as prim, reader::Reader, tag::Tag, writer::Writer};
use crate::types::{BitString, ObjectId, PropertyId, Time};
use crate::{DecodeError, EncodeError};

/// BACnetDeviceObjectPropertyReference: `[0]` object, `[1]` property,
/// optional `[2]` array index, optional `[3]` device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceObjectPropertyReference {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub device_id: Option<ObjectId>,
}

impl DeviceObjectPropertyReference {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_ctx_object_id(w, 0, self.object_id)?;
        prim::encode_ctx_enumerated(w, 1, self.property_id.to_u32())?;
        if let Some(index) = self.array_index {
            prim::encode_ctx_unsigned(w, 2, index as u64)?;
        }
        if let Some(device) = self.device_id {
            prim::encode_ctx_object_id(w, 3, device)?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let object_id = prim::decode_ctx_object_id(r, 0)?;
        let property_id = PropertyId::from_u32(prim::decode_ctx_enumerated(r, 1)?);
        let array_index = match prim::peek_tag(r) {
            Ok(Tag::Context { tag_num: 2, .. }) => {
                let v = prim::decode_ctx_unsigned(r, 2)?;
                Some(u32::try_from(v).map_err(|_| DecodeError::ValueOutOfRange)?)
            }
            _ => None,
        };
        let device_id = match prim::peek_tag(r) {
            Ok(Tag::Context { tag_num: 3, .. }) => Some(prim::decode_ctx_object_id(r, 3)?),
            _ => None,
        };
        Ok(Self {
            object_id,
            property_id,
            array_index,
            device_id,
        })
    }

    pub fn encoded_len(&self) -> usize {
        let mut len = 5 + 1 + prim::unsigned_encoded_len(self.property_id.to_u32() as u64);
        if let Some(index) = self.array_index {
            len += 1 + prim::unsigned_encoded_len(index as u64);
        }
        if self.device_id.is_some() {
            len += 5;
        }
        len
    }
}

/// BACnetDeviceObjectReference: optional `[0]` device, `[1]` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceObjectReference {
    pub device_id: Option<ObjectId>,
    pub object_id: ObjectId,
}

impl DeviceObjectReference {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        if let Some(device) = self.device_id {
            prim::encode_ctx_object_id(w, 0, device)?;
        }
        prim::encode_ctx_object_id(w, 1, self.object_id)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let device_id = match prim::peek_tag(r)? {
            Tag::Context { tag_num: 0, .. } => Some(prim::decode_ctx_object_id(r, 0)?),
            _ => None,
        };
        let object_id = prim::decode_ctx_object_id(r, 1)?;
        Ok(Self {
            device_id,
            object_id,
        })
    }

    pub fn encoded_len(&self) -> usize {
        if self.device_id.is_some() {
            10
        } else {
            5
        }
    }
}

/// BACnetObjectPropertyReference: `[0]` object, `[1]` property, optional
/// `[2]` array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPropertyReference {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
}

impl ObjectPropertyReference {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_ctx_object_id(w, 0, self.object_id)?;
        prim::encode_ctx_enumerated(w, 1, self.property_id.to_u32())?;
        if let Some(index) = self.array_index {
            prim::encode_ctx_unsigned(w, 2, index as u64)?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let object_id = prim::decode_ctx_object_id(r, 0)?;
        let property_id = PropertyId::from_u32(prim::decode_ctx_enumerated(r, 1)?);
        let array_index = match prim::peek_tag(r) {
            Ok(Tag::Context { tag_num: 2, .. }) => {
                let v = prim::decode_ctx_unsigned(r, 2)?;
                Some(u32::try_from(v).map_err(|_| DecodeError::ValueOutOfRange)?)
            }
            _ => None,
        };
        Ok(Self {
            object_id,
            property_id,
            array_index,
        })
    }

    pub fn encoded_len(&self) -> usize {
        let mut len = 5 + 1 + prim::unsigned_encoded_len(self.property_id.to_u32() as u64);
        if let Some(index) = self.array_index {
            len += 1 + prim::unsigned_encoded_len(index as u64);
        }
        len
    }
}

/// BACnetRecipient CHOICE: `[0]` device identifier or `[1]` bracketed
/// network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient<'a> {
    Device(ObjectId),
    Address { network: u16, mac: &'a [u8] },
}

impl<'a> Recipient<'a> {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Self::Device(id) => prim::encode_ctx_object_id(w, 0, *id),
            Self::Address { network, mac } => {
                prim::encode_opening_tag(w, 1)?;
                prim::encode_app_unsigned(w, *network as u64)?;
                prim::encode_app_octet_string(w, mac)?;
                prim::encode_closing_tag(w, 1)
            }
        }
    }

    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        match prim::peek_tag(r)? {
            Tag::Context { tag_num: 0, .. } => Ok(Self::Device(prim::decode_ctx_object_id(r, 0)?)),
            Tag::Opening { tag_num: 1 } => {
                prim::expect_opening(r, 1)?;
                let network = prim::decode_app_unsigned(r)?;
                let network = u16::try_from(network).map_err(|_| DecodeError::ValueOutOfRange)?;
                let mac = match Tag::decode(r)? {
                    Tag::Application {
                        tag: crate::encoding::tag::AppTag::OctetString,
                        len,
                    } => r.read_exact(len as usize)?,
                    _ => return Err(DecodeError::TypeMismatch),
                };
                prim::expect_closing(r, 1)?;
                Ok(Self::Address { network, mac })
            }
            _ => Err(DecodeError::MalformedTag),
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Device(_) => 5,
            Self::Address { network, mac } => {
                2 + 1 + prim::unsigned_encoded_len(*network as u64) + 1 + mac.len()
            }
        }
    }
}

/// BACnetDestination: the recipient-list entry of a Notification Class.
///
/// All members are application-tagged except the recipient CHOICE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination<'a> {
    pub valid_days: BitString<'a>,
    pub from_time: Time,
    pub to_time: Time,
    pub recipient: Recipient<'a>,
    pub process_id: u32,
    pub confirmed_notify: bool,
    pub transitions: BitString<'a>,
}

impl<'a> Destination<'a> {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        prim::encode_app_bit_string(w, &self.valid_days)?;
        prim::encode_app_time(w, &self.from_time)?;
        prim::encode_app_time(w, &self.to_time)?;
        self.recipient.encode(w)?;
        prim::encode_app_unsigned(w, self.process_id as u64)?;
        prim::encode_app_boolean(w, self.confirmed_notify)?;
        prim::encode_app_bit_string(w, &self.transitions)
    }

    pub fn decode(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let valid_days = prim::decode_app_bit_string(r)?;
        let from_time = prim::decode_app_time(r)?;
        let to_time = prim::decode_app_time(r)?;
        let recipient = Recipient::decode(r)?;
        let process_id = prim::decode_app_unsigned(r)?;
        let process_id = u32::try_from(process_id).map_err(|_| DecodeError::ValueOutOfRange)?;
        let confirmed_notify = prim::decode_app_boolean(r)?;
        let transitions = prim::decode_app_bit_string(r)?;
        Ok(Self {
            valid_days,
            from_time,
            to_time,
            recipient,
            process_id,
            confirmed_notify,
            transitions,
        })
    }

    pub fn encoded_len(&self) -> usize {
        2 + self.valid_days.data.len()
            + 10
            + self.recipient.encoded_len()
            + 1
            + prim::unsigned_encoded_len(self.process_id as u64)
            + 1
            + 2
            + self.transitions.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Destination, DeviceObjectPropertyReference, DeviceObjectReference, ObjectPropertyReference,
        Recipient,
    };
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::types::{BitString, ObjectId, ObjectType, PropertyId, Time};

    #[test]
    fn device_object_property_reference_roundtrip() {
        let refs = [
            DeviceObjectPropertyReference {
                object_id: ObjectId::new(ObjectType::AnalogInput, 1),
                property_id: PropertyId::PresentValue,
                array_index: None,
                device_id: None,
            },
            DeviceObjectPropertyReference {
                object_id: ObjectId::new(ObjectType::TrendLog, 9),
                property_id: PropertyId::PriorityArray,
                array_index: Some(4),
                device_id: Some(ObjectId::new(ObjectType::Device, 1000)),
            },
        ];
        for re in refs {
            let mut buf = [0u8; 48];
            let mut w = Writer::new(&mut buf);
            re.encode(&mut w).unwrap();
            assert_eq!(w.position(), re.encoded_len());
            let mut r = Reader::new(w.as_written());
            assert_eq!(DeviceObjectPropertyReference::decode(&mut r).unwrap(), re);
        }
    }

    #[test]
    fn device_object_reference_optional_device() {
        let re = DeviceObjectReference {
            device_id: None,
            object_id: ObjectId::new(ObjectType::Schedule, 7),
        };
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        re.encode(&mut w).unwrap();
        assert_eq!(w.position(), 5);
        let mut r = Reader::new(w.as_written());
        assert_eq!(DeviceObjectReference::decode(&mut r).unwrap(), re);
    }

    #[test]
    fn object_property_reference_roundtrip() {
        let re = ObjectPropertyReference {
            object_id: ObjectId::new(ObjectType::AnalogValue, 2),
            property_id: PropertyId::PresentValue,
            array_index: None,
        };
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        re.encode(&mut w).unwrap();
        assert_eq!(w.position(), re.encoded_len());
        let mut r = Reader::new(w.as_written());
        assert_eq!(ObjectPropertyReference::decode(&mut r).unwrap(), re);
    }

    #[test]
    fn destination_roundtrip_with_both_recipient_forms() {
        let recipients = [
            Recipient::Device(ObjectId::new(ObjectType::Device, 77)),
            Recipient::Address {
                network: 5,
                mac: &[0x0A],
            },
        ];
        for recipient in recipients {
            let dest = Destination {
                valid_days: BitString::new(1, &[0b1111_1110]),
                from_time: Time::new(0, 0, 0, 0),
                to_time: Time::new(23, 59, 59, 99),
                recipient,
                process_id: 12,
                confirmed_notify: true,
                transitions: BitString::new(5, &[0b1110_0000]),
            };
            let mut buf = [0u8; 64];
            let mut w = Writer::new(&mut buf);
            dest.encode(&mut w).unwrap();
            assert_eq!(w.position(), dest.encoded_len());
            let mut r = Reader::new(w.as_written());
            assert_eq!(Destination::decode(&mut r).unwrap(), dest);
        }
    }
}
