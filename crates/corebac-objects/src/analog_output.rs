//! Commandable Analog Output objects.
//!
//! Each instance carries the 16-slot priority array; the lowest-numbered
//! non-null slot drives the present value, and relinquishing every slot
//! falls back to the relinquish default. The Load Control machine
//! actuates these outputs through the [`CommandableOutput`] trait.

use crate::error::PropertyError;
use corebac_core::encoding::{primitives as prim, Reader, Writer};
use corebac_core::types::{CharacterString, ObjectId, ObjectType, PropertyId};
use corebac_core::value::AppValue;
use corebac_core::{BACNET_MAX_PRIORITY, BACNET_NO_PRIORITY};

/// Engineering unit reported by these outputs (percent of full load).
const UNITS_PERCENT: u32 = 98;

/// The priority slot reserved for minimum on/off time algorithms; not
/// writable over the network.
const PRIORITY_MINIMUM_ON_OFF: u8 = 6;

/// The actuation interface Load Control requires of its linked outputs.
pub trait CommandableOutput {
    fn present_value(&self, instance: u32) -> f32;
    /// The active (lowest-numbered non-null) priority slot, or
    /// [`BACNET_NO_PRIORITY`] when nothing commands the output.
    fn present_value_priority(&self, instance: u32) -> u8;
    fn present_value_set(
        &mut self,
        instance: u32,
        value: f32,
        priority: u8,
    ) -> Result<(), PropertyError>;
    fn present_value_relinquish(&mut self, instance: u32, priority: u8)
        -> Result<(), PropertyError>;
}

#[derive(Debug, Clone)]
struct AnalogOutputInstance {
    priority_array: [Option<f32>; BACNET_MAX_PRIORITY as usize],
    relinquish_default: f32,
    out_of_service: bool,
}

impl Default for AnalogOutputInstance {
    fn default() -> Self {
        Self {
            priority_array: [None; BACNET_MAX_PRIORITY as usize],
            relinquish_default: 0.0,
            out_of_service: false,
        }
    }
}

impl AnalogOutputInstance {
    fn present_value(&self) -> f32 {
        self.priority_array
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap_or(self.relinquish_default)
    }

    fn active_priority(&self) -> u8 {
        self.priority_array
            .iter()
            .position(Option::is_some)
            .map_or(BACNET_NO_PRIORITY, |slot| slot as u8 + 1)
    }
}

/// A fixed bank of Analog Output instances, numbered from zero.
#[derive(Debug, Clone)]
pub struct AnalogOutputBank {
    instances: Vec<AnalogOutputInstance>,
}

fn check_priority(priority: u8) -> Result<usize, PropertyError> {
    if priority < 1 || priority > BACNET_MAX_PRIORITY || priority == PRIORITY_MINIMUM_ON_OFF {
        return Err(PropertyError::ValueOutOfRange);
    }
    Ok(priority as usize - 1)
}

impl AnalogOutputBank {
    pub fn new(count: usize) -> Self {
        Self {
            instances: vec![AnalogOutputInstance::default(); count],
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn instance(&self, instance: u32) -> Result<&AnalogOutputInstance, PropertyError> {
        self.instances
            .get(instance as usize)
            .ok_or(PropertyError::UnknownObject)
    }

    fn instance_mut(&mut self, instance: u32) -> Result<&mut AnalogOutputInstance, PropertyError> {
        self.instances
            .get_mut(instance as usize)
            .ok_or(PropertyError::UnknownObject)
    }

    /// Encodes one property of `instance` into `w`.
    ///
    /// `array_index` follows ReadProperty semantics: `None` reads a whole
    /// array, `Some(0)` its size, `Some(n)` element `n`.
    pub fn read_property(
        &self,
        instance: u32,
        property: PropertyId,
        array_index: Option<u32>,
        w: &mut Writer<'_>,
    ) -> Result<(), PropertyError> {
        let inst = self.instance(instance)?;
        if property != PropertyId::PriorityArray && array_index.is_some() {
            return Err(PropertyError::PropertyIsNotAnArray);
        }
        match property {
            PropertyId::ObjectIdentifier => prim::encode_app_object_id(
                w,
                ObjectId::new(ObjectType::AnalogOutput, instance),
            )?,
            PropertyId::ObjectName => {
                let name = format!("analog-output-{instance}");
                prim::encode_app_character_string(w, &CharacterString::ansi(&name))?;
            }
            PropertyId::ObjectType => {
                prim::encode_app_enumerated(w, ObjectType::AnalogOutput.to_u16() as u32)?
            }
            PropertyId::PresentValue => prim::encode_app_real(w, inst.present_value())?,
            PropertyId::StatusFlags => {
                prim::encode_app_bit_string(w, &corebac_core::types::BitString::new(4, &[0]))?
            }
            PropertyId::EventState => prim::encode_app_enumerated(w, 0)?,
            PropertyId::OutOfService => prim::encode_app_boolean(w, inst.out_of_service)?,
            PropertyId::Units => prim::encode_app_enumerated(w, UNITS_PERCENT)?,
            PropertyId::RelinquishDefault => prim::encode_app_real(w, inst.relinquish_default)?,
            PropertyId::PriorityArray => {
                self.read_priority_array(inst, array_index, w)?;
            }
            _ => return Err(PropertyError::UnknownProperty),
        }
        Ok(())
    }

    fn read_priority_array(
        &self,
        inst: &AnalogOutputInstance,
        array_index: Option<u32>,
        w: &mut Writer<'_>,
    ) -> Result<(), PropertyError> {
        let encode_slot = |w: &mut Writer<'_>, slot: Option<f32>| match slot {
            Some(value) => prim::encode_app_real(w, value),
            None => prim::encode_app_null(w),
        };
        match array_index {
            Some(0) => prim::encode_app_unsigned(w, BACNET_MAX_PRIORITY as u64)?,
            None => {
                for slot in inst.priority_array {
                    encode_slot(w, slot)
                        .map_err(|_| PropertyError::SegmentationNotSupported)?;
                }
            }
            Some(n) if n <= BACNET_MAX_PRIORITY as u32 => {
                encode_slot(w, inst.priority_array[n as usize - 1])?;
            }
            Some(_) => return Err(PropertyError::InvalidArrayIndex),
        }
        Ok(())
    }

    /// Applies one property write to `instance`.
    pub fn write_property(
        &mut self,
        instance: u32,
        property: PropertyId,
        array_index: Option<u32>,
        priority: Option<u8>,
        data: &[u8],
    ) -> Result<(), PropertyError> {
        if array_index.is_some() {
            return Err(PropertyError::PropertyIsNotAnArray);
        }
        let mut r = Reader::new(data);
        match property {
            PropertyId::PresentValue => {
                let value =
                    AppValue::decode(&mut r).map_err(PropertyError::from_write_decode)?;
                let slot = check_priority(priority.unwrap_or(BACNET_MAX_PRIORITY))?;
                let inst = self.instance_mut(instance)?;
                match value {
                    AppValue::Real(level) => inst.priority_array[slot] = Some(level),
                    AppValue::Null => inst.priority_array[slot] = None,
                    _ => return Err(PropertyError::InvalidDataType),
                }
                log::debug!(
                    "analog-output-{instance}: present value {:?} at priority {}",
                    inst.priority_array[slot],
                    slot + 1
                );
            }
            PropertyId::RelinquishDefault => {
                let value = prim::decode_app_real(&mut r)
                    .map_err(PropertyError::from_write_decode)?;
                self.instance_mut(instance)?.relinquish_default = value;
            }
            PropertyId::OutOfService => {
                let value = prim::decode_app_boolean(&mut r)
                    .map_err(PropertyError::from_write_decode)?;
                self.instance_mut(instance)?.out_of_service = value;
            }
            PropertyId::ObjectIdentifier
            | PropertyId::ObjectName
            | PropertyId::ObjectType
            | PropertyId::StatusFlags
            | PropertyId::EventState
            | PropertyId::Units
            | PropertyId::PriorityArray => return Err(PropertyError::WriteAccessDenied),
            _ => return Err(PropertyError::UnknownProperty),
        }
        Ok(())
    }
}

impl CommandableOutput for AnalogOutputBank {
    fn present_value(&self, instance: u32) -> f32 {
        self.instance(instance)
            .map_or(0.0, AnalogOutputInstance::present_value)
    }

    fn present_value_priority(&self, instance: u32) -> u8 {
        self.instance(instance)
            .map_or(BACNET_NO_PRIORITY, AnalogOutputInstance::active_priority)
    }

    fn present_value_set(
        &mut self,
        instance: u32,
        value: f32,
        priority: u8,
    ) -> Result<(), PropertyError> {
        let slot = check_priority(priority)?;
        self.instance_mut(instance)?.priority_array[slot] = Some(value);
        Ok(())
    }

    fn present_value_relinquish(
        &mut self,
        instance: u32,
        priority: u8,
    ) -> Result<(), PropertyError> {
        let slot = check_priority(priority)?;
        self.instance_mut(instance)?.priority_array[slot] = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalogOutputBank, CommandableOutput};
    use crate::error::PropertyError;
    use corebac_core::encoding::Writer;
    use corebac_core::types::PropertyId;
    use corebac_core::BACNET_NO_PRIORITY;

    #[test]
    fn lowest_numbered_priority_wins() {
        let mut bank = AnalogOutputBank::new(1);
        assert_eq!(bank.present_value_priority(0), BACNET_NO_PRIORITY);

        bank.present_value_set(0, 60.0, 8).unwrap();
        bank.present_value_set(0, 90.0, 4).unwrap();
        assert_eq!(bank.present_value(0), 90.0);
        assert_eq!(bank.present_value_priority(0), 4);

        bank.present_value_relinquish(0, 4).unwrap();
        assert_eq!(bank.present_value(0), 60.0);
        assert_eq!(bank.present_value_priority(0), 8);

        bank.present_value_relinquish(0, 8).unwrap();
        assert_eq!(bank.present_value(0), 0.0);
        assert_eq!(bank.present_value_priority(0), BACNET_NO_PRIORITY);
    }

    #[test]
    fn rejects_reserved_and_out_of_range_priorities() {
        let mut bank = AnalogOutputBank::new(1);
        assert_eq!(
            bank.present_value_set(0, 1.0, 0).unwrap_err(),
            PropertyError::ValueOutOfRange
        );
        assert_eq!(
            bank.present_value_set(0, 1.0, 6).unwrap_err(),
            PropertyError::ValueOutOfRange
        );
        assert_eq!(
            bank.present_value_set(0, 1.0, 17).unwrap_err(),
            PropertyError::ValueOutOfRange
        );
    }

    #[test]
    fn write_present_value_null_relinquishes() {
        let mut bank = AnalogOutputBank::new(1);
        // Real 42.0 at priority 5.
        bank.write_property(
            0,
            PropertyId::PresentValue,
            None,
            Some(5),
            &[0x44, 0x42, 0x28, 0x00, 0x00],
        )
        .unwrap();
        assert_eq!(bank.present_value(0), 42.0);

        bank.write_property(0, PropertyId::PresentValue, None, Some(5), &[0x00])
            .unwrap();
        assert_eq!(bank.present_value_priority(0), BACNET_NO_PRIORITY);
    }

    #[test]
    fn priority_array_reads_size_element_and_all() {
        let mut bank = AnalogOutputBank::new(1);
        bank.present_value_set(0, 75.0, 4).unwrap();

        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        bank.read_property(0, PropertyId::PriorityArray, Some(0), &mut w)
            .unwrap();
        assert_eq!(w.as_written(), &[0x21, 0x10]);

        let mut buf = [0u8; 8];
        let mut w = Writer::new(&mut buf);
        bank.read_property(0, PropertyId::PriorityArray, Some(4), &mut w)
            .unwrap();
        assert_eq!(w.as_written(), &[0x44, 0x42, 0x96, 0x00, 0x00]);

        // Whole array: 15 nulls and one real.
        let mut buf = [0u8; 64];
        let mut w = Writer::new(&mut buf);
        bank.read_property(0, PropertyId::PriorityArray, None, &mut w)
            .unwrap();
        assert_eq!(w.position(), 15 + 5);
    }

    #[test]
    fn whole_array_overrun_asks_for_segmentation() {
        let bank = AnalogOutputBank::new(1);
        let mut buf = [0u8; 4];
        let mut w = Writer::new(&mut buf);
        assert_eq!(
            bank.read_property(0, PropertyId::PriorityArray, None, &mut w)
                .unwrap_err(),
            PropertyError::SegmentationNotSupported
        );
    }

    #[test]
    fn non_array_property_rejects_an_index() {
        let bank = AnalogOutputBank::new(1);
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        assert_eq!(
            bank.read_property(0, PropertyId::PresentValue, Some(1), &mut w)
                .unwrap_err(),
            PropertyError::PropertyIsNotAnArray
        );
    }
}
