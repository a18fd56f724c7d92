//! Property dispatch: one read and one write entry point routed per
//! object type, plus the periodic tick that advances the Load Control
//! machines against their linked outputs.

use crate::analog_output::AnalogOutputBank;
use crate::clock::Clock;
use crate::error::PropertyError;
use crate::load_control::LoadControl;
use corebac_core::encoding::Writer;
use corebac_core::types::{ObjectId, ObjectType, PropertyId};
use corebac_core::BACNET_ARRAY_ALL;

/// One property access target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyRef {
    pub object: ObjectId,
    pub property: PropertyId,
    /// `None` addresses the whole property; `Some(0)` an array's size.
    pub array_index: Option<u32>,
}

impl PropertyRef {
    pub const fn new(object: ObjectId, property: PropertyId) -> Self {
        Self {
            object,
            property,
            array_index: None,
        }
    }

    /// Builds the reference from a wire-level array index, where
    /// [`BACNET_ARRAY_ALL`] means "no index given".
    pub const fn with_wire_index(object: ObjectId, property: PropertyId, index: u32) -> Self {
        Self {
            object,
            property,
            array_index: if index == BACNET_ARRAY_ALL {
                None
            } else {
                Some(index)
            },
        }
    }
}

/// The served objects of one device: a Load Control bank shedding through
/// a matching Analog Output bank.
#[derive(Debug)]
pub struct ObjectDatabase {
    pub load_controls: LoadControl,
    pub analog_outputs: AnalogOutputBank,
}

impl ObjectDatabase {
    /// Creates `count` Load Control instances, each linked to the Analog
    /// Output with the same instance number.
    pub fn new(count: usize) -> Self {
        Self {
            load_controls: LoadControl::new(count),
            analog_outputs: AnalogOutputBank::new(count),
        }
    }

    /// Advances the shed state machines one step. Call roughly once a
    /// second; writes landed since the previous call are observed here.
    pub fn tick(&mut self, clock: &dyn Clock) {
        self.load_controls.tick(clock.now(), &mut self.analog_outputs);
    }

    /// Encodes the referenced property into `buf`, returning the number
    /// of octets written. The payload carries no outer framing; that is
    /// the APDU layer's job.
    pub fn read_property(&self, re: PropertyRef, buf: &mut [u8]) -> Result<usize, PropertyError> {
        let mut w = Writer::new(buf);
        let instance = re.object.instance();
        match re.object.object_type() {
            ObjectType::LoadControl => {
                self.load_controls
                    .read_property(instance, re.property, re.array_index, &mut w)?
            }
            ObjectType::AnalogOutput => {
                self.analog_outputs
                    .read_property(instance, re.property, re.array_index, &mut w)?
            }
            _ => return Err(PropertyError::UnknownObject),
        }
        Ok(w.position())
    }

    /// Decodes and applies one property write. `priority` only has
    /// meaning for commandable properties.
    pub fn write_property(
        &mut self,
        re: PropertyRef,
        priority: Option<u8>,
        data: &[u8],
    ) -> Result<(), PropertyError> {
        let instance = re.object.instance();
        match re.object.object_type() {
            ObjectType::LoadControl => {
                self.load_controls
                    .write_property(instance, re.property, re.array_index, data)
            }
            ObjectType::AnalogOutput => self.analog_outputs.write_property(
                instance,
                re.property,
                re.array_index,
                priority,
                data,
            ),
            _ => Err(PropertyError::UnknownObject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectDatabase, PropertyRef};
    use crate::analog_output::CommandableOutput;
    use crate::clock::{Clock, ManualClock};
    use crate::error::PropertyError;
    use crate::load_control::{ShedLevel, ShedState, SHED_PRIORITY};
    use corebac_core::encoding::Writer;
    use corebac_core::types::{Date, DateTime, ObjectId, ObjectType, PropertyId, Time};
    use corebac_core::BACNET_ARRAY_ALL;

    fn load_control_ref(property: PropertyId) -> PropertyRef {
        PropertyRef::new(ObjectId::new(ObjectType::LoadControl, 0), property)
    }

    fn write_requested_percent(db: &mut ObjectDatabase, percent: u8) {
        // Context tag [0], one octet.
        db.write_property(
            load_control_ref(PropertyId::RequestedShedLevel),
            None,
            &[0x09, percent],
        )
        .unwrap();
    }

    fn write_requested_level(db: &mut ObjectDatabase, level: u8) {
        db.write_property(
            load_control_ref(PropertyId::RequestedShedLevel),
            None,
            &[0x19, level],
        )
        .unwrap();
    }

    fn write_requested_amount(db: &mut ObjectDatabase, amount: f32) {
        let bits = amount.to_bits().to_be_bytes();
        db.write_property(
            load_control_ref(PropertyId::RequestedShedLevel),
            None,
            &[0x2C, bits[0], bits[1], bits[2], bits[3]],
        )
        .unwrap();
    }

    fn write_start_time(db: &mut ObjectDatabase, start: DateTime) {
        let mut buf = [0u8; 16];
        let mut w = Writer::new(&mut buf);
        corebac_core::value::encode_datetime(&mut w, &start).unwrap();
        db.write_property(load_control_ref(PropertyId::StartTime), None, w.as_written())
            .unwrap();
    }

    fn write_duration_minutes(db: &mut ObjectDatabase, minutes: u8) {
        db.write_property(
            load_control_ref(PropertyId::ShedDuration),
            None,
            &[0x21, minutes],
        )
        .unwrap();
    }

    fn state(db: &ObjectDatabase) -> ShedState {
        db.load_controls.instance(0).unwrap().state()
    }

    fn test_clock() -> ManualClock {
        ManualClock::new(DateTime::new(
            Date::from_ymd(2024, 6, 3),
            Time::new(12, 0, 0, 0),
        ))
    }

    #[test]
    fn cancel_sentinel_returns_to_inactive() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();

        // Drive into the pending state with a real request.
        write_requested_level(&mut db, 2);
        write_start_time(&mut db, clock.now().add_minutes(10));
        write_duration_minutes(&mut db, 30);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::RequestPending);

        // Percent(100) is the percent subtype's cancel sentinel.
        write_requested_percent(&mut db, 100);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Inactive);
    }

    #[test]
    fn requested_write_alone_does_not_arm_the_machine() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();
        write_requested_percent(&mut db, 100);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Inactive);
    }

    #[test]
    fn level_shed_becomes_compliant_when_output_can_follow() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();
        db.analog_outputs.present_value_set(0, 100.0, 8).unwrap();

        write_requested_level(&mut db, 2);
        write_start_time(&mut db, clock.now().add_minutes(5));
        write_duration_minutes(&mut db, 60);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::RequestPending);
        assert_eq!(
            db.load_controls.instance(0).unwrap().expected(),
            ShedLevel::Level(2)
        );

        // Before the window opens nothing actuates.
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::RequestPending);
        assert_eq!(db.analog_outputs.present_value_priority(0), 8);

        // At the start moment the shed commands priority 4.
        clock.advance_minutes(5);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Compliant);
        assert_eq!(db.analog_outputs.present_value_priority(0), SHED_PRIORITY);
        // Level 2 selects the second shed level value, 80%.
        assert_eq!(db.analog_outputs.present_value(0), 80.0);
        assert_eq!(
            db.load_controls.instance(0).unwrap().actual(),
            ShedLevel::Level(2)
        );

        // When the window closes the output is relinquished and the start
        // time resets to the wildcard.
        clock.advance_minutes(61);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Inactive);
        assert_eq!(db.analog_outputs.present_value_priority(0), 8);
        assert!(db.load_controls.instance(0).unwrap().start_time().is_wildcard());
    }

    #[test]
    fn amount_shed_derives_level_from_baseline() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();
        db.analog_outputs.present_value_set(0, 100.0, 8).unwrap();

        // 1.0 kW off a 1.5 kW baseline leaves one third of full duty.
        write_requested_amount(&mut db, 1.0);
        write_start_time(&mut db, clock.now());
        write_duration_minutes(&mut db, 10);
        db.tick(&clock);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Compliant);
        let level = db.analog_outputs.present_value(0);
        assert!((level - 33.333).abs() < 0.01, "derived level {level}");
    }

    #[test]
    fn higher_priority_command_blocks_compliance() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();
        db.analog_outputs.present_value_set(0, 100.0, 2).unwrap();

        write_requested_level(&mut db, 1);
        write_start_time(&mut db, clock.now());
        write_duration_minutes(&mut db, 60);
        db.tick(&clock);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::NonCompliant);

        // Releasing the higher-priority command lets the shed through on
        // a later tick.
        db.analog_outputs.present_value_relinquish(0, 2).unwrap();
        db.analog_outputs.present_value_set(0, 95.0, 8).unwrap();
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Compliant);
        assert_eq!(db.analog_outputs.present_value(0), 90.0);
    }

    #[test]
    fn compliant_shed_degrades_when_output_falls_below_target() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();
        db.analog_outputs.present_value_set(0, 100.0, 8).unwrap();

        write_requested_level(&mut db, 3);
        write_start_time(&mut db, clock.now());
        write_duration_minutes(&mut db, 60);
        db.tick(&clock);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Compliant);

        // A higher-priority writer drags the output below the 70% target.
        db.analog_outputs.present_value_set(0, 10.0, 1).unwrap();
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::NonCompliant);
        let inst = db.load_controls.instance(0).unwrap();
        assert_eq!(inst.expected(), ShedLevel::Level(0));
        assert_eq!(inst.actual(), ShedLevel::Level(0));
    }

    #[test]
    fn expired_window_cancels_a_pending_request() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();

        write_requested_level(&mut db, 1);
        write_start_time(&mut db, clock.now().add_minutes(1));
        write_duration_minutes(&mut db, 2);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::RequestPending);

        clock.advance_minutes(10);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Inactive);
    }

    #[test]
    fn disable_forces_inactive_without_side_effects() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();
        db.analog_outputs.present_value_set(0, 100.0, 8).unwrap();

        write_requested_level(&mut db, 2);
        write_start_time(&mut db, clock.now());
        write_duration_minutes(&mut db, 60);
        db.tick(&clock);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Compliant);

        // Enable := false. The machine parks; the output keeps whatever
        // command it already holds.
        db.write_property(load_control_ref(PropertyId::Enable), None, &[0x10])
            .unwrap();
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Inactive);
        assert_eq!(db.analog_outputs.present_value_priority(0), SHED_PRIORITY);
    }

    #[test]
    fn write_is_observed_on_the_next_tick_not_the_current_one() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();

        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Inactive);
        write_start_time(&mut db, clock.now().add_minutes(5));
        // Not yet: the flag is consumed by the tick after the write.
        assert_eq!(state(&db), ShedState::Inactive);
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::RequestPending);
    }

    #[test]
    fn read_property_round_trips_shed_levels_array() {
        let db = ObjectDatabase::new(1);
        let mut buf = [0u8; 64];

        // Element zero is the array size.
        let object = ObjectId::new(ObjectType::LoadControl, 0);
        let size_ref = PropertyRef::with_wire_index(object, PropertyId::ShedLevels, 0);
        let n = db.read_property(size_ref, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x21, 0x03]);

        // ARRAY_ALL maps to a whole-array read.
        let all_ref = PropertyRef::with_wire_index(object, PropertyId::ShedLevels, BACNET_ARRAY_ALL);
        let n = db.read_property(all_ref, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x21, 0x01, 0x21, 0x02, 0x21, 0x03]);

        // A positive index reads element index-1.
        let one_ref = PropertyRef::with_wire_index(object, PropertyId::ShedLevels, 3);
        let n = db.read_property(one_ref, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x21, 0x03]);

        let bad_ref = PropertyRef::with_wire_index(object, PropertyId::ShedLevels, 4);
        assert_eq!(
            db.read_property(bad_ref, &mut buf).unwrap_err(),
            PropertyError::InvalidArrayIndex
        );
    }

    #[test]
    fn whole_description_array_aborts_in_a_small_buffer() {
        let db = ObjectDatabase::new(1);
        let mut buf = [0u8; 8];
        let re = load_control_ref(PropertyId::ShedLevelDescriptions);
        assert_eq!(
            db.read_property(re, &mut buf).unwrap_err(),
            PropertyError::SegmentationNotSupported
        );
    }

    #[test]
    fn shed_levels_size_field_is_not_writable() {
        let mut db = ObjectDatabase::new(1);
        let object = ObjectId::new(ObjectType::LoadControl, 0);
        let re = PropertyRef::with_wire_index(object, PropertyId::ShedLevels, 0);
        assert_eq!(
            db.write_property(re, None, &[0x21, 0x05]).unwrap_err(),
            PropertyError::WriteAccessDenied
        );
    }

    #[test]
    fn start_time_write_needs_both_halves() {
        let mut db = ObjectDatabase::new(1);
        // A lone Date must not land.
        let err = db
            .write_property(
                load_control_ref(PropertyId::StartTime),
                None,
                &[0xA4, 0x7C, 0x06, 0x03, 0x01],
            )
            .unwrap_err();
        assert_eq!(err, PropertyError::ValueOutOfRange);

        let clock = test_clock();
        db.tick(&clock);
        assert_eq!(state(&db), ShedState::Inactive);
    }

    #[test]
    fn unknown_targets_are_rejected() {
        let mut db = ObjectDatabase::new(1);
        let mut buf = [0u8; 16];

        let wrong_type = PropertyRef::new(
            ObjectId::new(ObjectType::BinaryOutput, 0),
            PropertyId::PresentValue,
        );
        assert_eq!(
            db.read_property(wrong_type, &mut buf).unwrap_err(),
            PropertyError::UnknownObject
        );

        let missing_instance = PropertyRef::new(
            ObjectId::new(ObjectType::LoadControl, 7),
            PropertyId::PresentValue,
        );
        assert_eq!(
            db.read_property(missing_instance, &mut buf).unwrap_err(),
            PropertyError::UnknownObject
        );

        let unknown_property = load_control_ref(PropertyId::VendorName);
        assert_eq!(
            db.read_property(unknown_property, &mut buf).unwrap_err(),
            PropertyError::UnknownProperty
        );

        assert_eq!(
            db.write_property(load_control_ref(PropertyId::PresentValue), None, &[0x21, 0x01])
                .unwrap_err(),
            PropertyError::WriteAccessDenied
        );
    }

    #[test]
    fn read_present_value_reports_shed_state() {
        let mut db = ObjectDatabase::new(1);
        let clock = test_clock();
        let mut buf = [0u8; 8];

        let re = load_control_ref(PropertyId::PresentValue);
        let n = db.read_property(re, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x91, 0x00]);

        write_start_time(&mut db, clock.now().add_minutes(5));
        write_duration_minutes(&mut db, 10);
        db.tick(&clock);
        let n = db.read_property(re, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x91, 0x01]);
    }

    #[test]
    fn requested_shed_level_reads_back_context_tagged() {
        let mut db = ObjectDatabase::new(1);
        write_requested_amount(&mut db, 0.5);
        let mut buf = [0u8; 8];
        let n = db
            .read_property(load_control_ref(PropertyId::RequestedShedLevel), &mut buf)
            .unwrap();
        assert_eq!(&buf[..n], &[0x2C, 0x3F, 0x00, 0x00, 0x00]);
    }
}
