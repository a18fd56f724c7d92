//! Load Control objects (135-2004 Addendum e).
//!
//! Each instance runs the four-state shed automaton: Inactive until a
//! start time is written, pending until the window opens, then compliant
//! or non-compliant depending on whether the linked Analog Output can be
//! driven to the requested level at the shed priority. Written-property
//! flags are consumed (and cleared) by the state that reacts to them, so
//! a write always takes effect on the tick after it lands.

use crate::analog_output::CommandableOutput;
use crate::error::PropertyError;
use corebac_core::encoding::{primitives as prim, Reader, Writer};
use corebac_core::types::{CharacterString, DateTime, ObjectId, ObjectType, PropertyId};
use corebac_core::value::{self, AppValue};
use corebac_core::BACNET_NO_PRIORITY;

/// Number of entries in the Shed_Levels / Shed_Level_Descriptions arrays.
pub const MAX_SHED_LEVELS: usize = 3;

/// Commandable-output priority this object sheds at.
pub const SHED_PRIORITY: u8 = 4;

/// Present_Value of a Load Control object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ShedState {
    Inactive = 0,
    RequestPending = 1,
    Compliant = 2,
    NonCompliant = 3,
}

/// BACnetShedLevel CHOICE. The context tag that carried the write picks
/// the subtype: `[0]` percent, `[1]` level, `[2]` amount in kilowatts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShedLevel {
    Percent(u32),
    Level(u32),
    Amount(f32),
}

impl ShedLevel {
    /// The neutral value of this subtype; writing it requests shed
    /// cancellation.
    pub fn default_like(&self) -> Self {
        match self {
            Self::Percent(_) => Self::Percent(100),
            Self::Level(_) => Self::Level(0),
            Self::Amount(_) => Self::Amount(0.0),
        }
    }

    /// Whether this value is its subtype's cancellation sentinel.
    pub fn is_cancel(&self) -> bool {
        match self {
            Self::Percent(percent) => *percent == 100,
            Self::Level(level) => *level == 0,
            Self::Amount(amount) => *amount <= 0.0,
        }
    }

    fn encode(&self, w: &mut Writer<'_>) -> Result<(), PropertyError> {
        match self {
            Self::Percent(percent) => prim::encode_ctx_unsigned(w, 0, *percent as u64)?,
            Self::Level(level) => prim::encode_ctx_unsigned(w, 1, *level as u64)?,
            Self::Amount(amount) => prim::encode_ctx_real(w, 2, *amount)?,
        }
        Ok(())
    }
}

/// One Load Control instance's state and configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadControlInstance {
    state: ShedState,
    requested: ShedLevel,
    expected: ShedLevel,
    actual: ShedLevel,
    start_time: DateTime,
    end_time: DateTime,
    shed_duration_minutes: u32,
    duty_window_minutes: u32,
    enable: bool,
    full_duty_baseline_kw: f32,
    shed_levels: [u32; MAX_SHED_LEVELS],
    request_written: bool,
    start_written: bool,
}

impl Default for LoadControlInstance {
    fn default() -> Self {
        Self {
            state: ShedState::Inactive,
            requested: ShedLevel::Level(0),
            expected: ShedLevel::Level(0),
            actual: ShedLevel::Level(0),
            start_time: DateTime::WILDCARD,
            end_time: DateTime::WILDCARD,
            shed_duration_minutes: 0,
            duty_window_minutes: 0,
            enable: true,
            full_duty_baseline_kw: 1.5,
            shed_levels: [1, 2, 3],
            request_written: false,
            start_written: false,
        }
    }
}

impl LoadControlInstance {
    pub fn state(&self) -> ShedState {
        self.state
    }

    pub fn requested(&self) -> ShedLevel {
        self.requested
    }

    pub fn expected(&self) -> ShedLevel {
        self.expected
    }

    pub fn actual(&self) -> ShedLevel {
        self.actual
    }

    pub fn start_time(&self) -> DateTime {
        self.start_time
    }

    pub fn enabled(&self) -> bool {
        self.enable
    }
}

/// A fixed bank of Load Control instances. Instance `i` sheds through
/// output `i` of the linked commandable bank.
#[derive(Debug, Clone)]
pub struct LoadControl {
    instances: Vec<LoadControlInstance>,
    shed_level_values: [f32; MAX_SHED_LEVELS],
    shed_level_descriptions: [&'static str; MAX_SHED_LEVELS],
}

impl LoadControl {
    pub fn new(count: usize) -> Self {
        Self {
            instances: vec![LoadControlInstance::default(); count],
            shed_level_values: [90.0, 80.0, 70.0],
            shed_level_descriptions: ["dim lights 10%", "dim lights 20%", "dim lights 30%"],
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instance(&self, instance: u32) -> Option<&LoadControlInstance> {
        self.instances.get(instance as usize)
    }

    fn instance_checked(&self, instance: u32) -> Result<&LoadControlInstance, PropertyError> {
        self.instance(instance).ok_or(PropertyError::UnknownObject)
    }

    fn instance_mut(&mut self, instance: u32) -> Result<&mut LoadControlInstance, PropertyError> {
        self.instances
            .get_mut(instance as usize)
            .ok_or(PropertyError::UnknownObject)
    }

    /// Advances every instance one step against `now`. Call roughly once
    /// a second.
    pub fn tick(&mut self, now: DateTime, output: &mut dyn CommandableOutput) {
        for index in 0..self.instances.len() {
            let before = self.instances[index].state;
            self.step(index, now, output);
            let after = self.instances[index].state;
            if before != after {
                log::debug!("load-control-{index}: {before:?} -> {after:?}");
            }
        }
    }

    fn step(&mut self, index: usize, now: DateTime, output: &mut dyn CommandableOutput) {
        if !self.instances[index].enable {
            self.instances[index].state = ShedState::Inactive;
            return;
        }
        match self.instances[index].state {
            ShedState::Inactive => self.step_inactive(index),
            ShedState::RequestPending => self.step_pending(index, now, output),
            ShedState::NonCompliant => self.step_non_compliant(index, now, output),
            ShedState::Compliant => self.step_compliant(index, now, output),
        }
    }

    fn step_inactive(&mut self, index: usize) {
        let inst = &mut self.instances[index];
        if !inst.start_written {
            return;
        }
        inst.start_written = false;
        if inst.start_time.is_wildcard() {
            // A wildcard start time is "nothing scheduled"; stay idle.
            return;
        }
        inst.expected = inst.requested;
        inst.actual = inst.requested.default_like();
        inst.state = ShedState::RequestPending;
    }

    fn step_pending(&mut self, index: usize, now: DateTime, output: &mut dyn CommandableOutput) {
        {
            let inst = &mut self.instances[index];
            if inst.request_written {
                inst.request_written = false;
                if inst.requested.is_cancel() {
                    log::debug!("load-control-{index}: requested level is the cancel sentinel");
                    inst.state = ShedState::Inactive;
                    return;
                }
            }
            if inst.start_written {
                inst.start_written = false;
                if inst.start_time.is_wildcard() {
                    log::debug!("load-control-{index}: start time cleared");
                    inst.state = ShedState::Inactive;
                    return;
                }
            }
            inst.end_time = inst.start_time.add_minutes(inst.shed_duration_minutes);
            if inst.end_time.is_before(&now) {
                log::debug!("load-control-{index}: window elapsed before activation");
                inst.state = ShedState::Inactive;
                return;
            }
        }
        if now.is_before(&self.instances[index].start_time) {
            let inst = &mut self.instances[index];
            inst.expected = inst.requested;
            inst.actual = inst.requested.default_like();
            return;
        }
        // The window is open.
        self.evaluate_shed(index, output);
    }

    fn step_non_compliant(
        &mut self,
        index: usize,
        now: DateTime,
        output: &mut dyn CommandableOutput,
    ) {
        {
            let inst = &mut self.instances[index];
            inst.end_time = inst.start_time.add_minutes(inst.shed_duration_minutes);
            if inst.end_time.is_before(&now) {
                inst.state = ShedState::Inactive;
                return;
            }
            if inst.request_written || inst.start_written {
                // Flags are consumed on the next pending evaluation.
                inst.state = ShedState::RequestPending;
                return;
            }
        }
        if self.able_to_meet(index, &*output) {
            self.command_shed(index, output);
        }
    }

    fn step_compliant(&mut self, index: usize, now: DateTime, output: &mut dyn CommandableOutput) {
        {
            let inst = &mut self.instances[index];
            inst.end_time = inst.start_time.add_minutes(inst.shed_duration_minutes);
            if inst.end_time.is_before(&now) {
                inst.start_time = DateTime::WILDCARD;
                inst.state = ShedState::Inactive;
                let _ = output.present_value_relinquish(index as u32, SHED_PRIORITY);
                return;
            }
            if inst.request_written || inst.start_written {
                inst.state = ShedState::RequestPending;
                return;
            }
        }
        if !self.able_to_meet(index, &*output) {
            let inst = &mut self.instances[index];
            inst.expected = inst.requested.default_like();
            inst.actual = inst.requested.default_like();
            inst.state = ShedState::NonCompliant;
        }
    }

    /// Pending-window evaluation shared with the non-compliant retry path.
    fn evaluate_shed(&mut self, index: usize, output: &mut dyn CommandableOutput) {
        if self.able_to_meet(index, &*output) {
            self.command_shed(index, output);
        } else {
            let inst = &mut self.instances[index];
            inst.expected = inst.requested.default_like();
            inst.actual = inst.requested.default_like();
            inst.state = ShedState::NonCompliant;
        }
    }

    fn command_shed(&mut self, index: usize, output: &mut dyn CommandableOutput) {
        let level = self.derived_level(index);
        if let Err(err) = output.present_value_set(index as u32, level, SHED_PRIORITY) {
            log::warn!("load-control-{index}: output refused shed command: {err}");
            return;
        }
        let inst = &mut self.instances[index];
        inst.expected = inst.requested;
        inst.actual = inst.requested;
        inst.state = ShedState::Compliant;
    }

    /// The Analog Output level a compliant shed drives, per the requested
    /// subtype.
    fn derived_level(&self, index: usize) -> f32 {
        let inst = &self.instances[index];
        match inst.requested {
            ShedLevel::Percent(percent) => percent as f32,
            ShedLevel::Amount(amount) => {
                // Wattage assumed linear with output level.
                (inst.full_duty_baseline_kw - amount) / inst.full_duty_baseline_kw * 100.0
            }
            ShedLevel::Level(level) => {
                let mut slot = 0;
                for (i, threshold) in inst.shed_levels.iter().enumerate() {
                    if *threshold <= level {
                        slot = i;
                    }
                }
                self.shed_level_values[slot]
            }
        }
    }

    /// Whether the linked output can currently honour the request: nothing
    /// above the shed priority may hold it, and the present level must be
    /// at or above the derived target.
    fn able_to_meet(&self, index: usize, output: &dyn CommandableOutput) -> bool {
        let priority = output.present_value_priority(index as u32);
        if priority != BACNET_NO_PRIORITY && priority < SHED_PRIORITY {
            return false;
        }
        output.present_value(index as u32) >= self.derived_level(index)
    }

    /// Encodes one property of `instance` into `w`. `array_index` follows
    /// ReadProperty semantics (`None` whole array, `Some(0)` size).
    pub fn read_property(
        &self,
        instance: u32,
        property: PropertyId,
        array_index: Option<u32>,
        w: &mut Writer<'_>,
    ) -> Result<(), PropertyError> {
        let inst = self.instance_checked(instance)?;
        let is_array_property = matches!(
            property,
            PropertyId::ShedLevels | PropertyId::ShedLevelDescriptions
        );
        if !is_array_property && array_index.is_some() {
            return Err(PropertyError::PropertyIsNotAnArray);
        }
        match property {
            PropertyId::ObjectIdentifier => prim::encode_app_object_id(
                w,
                ObjectId::new(ObjectType::LoadControl, instance),
            )?,
            PropertyId::ObjectName | PropertyId::Description => {
                let name = format!("load-control-{instance}");
                prim::encode_app_character_string(w, &CharacterString::ansi(&name))?;
            }
            PropertyId::ObjectType => {
                prim::encode_app_enumerated(w, ObjectType::LoadControl.to_u16() as u32)?
            }
            PropertyId::PresentValue => prim::encode_app_enumerated(w, inst.state as u32)?,
            PropertyId::StatusFlags => {
                prim::encode_app_bit_string(w, &corebac_core::types::BitString::new(4, &[0]))?
            }
            PropertyId::EventState => prim::encode_app_enumerated(w, 0)?,
            PropertyId::RequestedShedLevel => inst.requested.encode(w)?,
            PropertyId::ExpectedShedLevel => inst.expected.encode(w)?,
            PropertyId::ActualShedLevel => inst.actual.encode(w)?,
            PropertyId::StartTime => value::encode_datetime(w, &inst.start_time)?,
            PropertyId::ShedDuration => {
                prim::encode_app_unsigned(w, inst.shed_duration_minutes as u64)?
            }
            PropertyId::DutyWindow => {
                prim::encode_app_unsigned(w, inst.duty_window_minutes as u64)?
            }
            PropertyId::Enable => prim::encode_app_boolean(w, inst.enable)?,
            PropertyId::FullDutyBaseline => prim::encode_app_real(w, inst.full_duty_baseline_kw)?,
            PropertyId::ShedLevels => match array_index {
                Some(0) => prim::encode_app_unsigned(w, MAX_SHED_LEVELS as u64)?,
                None => {
                    for level in inst.shed_levels {
                        prim::encode_app_unsigned(w, level as u64)
                            .map_err(|_| PropertyError::SegmentationNotSupported)?;
                    }
                }
                Some(n) if n as usize <= MAX_SHED_LEVELS => {
                    prim::encode_app_unsigned(w, inst.shed_levels[n as usize - 1] as u64)?
                }
                Some(_) => return Err(PropertyError::InvalidArrayIndex),
            },
            PropertyId::ShedLevelDescriptions => match array_index {
                Some(0) => prim::encode_app_unsigned(w, MAX_SHED_LEVELS as u64)?,
                None => {
                    for description in self.shed_level_descriptions {
                        prim::encode_app_character_string(w, &CharacterString::ansi(description))
                            .map_err(|_| PropertyError::SegmentationNotSupported)?;
                    }
                }
                Some(n) if n as usize <= MAX_SHED_LEVELS => prim::encode_app_character_string(
                    w,
                    &CharacterString::ansi(self.shed_level_descriptions[n as usize - 1]),
                )?,
                Some(_) => return Err(PropertyError::InvalidArrayIndex),
            },
            _ => return Err(PropertyError::UnknownProperty),
        }
        Ok(())
    }

    /// Applies one property write to `instance` from encoded `data`.
    ///
    /// Writes to RequestedShedLevel, ShedDuration, or DutyWindow raise
    /// `request_written`; a StartTime write raises `start_written`. The
    /// state machine observes either on its next tick.
    pub fn write_property(
        &mut self,
        instance: u32,
        property: PropertyId,
        array_index: Option<u32>,
        data: &[u8],
    ) -> Result<(), PropertyError> {
        if property != PropertyId::ShedLevels && array_index.is_some() {
            return Err(PropertyError::PropertyIsNotAnArray);
        }
        let mut r = Reader::new(data);
        match property {
            PropertyId::RequestedShedLevel => {
                let cv = value::decode_context(&mut r, PropertyId::RequestedShedLevel)
                    .map_err(|_| PropertyError::InvalidDataType)?;
                let requested = match (cv.tag, cv.value) {
                    (0, AppValue::Unsigned(percent)) => ShedLevel::Percent(
                        u32::try_from(percent).map_err(|_| PropertyError::ValueOutOfRange)?,
                    ),
                    (1, AppValue::Unsigned(level)) => ShedLevel::Level(
                        u32::try_from(level).map_err(|_| PropertyError::ValueOutOfRange)?,
                    ),
                    (2, AppValue::Real(amount)) => ShedLevel::Amount(amount),
                    _ => return Err(PropertyError::InvalidDataType),
                };
                let inst = self.instance_mut(instance)?;
                inst.requested = requested;
                inst.request_written = true;
            }
            PropertyId::StartTime => {
                // Hold the date until the time half also decodes; a bad
                // second half fails the whole write.
                let date =
                    prim::decode_app_date(&mut r).map_err(PropertyError::from_write_decode)?;
                let time =
                    prim::decode_app_time(&mut r).map_err(PropertyError::from_write_decode)?;
                let inst = self.instance_mut(instance)?;
                inst.start_time = DateTime::new(date, time);
                inst.start_written = true;
            }
            PropertyId::ShedDuration => {
                let minutes =
                    prim::decode_app_unsigned(&mut r).map_err(PropertyError::from_write_decode)?;
                let minutes =
                    u32::try_from(minutes).map_err(|_| PropertyError::ValueOutOfRange)?;
                let inst = self.instance_mut(instance)?;
                inst.shed_duration_minutes = minutes;
                inst.request_written = true;
            }
            PropertyId::DutyWindow => {
                let minutes =
                    prim::decode_app_unsigned(&mut r).map_err(PropertyError::from_write_decode)?;
                let minutes =
                    u32::try_from(minutes).map_err(|_| PropertyError::ValueOutOfRange)?;
                let inst = self.instance_mut(instance)?;
                inst.duty_window_minutes = minutes;
                inst.request_written = true;
            }
            PropertyId::ShedLevels => {
                let inst_exists = (instance as usize) < self.instances.len();
                if !inst_exists {
                    return Err(PropertyError::UnknownObject);
                }
                match array_index {
                    Some(0) => return Err(PropertyError::WriteAccessDenied),
                    Some(n) if n as usize <= MAX_SHED_LEVELS => {
                        let level = prim::decode_app_unsigned(&mut r)
                            .map_err(PropertyError::from_write_decode)?;
                        let level =
                            u32::try_from(level).map_err(|_| PropertyError::ValueOutOfRange)?;
                        self.instances[instance as usize].shed_levels[n as usize - 1] = level;
                    }
                    Some(_) => return Err(PropertyError::InvalidArrayIndex),
                    None => {
                        let mut levels = [0u32; MAX_SHED_LEVELS];
                        for slot in &mut levels {
                            let level = prim::decode_app_unsigned(&mut r)
                                .map_err(PropertyError::from_write_decode)?;
                            *slot = u32::try_from(level)
                                .map_err(|_| PropertyError::ValueOutOfRange)?;
                        }
                        self.instances[instance as usize].shed_levels = levels;
                    }
                }
            }
            PropertyId::Enable => {
                let enable =
                    prim::decode_app_boolean(&mut r).map_err(PropertyError::from_write_decode)?;
                self.instance_mut(instance)?.enable = enable;
            }
            PropertyId::ObjectIdentifier
            | PropertyId::ObjectName
            | PropertyId::ObjectType
            | PropertyId::PresentValue
            | PropertyId::StatusFlags
            | PropertyId::EventState
            | PropertyId::ExpectedShedLevel
            | PropertyId::ActualShedLevel
            | PropertyId::FullDutyBaseline
            | PropertyId::ShedLevelDescriptions => return Err(PropertyError::WriteAccessDenied),
            _ => return Err(PropertyError::UnknownProperty),
        }
        Ok(())
    }
}
