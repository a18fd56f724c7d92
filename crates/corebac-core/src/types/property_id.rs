/// BACnet property identifiers.
///
/// Named variants cover the properties the value codec's context-tag table
/// and the object layer reference; anything else round-trips through
/// [`Proprietary`](Self::Proprietary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyId {
    Action,
    ChangeOfStateTime,
    ControlledVariableReference,
    DateList,
    Description,
    EffectivePeriod,
    EventState,
    ExceptionSchedule,
    ListOfGroupMembers,
    ListOfObjectPropertyReferences,
    ManipulatedVariableReference,
    ModificationDate,
    ObjectIdentifier,
    ObjectList,
    ObjectName,
    ObjectPropertyReference,
    ObjectType,
    OutOfService,
    PresentValue,
    PriorityArray,
    RecipientList,
    Reliability,
    RelinquishDefault,
    SetpointReference,
    StatusFlags,
    TimeOfActiveTimeReset,
    TimeOfStateCountReset,
    Units,
    VendorName,
    WeeklySchedule,
    EventTimeStamps,
    LogDeviceObjectProperty,
    Enable,
    StartTime,
    StopTime,
    ActiveCovSubscriptions,
    LastRestoreTime,
    TrackingValue,
    InputReference,
    Prescale,
    Scale,
    UpdateTime,
    TimeOfDeviceRestart,
    SubordinateList,
    ActualShedLevel,
    DutyWindow,
    ExpectedShedLevel,
    FullDutyBaseline,
    RequestedShedLevel,
    ShedDuration,
    ShedLevelDescriptions,
    ShedLevels,
    LightingCommand,
    BacnetIpGlobalAddress,
    BbmdBroadcastDistributionTable,
    BbmdForeignDeviceTable,
    FdBbmdAddress,
    ColorCommand,
    DefaultColor,
    Proprietary(u32),
}

impl PropertyId {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Action => 2,
            Self::ChangeOfStateTime => 16,
            Self::ControlledVariableReference => 19,
            Self::DateList => 23,
            Self::Description => 28,
            Self::EffectivePeriod => 32,
            Self::EventState => 36,
            Self::ExceptionSchedule => 38,
            Self::ListOfGroupMembers => 53,
            Self::ListOfObjectPropertyReferences => 54,
            Self::ManipulatedVariableReference => 60,
            Self::ModificationDate => 71,
            Self::ObjectIdentifier => 75,
            Self::ObjectList => 76,
            Self::ObjectName => 77,
            Self::ObjectPropertyReference => 78,
            Self::ObjectType => 79,
            Self::OutOfService => 81,
            Self::PresentValue => 85,
            Self::PriorityArray => 87,
            Self::RecipientList => 102,
            Self::Reliability => 103,
            Self::RelinquishDefault => 104,
            Self::SetpointReference => 109,
            Self::StatusFlags => 111,
            Self::TimeOfActiveTimeReset => 114,
            Self::TimeOfStateCountReset => 115,
            Self::Units => 117,
            Self::VendorName => 121,
            Self::WeeklySchedule => 123,
            Self::EventTimeStamps => 130,
            Self::LogDeviceObjectProperty => 132,
            Self::Enable => 133,
            Self::StartTime => 142,
            Self::StopTime => 143,
            Self::ActiveCovSubscriptions => 152,
            Self::LastRestoreTime => 157,
            Self::TrackingValue => 164,
            Self::InputReference => 181,
            Self::Prescale => 185,
            Self::Scale => 187,
            Self::UpdateTime => 189,
            Self::TimeOfDeviceRestart => 203,
            Self::SubordinateList => 211,
            Self::ActualShedLevel => 212,
            Self::DutyWindow => 213,
            Self::ExpectedShedLevel => 214,
            Self::FullDutyBaseline => 215,
            Self::RequestedShedLevel => 218,
            Self::ShedDuration => 219,
            Self::ShedLevelDescriptions => 220,
            Self::ShedLevels => 221,
            Self::LightingCommand => 380,
            Self::BacnetIpGlobalAddress => 407,
            Self::BbmdBroadcastDistributionTable => 414,
            Self::BbmdForeignDeviceTable => 415,
            Self::FdBbmdAddress => 418,
            Self::ColorCommand => 515,
            Self::DefaultColor => 518,
            Self::Proprietary(v) => v,
        }
    }

    pub const fn from_u32(value: u32) -> Self {
        match value {
            2 => Self::Action,
            16 => Self::ChangeOfStateTime,
            19 => Self::ControlledVariableReference,
            23 => Self::DateList,
            28 => Self::Description,
            32 => Self::EffectivePeriod,
            36 => Self::EventState,
            38 => Self::ExceptionSchedule,
            53 => Self::ListOfGroupMembers,
            54 => Self::ListOfObjectPropertyReferences,
            60 => Self::ManipulatedVariableReference,
            71 => Self::ModificationDate,
            75 => Self::ObjectIdentifier,
            76 => Self::ObjectList,
            77 => Self::ObjectName,
            78 => Self::ObjectPropertyReference,
            79 => Self::ObjectType,
            81 => Self::OutOfService,
            85 => Self::PresentValue,
            87 => Self::PriorityArray,
            102 => Self::RecipientList,
            103 => Self::Reliability,
            104 => Self::RelinquishDefault,
            109 => Self::SetpointReference,
            111 => Self::StatusFlags,
            114 => Self::TimeOfActiveTimeReset,
            115 => Self::TimeOfStateCountReset,
            117 => Self::Units,
            121 => Self::VendorName,
            123 => Self::WeeklySchedule,
            130 => Self::EventTimeStamps,
            132 => Self::LogDeviceObjectProperty,
            133 => Self::Enable,
            142 => Self::StartTime,
            143 => Self::StopTime,
            152 => Self::ActiveCovSubscriptions,
            157 => Self::LastRestoreTime,
            164 => Self::TrackingValue,
            181 => Self::InputReference,
            185 => Self::Prescale,
            187 => Self::Scale,
            189 => Self::UpdateTime,
            203 => Self::TimeOfDeviceRestart,
            211 => Self::SubordinateList,
            212 => Self::ActualShedLevel,
            213 => Self::DutyWindow,
            214 => Self::ExpectedShedLevel,
            215 => Self::FullDutyBaseline,
            218 => Self::RequestedShedLevel,
            219 => Self::ShedDuration,
            220 => Self::ShedLevelDescriptions,
            221 => Self::ShedLevels,
            380 => Self::LightingCommand,
            407 => Self::BacnetIpGlobalAddress,
            414 => Self::BbmdBroadcastDistributionTable,
            415 => Self::BbmdForeignDeviceTable,
            418 => Self::FdBbmdAddress,
            515 => Self::ColorCommand,
            518 => Self::DefaultColor,
            v => Self::Proprietary(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyId;

    #[test]
    fn numeric_mapping_is_symmetric() {
        for raw in 0..600 {
            assert_eq!(PropertyId::from_u32(raw).to_u32(), raw);
        }
    }
}
