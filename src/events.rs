// src/events.rs
//
// Ordered collector for the events raised on one control tick.
// Consumers use insertion order as a display tie-break, so nothing here
// sorts or deduplicates.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    // Common checks
    DoorOpen,
    SeatbeltNotLatched,
    WrongGear,
    ReverseGear,
    WrongCarMode,
    EspDisabled,
    EspActive,
    StockFcw,
    StockAeb,
    SpeedTooHigh,
    WrongCruiseMode,
    BrakeHold,
    ParkBrake,
    AccFaulted,
    SteerOverride,
    PreEnableStandstill,
    GasPressedOverride,
    VehicleSensorsInvalid,

    // Buttons
    ButtonEnable,
    ButtonCancel,

    // Steering faults
    SteerTempUnavailableSilent,
    SteerTempUnavailable,
    SteerUnavailable,

    // Cruise module edges
    PcmEnable,
    PcmDisable,

    // Brand additions
    InvalidLkasSetting,
    LkasDisabled,
    BelowSteerSpeed,
    BelowEngageSpeed,
    SpeedTooLow,
    CruiseDisabled,
    ManualRestart,
    ResumeRequired,
    LowSpeedLockout,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::DoorOpen => "doorOpen",
            EventName::SeatbeltNotLatched => "seatbeltNotLatched",
            EventName::WrongGear => "wrongGear",
            EventName::ReverseGear => "reverseGear",
            EventName::WrongCarMode => "wrongCarMode",
            EventName::EspDisabled => "espDisabled",
            EventName::EspActive => "espActive",
            EventName::StockFcw => "stockFcw",
            EventName::StockAeb => "stockAeb",
            EventName::SpeedTooHigh => "speedTooHigh",
            EventName::WrongCruiseMode => "wrongCruiseMode",
            EventName::BrakeHold => "brakeHold",
            EventName::ParkBrake => "parkBrake",
            EventName::AccFaulted => "accFaulted",
            EventName::SteerOverride => "steerOverride",
            EventName::PreEnableStandstill => "preEnableStandstill",
            EventName::GasPressedOverride => "gasPressedOverride",
            EventName::VehicleSensorsInvalid => "vehicleSensorsInvalid",
            EventName::ButtonEnable => "buttonEnable",
            EventName::ButtonCancel => "buttonCancel",
            EventName::SteerTempUnavailableSilent => "steerTempUnavailableSilent",
            EventName::SteerTempUnavailable => "steerTempUnavailable",
            EventName::SteerUnavailable => "steerUnavailable",
            EventName::PcmEnable => "pcmEnable",
            EventName::PcmDisable => "pcmDisable",
            EventName::InvalidLkasSetting => "invalidLkasSetting",
            EventName::LkasDisabled => "lkasDisabled",
            EventName::BelowSteerSpeed => "belowSteerSpeed",
            EventName::BelowEngageSpeed => "belowEngageSpeed",
            EventName::SpeedTooLow => "speedTooLow",
            EventName::CruiseDisabled => "cruiseDisabled",
            EventName::ManualRestart => "manualRestart",
            EventName::ResumeRequired => "resumeRequired",
            EventName::LowSpeedLockout => "lowSpeedLockout",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events raised during one evaluation, in the order the rules fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Events {
    names: Vec<EventName>,
}

impl Events {
    pub fn new() -> Self {
        Self {
            names: Vec::with_capacity(8),
        }
    }

    pub fn add(&mut self, name: EventName) {
        self.names.push(name);
    }

    pub fn names(&self) -> &[EventName] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventName> {
        self.names.iter()
    }

    pub fn contains(&self, name: EventName) -> bool {
        self.names.contains(&name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl IntoIterator for Events {
    type Item = EventName;
    type IntoIter = std::vec::IntoIter<EventName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl<'a> IntoIterator for &'a Events {
    type Item = &'a EventName;
    type IntoIter = std::slice::Iter<'a, EventName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
