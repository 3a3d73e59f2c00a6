// src/car_specific/common.rs
//
// Brand-independent checks. Every rule is evaluated on every call; this is
// a rule set, not a priority chain.

use super::hysteresis::HysteresisState;
use crate::events::{EventName, Events};
use crate::types::{ButtonType, CarParams, CarState, GearShifter, MAX_CTRL_SPEED};
use tracing::trace;

pub const DEFAULT_ENABLE_BUTTONS: [ButtonType; 2] =
    [ButtonType::AccelCruise, ButtonType::DecelCruise];

/// Per-family knobs for the common rule set
#[derive(Debug, Clone, Copy)]
pub struct CommonEventParams<'a> {
    /// Gears tolerated besides drive
    pub extra_gears: &'a [GearShifter],
    /// Engage/disengage follows the PCM cruise-enabled edges
    pub pcm_enable: bool,
    /// Brand veto on the PCM rising edge
    pub allow_enable: bool,
    /// Buttons whose release requests engagement
    pub enable_buttons: &'a [ButtonType],
}

impl Default for CommonEventParams<'static> {
    fn default() -> Self {
        Self {
            extra_gears: &[],
            pcm_enable: true,
            allow_enable: true,
            enable_buttons: &DEFAULT_ENABLE_BUTTONS,
        }
    }
}

impl<'a> CommonEventParams<'a> {
    pub fn with_extra_gears(extra_gears: &'a [GearShifter]) -> Self {
        Self {
            extra_gears,
            ..CommonEventParams::default()
        }
    }
}

pub fn evaluate(
    cp: &CarParams,
    state: &mut HysteresisState,
    cs: &CarState,
    cs_prev: &CarState,
    params: CommonEventParams<'_>,
) -> Events {
    let mut events = Events::new();

    if cs.door_open {
        events.add(EventName::DoorOpen);
    }
    if cs.seatbelt_unlatched {
        events.add(EventName::SeatbeltNotLatched);
    }
    if cs.gear_shifter != GearShifter::Drive && !params.extra_gears.contains(&cs.gear_shifter) {
        events.add(EventName::WrongGear);
    }
    if cs.gear_shifter == GearShifter::Reverse {
        events.add(EventName::ReverseGear);
    }
    if !cs.cruise_state.available {
        events.add(EventName::WrongCarMode);
    }
    if cs.esp_disabled {
        events.add(EventName::EspDisabled);
    }
    if cs.esp_active {
        events.add(EventName::EspActive);
    }
    if cs.stock_fcw {
        events.add(EventName::StockFcw);
    }
    if cs.stock_aeb {
        events.add(EventName::StockAeb);
    }
    if f64::from(cs.v_ego) > MAX_CTRL_SPEED {
        events.add(EventName::SpeedTooHigh);
    }
    if cs.cruise_state.non_adaptive {
        events.add(EventName::WrongCruiseMode);
    }
    if cs.brake_hold_active && cp.openpilot_longitudinal_control {
        events.add(EventName::BrakeHold);
    }
    if cs.parking_brake {
        events.add(EventName::ParkBrake);
    }
    if cs.acc_faulted {
        events.add(EventName::AccFaulted);
    }
    if cs.steering_pressed {
        events.add(EventName::SteerOverride);
    }
    if cs.brake_pressed && cs.standstill {
        events.add(EventName::PreEnableStandstill);
    }
    if cs.gas_pressed {
        events.add(EventName::GasPressedOverride);
    }
    if cs.vehicle_sensors_invalid {
        events.add(EventName::VehicleSensorsInvalid);
    }

    for b in &cs.button_events {
        // Stack-owned engagement starts on the release of an enable button
        if !cp.pcm_cruise && params.enable_buttons.contains(&b.kind) && !b.pressed {
            events.add(EventName::ButtonEnable);
        }
        // Cancel disengages on both edges, stock and stack longitudinal alike
        if b.kind == ButtonType::Cancel {
            events.add(EventName::ButtonCancel);
        }
    }

    update_steer_faults(state, cs, cs_prev, &mut events);

    if params.pcm_enable {
        let was_enabled = cs_prev.cruise_state.enabled;
        if cs.cruise_state.enabled && !was_enabled && params.allow_enable {
            events.add(EventName::PcmEnable);
        } else if !cs.cruise_state.enabled && was_enabled {
            events.add(EventName::PcmDisable);
        }
    }

    events
}

fn update_steer_faults(
    state: &mut HysteresisState,
    cs: &CarState,
    cs_prev: &CarState,
    events: &mut Events,
) {
    state.count_steering(cs.steering_pressed);

    if cs.steer_fault_temporary {
        if cs.steering_pressed && (!cs_prev.steer_fault_temporary || state.no_steer_warning) {
            state.no_steer_warning = true;
        } else {
            state.no_steer_warning = false;

            // Soften the alert if the driver was holding the wheel recently
            if state.silent_steer_warning || cs.standstill || state.recently_overridden() {
                state.silent_steer_warning = true;
                events.add(EventName::SteerTempUnavailableSilent);
            } else {
                events.add(EventName::SteerTempUnavailable);
            }
            trace!(
                "Temporary steer fault: silent={} unpressed={}",
                state.silent_steer_warning,
                state.steering_unpressed
            );
        }
    } else {
        state.no_steer_warning = false;
        state.silent_steer_warning = false;
    }

    if cs.steer_fault_permanent {
        events.add(EventName::SteerUnavailable);
    }
}
