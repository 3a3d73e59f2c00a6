// src/car_specific/brands.rs
//
// Per-family rules layered on top of the common rule set.

use super::common::CommonEventParams;
use super::CarSpecificEvents;
use crate::events::{EventName, Events};
use crate::types::{
    ButtonType, CarControl, CarState, CarStateSnapshot, GearShifter, NetworkLocation,
};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Below this the car is treated as stopped (m/s)
const STANDSTILL_SPEED: f32 = 0.001;

// Chrysler below-steer-speed latch, offsets from min_steer_speed (m/s)
const CHRYSLER_LOW_SPEED_SET: f32 = 0.5;
const CHRYSLER_LOW_SPEED_CLEAR: f32 = 1.0;

// Honda: cruise dropping within this margin of min_enable_speed is expected
const HONDA_SPEED_TOO_LOW_MARGIN: f32 = 2.0;

// Toyota: accel command above this means we were not stopping on purpose
const TOYOTA_SPEED_TOO_LOW_ACCEL: f32 = 0.3;

// GM: brake pressure that counts as holding the car at a stop
const GM_STANDSTILL_BRAKE: f32 = 20.0;

// Volkswagen
pub const VW_DEFAULT_MIN_STEER_SPEED: f32 = 0.4;
const VW_LOW_SPEED_SET: f32 = 1.0;
const VW_LOW_SPEED_CLEAR: f32 = 2.0;
const VW_BELOW_ENGAGE_MARGIN: f32 = 0.5;

// Hyundai: only cars with steering cut off above this speed get the latch
const HYUNDAI_LOW_SPEED_CUTOFF: f32 = 10.0;
const HYUNDAI_LOW_SPEED_SET: f32 = 2.0;
const HYUNDAI_LOW_SPEED_CLEAR: f32 = 4.0;

// Hyundai CLU11 cruise button codes
pub const HYUNDAI_BUTTON_RES_ACCEL: i32 = 1;
pub const HYUNDAI_BUTTON_SET_DECEL: i32 = 2;
pub const HYUNDAI_BUTTON_CANCEL: i32 = 4;
pub const HYUNDAI_ENABLE_BUTTONS: [i32; 3] = [
    HYUNDAI_BUTTON_RES_ACCEL,
    HYUNDAI_BUTTON_SET_DECEL,
    HYUNDAI_BUTTON_CANCEL,
];

const NISSAN_EXTRA_GEARS: [GearShifter; 1] = [GearShifter::Brake];
const FORD_EXTRA_GEARS: [GearShifter; 1] = [GearShifter::Manumatic];
const CHRYSLER_EXTRA_GEARS: [GearShifter; 1] = [GearShifter::Low];
const GM_EXTRA_GEARS: [GearShifter; 4] = [
    GearShifter::Sport,
    GearShifter::Low,
    GearShifter::Eco,
    GearShifter::Manumatic,
];
const GM_ENABLE_BUTTONS: [ButtonType; 1] = [ButtonType::DecelCruise];
const VW_EXTRA_GEARS: [GearShifter; 3] =
    [GearShifter::Eco, GearShifter::Sport, GearShifter::Manumatic];
const VW_ENABLE_BUTTONS: [ButtonType; 2] = [ButtonType::SetCruise, ButtonType::ResumeCruise];

impl CarSpecificEvents {
    pub(super) fn ford_events(&mut self, cs: &CarStateSnapshot, cs_prev: &CarState) -> Events {
        self.common_events(
            &cs.out,
            cs_prev,
            CommonEventParams::with_extra_gears(&FORD_EXTRA_GEARS),
        )
    }

    pub(super) fn nissan_events(&mut self, cs: &CarStateSnapshot, cs_prev: &CarState) -> Events {
        let mut events = self.common_events(
            &cs.out,
            cs_prev,
            CommonEventParams::with_extra_gears(&NISSAN_EXTRA_GEARS),
        );

        if cs.brand.lkas_enabled {
            events.add(EventName::InvalidLkasSetting);
        }
        events
    }

    pub(super) fn mazda_events(&mut self, cs: &CarStateSnapshot, cs_prev: &CarState) -> Events {
        let mut events = self.common_events(&cs.out, cs_prev, CommonEventParams::default());

        if cs.brand.lkas_disabled {
            events.add(EventName::LkasDisabled);
        } else if cs.brand.low_speed_alert {
            events.add(EventName::BelowSteerSpeed);
        }
        events
    }

    pub(super) fn chrysler_events(&mut self, cs: &CarStateSnapshot, cs_prev: &CarState) -> Events {
        let mut events = self.common_events(
            &cs.out,
            cs_prev,
            CommonEventParams::with_extra_gears(&CHRYSLER_EXTRA_GEARS),
        );

        let v_ego = cs.out.v_ego;
        let min_steer = self.cp.min_steer_speed;
        let latched = self.state.update_low_speed_alert(
            min_steer > 0.0 && v_ego < min_steer + CHRYSLER_LOW_SPEED_SET,
            v_ego > min_steer + CHRYSLER_LOW_SPEED_CLEAR,
            v_ego,
        );
        if latched {
            events.add(EventName::BelowSteerSpeed);
        }
        events
    }

    pub(super) fn honda_events(
        &mut self,
        cs: &CarStateSnapshot,
        cs_prev: &CarState,
        cc_prev: &CarControl,
    ) -> Events {
        let params = CommonEventParams {
            pcm_enable: false,
            ..CommonEventParams::default()
        };
        let mut events = self.common_events(&cs.out, cs_prev, params);

        let v_ego = cs.out.v_ego;
        let min_enable = self.cp.min_enable_speed;

        if self.cp.pcm_cruise && v_ego < min_enable {
            events.add(EventName::BelowEngageSpeed);
        }

        if self.cp.pcm_cruise {
            if cs.out.cruise_state.enabled && !cs_prev.cruise_state.enabled {
                events.add(EventName::PcmEnable);
            } else if !cs.out.cruise_state.enabled
                && (cc_prev.actuators.accel >= 0.0 || !self.cp.openpilot_longitudinal_control)
            {
                // The PCM can drop cruise while we are engaged. Near the
                // engage floor that is expected; above it, alert loudly.
                if v_ego < min_enable + HONDA_SPEED_TOO_LOW_MARGIN {
                    events.add(EventName::SpeedTooLow);
                } else {
                    events.add(EventName::CruiseDisabled);
                }
            }
        }

        if min_enable > 0.0 && v_ego < STANDSTILL_SPEED {
            events.add(EventName::ManualRestart);
        }
        events
    }

    pub(super) fn toyota_events(
        &mut self,
        cs: &CarStateSnapshot,
        cs_prev: &CarState,
        cc_prev: &CarControl,
    ) -> Events {
        let mut events = self.common_events(&cs.out, cs_prev, CommonEventParams::default());

        if self.cp.openpilot_longitudinal_control {
            if cs.out.cruise_state.standstill && !cs.out.brake_pressed {
                events.add(EventName::ResumeRequired);
            }
            if cs.brand.low_speed_lockout {
                events.add(EventName::LowSpeedLockout);
            }
            if cs.out.v_ego < self.cp.min_enable_speed {
                events.add(EventName::BelowEngageSpeed);
                // margin so a deliberate stop does not cancel
                if cc_prev.actuators.accel > TOYOTA_SPEED_TOO_LOW_ACCEL {
                    events.add(EventName::SpeedTooLow);
                }
                if cs.out.v_ego < STANDSTILL_SPEED {
                    events.add(EventName::ManualRestart);
                }
            }
        }
        events
    }

    pub(super) fn gm_events(&mut self, cs: &CarStateSnapshot, cs_prev: &CarState) -> Events {
        // The ECM enables on the falling edge of set, but only the rising edge of resume
        let params = CommonEventParams {
            extra_gears: &GM_EXTRA_GEARS,
            pcm_enable: self.cp.pcm_cruise,
            allow_enable: true,
            enable_buttons: &GM_ENABLE_BUTTONS,
        };
        let mut events = self.common_events(&cs.out, cs_prev, params);

        if !self.cp.pcm_cruise
            && cs
                .out
                .button_events
                .iter()
                .any(|b| b.kind == ButtonType::AccelCruise && b.pressed)
        {
            events.add(EventName::ButtonEnable);
        }

        // Engaging at a standstill with the brake held is allowed on camera harnesses
        let below_min_enable_speed =
            cs.out.v_ego < self.cp.min_enable_speed || cs.brand.moving_backward;
        let held_at_stop = cs.out.standstill
            && cs.out.brake >= GM_STANDSTILL_BRAKE
            && self.cp.network_location == NetworkLocation::FwdCamera;
        if below_min_enable_speed && !held_at_stop {
            events.add(EventName::BelowEngageSpeed);
        }
        if cs.out.cruise_state.standstill {
            events.add(EventName::ResumeRequired);
        }
        if cs.out.v_ego < self.cp.min_steer_speed {
            events.add(EventName::BelowSteerSpeed);
        }
        events
    }

    pub(super) fn volkswagen_events(
        &mut self,
        cs: &CarStateSnapshot,
        cs_prev: &CarState,
        cc_prev: &CarControl,
    ) -> Events {
        let params = CommonEventParams {
            extra_gears: &VW_EXTRA_GEARS,
            pcm_enable: !self.cp.openpilot_longitudinal_control,
            allow_enable: true,
            enable_buttons: &VW_ENABLE_BUTTONS,
        };
        let mut events = self.common_events(&cs.out, cs_prev, params);

        let v_ego = cs.out.v_ego;
        let min_steer = self.cp.min_steer_speed;
        let latched = self.state.update_low_speed_alert(
            (min_steer - 1e-3) > VW_DEFAULT_MIN_STEER_SPEED
                && v_ego < min_steer + VW_LOW_SPEED_SET,
            v_ego > min_steer + VW_LOW_SPEED_CLEAR,
            v_ego,
        );
        if latched {
            events.add(EventName::BelowSteerSpeed);
        }

        if self.cp.openpilot_longitudinal_control {
            if v_ego < self.cp.min_enable_speed + VW_BELOW_ENGAGE_MARGIN {
                events.add(EventName::BelowEngageSpeed);
            }
            if cc_prev.enabled && v_ego < self.cp.min_enable_speed {
                events.add(EventName::SpeedTooLow);
            }
        }
        events
    }

    pub(super) fn hyundai_events(&mut self, cs: &CarStateSnapshot, cs_prev: &CarState) -> Events {
        // Newer cars use CANCEL as pause/resume based on PCM state, so only a
        // deliberate button press (or the main button) may engage.
        let allow_enable = cs
            .brand
            .cruise_buttons
            .iter()
            .any(|btn| HYUNDAI_ENABLE_BUTTONS.contains(btn))
            || cs.brand.main_buttons.iter().any(|&btn| btn != 0);
        let params = CommonEventParams {
            pcm_enable: self.cp.pcm_cruise,
            allow_enable,
            ..CommonEventParams::default()
        };
        let mut events = self.common_events(&cs.out, cs_prev, params);

        let v_ego = cs.out.v_ego;
        let min_steer = self.cp.min_steer_speed;
        let latched = self.state.update_low_speed_alert(
            v_ego < min_steer + HYUNDAI_LOW_SPEED_SET && min_steer > HYUNDAI_LOW_SPEED_CUTOFF,
            v_ego > min_steer + HYUNDAI_LOW_SPEED_CLEAR,
            v_ego,
        );
        if latched {
            events.add(EventName::BelowSteerSpeed);
        }
        events
    }
}
