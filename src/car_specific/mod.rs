// src/car_specific/mod.rs
//
// Per-tick event generation for one drive.
//
// Signal flow:
//   CarStateSnapshot (now) ─┐
//   CarState (last tick)  ──┼→ common::evaluate ─→ brand rules ─→ Events
//   CarControl (last tick) ─┘          │                 │
//                                      └── HysteresisState ┘
//
// One `CarSpecificEvents` per drive; `update` must run exactly once per tick.

mod brands;
pub mod common;
pub mod hysteresis;

pub use brands::{HYUNDAI_ENABLE_BUTTONS, VW_DEFAULT_MIN_STEER_SPEED};
pub use common::{CommonEventParams, DEFAULT_ENABLE_BUTTONS};
pub use hysteresis::{HysteresisState, STEER_WARNING_SILENT_FRAMES};

use crate::error::ConfigError;
use crate::events::Events;
use crate::types::{CarControl, CarName, CarParams, CarState, CarStateSnapshot};
use tracing::info;

pub struct CarSpecificEvents {
    cp: CarParams,
    state: HysteresisState,
}

impl CarSpecificEvents {
    pub fn new(cp: CarParams) -> Self {
        info!(
            "Car events ready: {} (pcm_cruise={}, long={}, min_enable={:.2}, min_steer={:.2})",
            cp.car_name,
            cp.pcm_cruise,
            cp.openpilot_longitudinal_control,
            cp.min_enable_speed,
            cp.min_steer_speed
        );
        Self {
            cp,
            state: HysteresisState::new(),
        }
    }

    /// Build from an unvalidated family identifier, e.g. from fingerprinting.
    pub fn from_car_name(car_name: &str) -> Result<Self, ConfigError> {
        let car_name: CarName = car_name.parse()?;
        Ok(Self::new(CarParams::new(car_name)))
    }

    /// Build from externally loaded params after checking they are consistent.
    pub fn from_params(cp: CarParams) -> Result<Self, ConfigError> {
        cp.validate()?;
        Ok(Self::new(cp))
    }

    pub fn car_params(&self) -> &CarParams {
        &self.cp
    }

    pub fn hysteresis(&self) -> &HysteresisState {
        &self.state
    }

    /// Evaluate one control tick.
    pub fn update(
        &mut self,
        cs: &CarStateSnapshot,
        cs_prev: &CarState,
        cc_prev: &CarControl,
    ) -> Events {
        match self.cp.car_name {
            CarName::Tesla | CarName::Subaru => {
                self.common_events(&cs.out, cs_prev, CommonEventParams::default())
            }
            CarName::Ford => self.ford_events(cs, cs_prev),
            CarName::Nissan => self.nissan_events(cs, cs_prev),
            CarName::Mazda => self.mazda_events(cs, cs_prev),
            CarName::Chrysler => self.chrysler_events(cs, cs_prev),
            CarName::Honda => self.honda_events(cs, cs_prev, cc_prev),
            CarName::Toyota => self.toyota_events(cs, cs_prev, cc_prev),
            CarName::Gm => self.gm_events(cs, cs_prev),
            CarName::Volkswagen => self.volkswagen_events(cs, cs_prev, cc_prev),
            CarName::Hyundai => self.hyundai_events(cs, cs_prev),
            CarName::Body => Events::new(),
        }
    }

    fn common_events(
        &mut self,
        cs: &CarState,
        cs_prev: &CarState,
        params: CommonEventParams<'_>,
    ) -> Events {
        common::evaluate(&self.cp, &mut self.state, cs, cs_prev, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventName;
    use crate::types::{Actuators, ButtonEvent, ButtonType, CruiseState, GearShifter};

    fn cruising(v_ego: f32) -> CarState {
        CarState {
            v_ego,
            gear_shifter: GearShifter::Drive,
            cruise_state: CruiseState {
                available: true,
                enabled: true,
                ..CruiseState::default()
            },
            ..CarState::default()
        }
    }

    fn cruise_off(v_ego: f32) -> CarState {
        let mut cs = cruising(v_ego);
        cs.cruise_state.enabled = false;
        cs
    }

    fn snap(out: CarState) -> CarStateSnapshot {
        CarStateSnapshot::from(out)
    }

    fn tick(ev: &mut CarSpecificEvents, cs: &CarState) -> Events {
        ev.update(&snap(cs.clone()), cs, &CarControl::default())
    }

    #[test]
    fn test_unsupported_car_is_config_error() {
        let result = CarSpecificEvents::from_car_name("trabant");
        assert!(matches!(result, Err(ConfigError::UnsupportedCar(_))));
    }

    #[test]
    fn test_body_never_raises_events() {
        let mut ev = CarSpecificEvents::from_car_name("body").unwrap();
        let cs = CarState {
            door_open: true,
            steer_fault_permanent: true,
            gear_shifter: GearShifter::Reverse,
            ..CarState::default()
        };
        assert!(tick(&mut ev, &cs).is_empty());
        assert_eq!(ev.hysteresis(), &HysteresisState::new());
    }

    #[test]
    fn test_door_seatbelt_scenario_for_every_driving_family() {
        for name in CarName::ALL {
            if name == CarName::Body {
                continue;
            }
            let mut cp = CarParams::new(name);
            cp.min_enable_speed = -1.0;
            let mut ev = CarSpecificEvents::new(cp);
            let cs = CarState {
                v_ego: 0.0,
                door_open: true,
                seatbelt_unlatched: true,
                ..cruising(0.0)
            };
            let events = tick(&mut ev, &cs);
            assert_eq!(
                &events.names()[..2],
                &[EventName::DoorOpen, EventName::SeatbeltNotLatched],
                "{name}"
            );
            assert!(!events.contains(EventName::SpeedTooHigh), "{name}");
            assert!(!events.contains(EventName::SpeedTooLow), "{name}");
            assert!(!events.contains(EventName::BelowEngageSpeed), "{name}");
        }
    }

    #[test]
    fn test_pcm_enable_scenario() {
        for name in [CarName::Tesla, CarName::Toyota, CarName::Honda, CarName::Ford] {
            let mut ev = CarSpecificEvents::new(CarParams::new(name));
            let events = ev.update(
                &snap(cruising(20.0)),
                &cruise_off(20.0),
                &CarControl::default(),
            );
            assert_eq!(events.names(), &[EventName::PcmEnable], "{name}");
        }
    }

    #[test]
    fn test_chrysler_low_speed_hysteresis() {
        let mut cp = CarParams::new(CarName::Chrysler);
        cp.min_steer_speed = 3.8;
        let mut ev = CarSpecificEvents::new(cp);

        // Above the clear threshold: no latch
        assert!(!tick(&mut ev, &cruising(6.0)).contains(EventName::BelowSteerSpeed));
        // Between thresholds, coming from above: stays clear
        assert!(!tick(&mut ev, &cruising(4.5)).contains(EventName::BelowSteerSpeed));
        // Below set threshold (3.8 + 0.5): latch
        assert!(tick(&mut ev, &cruising(4.2)).contains(EventName::BelowSteerSpeed));
        // Between thresholds, coming from below: stays latched
        assert!(tick(&mut ev, &cruising(4.5)).contains(EventName::BelowSteerSpeed));
        assert!(tick(&mut ev, &cruising(4.79)).contains(EventName::BelowSteerSpeed));
        // Above clear threshold (3.8 + 1.0): release
        assert!(!tick(&mut ev, &cruising(4.81)).contains(EventName::BelowSteerSpeed));
        assert!(!ev.hysteresis().low_speed_alert);
    }

    #[test]
    fn test_chrysler_without_min_steer_speed_never_latches() {
        let mut ev = CarSpecificEvents::new(CarParams::new(CarName::Chrysler));
        assert!(!tick(&mut ev, &cruising(0.2)).contains(EventName::BelowSteerSpeed));
    }

    #[test]
    fn test_chrysler_allows_low_gear() {
        let mut ev = CarSpecificEvents::new(CarParams::new(CarName::Chrysler));
        let cs = CarState {
            gear_shifter: GearShifter::Low,
            ..cruising(10.0)
        };
        assert!(!tick(&mut ev, &cs).contains(EventName::WrongGear));
    }

    #[test]
    fn test_volkswagen_low_speed_hysteresis() {
        let mut cp = CarParams::new(CarName::Volkswagen);
        cp.min_steer_speed = 14.0;
        let mut ev = CarSpecificEvents::new(cp);

        assert!(tick(&mut ev, &cruising(14.5)).contains(EventName::BelowSteerSpeed));
        assert!(tick(&mut ev, &cruising(15.9)).contains(EventName::BelowSteerSpeed));
        assert!(!tick(&mut ev, &cruising(16.1)).contains(EventName::BelowSteerSpeed));
        assert!(!tick(&mut ev, &cruising(15.5)).contains(EventName::BelowSteerSpeed));
    }

    #[test]
    fn test_volkswagen_default_min_steer_speed_has_no_latch() {
        let mut cp = CarParams::new(CarName::Volkswagen);
        cp.min_steer_speed = VW_DEFAULT_MIN_STEER_SPEED;
        let mut ev = CarSpecificEvents::new(cp);
        assert!(!tick(&mut ev, &cruising(0.1)).contains(EventName::BelowSteerSpeed));
    }

    #[test]
    fn test_volkswagen_longitudinal_speed_checks() {
        let mut cp = CarParams::new(CarName::Volkswagen);
        cp.openpilot_longitudinal_control = true;
        cp.pcm_cruise = false;
        cp.min_enable_speed = 5.0;
        let mut ev = CarSpecificEvents::new(cp);

        let cs = cruising(4.8);
        let events = ev.update(&snap(cs.clone()), &cs, &CarControl::default());
        assert_eq!(events.names(), &[EventName::BelowEngageSpeed]);

        let engaged = CarControl {
            enabled: true,
            ..CarControl::default()
        };
        let events = ev.update(&snap(cs.clone()), &cs, &engaged);
        assert_eq!(
            events.names(),
            &[EventName::BelowEngageSpeed, EventName::SpeedTooLow]
        );
    }

    #[test]
    fn test_hyundai_low_speed_hysteresis() {
        let mut cp = CarParams::new(CarName::Hyundai);
        cp.min_steer_speed = 32.0 * 0.447;
        let min_steer = cp.min_steer_speed;
        let mut ev = CarSpecificEvents::new(cp);

        assert!(tick(&mut ev, &cruising(min_steer + 1.9)).contains(EventName::BelowSteerSpeed));
        assert!(tick(&mut ev, &cruising(min_steer + 3.9)).contains(EventName::BelowSteerSpeed));
        assert!(!tick(&mut ev, &cruising(min_steer + 4.1)).contains(EventName::BelowSteerSpeed));
        assert!(!tick(&mut ev, &cruising(min_steer + 3.0)).contains(EventName::BelowSteerSpeed));
    }

    #[test]
    fn test_hyundai_enable_requires_button_provenance() {
        let mut ev = CarSpecificEvents::new(CarParams::new(CarName::Hyundai));
        let prev = cruise_off(20.0);

        // PCM engaged on its own (e.g. CANCEL acting as resume after we cancelled)
        let events = ev.update(&snap(cruising(20.0)), &prev, &CarControl::default());
        assert!(!events.contains(EventName::PcmEnable));

        let mut cs = snap(cruising(20.0));
        cs.brand.cruise_buttons = vec![0, HYUNDAI_ENABLE_BUTTONS[1]];
        let events = ev.update(&cs, &prev, &CarControl::default());
        assert_eq!(events.names(), &[EventName::PcmEnable]);

        let mut cs = snap(cruising(20.0));
        cs.brand.main_buttons = vec![0, 1];
        let events = ev.update(&cs, &prev, &CarControl::default());
        assert_eq!(events.names(), &[EventName::PcmEnable]);
    }

    #[test]
    fn test_nissan_and_mazda_flags() {
        let mut ev = CarSpecificEvents::new(CarParams::new(CarName::Nissan));
        let mut cs = snap(cruising(20.0));
        cs.brand.lkas_enabled = true;
        let events = ev.update(&cs, &cs.out, &CarControl::default());
        assert_eq!(events.names(), &[EventName::InvalidLkasSetting]);

        let mut ev = CarSpecificEvents::new(CarParams::new(CarName::Mazda));
        let mut cs = snap(cruising(20.0));
        cs.brand.lkas_disabled = true;
        cs.brand.low_speed_alert = true;
        let events = ev.update(&cs, &cs.out, &CarControl::default());
        assert_eq!(events.names(), &[EventName::LkasDisabled]);

        cs.brand.lkas_disabled = false;
        let events = ev.update(&cs, &cs.out, &CarControl::default());
        assert_eq!(events.names(), &[EventName::BelowSteerSpeed]);
    }

    #[test]
    fn test_honda_cruise_drop_expected_vs_unexpected() {
        let mut cp = CarParams::new(CarName::Honda);
        cp.min_enable_speed = 25.0 * 0.447;
        let min_enable = cp.min_enable_speed;
        let mut ev = CarSpecificEvents::new(cp);
        let cc = CarControl::default();

        // Cruise drops just above the engage floor: quiet
        let events = ev.update(
            &snap(cruise_off(min_enable + 1.0)),
            &cruising(min_enable + 1.0),
            &cc,
        );
        assert_eq!(events.names(), &[EventName::SpeedTooLow]);

        // Cruise drops at highway speed: loud
        let events = ev.update(&snap(cruise_off(30.0)), &cruising(30.0), &cc);
        assert_eq!(events.names(), &[EventName::CruiseDisabled]);

        // Stopped below the floor
        let events = ev.update(&snap(cruise_off(0.0)), &cruise_off(0.0), &cc);
        assert_eq!(
            events.names(),
            &[
                EventName::BelowEngageSpeed,
                EventName::SpeedTooLow,
                EventName::ManualRestart
            ]
        );
    }

    #[test]
    fn test_honda_braking_suppresses_cruise_drop_with_stack_longitudinal() {
        let mut cp = CarParams::new(CarName::Honda);
        cp.openpilot_longitudinal_control = true;
        let mut ev = CarSpecificEvents::new(cp);
        let braking = CarControl {
            enabled: true,
            actuators: Actuators { accel: -1.5 },
        };
        let events = ev.update(&snap(cruise_off(30.0)), &cruising(30.0), &braking);
        assert!(events.is_empty());
    }

    #[test]
    fn test_toyota_longitudinal_low_speed() {
        let mut cp = CarParams::new(CarName::Toyota);
        cp.openpilot_longitudinal_control = true;
        cp.min_enable_speed = 19.0 * 0.447;
        let mut ev = CarSpecificEvents::new(cp);
        let cs = cruising(5.0);

        let stopping = CarControl {
            enabled: true,
            actuators: Actuators { accel: -0.5 },
        };
        let events = ev.update(&snap(cs.clone()), &cs, &stopping);
        assert_eq!(events.names(), &[EventName::BelowEngageSpeed]);

        let accelerating = CarControl {
            enabled: true,
            actuators: Actuators { accel: 0.5 },
        };
        let events = ev.update(&snap(cs.clone()), &cs, &accelerating);
        assert_eq!(
            events.names(),
            &[EventName::BelowEngageSpeed, EventName::SpeedTooLow]
        );

        // Fully stopped below the engage floor needs a manual restart
        let stopped = cruising(0.0);
        let events = ev.update(&snap(stopped.clone()), &stopped, &stopping);
        assert_eq!(
            events.names(),
            &[EventName::BelowEngageSpeed, EventName::ManualRestart]
        );
    }

    #[test]
    fn test_toyota_resume_and_lockout() {
        let mut cp = CarParams::new(CarName::Toyota);
        cp.openpilot_longitudinal_control = true;
        let mut ev = CarSpecificEvents::new(cp);
        let mut cs = snap(cruising(0.0));
        cs.out.cruise_state.standstill = true;
        cs.brand.low_speed_lockout = true;
        let events = ev.update(&cs, &cs.out, &CarControl::default());
        assert_eq!(
            events.names(),
            &[EventName::ResumeRequired, EventName::LowSpeedLockout]
        );
    }

    #[test]
    fn test_gm_buttons_and_standstill() {
        let mut cp = CarParams::new(CarName::Gm);
        cp.pcm_cruise = false;
        cp.openpilot_longitudinal_control = true;
        cp.min_enable_speed = -1.0;
        let mut ev = CarSpecificEvents::new(cp);

        // Resume enables on press, set on release
        let cs = CarState {
            button_events: vec![
                ButtonEvent::press(ButtonType::AccelCruise),
                ButtonEvent::release(ButtonType::DecelCruise),
            ],
            ..cruising(15.0)
        };
        let events = tick(&mut ev, &cs);
        assert_eq!(
            events.names(),
            &[EventName::ButtonEnable, EventName::ButtonEnable]
        );

        // Rolling backwards is below engage speed
        let mut back = snap(cruising(0.5));
        back.brand.moving_backward = true;
        let events = ev.update(&back, &back.out, &CarControl::default());
        assert_eq!(events.names(), &[EventName::BelowEngageSpeed]);

        // Cruise holding at a stop wants a resume
        let mut held = cruising(0.0);
        held.cruise_state.standstill = true;
        assert_eq!(tick(&mut ev, &held).names(), &[EventName::ResumeRequired]);
    }

    #[test]
    fn test_gm_below_steer_speed() {
        let mut cp = CarParams::new(CarName::Gm);
        cp.min_steer_speed = 3.0;
        let mut ev = CarSpecificEvents::new(cp);

        assert_eq!(
            tick(&mut ev, &cruising(2.5)).names(),
            &[EventName::BelowSteerSpeed]
        );
        assert!(tick(&mut ev, &cruising(3.0)).is_empty());
    }

    #[test]
    fn test_gm_brake_hold_exemption_on_camera_harness() {
        let mut cp = CarParams::new(CarName::Gm);
        cp.min_enable_speed = 5.0;
        let mut ev = CarSpecificEvents::new(cp.clone());
        let stopped = CarState {
            standstill: true,
            brake: 25.0,
            ..cruising(0.0)
        };
        assert!(!tick(&mut ev, &stopped).contains(EventName::BelowEngageSpeed));

        cp.network_location = crate::types::NetworkLocation::Gateway;
        let mut ev = CarSpecificEvents::new(cp);
        assert!(tick(&mut ev, &stopped).contains(EventName::BelowEngageSpeed));
    }

    #[test]
    fn test_gm_allows_sport_gear() {
        let mut ev = CarSpecificEvents::new(CarParams::new(CarName::Gm));
        let cs = CarState {
            gear_shifter: GearShifter::Sport,
            ..cruising(20.0)
        };
        assert!(!tick(&mut ev, &cs).contains(EventName::WrongGear));
    }

    #[test]
    fn test_held_fault_stays_silent_once_reported_silently() {
        let mut ev = CarSpecificEvents::new(CarParams::new(CarName::Subaru));
        let faulted = CarState {
            steer_fault_temporary: true,
            ..cruising(20.0)
        };

        // Fault from the first tick of the drive: initial silent latch applies
        for _ in 0..(STEER_WARNING_SILENT_FRAMES * 2) {
            let events = tick(&mut ev, &faulted);
            assert_eq!(events.names(), &[EventName::SteerTempUnavailableSilent]);
        }

        // Fault clears and returns long after the window: loud
        let healthy = cruising(20.0);
        tick(&mut ev, &healthy);
        let events = ev.update(&snap(faulted.clone()), &healthy, &CarControl::default());
        assert_eq!(events.names(), &[EventName::SteerTempUnavailable]);
    }

    #[test]
    fn test_update_is_deterministic_for_same_state() {
        let mut cp = CarParams::new(CarName::Chrysler);
        cp.min_steer_speed = 3.8;
        let ev = CarSpecificEvents::new(cp);
        let cs = CarState {
            steer_fault_temporary: true,
            door_open: true,
            ..cruising(4.0)
        };

        let mut a = CarSpecificEvents {
            cp: ev.cp.clone(),
            state: ev.state.clone(),
        };
        let mut b = CarSpecificEvents {
            cp: ev.cp.clone(),
            state: ev.state.clone(),
        };
        assert_eq!(tick(&mut a, &cs), tick(&mut b, &cs));
        assert_eq!(a.hysteresis(), b.hysteresis());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use proptest::sample::select;

        const GEARS: [GearShifter; 10] = [
            GearShifter::Unknown,
            GearShifter::Park,
            GearShifter::Drive,
            GearShifter::Neutral,
            GearShifter::Reverse,
            GearShifter::Sport,
            GearShifter::Low,
            GearShifter::Brake,
            GearShifter::Eco,
            GearShifter::Manumatic,
        ];

        fn tolerated_gears(name: CarName) -> &'static [GearShifter] {
            match name {
                CarName::Ford => &[GearShifter::Manumatic],
                CarName::Nissan => &[GearShifter::Brake],
                CarName::Chrysler => &[GearShifter::Low],
                CarName::Gm => &[
                    GearShifter::Sport,
                    GearShifter::Low,
                    GearShifter::Eco,
                    GearShifter::Manumatic,
                ],
                CarName::Volkswagen => {
                    &[GearShifter::Eco, GearShifter::Sport, GearShifter::Manumatic]
                }
                _ => &[],
            }
        }

        fn driving_families() -> Vec<CarName> {
            CarName::ALL
                .into_iter()
                .filter(|name| *name != CarName::Body)
                .collect()
        }

        proptest! {
            /// wrongGear is raised exactly for gears outside drive and the family's extras
            #[test]
            fn prop_wrong_gear_invariant(
                name in select(driving_families()),
                gear in select(GEARS.to_vec()),
                v_ego in 0.0f32..40.0f32,
            ) {
                let mut ev = CarSpecificEvents::new(CarParams::new(name));
                let cs = CarState { gear_shifter: gear, ..cruising(v_ego) };
                let events = tick(&mut ev, &cs);

                let expected = gear != GearShifter::Drive && !tolerated_gears(name).contains(&gear);
                prop_assert_eq!(events.contains(EventName::WrongGear), expected);
            }

            /// pcmEnable only on a false -> true transition
            #[test]
            fn prop_pcm_enable_only_on_rising_edge(
                name in select(vec![CarName::Tesla, CarName::Subaru, CarName::Toyota, CarName::Honda]),
                was_enabled in any::<bool>(),
                is_enabled in any::<bool>(),
            ) {
                let mut ev = CarSpecificEvents::new(CarParams::new(name));
                let mut prev = cruising(20.0);
                prev.cruise_state.enabled = was_enabled;
                let mut cs = cruising(20.0);
                cs.cruise_state.enabled = is_enabled;

                let events = ev.update(&snap(cs), &prev, &CarControl::default());
                prop_assert_eq!(
                    events.contains(EventName::PcmEnable),
                    is_enabled && !was_enabled
                );
            }

            /// Same inputs and same hysteresis state give the same events and next state
            #[test]
            fn prop_update_is_deterministic(
                name in select(CarName::ALL.to_vec()),
                v_ego in 0.0f32..45.0f32,
                steering_pressed in any::<bool>(),
                steer_fault_temporary in any::<bool>(),
                prev_fault in any::<bool>(),
                cruise_enabled in any::<bool>(),
                accel in -3.0f32..2.0f32,
                warmup in 0u32..200,
            ) {
                let mut cp = CarParams::new(name);
                cp.min_steer_speed = 12.0;
                cp.min_enable_speed = 5.0;
                let mut a = CarSpecificEvents::new(cp);

                let healthy = cruising(v_ego);
                for _ in 0..warmup {
                    tick(&mut a, &healthy);
                }
                let mut b = CarSpecificEvents {
                    cp: a.cp.clone(),
                    state: a.state.clone(),
                };

                let mut cs = cruising(v_ego);
                cs.steering_pressed = steering_pressed;
                cs.steer_fault_temporary = steer_fault_temporary;
                cs.cruise_state.enabled = cruise_enabled;
                let mut prev = cruising(v_ego);
                prev.steer_fault_temporary = prev_fault;
                let cc = CarControl { enabled: true, actuators: Actuators { accel } };

                let events_a = a.update(&snap(cs.clone()), &prev, &cc);
                let events_b = b.update(&snap(cs), &prev, &cc);
                prop_assert_eq!(events_a, events_b);
                prop_assert_eq!(a.hysteresis(), b.hysteresis());
            }
        }
    }
}
