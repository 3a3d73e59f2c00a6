// src/car_specific/hysteresis.rs

use crate::types::DT_CTRL;
use tracing::debug;

/// Seconds after the driver lets go of the wheel during which a temporary
/// steering fault only raises the silent alert.
pub const STEER_WARNING_SILENT_S: f64 = 1.5;
pub const STEER_WARNING_SILENT_FRAMES: u32 = (STEER_WARNING_SILENT_S / DT_CTRL) as u32;

/// Cycle-to-cycle memory of one drive. Lives inside a single
/// `CarSpecificEvents` and is only touched by its `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HysteresisState {
    /// Ticks since the driver last pressed the wheel
    pub steering_unpressed: u32,
    /// Below-steer-speed latch
    pub low_speed_alert: bool,
    /// Driver is overriding through a temporary fault, alert suppressed
    pub no_steer_warning: bool,
    /// Current temporary fault is being reported silently
    pub silent_steer_warning: bool,
}

impl Default for HysteresisState {
    fn default() -> Self {
        Self {
            steering_unpressed: 0,
            low_speed_alert: false,
            no_steer_warning: false,
            silent_steer_warning: true,
        }
    }
}

impl HysteresisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two-threshold latch: `set` wins, otherwise `clear` releases it,
    /// otherwise the previous value holds.
    pub fn update_low_speed_alert(&mut self, set: bool, clear: bool, v_ego: f32) -> bool {
        let previous = self.low_speed_alert;
        if set {
            self.low_speed_alert = true;
        } else if clear {
            self.low_speed_alert = false;
        }

        if self.low_speed_alert != previous {
            debug!(
                "Low speed alert {} at {:.2} m/s",
                if self.low_speed_alert { "latched" } else { "released" },
                v_ego
            );
        }
        self.low_speed_alert
    }

    pub fn count_steering(&mut self, steering_pressed: bool) {
        self.steering_unpressed = if steering_pressed {
            0
        } else {
            self.steering_unpressed.saturating_add(1)
        };
    }

    pub fn recently_overridden(&self) -> bool {
        self.steering_unpressed < STEER_WARNING_SILENT_FRAMES
    }
}
