// src/types.rs

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONTROL LOOP CONSTANTS
// ============================================================================

/// Control loop period in seconds (100 Hz).
pub const DT_CTRL: f64 = 0.01;

pub const KPH_TO_MS: f64 = 1.0 / 3.6;

/// Highest set speed the cruise UI allows, km/h.
pub const V_CRUISE_MAX: f64 = 145.0;

/// Above this speed (m/s) the stack refuses to control the car.
pub const MAX_CTRL_SPEED: f64 = (V_CRUISE_MAX + 4.0) * KPH_TO_MS;

// ============================================================================
// APPLICATION CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub car: CarParams,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Print frames that raised no events as well
    #[serde(default)]
    pub emit_empty_frames: bool,
    /// Write the run summary as JSON to this path
    #[serde(default)]
    pub summary_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// VEHICLE CONFIGURATION
// ============================================================================

/// Vehicle family. Every variant has exactly one rule set in the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CarName {
    Tesla,
    Subaru,
    Ford,
    Nissan,
    Mazda,
    Chrysler,
    Honda,
    Toyota,
    Gm,
    Volkswagen,
    Hyundai,
    /// comma body, a robotics platform with no driving controls
    Body,
}

impl CarName {
    pub const ALL: [CarName; 12] = [
        CarName::Tesla,
        CarName::Subaru,
        CarName::Ford,
        CarName::Nissan,
        CarName::Mazda,
        CarName::Chrysler,
        CarName::Honda,
        CarName::Toyota,
        CarName::Gm,
        CarName::Volkswagen,
        CarName::Hyundai,
        CarName::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarName::Tesla => "tesla",
            CarName::Subaru => "subaru",
            CarName::Ford => "ford",
            CarName::Nissan => "nissan",
            CarName::Mazda => "mazda",
            CarName::Chrysler => "chrysler",
            CarName::Honda => "honda",
            CarName::Toyota => "toyota",
            CarName::Gm => "gm",
            CarName::Volkswagen => "volkswagen",
            CarName::Hyundai => "hyundai",
            CarName::Body => "body",
        }
    }
}

impl fmt::Display for CarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CarName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedCar(s.to_string()))
    }
}

impl TryFrom<String> for CarName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where the panda/harness sits on the car's CAN network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkLocation {
    #[default]
    FwdCamera,
    Gateway,
}

/// Per-drive vehicle profile. Read-only while events are evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarParams {
    pub car_name: CarName,
    #[serde(default)]
    pub car_fingerprint: String,
    /// Non-car robotics platform
    #[serde(default)]
    pub not_car: bool,

    /// Stack engagement follows the PCM's cruise state
    #[serde(default = "default_pcm_cruise")]
    pub pcm_cruise: bool,
    /// Stack commands longitudinal acceleration itself
    #[serde(default)]
    pub openpilot_longitudinal_control: bool,

    /// m/s, negative when the car can engage at any speed
    #[serde(default = "default_min_enable_speed")]
    pub min_enable_speed: f32,
    /// m/s
    #[serde(default)]
    pub min_steer_speed: f32,

    #[serde(default)]
    pub network_location: NetworkLocation,
}

fn default_pcm_cruise() -> bool {
    true
}

fn default_min_enable_speed() -> f32 {
    -1.0
}

impl CarParams {
    pub fn new(car_name: CarName) -> Self {
        Self {
            car_name,
            car_fingerprint: String::new(),
            not_car: car_name == CarName::Body,
            pcm_cruise: default_pcm_cruise(),
            openpilot_longitudinal_control: false,
            min_enable_speed: default_min_enable_speed(),
            min_steer_speed: 0.0,
            network_location: NetworkLocation::FwdCamera,
        }
    }

    /// Load-time consistency checks. Never called per tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.not_car && self.car_name != CarName::Body {
            return Err(ConfigError::InvalidParams(format!(
                "not_car set for driving platform {}",
                self.car_name
            )));
        }
        if self.min_enable_speed.is_nan() || self.min_steer_speed.is_nan() {
            return Err(ConfigError::InvalidParams(format!(
                "speed thresholds for {} must be numbers",
                self.car_name
            )));
        }
        Ok(())
    }
}

// ============================================================================
// VEHICLE STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GearShifter {
    #[default]
    Unknown,
    Park,
    Drive,
    Neutral,
    Reverse,
    Sport,
    Low,
    Brake,
    Eco,
    Manumatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonType {
    #[default]
    Unknown,
    LeftBlinker,
    RightBlinker,
    AccelCruise,
    DecelCruise,
    Cancel,
    AltButton1,
    AltButton2,
    AltButton3,
    SetCruise,
    ResumeCruise,
    GapAdjustCruise,
}

/// A button press or release seen since the previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonEvent {
    #[serde(rename = "type")]
    pub kind: ButtonType,
    pub pressed: bool,
}

impl ButtonEvent {
    pub fn press(kind: ButtonType) -> Self {
        Self {
            kind,
            pressed: true,
        }
    }

    pub fn release(kind: ButtonType) -> Self {
        Self {
            kind,
            pressed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CruiseState {
    pub enabled: bool,
    pub available: bool,
    pub standstill: bool,
    pub non_adaptive: bool,
    /// m/s
    pub speed: f32,
}

/// Brand-independent decoded vehicle state for one control tick
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarState {
    /// m/s
    pub v_ego: f32,
    pub standstill: bool,
    pub gear_shifter: GearShifter,

    pub door_open: bool,
    pub seatbelt_unlatched: bool,

    pub brake_pressed: bool,
    /// Brake pressure as reported by the car, brand units
    pub brake: f32,
    pub gas_pressed: bool,
    pub parking_brake: bool,
    pub brake_hold_active: bool,

    pub esp_disabled: bool,
    pub esp_active: bool,
    pub stock_fcw: bool,
    pub stock_aeb: bool,
    pub acc_faulted: bool,
    pub vehicle_sensors_invalid: bool,

    pub cruise_state: CruiseState,
    pub button_events: Vec<ButtonEvent>,

    pub steering_pressed: bool,
    pub steer_fault_temporary: bool,
    pub steer_fault_permanent: bool,
}

/// Signals only some brand interfaces decode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandSignals {
    /// Nissan: stock LKAS switched on
    pub lkas_enabled: bool,
    /// Mazda: LKAS disabled in the car settings
    pub lkas_disabled: bool,
    /// Mazda: below-steer-speed alert computed by the interface
    pub low_speed_alert: bool,
    /// Toyota: cruise locked out at low speed
    pub low_speed_lockout: bool,
    /// GM
    pub moving_backward: bool,
    /// Hyundai: raw cruise button codes received since the last tick
    pub cruise_buttons: Vec<i32>,
    /// Hyundai: main button state samples
    pub main_buttons: Vec<i32>,
}

/// Current-tick input: the public car state plus brand-specific signals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarStateSnapshot {
    pub out: CarState,
    #[serde(flatten)]
    pub brand: BrandSignals,
}

impl From<CarState> for CarStateSnapshot {
    fn from(out: CarState) -> Self {
        Self {
            out,
            brand: BrandSignals::default(),
        }
    }
}

// ============================================================================
// ACTUATOR OUTPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Actuators {
    /// m/s^2
    pub accel: f32,
}

/// Control command sent on the previous tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarControl {
    pub enabled: bool,
    pub actuators: Actuators,
}
