// src/lib.rs
//
// Car-specific event generation for the control loop.
//
// Signal flow (one call per 10 ms control tick):
//   CAN parser → CarStateSnapshot ─┐
//   previous tick's CarState ──────┼→ CarSpecificEvents::update → Events → alert arbitration
//   previous tick's CarControl ────┘
//
// The replay module drives the same entry point from a logged drive.

pub mod car_specific;
pub mod config;
pub mod error;
pub mod events;
pub mod replay;
pub mod types;

pub use car_specific::{CarSpecificEvents, CommonEventParams, HysteresisState};
pub use error::ConfigError;
pub use events::{EventName, Events};
pub use replay::{FrameEvents, ReplayFrame, ReplayRunner, ReplaySummary};
pub use types::{
    Actuators, BrandSignals, ButtonEvent, ButtonType, CarControl, CarName, CarParams, CarState,
    CarStateSnapshot, Config, CruiseState, GearShifter, NetworkLocation,
};
