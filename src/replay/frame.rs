// src/replay/frame.rs
//
// One logged control tick in, the events it raised out.

use crate::events::Events;
use crate::types::{CarControl, CarStateSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub car_state: CarStateSnapshot,
    /// Command sent on this tick; becomes `cc_prev` for the next one
    #[serde(default)]
    pub car_control: CarControl,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameEvents {
    pub frame_id: u64,
    pub events: Events,
}
