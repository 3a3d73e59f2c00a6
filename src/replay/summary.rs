// src/replay/summary.rs
//
// Counts for one replay run. Written to the log and optionally to disk.

use crate::events::{EventName, Events};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct ReplayMetrics {
    frames: u64,
    frames_with_events: u64,
    event_counts: BTreeMap<EventName, u64>,
    started_at: Instant,
}

impl ReplayMetrics {
    pub fn new() -> Self {
        Self {
            frames: 0,
            frames_with_events: 0,
            event_counts: BTreeMap::new(),
            started_at: Instant::now(),
        }
    }

    pub fn record(&mut self, events: &Events) {
        self.frames += 1;
        if !events.is_empty() {
            self.frames_with_events += 1;
        }
        for &name in events {
            *self.event_counts.entry(name).or_insert(0) += 1;
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn count(&self, name: EventName) -> u64 {
        self.event_counts.get(&name).copied().unwrap_or(0)
    }

    pub fn ticks_per_sec(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.001 {
            self.frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> ReplaySummary {
        ReplaySummary {
            frames: self.frames,
            frames_with_events: self.frames_with_events,
            event_counts: self.event_counts.clone(),
            ticks_per_sec: self.ticks_per_sec(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for ReplayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub frames: u64,
    pub frames_with_events: u64,
    pub event_counts: BTreeMap<EventName, u64>,
    pub ticks_per_sec: f64,
    pub elapsed_secs: f64,
}
