// src/replay/mod.rs
//
// Feeds a logged drive through `CarSpecificEvents`, one line per tick.
// Every frame is evaluated exactly once and in order; a bad line stops the
// run instead of being skipped, since a missing tick would corrupt edge
// detection and the steering-fault debounce.

pub mod frame;
pub mod summary;

pub use frame::{FrameEvents, ReplayFrame};
pub use summary::{ReplayMetrics, ReplaySummary};

use crate::car_specific::CarSpecificEvents;
use crate::types::{CarControl, CarState};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

pub struct ReplayRunner {
    car_events: CarSpecificEvents,
    prev_state: CarState,
    prev_control: CarControl,
    frame_id: u64,
    metrics: ReplayMetrics,
}

impl ReplayRunner {
    pub fn new(car_events: CarSpecificEvents) -> Self {
        Self {
            car_events,
            prev_state: CarState::default(),
            prev_control: CarControl::default(),
            frame_id: 0,
            metrics: ReplayMetrics::new(),
        }
    }

    /// Evaluate one tick and roll it into the previous-tick slots.
    pub fn step(&mut self, frame: ReplayFrame) -> FrameEvents {
        let events = self
            .car_events
            .update(&frame.car_state, &self.prev_state, &self.prev_control);

        self.metrics.record(&events);
        if !events.is_empty() {
            debug!("Frame {}: {:?}", self.frame_id, events.names());
        }

        let result = FrameEvents {
            frame_id: self.frame_id,
            events,
        };

        self.prev_state = frame.car_state.out;
        self.prev_control = frame.car_control;
        self.frame_id += 1;
        result
    }

    /// Replay JSON lines from `reader`, handing each result to `on_frame`.
    pub fn run<R, F>(&mut self, reader: R, mut on_frame: F) -> Result<ReplaySummary>
    where
        R: BufRead,
        F: FnMut(&FrameEvents) -> Result<()>,
    {
        info!(
            "Replaying drive for {}",
            self.car_events.car_params().car_name
        );

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("reading replay line {line_no}"))?;
            if line.trim().is_empty() {
                continue;
            }

            let frame: ReplayFrame = serde_json::from_str(&line)
                .with_context(|| format!("malformed replay frame on line {line_no}"))?;
            let result = self.step(frame);
            on_frame(&result)?;
        }

        let summary = self.metrics.summary();
        if summary.frames == 0 {
            warn!("Replay log contained no frames");
        }
        info!(
            "Replay done: {} frames, {} with events ({:.0} ticks/s)",
            summary.frames, summary.frames_with_events, summary.ticks_per_sec
        );
        Ok(summary)
    }

    /// Replay into `out` as JSON lines, one `FrameEvents` object per line.
    /// Nothing else is written to `out`.
    pub fn run_to_writer<R, W>(
        &mut self,
        reader: R,
        out: &mut W,
        emit_empty_frames: bool,
    ) -> Result<ReplaySummary>
    where
        R: BufRead,
        W: Write,
    {
        let summary = self.run(reader, |result| {
            if emit_empty_frames || !result.events.is_empty() {
                serde_json::to_writer(&mut *out, result)?;
                writeln!(out)?;
            }
            Ok(())
        })?;
        out.flush()?;
        Ok(summary)
    }

    pub fn metrics(&self) -> &ReplayMetrics {
        &self.metrics
    }
}
