//! Micro-worldtest harness for deterministic, tick-based tests.
//!
//! A micro-worldtest is intentionally small: it steps a tiny simulation for a
//! fixed number of ticks and captures selected state each tick. The resulting
//! frame report serializes canonically, so two identical runs can be compared
//! byte-for-byte.

use crate::snapshot::canonical_json;
use anyhow::Result;
use embercraft_core::SimTick;
use serde::Serialize;

/// Single frame captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Full report of a micro-worldtest run.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Human-readable run name.
    pub name: String,
    /// One frame per tick, plus the initial frame at tick 0.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

impl<S: Serialize> MicroWorldtestReport<S> {
    /// Canonical JSON form of the report.
    pub fn to_canonical_json(&self) -> Result<String> {
        canonical_json(self)
    }
}

/// Step a simulation `ticks` times, capturing a snapshot before the first
/// step and after each one (so the report holds `ticks + 1` frames).
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    name: &str,
    ticks: u64,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> MicroWorldtestReport<Snapshot>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(ticks as usize + 1);

    let mut tick = SimTick::ZERO;
    frames.push(MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        frames.push(MicroWorldtestFrame {
            tick: tick.0,
            snapshot: snapshot(tick, &state),
        });
    }

    MicroWorldtestReport {
        name: name.to_string(),
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_initial_and_per_tick_frames() {
        let report = run_micro_worldtest(
            "counter",
            3,
            0u32,
            |_, state| *state += 1,
            |_, state| *state,
        );
        assert_eq!(report.frames.len(), 4);
        assert_eq!(report.frames[0].snapshot, 0);
        assert_eq!(report.frames[3].snapshot, 3);
        assert_eq!(report.frames[3].tick, 3);
    }
}
