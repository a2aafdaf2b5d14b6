use std::cell::Cell;

use chrono::{DateTime, Datelike, Local, Timelike};

use crate::store::{State, Store};

/// Elapsed wall-clock time above which a tick is treated as following a
/// suspend/resume rather than the regular 1 s cadence.
const GAP_SECS: i64 = 2;

// ---------------------------------------------------------------------------
// Clock state
// ---------------------------------------------------------------------------

/// The shared clock's published state. Fields are optional because they fill
/// in tier by tier; `now` carries the full sample for subscribers that need
/// calendar math rather than a single unit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockState {
    pub second: Option<u32>,
    pub minute: Option<u32>,
    pub hour: Option<u32>,
    pub day: Option<u32>,
    pub timestamp: Option<i64>,
    pub now: Option<DateTime<Local>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockPatch {
    pub second: Option<u32>,
    pub minute: Option<u32>,
    pub hour: Option<u32>,
    pub day: Option<u32>,
    pub timestamp: Option<i64>,
    pub now: Option<DateTime<Local>>,
}

impl State for ClockState {
    type Patch = ClockPatch;

    fn apply(&mut self, patch: ClockPatch) -> Vec<String> {
        let mut touched = Vec::new();
        if let Some(v) = patch.second {
            self.second = Some(v);
            touched.push("second".to_string());
        }
        if let Some(v) = patch.minute {
            self.minute = Some(v);
            touched.push("minute".to_string());
        }
        if let Some(v) = patch.hour {
            self.hour = Some(v);
            touched.push("hour".to_string());
        }
        if let Some(v) = patch.day {
            self.day = Some(v);
            touched.push("day".to_string());
        }
        if let Some(v) = patch.timestamp {
            self.timestamp = Some(v);
            touched.push("timestamp".to_string());
        }
        if patch.now.is_some() {
            self.now = patch.now;
        }
        touched
    }
}

// ---------------------------------------------------------------------------
// Tier computation
// ---------------------------------------------------------------------------

/// Computes the partial update one tick publishes.
///
/// With no previous sample (cold start) the full tuple is emitted. After
/// that, `second` and `timestamp` are always present; `minute` only when the
/// second wrapped to 0 or a gap was detected; `hour` only when `minute` is
/// emitted and the minute wrapped (or gap); `day` likewise above `hour`. A
/// gap therefore republishes every tier, which is how subscribers catch up
/// after a system sleep.
pub fn tick_patch(prev: Option<DateTime<Local>>, now: DateTime<Local>) -> ClockPatch {
    let mut patch = ClockPatch {
        second: Some(now.second()),
        timestamp: Some(now.timestamp()),
        now: Some(now),
        ..Default::default()
    };

    let gap = match prev {
        // Cold start publishes everything unconditionally.
        None => {
            patch.minute = Some(now.minute());
            patch.hour = Some(now.hour());
            patch.day = Some(now.day());
            return patch;
        }
        Some(prev) => (now - prev).num_seconds() > GAP_SECS,
    };

    if now.second() == 0 || gap {
        patch.minute = Some(now.minute());
        if now.minute() == 0 || gap {
            patch.hour = Some(now.hour());
            if now.hour() == 0 || gap {
                patch.day = Some(now.day());
            }
        }
    }
    patch
}

// ---------------------------------------------------------------------------
// Clock — the single process-wide tick source
// ---------------------------------------------------------------------------

/// Samples wall-clock time once per second (driven externally by the app's
/// tick event) and publishes tiered updates into a resettable [`Store`].
pub struct Clock {
    store: Store<ClockState>,
    last: Cell<Option<DateTime<Local>>>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            store: Store::resettable(ClockState::default()),
            last: Cell::new(None),
        }
    }

    /// The store widgets subscribe to (`"second"`, `"minute"`, `"hour"`,
    /// `"day"`, `"timestamp"`, or `""`).
    pub fn store(&self) -> Store<ClockState> {
        self.store.clone()
    }

    /// Publishes the first full sample. Idempotent with respect to state but
    /// intended to be called once per activation.
    pub fn activate(&self, now: DateTime<Local>) {
        self.last.set(None);
        self.tick(now);
    }

    pub fn tick(&self, now: DateTime<Local>) {
        let patch = tick_patch(self.last.get(), now);
        self.last.set(Some(now));
        self.store.update(patch);
    }

    /// Stops publishing and wipes every clock subscription. Subscribers must
    /// re-subscribe after the next [`activate`](Clock::activate).
    pub fn deactivate(&self) {
        self.last.set(None);
        self.store.reset();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
