use std::collections::HashMap;

use chrono::{DateTime, Duration, Local};

use crate::models::{format_time, parse_mmss, Exercise};

/// Which counter of an exercise an inline edit targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeField {
    Elapsed,
    Lap,
}

/// Transient state of an in-progress inline time edit.
#[derive(Clone, Debug)]
pub struct PendingEdit {
    pub exercise: String,
    pub field: TimeField,
    pub text: String,
}

/// One live stopwatch. Holding an entry in the controller's map is what
/// makes an exercise "running"; dropping it stops the ticks.
#[derive(Debug)]
struct RunningTimer {
    last_tick: DateTime<Local>,
}

/// Drives the per-exercise stopwatches and owns the inline-edit state.
///
/// Invariant: at most one `RunningTimer` per exercise name, and at most
/// one pending edit overall.
pub struct TimerController {
    running: HashMap<String, RunningTimer>,
    edit: Option<PendingEdit>,
}

impl TimerController {
    pub fn new() -> Self {
        TimerController {
            running: HashMap::new(),
            edit: None,
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains_key(name)
    }

    pub fn any_running(&self) -> bool {
        !self.running.is_empty()
    }

    /// Starts the named exercise's stopwatch if it is stopped, stops it
    /// (freezing both counters) if it is running. An edit pending on the
    /// same exercise is committed first.
    pub fn toggle(&mut self, exercises: &mut [Exercise], name: &str, now: DateTime<Local>) {
        if self.edit.as_ref().is_some_and(|e| e.exercise == name) {
            self.commit_edit(exercises);
        }
        if self.running.remove(name).is_none() {
            self.running
                .insert(name.to_string(), RunningTimer { last_tick: now });
        }
    }

    /// Credits every running exercise with the whole seconds elapsed since
    /// its last tick. Fractional remainders carry over to the next call, so
    /// counters advance by exactly one per wall-clock second no matter how
    /// often the frame loop calls this.
    pub fn advance(&mut self, exercises: &mut [Exercise], now: DateTime<Local>) {
        for (name, timer) in self.running.iter_mut() {
            let whole = (now - timer.last_tick).num_seconds();
            if whole < 1 {
                continue;
            }
            if let Some(exercise) = exercises.iter_mut().find(|e| &e.name == name) {
                exercise.elapsed_seconds += whole as u32;
                exercise.lap_seconds += whole as u32;
            }
            timer.last_tick += Duration::seconds(whole);
        }
    }

    /// Zeroes the lap counter only; elapsed time and run state are
    /// untouched. Harmless on a stopped exercise.
    pub fn lap(&self, exercises: &mut [Exercise], name: &str) {
        if let Some(exercise) = exercises.iter_mut().find(|e| e.name == name) {
            exercise.lap_seconds = 0;
        }
    }

    pub fn editing(&self) -> Option<&PendingEdit> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut PendingEdit> {
        self.edit.as_mut()
    }

    /// Opens an inline edit on one time field, capturing its current value
    /// as mm:ss text. Any edit already pending is committed first.
    pub fn start_edit(&mut self, exercises: &mut [Exercise], name: &str, field: TimeField) {
        self.commit_edit(exercises);
        let Some(exercise) = exercises.iter().find(|e| e.name == name) else {
            return;
        };
        let current = match field {
            TimeField::Elapsed => exercise.elapsed_seconds,
            TimeField::Lap => exercise.lap_seconds,
        };
        self.edit = Some(PendingEdit {
            exercise: name.to_string(),
            field,
            text: format_time(current),
        });
    }

    /// Applies the pending edit if its text parses as mm:ss; malformed
    /// text is dropped and the counter keeps its prior value.
    pub fn commit_edit(&mut self, exercises: &mut [Exercise]) {
        let Some(edit) = self.edit.take() else {
            return;
        };
        let Some(total) = parse_mmss(&edit.text) else {
            return;
        };
        if let Some(exercise) = exercises.iter_mut().find(|e| e.name == edit.exercise) {
            match edit.field {
                TimeField::Elapsed => exercise.elapsed_seconds = total,
                TimeField::Lap => exercise.lap_seconds = total,
            }
        }
    }

    /// Ends the session round: commits any pending edit, cancels every
    /// stopwatch before the snapshot is taken, then zeroes all counters
    /// while keeping the entered weights. Returns the snapshot.
    pub fn submit_all(&mut self, exercises: &mut [Exercise]) -> Vec<Exercise> {
        self.commit_edit(exercises);
        self.running.clear();
        let snapshot = exercises.to_vec();
        for exercise in exercises.iter_mut() {
            exercise.elapsed_seconds = 0;
            exercise.lap_seconds = 0;
        }
        snapshot
    }
}

impl Default for TimerController {
    fn default() -> Self {
        Self::new()
    }
}
