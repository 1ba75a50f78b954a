// Per-task run bookkeeping
// Plain data: the firmware keeps one copy behind a critical section
// and snapshots it for the console.
use core::fmt;

use crate::task::{TASK_COUNT, TaskId, spec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    pub runs: [u32; TASK_COUNT],
    /// reports that found the console channel full
    pub dropped: u32,
}

impl RunStats {
    pub const fn new() -> Self {
        Self {
            runs: [0; TASK_COUNT],
            dropped: 0,
        }
    }

    pub fn record_run(&mut self, id: TaskId) {
        let slot = &mut self.runs[id.index()];
        *slot = slot.wrapping_add(1);
    }

    pub fn record_drop(&mut self) {
        self.dropped = self.dropped.wrapping_add(1);
    }

    #[inline]
    pub fn runs_of(&self, id: TaskId) -> u32 {
        self.runs[id.index()]
    }

    pub fn total(&self) -> u32 {
        self.runs.iter().fold(0u32, |acc, r| acc.wrapping_add(*r))
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in TaskId::ALL {
            write!(f, "{}={} ", spec(id).name, self.runs_of(id))?;
        }
        write!(f, "dropped={}", self.dropped)
    }
}
