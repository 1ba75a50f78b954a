// ipsa-kernel: everything the demo firmware needs that is not tied to
// the chip, so it builds and tests on the host.
// task:     fixed table of periodic tasks (name, tier, period, budget)
// workload: the four job bodies and the report line each one emits
// analysis: hyperperiod, arrangement replay, waiting-cost ranking
// stats:    per-task run counters the firmware reports on

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod analysis;
pub mod stats;
pub mod task;
pub mod workload;

pub use task::{Priority, TASK_COUNT, TASKS, TaskId, TaskSpec};
pub use stats::RunStats;
pub use workload::Report;
