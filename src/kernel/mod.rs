// Firmware side of the demo: job tasks, console, run bookkeeping.
// Scheduling itself belongs to esp-rtos; nothing here dispatches.
//
// tasks:   periodic_task body and the REPORTS channel
// console: drains REPORTS, logs periodic stats
// stats:   shared RunStats behind a critical section

pub mod console;
pub mod stats;
pub mod tasks;

pub use tasks::{REPORTS, periodic_task};
