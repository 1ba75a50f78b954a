// Run bookkeeping shared between the two executors
//
// Both tiers bump these from task context. Critical section guards
// riscv32imc (no atomic RMW); the interrupt executor can preempt the
// thread executor mid-update otherwise.

use core::cell::Cell;

use critical_section::Mutex;
use ipsa_kernel::stats::RunStats;
use ipsa_kernel::task::TaskId;

static STATS: Mutex<Cell<RunStats>> = Mutex::new(Cell::new(RunStats::new()));

fn update(f: impl FnOnce(&mut RunStats)) {
    critical_section::with(|cs| {
        let cell = STATS.borrow(cs);
        let mut stats = cell.get();
        f(&mut stats);
        cell.set(stats);
    });
}

pub fn record_run(id: TaskId) {
    update(|s| s.record_run(id));
}

pub fn record_drop() {
    update(|s| s.record_drop());
}

pub fn snapshot() -> RunStats {
    critical_section::with(|cs| STATS.borrow(cs).get())
}
