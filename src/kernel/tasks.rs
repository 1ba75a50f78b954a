// Embassy spawned tasks: the four periodic jobs
//
// One task body serves every table entry. The executor it is spawned
// on decides its tier: the interrupt executor preempts the thread
// executor, so high-tier jobs never wait behind low-tier ones.
//
// Each iteration runs the job, hands the report to the console through
// REPORTS, then sleeps for the task's period. The sleep is relative to
// the end of the iteration, not an absolute release grid.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use ipsa_kernel::task::{TASK_COUNT, TaskSpec};
use ipsa_kernel::workload::Report;

use super::stats;

/// Capacity of the report channel.
///
/// Worst case every task lands one report before the console drains,
/// so twice the task count leaves headroom for a slow UART flush.
pub const REPORT_CHANNEL_CAP: usize = 2 * TASK_COUNT;

/// Reports travelling from job tasks to the console. Producers use
/// `try_send` only: a high-tier job must never block on the
/// low-tier consumer.
pub static REPORTS: Channel<CriticalSectionRawMutex, Report, REPORT_CHANNEL_CAP> =
    Channel::new();

/// Periodic job loop for one [`TaskSpec`].
///
/// Spawned once per table entry, from the spawner matching the
/// entry's priority.
#[embassy_executor::task(pool_size = 4)]
pub async fn periodic_task(spec: &'static TaskSpec) -> ! {
    let period = Duration::from_millis(u64::from(spec.period_ms));

    loop {
        let report = spec.id.run();
        stats::record_run(spec.id);

        // channel full: the console is behind, count it and move on
        if REPORTS.try_send(report).is_err() {
            stats::record_drop();
        }

        Timer::after(period).await;
    }
}
