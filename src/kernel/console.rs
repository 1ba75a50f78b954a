// Console: the single writer of job output
//
// Runs on the thread executor after boot. Report lines are written as
// they arrive; every STATS_INTERVAL_SECS an uptime and run-count
// summary is interleaved.

use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Ticker};
use log::info;

use super::stats;
use super::tasks::REPORTS;

pub const STATS_INTERVAL_SECS: u64 = 10;

pub async fn run() -> ! {
    let mut stats_ticker = Ticker::every(Duration::from_secs(STATS_INTERVAL_SECS));

    loop {
        match select(REPORTS.receive(), stats_ticker.next()).await {
            Either::First(report) => {
                info!("{}", report);
            }
            Either::Second(()) => {
                let snap = stats::snapshot();
                info!(
                    "stats: uptime {}s, {} runs ({})",
                    Instant::now().as_secs(),
                    snap.total(),
                    snap
                );
            }
        }
    }
}
