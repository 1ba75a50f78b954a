// ipsa-sched entry point
//
// Boot sequence: logger -> HAL -> heap -> survey the task table ->
// start esp-rtos -> start the high-tier interrupt executor -> spawn
// every task on its tier -> run the console forever.
//
// Two tiers, two executors. The thread-mode executor (this main task)
// hosts the low tier and the console. An InterruptExecutor driven by
// a software interrupt at HIGH_TIER_IRQ hosts the high tier and
// preempts thread mode whenever one of its tasks becomes ready.

#![no_std]
#![no_main]

use alloc::vec::Vec;

use embassy_executor::Spawner;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::interrupt::Priority as IrqPriority;
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::timer::timg::TimerGroup;
use esp_rtos::embassy::InterruptExecutor;
use log::{info, warn};
use static_cell::StaticCell;

use ipsa_kernel::analysis::{self, Load};
use ipsa_kernel::task::{Priority, TASKS, by_priority};
use ipsa_sched::kernel::{console, periodic_task};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

const HEAP_SIZE: usize = 64 * 1024;

// must sit above thread mode (Priority1 is the lowest usable level)
const HIGH_TIER_IRQ: IrqPriority = IrqPriority::Priority2;

static HIGH_EXECUTOR: StaticCell<InterruptExecutor<2>> = StaticCell::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    info!("booting...");

    for spec in TASKS.iter() {
        info!(
            "task {}: priority {}, period {}ms, stack {}B",
            spec.name, spec.priority, spec.period_ms, spec.stack_bytes
        );
    }
    survey_task_table();

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_int = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_int.software_interrupt0);
    info!("scheduler started.");

    let high = HIGH_EXECUTOR
        .init(InterruptExecutor::new(sw_int.software_interrupt2))
        .start(HIGH_TIER_IRQ);

    // high tier first so it is live before thread mode gets busy
    let mut spawned = 0;
    for spec in by_priority(Priority::High) {
        if let Err(e) = high.spawn(periodic_task(spec)) {
            warn!("task {}: spawn failed: {:?}", spec.name, e);
            continue;
        }
        spawned += 1;
    }
    for spec in by_priority(Priority::Low) {
        if let Err(e) = spawner.spawn(periodic_task(spec)) {
            warn!("task {}: spawn failed: {:?}", spec.name, e);
            continue;
        }
        spawned += 1;
    }
    info!("{}/{} tasks running.", spawned, TASKS.len());

    console::run().await
}

// Replay the task table's declared budgets over one hyperperiod and
// log whether the table fits. Informational only: the tiers above
// decide the real dispatch order.
fn survey_task_table() {
    let mut loads: Vec<Load> = TASKS.iter().map(|t| t.load()).collect();
    let unit = analysis::normalize(&mut loads);

    let survey = match analysis::survey(&loads, None) {
        Ok(s) => s,
        Err(e) => {
            warn!("survey: {}", e);
            return;
        }
    };

    info!(
        "survey: hyperperiod {}ms, utilization {:.3}, {}/{} orders viable",
        survey.hyperperiod * unit as u64,
        analysis::utilization(&loads),
        survey.viable,
        survey.arrangements
    );
    match &survey.best {
        Some(best) => info!(
            "survey: best order {} (waiting {}ms, idle {}ms)",
            best.names(&loads),
            best.waiting * unit as u64,
            best.trace.idle * unit as u64
        ),
        None => warn!("survey: no order meets every period"),
    }
}
