// Static task table
//
// Four periodic jobs at two priority tiers. The firmware spawns one
// executor task per entry; the high tier runs on an interrupt
// executor and preempts the low tier.
use core::fmt;

use crate::analysis::Load;
use crate::workload::{self, Report};

pub const TASK_COUNT: usize = 4;

/// Stack reserved per task on a thread-per-task kernel. Embassy
/// futures are sized at compile time, so this is reported, not enforced.
pub const MINIMAL_STACK_BYTES: u32 = 1024;

/// Priority tiers, higher value preempts lower
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low = 1,
    High = 2,
}

impl Priority {
    pub const fn level(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    Status,
    TempConversion,
    Multiply,
    BinarySearch,
}

impl TaskId {
    pub const ALL: [TaskId; TASK_COUNT] = [
        TaskId::Status,
        TaskId::TempConversion,
        TaskId::Multiply,
        TaskId::BinarySearch,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn tag(self) -> &'static str {
        match self {
            TaskId::Status => "T1",
            TaskId::TempConversion => "T2",
            TaskId::Multiply => "T3",
            TaskId::BinarySearch => "T4",
        }
    }

    /// Execute one iteration of this task's job.
    pub fn run(self) -> Report {
        match self {
            TaskId::Status => workload::status(),
            TaskId::TempConversion => workload::temp_conversion(),
            TaskId::Multiply => workload::big_multiply(),
            TaskId::BinarySearch => workload::binary_search_job(),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Creation parameters for one periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub id: TaskId,
    pub name: &'static str,
    pub priority: Priority,
    /// Delay between the end of one iteration and the start of the next
    pub period_ms: u32,
    /// Declared worst-case execution time, only used by the boot survey
    pub budget_ms: u32,
    pub stack_bytes: u32,
}

impl TaskSpec {
    pub const fn load(&self) -> Load {
        Load {
            name: self.name,
            cost: self.budget_ms,
            period: self.period_ms,
        }
    }
}

pub static TASKS: [TaskSpec; TASK_COUNT] = [
    TaskSpec {
        id: TaskId::Status,
        name: "T1_Print",
        priority: Priority::High,
        period_ms: 1000,
        budget_ms: 50,
        stack_bytes: MINIMAL_STACK_BYTES,
    },
    TaskSpec {
        id: TaskId::TempConversion,
        name: "T2_Convert",
        priority: Priority::High,
        period_ms: 700,
        budget_ms: 50,
        stack_bytes: MINIMAL_STACK_BYTES,
    },
    TaskSpec {
        id: TaskId::Multiply,
        name: "T3_Multiply",
        priority: Priority::Low,
        period_ms: 750,
        budget_ms: 50,
        stack_bytes: MINIMAL_STACK_BYTES,
    },
    TaskSpec {
        id: TaskId::BinarySearch,
        name: "T4_BinSearch",
        priority: Priority::Low,
        period_ms: 600,
        budget_ms: 50,
        stack_bytes: MINIMAL_STACK_BYTES,
    },
];

pub fn spec(id: TaskId) -> &'static TaskSpec {
    &TASKS[id.index()]
}

pub fn by_priority(priority: Priority) -> impl Iterator<Item = &'static TaskSpec> {
    TASKS.iter().filter(move |t| t.priority == priority)
}
