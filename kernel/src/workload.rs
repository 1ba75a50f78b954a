// Job bodies for the four periodic tasks
// Each call is straight-line work on constants and returns a Report;
// the firmware decides where the line goes.
use core::fmt;

use crate::task::TaskId;

pub const FIXED_FAHRENHEIT: f32 = 95.0;

pub const MULTIPLICAND: u32 = 123_456_789;
pub const MULTIPLIER: u32 = 987_654_321;

pub const SEARCH_LEN: usize = 50;
pub const SEARCH_TARGET: i32 = 25;

static SEARCH_TABLE: [i32; SEARCH_LEN] = ascending_table();

/// One job's result, rendered as a single console line by `Display`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Report {
    Status,
    Conversion { fahrenheit: f32, celsius: f32 },
    Product { product: u64 },
    Search { target: i32, index: Option<usize> },
}

impl Report {
    pub const fn task(&self) -> TaskId {
        match self {
            Report::Status => TaskId::Status,
            Report::Conversion { .. } => TaskId::TempConversion,
            Report::Product { .. } => TaskId::Multiply,
            Report::Search { .. } => TaskId::BinarySearch,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.task())?;
        match self {
            Report::Status => f.write_str("system running normally"),
            Report::Conversion {
                fahrenheit,
                celsius,
            } => write!(f, "{:.1}°F => {:.1}°C", fahrenheit, celsius),
            Report::Product { product } => write!(f, "multiplication: {}", product),
            Report::Search {
                target,
                index: Some(i),
            } => write!(f, "{} found at index {}", target, i),
            Report::Search {
                target,
                index: None,
            } => write!(f, "{} not found", target),
        }
    }
}

pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

// widened so the product never wraps, even on riscv32
pub fn widening_mul(a: u32, b: u32) -> u64 {
    u64::from(a) * u64::from(b)
}

/// `[1, 2, ..., N]`
pub const fn ascending_table<const N: usize>() -> [i32; N] {
    let mut table = [0i32; N];
    let mut i = 0;
    while i < N {
        table[i] = i as i32 + 1;
        i += 1;
    }
    table
}

/// Lower-midpoint binary search over an ascending slice.
///
/// Inclusive bounds `[lo, hi]`, so the first comparison on a 50-entry table
/// is index 24.
pub fn binary_search(haystack: &[i32], target: i32) -> Option<usize> {
    let mut lo = 0;
    let mut hi = haystack.len().checked_sub(1)?;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        match haystack[mid].cmp(&target) {
            core::cmp::Ordering::Equal => return Some(mid),
            core::cmp::Ordering::Less => lo = mid + 1,
            core::cmp::Ordering::Greater => hi = mid.checked_sub(1)?,
        }
    }
    None
}

pub fn status() -> Report {
    Report::Status
}

pub fn temp_conversion() -> Report {
    Report::Conversion {
        fahrenheit: FIXED_FAHRENHEIT,
        celsius: fahrenheit_to_celsius(FIXED_FAHRENHEIT),
    }
}

pub fn big_multiply() -> Report {
    Report::Product {
        product: widening_mul(MULTIPLICAND, MULTIPLIER),
    }
}

pub fn binary_search_job() -> Report {
    Report::Search {
        target: SEARCH_TARGET,
        index: binary_search(&SEARCH_TABLE, SEARCH_TARGET),
    }
}
