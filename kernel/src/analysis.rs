// Offline schedulability survey for a periodic task set
//
// Every job released inside one hyperperiod is replayed on a single
// processor, first come first served, no preemption. Jobs released at
// the same instant run in the order their tasks appear in the
// arrangement being tried, so each permutation of the set can give a
// different trace. An arrangement is viable when every response time
// fits inside its task's period; viable arrangements are ranked by
// total waiting time (response minus cost).
//
// Times are abstract units. `normalize` turns millisecond tables into
// the coarsest unit that keeps every value integral.
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// Above this the n! arrangements get too expensive to replay on target.
pub const MAX_SURVEY_TASKS: usize = 8;

/// Releases replayed per arrangement. One job is 24 bytes, so this
/// keeps a replay well inside the firmware heap.
pub const MAX_SURVEY_JOBS: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Load {
    pub name: &'static str,
    pub cost: u32,
    pub period: u32,
}

impl Load {
    pub const fn new(name: &'static str, cost: u32, period: u32) -> Self {
        Self { name, cost, period }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisError {
    EmptySet,
    ZeroPeriod(&'static str),
    ZeroCost(&'static str),
    TooManyTasks(usize),
    /// releases in one hyperperiod
    TooManyJobs(u64),
    /// hyperperiod does not fit in 64 bits
    Overflow,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::EmptySet => write!(f, "empty task set"),
            AnalysisError::ZeroPeriod(name) => write!(f, "task {} has zero period", name),
            AnalysisError::ZeroCost(name) => write!(f, "task {} has zero cost", name),
            AnalysisError::TooManyTasks(n) => {
                write!(f, "{} tasks, at most {} supported", n, MAX_SURVEY_TASKS)
            }
            AnalysisError::TooManyJobs(n) => {
                write!(f, "{} jobs per hyperperiod, at most {} supported", n, MAX_SURVEY_JOBS)
            }
            AnalysisError::Overflow => write!(f, "hyperperiod overflow"),
        }
    }
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Least common multiple of all periods.
pub fn hyperperiod(loads: &[Load]) -> Result<u64, AnalysisError> {
    let mut acc: Option<u64> = None;
    for l in loads {
        if l.period == 0 {
            return Err(AnalysisError::ZeroPeriod(l.name));
        }
        let p = u64::from(l.period);
        acc = Some(match acc {
            None => p,
            Some(a) => (a / gcd(a, p))
                .checked_mul(p)
                .ok_or(AnalysisError::Overflow)?,
        });
    }
    acc.ok_or(AnalysisError::EmptySet)
}

/// Divide every cost and period by their common divisor, returning it.
pub fn normalize(loads: &mut [Load]) -> u32 {
    let unit = loads
        .iter()
        .flat_map(|l| [l.cost, l.period])
        .fold(0u64, |acc, v| gcd(acc, u64::from(v))) as u32;
    if unit <= 1 {
        return 1;
    }
    for l in loads.iter_mut() {
        l.cost /= unit;
        l.period /= unit;
    }
    unit
}

/// Processor utilization, sum of cost / period.
pub fn utilization(loads: &[Load]) -> f32 {
    loads
        .iter()
        .filter(|l| l.period != 0)
        .map(|l| l.cost as f32 / l.period as f32)
        .sum()
}

// permutation successor in lexicographic order; false once `v` is the last
fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

/// Every ordering of `0..n`, lexicographic, starting with the identity.
pub struct Arrangements {
    next: Option<Vec<usize>>,
}

impl Arrangements {
    pub fn new(n: usize) -> Self {
        Self {
            next: Some((0..n).collect()),
        }
    }
}

impl Iterator for Arrangements {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut succ = current.clone();
        if next_permutation(&mut succ) {
            self.next = Some(succ);
        }
        Some(current)
    }
}

/// Replay result of one arrangement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// response times per task (indexed like the load slice), in completion order
    pub responses: Vec<Vec<u64>>,
    pub idle: u64,
}

#[derive(Debug, Clone, Copy)]
struct Job {
    task: usize,
    release: u64,
    cost: u64,
}

/// Number of releases in one hyperperiod, saturating.
pub fn job_count(loads: &[Load], hyperperiod: u64) -> u64 {
    loads
        .iter()
        .filter(|l| l.period != 0)
        .fold(0u64, |acc, l| {
            acc.saturating_add(hyperperiod / u64::from(l.period))
        })
}

/// Replay one hyperperiod of releases with ties broken by `order`.
///
/// Zero-period loads release nothing and indices outside `loads` are
/// skipped; `survey` rejects both before getting here.
pub fn simulate(loads: &[Load], order: &[usize], hyperperiod: u64) -> Trace {
    let mut jobs = Vec::new();
    for &task in order {
        let Some(load) = loads.get(task) else {
            continue;
        };
        if load.period == 0 {
            continue;
        }
        let period = u64::from(load.period);
        for k in 0..hyperperiod / period {
            jobs.push(Job {
                task,
                release: k * period,
                cost: u64::from(load.cost),
            });
        }
    }
    // stable: equal releases keep arrangement order
    jobs.sort_by_key(|j| j.release);

    let mut responses = vec![Vec::new(); loads.len()];
    let mut now = 0u64;
    let mut idle = 0u64;
    for job in &jobs {
        if job.release > now {
            idle += job.release - now;
            now = job.release;
        }
        now += job.cost;
        responses[job.task].push(now - job.release);
    }

    Trace { responses, idle }
}

/// Total time jobs spent released but not finished beyond their own cost.
pub fn waiting_cost(loads: &[Load], trace: &Trace) -> u64 {
    trace
        .responses
        .iter()
        .zip(loads)
        .map(|(rs, l)| {
            rs.iter()
                .map(|r| r.saturating_sub(u64::from(l.cost)))
                .sum::<u64>()
        })
        .sum()
}

/// Every response fits its period, except the tolerated task's.
pub fn is_viable(loads: &[Load], trace: &Trace, tolerated: Option<&str>) -> bool {
    trace.responses.iter().zip(loads).all(|(rs, l)| {
        tolerated == Some(l.name) || rs.iter().all(|&r| r <= u64::from(l.period))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub order: Vec<usize>,
    pub trace: Trace,
    pub waiting: u64,
}

impl Outcome {
    pub fn names<'a>(&'a self, loads: &'a [Load]) -> OrderNames<'a> {
        OrderNames {
            order: &self.order,
            loads,
        }
    }
}

/// `Display` adapter listing an arrangement by task name
pub struct OrderNames<'a> {
    order: &'a [usize],
    loads: &'a [Load],
}

impl fmt::Display for OrderNames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &task) in self.order.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(self.loads[task].name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Survey {
    pub hyperperiod: u64,
    pub arrangements: usize,
    pub viable: usize,
    /// lowest waiting cost among viable arrangements, first found on ties
    pub best: Option<Outcome>,
}

fn validate(loads: &[Load]) -> Result<(), AnalysisError> {
    if loads.is_empty() {
        return Err(AnalysisError::EmptySet);
    }
    if loads.len() > MAX_SURVEY_TASKS {
        return Err(AnalysisError::TooManyTasks(loads.len()));
    }
    for l in loads {
        if l.period == 0 {
            return Err(AnalysisError::ZeroPeriod(l.name));
        }
        if l.cost == 0 {
            return Err(AnalysisError::ZeroCost(l.name));
        }
    }
    Ok(())
}

/// Replay every arrangement of `loads` and keep the cheapest viable one.
pub fn survey(loads: &[Load], tolerated: Option<&str>) -> Result<Survey, AnalysisError> {
    validate(loads)?;
    let hyper = hyperperiod(loads)?;
    let jobs = job_count(loads, hyper);
    if jobs > MAX_SURVEY_JOBS {
        return Err(AnalysisError::TooManyJobs(jobs));
    }
    log::debug!("survey: {} tasks, hyperperiod {}", loads.len(), hyper);

    let mut arrangements = 0;
    let mut viable = 0;
    let mut best: Option<Outcome> = None;

    for order in Arrangements::new(loads.len()) {
        arrangements += 1;
        let trace = simulate(loads, &order, hyper);
        if !is_viable(loads, &trace, tolerated) {
            continue;
        }
        viable += 1;
        let waiting = waiting_cost(loads, &trace);
        if best.as_ref().is_none_or(|b| waiting < b.waiting) {
            best = Some(Outcome {
                order,
                trace,
                waiting,
            });
        }
    }

    log::debug!("survey: {}/{} arrangements viable", viable, arrangements);
    Ok(Survey {
        hyperperiod: hyper,
        arrangements,
        viable,
        best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TASKS;

    fn reference_set() -> Vec<Load> {
        vec![
            Load::new("T1", 2, 10),
            Load::new("T2", 3, 10),
            Load::new("T3", 2, 20),
            Load::new("T4", 2, 20),
            Load::new("T5", 2, 40),
            Load::new("T6", 2, 40),
            Load::new("T7", 3, 80),
        ]
    }

    fn periods(ps: &[u32]) -> Vec<Load> {
        ps.iter().map(|&p| Load::new("P", 1, p)).collect()
    }

    #[test]
    fn hyperperiod_is_lcm() {
        assert_eq!(hyperperiod(&reference_set()), Ok(80));
        assert_eq!(hyperperiod(&periods(&[4, 6])), Ok(12));
        assert_eq!(hyperperiod(&periods(&[1000, 700, 750, 600])), Ok(21000));
        assert_eq!(hyperperiod(&periods(&[7])), Ok(7));
    }

    #[test]
    fn hyperperiod_errors() {
        assert_eq!(hyperperiod(&[]), Err(AnalysisError::EmptySet));
        let with_zero = [Load::new("A", 1, 5), Load::new("B", 1, 0)];
        assert_eq!(hyperperiod(&with_zero), Err(AnalysisError::ZeroPeriod("B")));
        // distinct primes just under 2^32
        let primes = periods(&[4_294_967_291, 4_294_967_279, 4_294_967_231]);
        assert_eq!(hyperperiod(&primes), Err(AnalysisError::Overflow));
    }

    #[test]
    fn arrangements_are_lexicographic() {
        let all: Vec<Vec<usize>> = Arrangements::new(3).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
        assert_eq!(Arrangements::new(7).count(), 5040);
        assert_eq!(Arrangements::new(1).count(), 1);
    }

    #[test]
    fn simulate_small_set() {
        let loads = [Load::new("A", 1, 4), Load::new("B", 2, 6)];
        let trace = simulate(&loads, &[0, 1], 12);
        assert_eq!(trace.responses, vec![vec![1, 1, 1], vec![3, 2]]);
        assert_eq!(trace.idle, 2);
        assert_eq!(waiting_cost(&loads, &trace), 1);
        assert!(is_viable(&loads, &trace, None));

        // B first: A's first job waits behind B's
        let trace = simulate(&loads, &[1, 0], 12);
        assert_eq!(trace.responses, vec![vec![3, 1, 1], vec![2, 2]]);
        assert_eq!(waiting_cost(&loads, &trace), 2);
    }

    #[test]
    fn tie_order_decides_viability() {
        let loads = [Load::new("A", 2, 3), Load::new("B", 2, 6)];
        let a_first = simulate(&loads, &[0, 1], 6);
        assert_eq!(a_first.responses, vec![vec![2, 3], vec![4]]);
        assert!(is_viable(&loads, &a_first, None));

        let b_first = simulate(&loads, &[1, 0], 6);
        assert_eq!(b_first.responses, vec![vec![4, 3], vec![2]]);
        assert!(!is_viable(&loads, &b_first, None));
        assert!(!is_viable(&loads, &b_first, Some("B")));
        assert!(is_viable(&loads, &b_first, Some("A")));
    }

    #[test]
    fn reference_set_has_no_viable_order() {
        let loads = reference_set();
        let survey = survey(&loads, None).unwrap();
        assert_eq!(survey.hyperperiod, 80);
        assert_eq!(survey.arrangements, 5040);
        assert_eq!(survey.viable, 0);
        assert!(survey.best.is_none());

        let identity = simulate(&loads, &[0, 1, 2, 3, 4, 5, 6], 80);
        assert_eq!(waiting_cost(&loads, &identity), 139);
        assert_eq!(identity.idle, 8);
        assert_eq!(identity.responses[1], vec![5, 11, 6, 5, 5, 8, 5, 5]);
    }

    #[test]
    fn tolerating_t2_admits_orders() {
        let loads = reference_set();
        let survey = survey(&loads, Some("T2")).unwrap();
        assert_eq!(survey.viable, 2208);
        let best = survey.best.unwrap();
        assert_eq!(best.order, vec![0, 2, 3, 4, 5, 1, 6]);
        assert_eq!(best.waiting, 127);
        assert_eq!(best.trace.idle, 8);
        assert_eq!(best.names(&loads).to_string(), "T1 T3 T4 T5 T6 T2 T7");
        assert_eq!(best.trace.responses[1], vec![13, 11, 10, 5, 13, 8, 9, 5]);
    }

    #[test]
    fn survey_rejects_bad_sets() {
        assert_eq!(survey(&[], None), Err(AnalysisError::EmptySet));
        assert_eq!(
            survey(&[Load::new("X", 1, 0)], None),
            Err(AnalysisError::ZeroPeriod("X"))
        );
        assert_eq!(
            survey(&[Load::new("Y", 0, 5)], None),
            Err(AnalysisError::ZeroCost("Y"))
        );
        let many = vec![Load::new("Z", 1, 10); MAX_SURVEY_TASKS + 1];
        assert_eq!(
            survey(&many, None),
            Err(AnalysisError::TooManyTasks(MAX_SURVEY_TASKS + 1))
        );
    }

    #[test]
    fn huge_hyperperiod_is_rejected_before_replay() {
        let loads = [Load::new("fast", 1, 1), Load::new("slow", 1, 2_000_000_011)];
        assert_eq!(job_count(&loads, 2_000_000_011), 2_000_000_012);
        assert_eq!(
            survey(&loads, None),
            Err(AnalysisError::TooManyJobs(2_000_000_012))
        );
        assert_eq!(
            AnalysisError::TooManyJobs(2000).to_string(),
            "2000 jobs per hyperperiod, at most 1024 supported"
        );
    }

    #[test]
    fn job_limit_boundary() {
        let loads = [Load::new("A", 1, 1)];
        assert_eq!(job_count(&loads, 1), 1);
        let over = [Load::new("A", 1, 2), Load::new("B", 1, 2048)];
        assert_eq!(job_count(&over, 2048), MAX_SURVEY_JOBS + 1);
        assert!(survey(&over, None).is_err());
        let under = [Load::new("A", 1, 2), Load::new("B", 1, 1024)];
        assert_eq!(job_count(&under, 1024), 512 + 1);
        assert!(survey(&under, None).is_ok());
    }

    #[test]
    fn simulate_skips_unreplayable_entries() {
        let loads = [Load::new("z", 1, 0), Load::new("a", 1, 5)];
        let trace = simulate(&loads, &[0, 1, 7], 10);
        assert_eq!(trace.responses, vec![vec![], vec![1, 1]]);
        assert_eq!(trace.idle, 4);
    }

    #[test]
    fn normalize_uses_common_unit() {
        let mut loads = [Load::new("A", 50, 1000), Load::new("B", 100, 750)];
        assert_eq!(normalize(&mut loads), 50);
        assert_eq!(loads[0], Load::new("A", 1, 20));
        assert_eq!(loads[1], Load::new("B", 2, 15));

        let mut coprime = [Load::new("C", 3, 7)];
        assert_eq!(normalize(&mut coprime), 1);
        assert_eq!(coprime[0], Load::new("C", 3, 7));
    }

    #[test]
    fn utilization_sums_ratios() {
        let u = utilization(&reference_set());
        assert!((u - 0.8375).abs() < 1e-5);
    }

    #[test]
    fn demo_table_is_feasible() {
        let mut loads: Vec<Load> = TASKS.iter().map(|t| t.load()).collect();
        assert_eq!(normalize(&mut loads), 50);
        let survey = survey(&loads, None).unwrap();
        assert_eq!(survey.hyperperiod, 420);
        assert_eq!(survey.arrangements, 24);
        assert_eq!(survey.viable, 24);
        let best = survey.best.unwrap();
        assert_eq!(best.order, vec![0, 1, 2, 3]);
        assert_eq!(best.waiting, 32);
        assert_eq!(best.trace.idle, 295);
    }

    #[test]
    fn errors_render() {
        assert_eq!(AnalysisError::EmptySet.to_string(), "empty task set");
        assert_eq!(
            AnalysisError::ZeroPeriod("T9").to_string(),
            "task T9 has zero period"
        );
    }
}
