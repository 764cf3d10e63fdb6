use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    error::Result,
    problem::{JobId, Problem},
    schedule::Schedule,
    sgs::build_schedule,
};

pub mod random_restart;
pub mod tabu;

pub use random_restart::{random_restart, search_best_schedule, SearchOptions};
pub use tabu::{reduced_neighborhood, tabu_search, TabuOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedSchedule {
    /// Permutation the schedule was generated from, source excluded.
    pub permutation: Vec<JobId>,
    pub schedule: Schedule,
    /// Makespan of `schedule`.
    pub duration: usize,
}

/// Runs the SGS and returns the makespan with the schedule.
pub(crate) fn evaluate(problem: &Problem, permutation: &[JobId]) -> Result<(usize, Schedule)> {
    let schedule = build_schedule(problem, permutation)?;
    let duration = schedule.makespan().unwrap_or(usize::MAX);

    Ok((duration, schedule))
}

pub(crate) fn thread_pool(threads: Option<usize>) -> Result<ThreadPool> {
    let threads = threads.unwrap_or_else(num_cpus::get);

    Ok(ThreadPoolBuilder::new().num_threads(threads).build()?)
}
