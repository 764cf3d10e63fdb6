use log::{debug, info, trace};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;

use crate::{
    cpm::compute_critical_path,
    error::Result,
    problem::{JobId, Problem},
    schedule::Schedule,
};

use super::{evaluate, thread_pool, OptimizedSchedule};

// Spreads consecutive trial numbers over the seed space
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Random permutations tried after the initial one.
    pub number_of_iterations: u32,
    pub parallel: bool,
    /// Worker threads for parallel search, defaults to the number of CPUs.
    pub threads: Option<usize>,
    /// Fixes the sequence of sampled permutations.
    pub seed: Option<u64>,
    /// Stop as soon as the critical path length is reached. Only the sequential search stops early.
    pub stop_at_lower_bound: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            number_of_iterations: 1000,
            parallel: false,
            threads: None,
            seed: None,
            stop_at_lower_bound: true,
        }
    }
}

struct Trial {
    number: u32,
    result: Result<(usize, Vec<JobId>, Schedule)>,
}

impl Trial {
    fn duration(&self) -> Option<usize> {
        self.result.as_ref().ok().map(|(duration, _, _)| *duration)
    }
}

/// Random-restart search with default options and `iterations` extra samples.
pub fn search_best_schedule(problem: &Problem, iterations: u32) -> Result<Schedule> {
    let options = SearchOptions {
        number_of_iterations: iterations,
        ..Default::default()
    };

    random_restart(problem, &options).map(|optimized| optimized.schedule)
}

/// Samples independent uniformly random permutations and keeps the one with the smallest
/// makespan. Equal makespans keep the earlier trial, so sequential and parallel runs with
/// the same seed return the same schedule.
///
/// Trials failing inside the SGS are discarded. The first failure is returned only when no
/// trial succeeds.
pub fn random_restart(problem: &Problem, options: &SearchOptions) -> Result<OptimizedSchedule> {
    let seed = options.seed.unwrap_or_else(rand::random);
    info!("options: {options:?}, seed: {seed}");

    let lower_bound = if options.stop_at_lower_bound {
        let lower_bound = compute_critical_path(problem)?.lower_bound();
        info!("lower bound: {lower_bound}");
        Some(lower_bound)
    } else {
        None
    };

    let source = problem.source();
    let jobs: Vec<JobId> = problem
        .jobs()
        .iter()
        .map(|job| job.id)
        .filter(|&job| job != source)
        .collect();

    let mut best = run_trial(problem, &jobs, seed, 0);

    if options.parallel {
        let pool = thread_pool(options.threads)?;
        let rest = pool.install(|| {
            (1..=options.number_of_iterations)
                .into_par_iter()
                .map(|number| run_trial(problem, &jobs, seed, number))
                .reduce_with(better)
        });

        if let Some(rest) = rest {
            best = better(best, rest);
        }
    } else {
        for number in 1..=options.number_of_iterations {
            if reached(&best, lower_bound) {
                info!("Stopping search as lower bound has been reached");
                break;
            }

            best = better(best, run_trial(problem, &jobs, seed, number));
        }
    }

    let Trial { number, result } = best;
    let (duration, permutation, schedule) = result?;

    info!("best_execution_schedule: {permutation:?} (trial {number})");
    info!("best_execution_time: {duration}");

    Ok(OptimizedSchedule {
        permutation,
        schedule,
        duration,
    })
}

fn trial_permutation(jobs: &[JobId], seed: u64, number: u32) -> Vec<JobId> {
    let mut rng = StdRng::seed_from_u64(seed ^ u64::from(number).wrapping_mul(SEED_STRIDE));
    let mut permutation = jobs.to_vec();
    permutation.shuffle(&mut rng);
    permutation
}

fn run_trial(problem: &Problem, jobs: &[JobId], seed: u64, number: u32) -> Trial {
    let permutation = trial_permutation(jobs, seed, number);
    trace!("trial {number}: {permutation:?}");

    let result = evaluate(problem, &permutation)
        .map(|(duration, schedule)| (duration, permutation, schedule));

    match &result {
        Ok((duration, _, _)) => debug!("trial {number}: makespan {duration}"),
        Err(err) => debug!("discarding trial {number}: {err}"),
    }

    Trial { number, result }
}

/// Successful trials beat failed ones, then smaller makespan, then lower trial number.
fn better(a: Trial, b: Trial) -> Trial {
    let key = |trial: &Trial| (trial.duration().is_none(), trial.duration(), trial.number);

    if key(&b) < key(&a) {
        b
    } else {
        a
    }
}

fn reached(best: &Trial, lower_bound: Option<usize>) -> bool {
    matches!((best.duration(), lower_bound), (Some(duration), Some(bound)) if duration <= bound)
}
