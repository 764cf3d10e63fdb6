use log::{debug, info, trace};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use crate::{
    cpm::compute_critical_path,
    error::Result,
    problem::{JobId, Problem},
    tabu_list::{SimpleTabuList, TabuList},
};

use super::{evaluate, thread_pool, OptimizedSchedule};

#[derive(Debug, Clone)]
pub struct TabuOptions {
    pub number_of_iterations: u32,
    /// Stop after this many iterations without improving the best makespan.
    pub max_iter_since_best: u32,
    pub tabu_list_size: u32,
    /// Only jobs less than `swap_range` positions apart are swapped.
    pub swap_range: usize,
    /// Return to the best permutation (and its tabu list) after this many iterations without improvement.
    pub iter_since_best_reset: Option<u32>,
    /// Rate the neighborhood on a worker pool.
    pub parallel: bool,
    pub threads: Option<usize>,
    /// Seeds the tabu list pruning.
    pub seed: Option<u64>,
}

impl Default for TabuOptions {
    fn default() -> Self {
        Self {
            number_of_iterations: 1000,
            max_iter_since_best: 100,
            tabu_list_size: 25,
            swap_range: 15,
            iter_since_best_reset: None,
            parallel: false,
            threads: None,
            seed: None,
        }
    }
}

/// Swaps of jobs less than `swap_range` positions apart that cannot break a direct precedence
/// relation: neither job may be linked to a job sitting between them.
pub fn reduced_neighborhood(
    problem: &Problem,
    permutation: &[JobId],
    swap_range: usize,
) -> Vec<(JobId, JobId)> {
    let mut moves = vec![];

    for a in 0..permutation.len() {
        for b in (a + 1)..permutation.len().min(a + swap_range) {
            let first = permutation[a];
            let last = permutation[b];

            let nodes_between = &permutation[a..=b];
            if nodes_between.iter().all(|&node| {
                !(problem.has_precedence(node, last) || problem.has_precedence(first, node))
            }) {
                moves.push((first, last));
            }
        }
    }

    moves
}

fn swapped(permutation: &[JobId], (i, j): (JobId, JobId)) -> Option<Vec<JobId>> {
    let index_a = permutation.iter().position(|&job| job == i)?;
    let index_b = permutation.iter().position(|&job| job == j)?;

    let mut permutation = permutation.to_vec();
    permutation.swap(index_a, index_b);
    Some(permutation)
}

/// Tabu search over swap moves, starting from the precedence ranks of the jobs.
///
/// Each iteration moves to the best non-tabu neighbor; a tabu move is still taken when it
/// beats the best makespan found so far. Stops after `number_of_iterations`, after
/// `max_iter_since_best` iterations without improvement, or once the critical path length
/// is reached.
pub fn tabu_search(problem: &Problem, options: &TabuOptions) -> Result<OptimizedSchedule> {
    let lower_bound = compute_critical_path(problem)?.lower_bound();
    info!("lower bound: {lower_bound}");

    let mut rng = StdRng::seed_from_u64(options.seed.unwrap_or_else(rand::random));
    let pool = if options.parallel {
        Some(thread_pool(options.threads)?)
    } else {
        None
    };

    // Compute initial solution
    let source = problem.source();
    let mut schedule: Vec<JobId> = problem
        .compute_job_execution_ranks()
        .into_iter()
        .flatten()
        .filter(|&job| job != source)
        .collect();
    info!("initial schedule: {schedule:?}");

    let (execution_time, _) = evaluate(problem, &schedule)?;
    info!("execution_time: {execution_time}");

    let mut best_execution_time = execution_time;
    let mut best_execution_schedule = schedule.clone();
    let mut iter_since_best = 0;
    let mut reset_counter = 0;

    // Jobs are tracked by their dense index
    let key = |job: JobId| problem.index_of(job).unwrap_or(usize::MAX);
    let mut tabu_list = SimpleTabuList::new(problem.len(), options.tabu_list_size as usize);
    let mut best_tabu_list = tabu_list.clone();

    for _ in 0..options.number_of_iterations {
        debug!("iter_since_best: {iter_since_best} - best_execution_time: {best_execution_time}");

        if best_execution_time <= lower_bound {
            info!("Stopping search as lower bound has been reached");
            break;
        }

        if iter_since_best >= options.max_iter_since_best {
            debug!(
                "did not find better move in {iter_since_best} iterations, thus stopping search"
            );
            break;
        }

        if let Some(iter_since_best_reset) = options.iter_since_best_reset {
            if reset_counter >= iter_since_best_reset {
                debug!("did not find a better solution in {reset_counter} iterations, resetting tabu search back to currently best solution");
                schedule = best_execution_schedule.clone();
                reset_counter = 0;
                tabu_list = best_tabu_list.clone();
            }
        }

        let moves = reduced_neighborhood(problem, &schedule, options.swap_range);
        trace!("moves: {moves:?}");

        if moves.is_empty() {
            debug!("neighborhood is empty, thus stopping search");
            break;
        }

        // Perform swaps and after each swap reevaluate execution time
        let rate = |&(i, j): &(JobId, JobId)| {
            let candidate = swapped(&schedule, (i, j))?;
            match evaluate(problem, &candidate) {
                Ok((execution_time, _)) => Some((execution_time, (i, j))),
                Err(err) => {
                    trace!("skipping move ({i}, {j}): {err}");
                    None
                }
            }
        };

        let mut rated_moves: Vec<(usize, (JobId, JobId))> = match &pool {
            Some(pool) => pool.install(|| moves.par_iter().filter_map(&rate).collect()),
            None => moves.iter().filter_map(&rate).collect(),
        };
        rated_moves.retain(|&(execution_time, (i, j))| {
            tabu_list.is_possible_move(key(i), key(j)) || execution_time < best_execution_time
        });
        rated_moves.sort_unstable();
        trace!("rated_moves: {rated_moves:?}");

        iter_since_best += 1;
        reset_counter += 1;

        let Some(&(execution_time, (i, j))) = rated_moves.first() else {
            debug!("every move is tabu, pruning tabu list");
            tabu_list.prune(&mut rng);
            continue;
        };

        if let Some(next) = swapped(&schedule, (i, j)) {
            schedule = next;
        }
        tabu_list.add_turn_to_tabu_list(key(i), key(j));

        if execution_time < best_execution_time {
            best_execution_time = execution_time;
            best_execution_schedule = schedule.clone();
            best_tabu_list = tabu_list.clone();
            iter_since_best = 0;
            reset_counter = 0;
        }
    }

    let (_, best_schedule) = evaluate(problem, &best_execution_schedule)?;

    info!("best_execution_schedule: {best_execution_schedule:?}");
    info!("best_execution_time: {best_execution_time}");

    Ok(OptimizedSchedule {
        permutation: best_execution_schedule,
        schedule: best_schedule,
        duration: best_execution_time,
    })
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        evaluation::satisfy,
        problem::{Job, Resource},
        psp_gen::random_problem,
    };

    fn problem() -> Problem {
        // Rank order [1, 2, 3] serializes 1 before 2 and delays the longer chain 2 -> 3
        Problem::builder()
            .job(Job::new(0, 0).with_successors([1, 2]))
            .job(Job::new(1, 3).with_demand("R", 1).with_successor(4))
            .job(Job::new(2, 1).with_demand("R", 1).with_successor(3))
            .job(Job::new(3, 3).with_successor(4))
            .job(Job::new(4, 0))
            .resource(Resource::renewable("R", 1))
            .build()
            .unwrap()
    }

    #[test]
    fn neighborhood_skips_linked_jobs() {
        let problem = problem();

        // (1, 3) would move 3 ahead of its predecessor 2
        let moves = reduced_neighborhood(&problem, &[1, 2, 3, 4], 15);

        assert_eq!(moves, vec![(1, 2)]);
    }

    #[test]
    fn neighborhood_respects_swap_range() {
        let problem = problem();

        assert_eq!(reduced_neighborhood(&problem, &[2, 1, 3, 4], 15), vec![(2, 1), (1, 3)]);
        assert_eq!(reduced_neighborhood(&problem, &[2, 1, 3, 4], 2), vec![(2, 1), (1, 3)]);
        assert!(reduced_neighborhood(&problem, &[2, 1, 3, 4], 1).is_empty());
    }

    #[test]
    fn reaches_lower_bound() {
        let problem = problem();

        let found = tabu_search(
            &problem,
            &TabuOptions {
                seed: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(found.duration, 4);
        assert_eq!(found.permutation, vec![2, 1, 3, 4]);
        assert!(satisfy(&problem, &found.schedule));
    }

    #[test]
    fn never_worse_than_initial_ranks() {
        let mut rng = StdRng::seed_from_u64(3);
        let problem = random_problem(&mut rng, 25).unwrap();

        let initial: Vec<JobId> = problem
            .compute_job_execution_ranks()
            .into_iter()
            .flatten()
            .filter(|&job| job != problem.source())
            .collect();
        let (initial_time, _) = evaluate(&problem, &initial).unwrap();

        let options = TabuOptions {
            number_of_iterations: 50,
            seed: Some(7),
            ..Default::default()
        };
        let found = tabu_search(&problem, &options).unwrap();

        assert!(found.duration <= initial_time);
        assert!(satisfy(&problem, &found.schedule));
        assert_eq!(found.schedule.makespan(), Some(found.duration));

        let parallel = tabu_search(
            &problem,
            &TabuOptions {
                parallel: true,
                threads: Some(2),
                ..options
            },
        )
        .unwrap();
        assert_eq!(parallel, found);
    }
}
