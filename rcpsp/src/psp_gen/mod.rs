//! Random instances for tests and benchmarks.

use rand::Rng;

use crate::{
    error::ConfigurationError,
    problem::{Job, Problem, Resource},
};

/// Generates a well-formed problem with `jobs` real jobs plus dummy source `0` and sink `jobs + 1`.
pub fn random_problem<R: Rng + ?Sized>(
    rng: &mut R,
    jobs: usize,
) -> Result<Problem, ConfigurationError> {
    let sink = jobs + 1;

    // number of resources and their capacity
    let m = rng.gen_range(1..=4);
    let rmax: Vec<u32> = (0..m).map(|_| rng.gen_range(6..14)).collect();

    // forward edges only, chance is 1/3 for each pair
    let mut successors: Vec<Vec<usize>> = vec![vec![]; jobs + 2];
    let mut has_predecessor = vec![false; jobs + 2];
    for i in 1..=jobs {
        for j in (i + 1)..=jobs {
            if rng.gen_range(0..3) == 0 {
                successors[i].push(j);
                has_predecessor[j] = true;
            }
        }
    }

    for job in 1..=jobs {
        if !has_predecessor[job] {
            successors[0].push(job);
        }
        if successors[job].is_empty() {
            successors[job].push(sink);
        }
    }
    if jobs == 0 {
        successors[0].push(sink);
    }

    let mut generated = Vec::with_capacity(jobs + 2);
    for (id, successors) in successors.into_iter().enumerate() {
        let duration = if id == 0 || id == sink {
            0
        } else {
            rng.gen_range(1..10)
        };

        let mut job = Job::new(id, duration).with_successors(successors);
        if duration > 0 {
            for (r, &max) in rmax.iter().enumerate() {
                // makes lower values more likely, so scheduling makes more sense
                let t1 = rng.gen_range(0..=max);
                let t2 = rng.gen_range(0..=max);
                let demand = t1 * t2 / max;
                if demand > 0 {
                    job = job.with_demand(format!("R{}", r + 1), demand);
                }
            }
        }
        generated.push(job);
    }

    Problem::builder()
        .jobs(generated)
        .resources(
            rmax.iter()
                .enumerate()
                .map(|(r, &max)| Resource::renewable(format!("R{}", r + 1), max)),
        )
        .build()
}
