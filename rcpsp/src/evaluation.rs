//! Independent feasibility checks for complete schedules.
//!
//! Nothing in here is used while building schedules; the serial SGS is feasible by
//! construction. These checks exist to verify that claim and to inspect schedules
//! produced elsewhere.

use crate::{
    problem::{JobId, Problem},
    schedule::Schedule,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingJob(JobId),
    WrongDuration {
        job: JobId,
        expected: usize,
        actual: usize,
    },
    Precedence {
        before: JobId,
        after: JobId,
    },
    /// A resource-consuming job runs past the end of the capacity arrays.
    BeyondHorizon {
        job: JobId,
        end: usize,
        horizon: usize,
    },
    ResourceOverload {
        resource: String,
        time: usize,
        used: u64,
        capacity: u32,
    },
    NonRenewableOverload {
        resource: String,
        used: u64,
        capacity: u32,
    },
}

/// Finish time of the sink.
pub fn makespan(schedule: &Schedule) -> Option<usize> {
    schedule.makespan()
}

pub fn satisfy(problem: &Problem, schedule: &Schedule) -> bool {
    violations(problem, schedule).is_empty()
}

/// Every precedence and capacity violation of `schedule`.
pub fn violations(problem: &Problem, schedule: &Schedule) -> Vec<Violation> {
    let mut violations = vec![];

    for job in problem.jobs() {
        let Some(window) = schedule.get(job.id) else {
            violations.push(Violation::MissingJob(job.id));
            continue;
        };

        let actual = window.end.saturating_sub(window.start);
        if window.end < window.start || actual != job.duration {
            violations.push(Violation::WrongDuration {
                job: job.id,
                expected: job.duration,
                actual,
            });
        }
    }

    // Precedence: a successor starts no earlier than its predecessor ends
    for job in problem.jobs() {
        let Some(window) = schedule.get(job.id) else {
            continue;
        };

        for &successor in &job.successors {
            if let Some(successor_window) = schedule.get(successor) {
                if successor_window.start < window.end {
                    violations.push(Violation::Precedence {
                        before: job.id,
                        after: successor,
                    });
                }
            }
        }
    }

    let horizon = problem.horizon();

    for resource in problem.resources() {
        let consumers: Vec<(JobId, usize, usize, u32)> = problem
            .jobs()
            .iter()
            .filter_map(|job| {
                let demand = job.demand(&resource.name);
                let window = schedule.get(job.id)?;
                (demand > 0).then_some((job.id, window.start, window.end, demand))
            })
            .collect();

        if !resource.is_renewable() {
            let used: u64 = consumers.iter().map(|&(_, _, _, demand)| u64::from(demand)).sum();
            let capacity = resource.capacity.max();
            if used > u64::from(capacity) {
                violations.push(Violation::NonRenewableOverload {
                    resource: resource.name.clone(),
                    used,
                    capacity,
                });
            }
            continue;
        }

        let mut usage = vec![0_u64; horizon];
        for &(job, start, end, demand) in &consumers {
            if end > horizon {
                violations.push(Violation::BeyondHorizon {
                    job,
                    end,
                    horizon,
                });
            }

            for slot in usage.iter_mut().take(end.min(horizon)).skip(start) {
                *slot += u64::from(demand);
            }
        }

        for (time, &used) in usage.iter().enumerate() {
            let capacity = resource.capacity.at(time);
            if used > u64::from(capacity) {
                violations.push(Violation::ResourceOverload {
                    resource: resource.name.clone(),
                    time,
                    used,
                    capacity,
                });
            }
        }
    }

    violations
}
