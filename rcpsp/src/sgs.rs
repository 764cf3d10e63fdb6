use log::trace;

use crate::{
    error::{InfeasibleGraphError, PermutationError, Result, UnschedulableJobError},
    problem::{JobId, Problem},
    schedule::{Schedule, TimeWindow},
    sources_load::{SourcesLoad, TimeResolution},
};

/// Serial schedule generation scheme.
///
/// Each round picks the first job in `permutation` whose predecessors are all scheduled,
/// places it at the earliest start after its predecessors where every demanded resource
/// has enough remaining capacity for the whole duration, and books that capacity.
/// The source may be left out of `permutation` or given in first position.
pub fn build_schedule(problem: &Problem, permutation: &[JobId]) -> Result<Schedule> {
    let order = resolve_permutation(problem, permutation)?;

    let mut windows: Vec<Option<TimeWindow>> = vec![None; problem.len()];
    let mut completed = vec![false; problem.len()];
    let mut sources_load = TimeResolution::new(problem);

    let source = problem.source_index();
    windows[source] = Some(TimeWindow::new(0, 0));
    completed[source] = true;

    // Positions before `first_open` hold completed jobs only
    let mut first_open = 0;

    for _ in 1..problem.len() {
        while completed[order[first_open]] {
            first_open += 1;
        }

        // Unreachable for validated problems, `Problem::new` rejects cycles
        let job = order[first_open..]
            .iter()
            .copied()
            .find(|&job| {
                !completed[job]
                    && problem
                        .predecessor_indices(job)
                        .iter()
                        .all(|&predecessor| completed[predecessor])
            })
            .ok_or(InfeasibleGraphError {
                job: problem.id_of(order[first_open]),
            })?;

        let earliest_start_time = problem
            .predecessor_indices(job)
            .iter()
            .filter_map(|&predecessor| windows[predecessor].map(|window| window.end))
            .max()
            .unwrap_or(0);

        let duration = problem.duration_at(job);
        let requirements = problem.requests(job);

        let start_time = sources_load
            .get_earliest_start_time(requirements, earliest_start_time, duration)
            .ok_or(UnschedulableJobError {
                job: problem.id_of(job),
                earliest: earliest_start_time,
                horizon: problem.horizon(),
            })?;

        sources_load.add_activity(start_time, start_time + duration, requirements);
        windows[job] = Some(TimeWindow::new(start_time, duration));
        completed[job] = true;

        trace!(
            "placed job {} at {start_time} (precedence floor {earliest_start_time})",
            problem.id_of(job)
        );
    }

    let mut schedule = Schedule::new(problem.sink());
    for (index, window) in windows.into_iter().enumerate() {
        if let Some(window) = window {
            schedule.insert(problem.id_of(index), window);
        }
    }

    Ok(schedule)
}

/// Maps the permutation onto job indices, without the source.
fn resolve_permutation(
    problem: &Problem,
    permutation: &[JobId],
) -> std::result::Result<Vec<usize>, PermutationError> {
    let source = problem.source_index();
    let mut seen = vec![false; problem.len()];
    let mut order = Vec::with_capacity(problem.len());

    for (position, &id) in permutation.iter().enumerate() {
        let index = problem
            .index_of(id)
            .ok_or(PermutationError::UnknownJob(id))?;

        if index == source {
            if position != 0 {
                return Err(PermutationError::SourceNotFirst(id));
            }
            continue;
        }

        if seen[index] {
            return Err(PermutationError::Duplicate(id));
        }
        seen[index] = true;
        order.push(index);
    }

    if let Some(missing) = (0..problem.len()).find(|&index| index != source && !seen[index]) {
        return Err(PermutationError::Missing(problem.id_of(missing)));
    }

    Ok(order)
}
