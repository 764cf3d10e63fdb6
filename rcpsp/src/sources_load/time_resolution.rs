use crate::problem::Problem;

use super::SourcesLoad;

/// Remaining capacity per resource and time step, owned by a single SGS run.
pub struct TimeResolution {
    horizon: usize,
    // `None` for non-renewable resources, which never limit the start time
    remaining_resource_capacity: Vec<Option<Vec<u32>>>,
}

impl TimeResolution {
    pub fn new(problem: &Problem) -> Self {
        let remaining_resource_capacity = problem
            .resources()
            .iter()
            .zip(problem.capacity_profiles())
            .map(|(resource, profile)| resource.is_renewable().then(|| profile.clone()))
            .collect();

        Self {
            horizon: problem.horizon(),
            remaining_resource_capacity,
        }
    }

    pub fn remaining(&self, resource_id: usize) -> Option<&[u32]> {
        self.remaining_resource_capacity
            .get(resource_id)
            .and_then(|remaining| remaining.as_deref())
    }

    fn fits(&self, activity_resource_requirements: &[u32], t: usize) -> bool {
        self.remaining_resource_capacity
            .iter()
            .zip(activity_resource_requirements)
            .all(|(remaining, &requirement)| match remaining {
                Some(remaining) if requirement > 0 => remaining[t] >= requirement,
                _ => true,
            })
    }
}

impl SourcesLoad for TimeResolution {
    /// First fit: the smallest start at or after the precedence floor whose whole window fits.
    fn get_earliest_start_time(
        &self,
        activity_resource_requirements: &[u32],
        earliest_precedence_start_time: usize,
        activity_duration: usize,
    ) -> Option<usize> {
        let mut load_time: usize = 0;
        let mut t: usize = earliest_precedence_start_time;

        // A failing step rules out every window containing it, so the scan restarts behind it
        while t < self.horizon && load_time < activity_duration {
            if self.fits(activity_resource_requirements, t) {
                load_time += 1;
            } else {
                load_time = 0;
            }

            t += 1;
        }

        (load_time == activity_duration).then(|| t - load_time)
    }

    fn add_activity(
        &mut self,
        activity_start: usize,
        activity_stop: usize,
        activity_requirements: &[u32],
    ) {
        for (remaining, &requirement) in self
            .remaining_resource_capacity
            .iter_mut()
            .zip(activity_requirements)
        {
            if let Some(remaining) = remaining {
                if requirement == 0 {
                    continue;
                }

                for capacity in &mut remaining[activity_start..activity_stop] {
                    *capacity -= requirement;
                }
            }
        }
    }
}
