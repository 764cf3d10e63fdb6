use hashbrown::HashMap;

use crate::problem::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: usize,
    pub end: usize,
}

impl TimeWindow {
    pub fn new(start: usize, duration: usize) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    pub fn duration(&self) -> usize {
        self.end - self.start
    }

    /// Whether the job occupies time step `time`.
    pub fn covers(&self, time: usize) -> bool {
        self.start <= time && time < self.end
    }
}

/// Start and end time per job. The sink's end is the makespan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    windows: HashMap<JobId, TimeWindow>,
    sink: JobId,
}

impl Schedule {
    pub fn new(sink: JobId) -> Self {
        Self {
            windows: HashMap::new(),
            sink,
        }
    }

    pub fn from_windows(sink: JobId, windows: impl IntoIterator<Item = (JobId, TimeWindow)>) -> Self {
        Self {
            windows: windows.into_iter().collect(),
            sink,
        }
    }

    pub fn insert(&mut self, job: JobId, window: TimeWindow) {
        self.windows.insert(job, window);
    }

    pub fn get(&self, job: JobId) -> Option<TimeWindow> {
        self.windows.get(&job).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobId, TimeWindow)> + '_ {
        self.windows.iter().map(|(&job, &window)| (job, window))
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Finish time of the sink, `None` while the sink is not scheduled.
    pub fn makespan(&self) -> Option<usize> {
        self.get(self.sink).map(|window| window.end)
    }

    /// Jobs ordered by start time, ties by id.
    pub fn ordered(&self) -> Vec<(JobId, TimeWindow)> {
        let mut ordered: Vec<_> = self.iter().collect();
        ordered.sort_by_key(|&(job, window)| (window.start, job));
        ordered
    }
}
