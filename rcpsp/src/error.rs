use thiserror::Error;

use crate::problem::JobId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    InfeasibleGraph(#[from] InfeasibleGraphError),
    #[error(transparent)]
    UnschedulableJob(#[from] UnschedulableJobError),
    #[error(transparent)]
    InvalidPermutation(#[from] PermutationError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Malformed problem definition, detected while building a [`crate::Problem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("problem does not contain any jobs")]
    Empty,
    #[error("job {0} is defined more than once")]
    DuplicateJob(JobId),
    #[error("resource {0:?} is defined more than once")]
    DuplicateResource(String),
    #[error("job {job} lists unknown successor {successor}")]
    UnknownSuccessor { job: JobId, successor: JobId },
    #[error("job {job} requests unknown resource {resource:?}")]
    UnknownResource { job: JobId, resource: String },
    #[error("precedence relation contains a cycle through job {0}")]
    Cycle(JobId),
    #[error("expected exactly one job without predecessors, found {0:?}")]
    Source(Vec<JobId>),
    #[error("expected exactly one job without successors, found {0:?}")]
    Sink(Vec<JobId>),
    #[error("dummy job {job} must have zero duration, found {duration}")]
    DummyDuration { job: JobId, duration: usize },
    #[error("calendar of resource {resource:?} covers {len} time steps, horizon is {horizon}")]
    CalendarTooShort {
        resource: String,
        len: usize,
        horizon: usize,
    },
    #[error("job {job} needs {demand} units of {resource:?} but capacity never exceeds {max}")]
    DemandExceedsCapacity {
        job: JobId,
        resource: String,
        demand: u32,
        max: u32,
    },
    #[error("jobs consume {consumed} units of non-renewable {resource:?}, only {capacity} available")]
    NonRenewableExceeded {
        resource: String,
        consumed: u64,
        capacity: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("precedence graph is not acyclic (cycle through job {job})")]
pub struct InfeasibleGraphError {
    pub job: JobId,
}

/// Raised by the serial SGS when no resource-feasible window exists before the horizon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job {job} cannot be placed at or after t={earliest} within horizon {horizon}")]
pub struct UnschedulableJobError {
    pub job: JobId,
    pub earliest: usize,
    pub horizon: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("permutation references unknown job {0}")]
    UnknownJob(JobId),
    #[error("job {0} appears more than once in the permutation")]
    Duplicate(JobId),
    #[error("job {0} is missing from the permutation")]
    Missing(JobId),
    #[error("source job {0} may only appear in first position")]
    SourceNotFirst(JobId),
}
