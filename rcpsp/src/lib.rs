//! Resource-constrained project scheduling: problem model, critical path method,
//! serial schedule generation and permutation search on top of it.

#![forbid(unsafe_code)]

pub mod cpm;
pub mod error;
pub mod evaluation;
pub mod priority;
pub mod problem;
pub mod psp_gen;
pub mod schedule;
pub mod scheduler;
pub mod sgs;
pub mod sources_load;
pub mod tabu_list;

pub use cpm::{compute_critical_path, CpmNode, CpmResult};
pub use error::{
    ConfigurationError, Error, InfeasibleGraphError, PermutationError, Result,
    UnschedulableJobError,
};
pub use problem::{Capacity, Job, JobId, Problem, ProblemBuilder, Resource, ResourceKind};
pub use schedule::{Schedule, TimeWindow};
pub use scheduler::{
    random_restart, search_best_schedule, tabu_search, OptimizedSchedule, SearchOptions,
    TabuOptions,
};
pub use sgs::build_schedule;
