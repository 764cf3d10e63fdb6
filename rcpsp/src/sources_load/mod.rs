pub mod time_resolution;

pub use time_resolution::TimeResolution;

/// Bookkeeping of resource usage while a schedule is being built.
pub trait SourcesLoad {
    /// It finds out the earliest possible activity start time without resource overload,
    /// or `None` when no window fits before the horizon.
    fn get_earliest_start_time(
        &self,
        activity_resource_requirements: &[u32],
        earliest_precedence_start_time: usize,
        activity_duration: usize,
    ) -> Option<usize>;

    /// It updates state of resources with respect to the added activity.
    fn add_activity(
        &mut self,
        activity_start: usize,
        activity_stop: usize,
        activity_requirements: &[u32],
    );
}
