use hashbrown::{HashMap, HashSet};
use log::debug;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::ConfigurationError;

pub type JobId = usize;

pub(crate) type Graph = DiGraph<JobId, ()>;

/// A single-mode job: fixed duration, fixed resource demand for its whole duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub duration: usize,
    /// Resource name -> units held while the job runs (or consumed once, for non-renewables).
    pub demands: HashMap<String, u32>,
    pub successors: Vec<JobId>,
}

impl Job {
    pub fn new(id: JobId, duration: usize) -> Self {
        Self {
            id,
            duration,
            demands: HashMap::new(),
            successors: vec![],
        }
    }

    pub fn with_demand(mut self, resource: impl Into<String>, units: u32) -> Self {
        self.demands.insert(resource.into(), units);
        self
    }

    pub fn with_successor(mut self, successor: JobId) -> Self {
        self.successors.push(successor);
        self
    }

    pub fn with_successors(mut self, successors: impl IntoIterator<Item = JobId>) -> Self {
        self.successors.extend(successors);
        self
    }

    pub fn demand(&self, resource: &str) -> u32 {
        self.demands.get(resource).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Capacity is available again at every time step.
    Renewable,
    /// Capacity is a stock consumed once over the whole project.
    NonRenewable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capacity {
    Constant(u32),
    /// Explicit capacity per time step, zero marks a break.
    Calendar(Vec<u32>),
}

impl Capacity {
    pub fn at(&self, time: usize) -> u32 {
        match self {
            Capacity::Constant(capacity) => *capacity,
            Capacity::Calendar(calendar) => calendar.get(time).copied().unwrap_or(0),
        }
    }

    pub fn max(&self) -> u32 {
        match self {
            Capacity::Constant(capacity) => *capacity,
            Capacity::Calendar(calendar) => calendar.iter().copied().max().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    pub capacity: Capacity,
}

impl Resource {
    pub fn renewable(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::Renewable,
            capacity: Capacity::Constant(capacity),
        }
    }

    pub fn with_calendar(name: impl Into<String>, calendar: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::Renewable,
            capacity: Capacity::Calendar(calendar),
        }
    }

    pub fn non_renewable(name: impl Into<String>, total: u32) -> Self {
        Self {
            name: name.into(),
            kind: ResourceKind::NonRenewable,
            capacity: Capacity::Constant(total),
        }
    }

    pub fn is_renewable(&self) -> bool {
        self.kind == ResourceKind::Renewable
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    jobs: Vec<Job>,
    resources: Vec<Resource>,
    horizon: Option<usize>,
}

impl ProblemBuilder {
    pub fn job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    pub fn jobs(mut self, jobs: impl IntoIterator<Item = Job>) -> Self {
        self.jobs.extend(jobs);
        self
    }

    pub fn resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn resources(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Number of time steps covered by the capacity arrays. Defaults to the sum of all durations.
    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn build(self) -> Result<Problem, ConfigurationError> {
        Problem::new(self.jobs, self.resources, self.horizon)
    }
}

/// Immutable RCPSP instance.
///
/// Jobs are stored densely in insertion order; everything derived from the job list
/// (predecessors, demand matrix, capacity arrays) is computed once here.
#[derive(Debug, Clone)]
pub struct Problem {
    jobs: Vec<Job>,
    resources: Vec<Resource>,
    horizon: usize,

    graph: Graph,
    job_to_index: HashMap<JobId, usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    predecessor_ids: Vec<Vec<JobId>>,

    // job index -> resource index -> units
    requests: Vec<Vec<u32>>,
    // resource index -> capacity per time step, empty for non-renewable resources
    capacities: Vec<Vec<u32>>,

    source: usize,
    sink: usize,
}

impl Problem {
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    pub fn new(
        mut jobs: Vec<Job>,
        resources: Vec<Resource>,
        horizon: Option<usize>,
    ) -> Result<Self, ConfigurationError> {
        if jobs.is_empty() {
            return Err(ConfigurationError::Empty);
        }

        let mut job_to_index = HashMap::with_capacity(jobs.len());
        for (index, job) in jobs.iter().enumerate() {
            if job_to_index.insert(job.id, index).is_some() {
                return Err(ConfigurationError::DuplicateJob(job.id));
            }
        }

        let mut resource_to_index = HashMap::with_capacity(resources.len());
        for (index, resource) in resources.iter().enumerate() {
            if resource_to_index
                .insert(resource.name.clone(), index)
                .is_some()
            {
                return Err(ConfigurationError::DuplicateResource(resource.name.clone()));
            }
        }

        let mut graph = Graph::with_capacity(jobs.len(), jobs.len());
        for job in &jobs {
            graph.add_node(job.id);
        }

        let mut successors = vec![Vec::new(); jobs.len()];
        let mut predecessors = vec![Vec::new(); jobs.len()];
        for (index, job) in jobs.iter_mut().enumerate() {
            let mut seen = HashSet::new();
            job.successors.retain(|successor| seen.insert(*successor));

            for successor in &job.successors {
                let successor_index =
                    *job_to_index
                        .get(successor)
                        .ok_or(ConfigurationError::UnknownSuccessor {
                            job: job.id,
                            successor: *successor,
                        })?;

                graph.add_edge(NodeIndex::new(index), NodeIndex::new(successor_index), ());
                successors[index].push(successor_index);
                predecessors[successor_index].push(index);
            }
        }

        algo::toposort(&graph, None)
            .map_err(|cycle| ConfigurationError::Cycle(graph[cycle.node_id()]))?;

        let sources: Vec<usize> = (0..jobs.len())
            .filter(|&index| predecessors[index].is_empty())
            .collect();
        let sinks: Vec<usize> = (0..jobs.len())
            .filter(|&index| successors[index].is_empty())
            .collect();

        let (source, sink) = match (sources.as_slice(), sinks.as_slice()) {
            (&[source], &[sink]) => (source, sink),
            (&[_], _) => {
                return Err(ConfigurationError::Sink(
                    sinks.iter().map(|&index| jobs[index].id).collect(),
                ))
            }
            _ => {
                return Err(ConfigurationError::Source(
                    sources.iter().map(|&index| jobs[index].id).collect(),
                ))
            }
        };

        for dummy in [source, sink] {
            if jobs[dummy].duration != 0 {
                return Err(ConfigurationError::DummyDuration {
                    job: jobs[dummy].id,
                    duration: jobs[dummy].duration,
                });
            }
        }

        // Long enough to run every job serially and to use every supplied calendar step
        let horizon = horizon.unwrap_or_else(|| {
            let upper_bound = jobs.iter().map(|job| job.duration).sum();
            resources
                .iter()
                .filter(|resource| resource.is_renewable())
                .filter_map(|resource| match &resource.capacity {
                    Capacity::Calendar(calendar) => Some(calendar.len()),
                    Capacity::Constant(_) => None,
                })
                .fold(upper_bound, usize::max)
        });

        let mut requests = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let mut demands: Vec<(&String, &u32)> = job.demands.iter().collect();
            demands.sort_unstable();

            let mut request = vec![0; resources.len()];
            for (resource, units) in demands {
                let resource_index = *resource_to_index.get(resource.as_str()).ok_or_else(|| {
                    ConfigurationError::UnknownResource {
                        job: job.id,
                        resource: resource.clone(),
                    }
                })?;
                request[resource_index] = *units;
            }
            requests.push(request);
        }

        let mut capacities = Vec::with_capacity(resources.len());
        for resource in &resources {
            let profile = match (&resource.kind, &resource.capacity) {
                (ResourceKind::NonRenewable, _) => vec![],
                (ResourceKind::Renewable, Capacity::Constant(capacity)) => vec![*capacity; horizon],
                (ResourceKind::Renewable, Capacity::Calendar(calendar)) => {
                    if calendar.len() < horizon {
                        return Err(ConfigurationError::CalendarTooShort {
                            resource: resource.name.clone(),
                            len: calendar.len(),
                            horizon,
                        });
                    }
                    calendar[..horizon].to_vec()
                }
            };
            capacities.push(profile);
        }

        // A job that asks for more than the peak capacity can never be placed
        for (job, request) in jobs.iter().zip(&requests) {
            if job.duration == 0 {
                continue;
            }

            for (resource_index, resource) in resources.iter().enumerate() {
                let demand = request[resource_index];
                if !resource.is_renewable() || demand == 0 {
                    continue;
                }

                let max = capacities[resource_index].iter().copied().max().unwrap_or(0);
                if demand > max {
                    return Err(ConfigurationError::DemandExceedsCapacity {
                        job: job.id,
                        resource: resource.name.clone(),
                        demand,
                        max,
                    });
                }
            }
        }

        for (resource_index, resource) in resources.iter().enumerate() {
            if resource.is_renewable() {
                continue;
            }

            let consumed: u64 = requests
                .iter()
                .map(|request| u64::from(request[resource_index]))
                .sum();
            let capacity = resource.capacity.max();
            if consumed > u64::from(capacity) {
                return Err(ConfigurationError::NonRenewableExceeded {
                    resource: resource.name.clone(),
                    consumed,
                    capacity,
                });
            }
        }

        let predecessor_ids = predecessors
            .iter()
            .map(|indices| indices.iter().map(|&index| jobs[index].id).collect())
            .collect();

        debug!(
            "built problem with {} jobs, {} resources, horizon {horizon}",
            jobs.len(),
            resources.len()
        );

        Ok(Self {
            jobs,
            resources,
            horizon,
            graph,
            job_to_index,
            successors,
            predecessors,
            predecessor_ids,
            requests,
            capacities,
            source,
            sink,
        })
    }

    /// Build a copy of this problem under a different resource scenario.
    pub fn with_resources(&self, resources: Vec<Resource>) -> Result<Self, ConfigurationError> {
        Self::new(self.jobs.clone(), resources, Some(self.horizon))
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.index_of(id).map(|index| &self.jobs[index])
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn source(&self) -> JobId {
        self.jobs[self.source].id
    }

    pub fn sink(&self) -> JobId {
        self.jobs[self.sink].id
    }

    pub fn successors(&self, id: JobId) -> Option<&[JobId]> {
        self.job(id).map(|job| job.successors.as_slice())
    }

    pub fn predecessors(&self, id: JobId) -> Option<&[JobId]> {
        self.index_of(id)
            .map(|index| self.predecessor_ids[index].as_slice())
    }

    /// Capacity per time step over `[0, horizon)`. `None` for unknown or non-renewable resources.
    pub fn capacity(&self, resource: &str) -> Option<&[u32]> {
        self.resources
            .iter()
            .position(|candidate| candidate.name == resource && candidate.is_renewable())
            .map(|index| self.capacities[index].as_slice())
    }

    /// Whether `after` is a direct successor of `before`.
    pub fn has_precedence(&self, before: JobId, after: JobId) -> bool {
        match (self.index_of(before), self.index_of(after)) {
            (Some(before), Some(after)) => self
                .graph
                .contains_edge(NodeIndex::new(before), NodeIndex::new(after)),
            _ => false,
        }
    }

    /// Compute the upper bound of execution time by accumulating all durations
    pub fn compute_upper_bound(&self) -> usize {
        self.jobs.iter().map(|job| job.duration).sum()
    }

    /// Groups jobs into ranks: a job enters the rank after the one its last predecessor is in.
    ///
    /// The source forms rank 0, so flattening the ranks yields a precedence-feasible permutation.
    pub fn compute_job_execution_ranks(&self) -> Vec<Vec<JobId>> {
        let mut remaining: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut ranks = vec![];
        let mut same_rank = vec![self.source];

        while !same_rank.is_empty() {
            let mut next_rank = vec![];
            for &index in &same_rank {
                for &successor in &self.successors[index] {
                    remaining[successor] -= 1;
                    if remaining[successor] == 0 {
                        next_rank.push(successor);
                    }
                }
            }

            let mut rank: Vec<JobId> = same_rank.iter().map(|&index| self.jobs[index].id).collect();
            rank.sort_unstable();
            ranks.push(rank);

            same_rank = next_rank;
        }

        ranks
    }

    pub(crate) fn index_of(&self, id: JobId) -> Option<usize> {
        self.job_to_index.get(&id).copied()
    }

    pub(crate) fn id_of(&self, index: usize) -> JobId {
        self.jobs[index].id
    }

    pub(crate) fn duration_at(&self, index: usize) -> usize {
        self.jobs[index].duration
    }

    pub(crate) fn source_index(&self) -> usize {
        self.source
    }

    pub(crate) fn sink_index(&self) -> usize {
        self.sink
    }

    pub(crate) fn successor_indices(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    pub(crate) fn predecessor_indices(&self, index: usize) -> &[usize] {
        &self.predecessors[index]
    }

    pub(crate) fn requests(&self, index: usize) -> &[u32] {
        &self.requests[index]
    }

    pub(crate) fn capacity_profiles(&self) -> &[Vec<u32>] {
        &self.capacities
    }

    pub(crate) fn graph(&self) -> &Graph {
        &self.graph
    }
}
