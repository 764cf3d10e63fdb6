use hashbrown::HashMap;
use log::debug;
use petgraph::algo;

use crate::{
    error::InfeasibleGraphError,
    problem::{JobId, Problem},
};

/// Time bounds of a single job when resources are unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpmNode {
    /// Earliest start date
    pub esd: usize,
    /// Earliest finish date
    pub efd: usize,
    /// Latest start date
    pub lsd: usize,
    /// Latest finish date
    pub lfd: usize,
}

impl CpmNode {
    pub fn slack(&self) -> usize {
        self.lsd - self.esd
    }

    pub fn is_critical(&self) -> bool {
        self.esd == self.lsd
    }
}

#[derive(Debug, Clone)]
pub struct CpmResult {
    nodes: HashMap<JobId, CpmNode>,
    critical_path: Vec<JobId>,
    lower_bound: usize,
}

impl CpmResult {
    pub fn node(&self, job: JobId) -> Option<&CpmNode> {
        self.nodes.get(&job)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (JobId, &CpmNode)> + '_ {
        self.nodes.iter().map(|(&job, node)| (job, node))
    }

    /// Jobs of one critical path, from source to sink.
    pub fn critical_path(&self) -> &[JobId] {
        &self.critical_path
    }

    /// Earliest finish of the sink; no resource-feasible schedule is shorter.
    pub fn lower_bound(&self) -> usize {
        self.lower_bound
    }
}

/// Forward and backward pass over the precedence graph, ignoring resources.
pub fn compute_critical_path(problem: &Problem) -> Result<CpmResult, InfeasibleGraphError> {
    let graph = problem.graph();
    // `Problem::new` rejects cycles, so this error only fires for unvalidated graphs
    let order: Vec<usize> = algo::toposort(graph, None)
        .map_err(|cycle| InfeasibleGraphError {
            job: graph[cycle.node_id()],
        })?
        .into_iter()
        .map(|node| node.index())
        .collect();

    let mut nodes = vec![CpmNode::default(); problem.len()];

    for &job in &order {
        let esd = problem
            .predecessor_indices(job)
            .iter()
            .map(|&predecessor| nodes[predecessor].efd)
            .max()
            .unwrap_or(0);

        nodes[job].esd = esd;
        nodes[job].efd = esd + problem.duration_at(job);
    }

    let lower_bound = nodes[problem.sink_index()].efd;

    for &job in order.iter().rev() {
        let lfd = problem
            .successor_indices(job)
            .iter()
            .map(|&successor| nodes[successor].lsd)
            .min()
            .unwrap_or(lower_bound);

        nodes[job].lfd = lfd;
        nodes[job].lsd = lfd - problem.duration_at(job);
    }

    // Follow tight edges (successor starts exactly when the current job ends) along zero slack
    let mut critical_path = vec![problem.source_index()];
    let mut current = problem.source_index();
    while let Some(&next) = problem.successor_indices(current).iter().find(|&&successor| {
        nodes[successor].is_critical() && nodes[successor].esd == nodes[current].efd
    }) {
        critical_path.push(next);
        current = next;
    }

    debug!(
        "critical path length {lower_bound} over {} jobs",
        critical_path.len()
    );

    Ok(CpmResult {
        nodes: nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| (problem.id_of(index), node))
            .collect(),
        critical_path: critical_path
            .into_iter()
            .map(|index| problem.id_of(index))
            .collect(),
        lower_bound,
    })
}
