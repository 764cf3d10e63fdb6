use log::debug;

use crate::{
    cpm::{compute_critical_path, CpmNode, CpmResult},
    error::Result,
    problem::{JobId, Problem},
    schedule::Schedule,
    sgs::build_schedule,
};

/// Deterministic orderings derived from the CPM time bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityRule {
    EarliestStart,
    EarliestFinish,
    LatestStart,
    LatestFinish,
    MinimumSlack,
}

impl PriorityRule {
    pub const ALL: [PriorityRule; 5] = [
        PriorityRule::EarliestStart,
        PriorityRule::EarliestFinish,
        PriorityRule::LatestStart,
        PriorityRule::LatestFinish,
        PriorityRule::MinimumSlack,
    ];

    fn key(&self, node: &CpmNode) -> usize {
        match self {
            PriorityRule::EarliestStart => node.esd,
            PriorityRule::EarliestFinish => node.efd,
            PriorityRule::LatestStart => node.lsd,
            PriorityRule::LatestFinish => node.lfd,
            PriorityRule::MinimumSlack => node.slack(),
        }
    }
}

/// All jobs but the source, ascending by the rule's key. Ties keep the problem's job order.
pub fn priority_permutation(problem: &Problem, cpm: &CpmResult, rule: PriorityRule) -> Vec<JobId> {
    let source = problem.source();
    let mut permutation: Vec<JobId> = problem
        .jobs()
        .iter()
        .map(|job| job.id)
        .filter(|&job| job != source)
        .collect();

    permutation.sort_by_key(|&job| cpm.node(job).map(|node| rule.key(node)).unwrap_or(usize::MAX));
    permutation
}

/// Single SGS pass over the rule's permutation.
pub fn priority_schedule(problem: &Problem, rule: PriorityRule) -> Result<Schedule> {
    let cpm = compute_critical_path(problem)?;
    let permutation = priority_permutation(problem, &cpm, rule);
    let schedule = build_schedule(problem, &permutation)?;

    debug!(
        "{rule:?} schedule makespan {:?} (lower bound {})",
        schedule.makespan(),
        cpm.lower_bound()
    );

    Ok(schedule)
}
