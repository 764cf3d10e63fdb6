use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rcpsp::{
    build_schedule, compute_critical_path,
    evaluation::{satisfy, violations},
    psp_gen::random_problem,
    random_restart, search_best_schedule, Job, JobId, Problem, Resource, SearchOptions,
    TimeWindow,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn instances() -> Vec<Problem> {
    let mut rng = StdRng::seed_from_u64(2023);
    [1, 4, 10, 30]
        .into_iter()
        .map(|jobs| random_problem(&mut rng, jobs).unwrap())
        .collect()
}

fn shuffled(problem: &Problem, rng: &mut StdRng) -> Vec<JobId> {
    let mut permutation: Vec<JobId> = problem.jobs().iter().map(|job| job.id).collect();
    permutation.retain(|&job| job != problem.source());
    permutation.shuffle(rng);
    permutation
}

#[test]
fn every_permutation_yields_a_feasible_schedule() {
    init();
    let mut rng = StdRng::seed_from_u64(7);

    for problem in instances() {
        for _ in 0..25 {
            let permutation = shuffled(&problem, &mut rng);
            let schedule = build_schedule(&problem, &permutation).unwrap();

            assert!(satisfy(&problem, &schedule), "{:?}", violations(&problem, &schedule));
        }
    }
}

#[test]
fn schedules_are_deterministic() {
    init();
    let mut rng = StdRng::seed_from_u64(8);

    for problem in instances() {
        let permutation = shuffled(&problem, &mut rng);

        assert_eq!(
            build_schedule(&problem, &permutation).unwrap(),
            build_schedule(&problem, &permutation).unwrap()
        );
    }
}

#[test]
fn successors_start_after_predecessors_end() {
    init();
    let mut rng = StdRng::seed_from_u64(9);

    for problem in instances() {
        let schedule = build_schedule(&problem, &shuffled(&problem, &mut rng)).unwrap();

        for job in problem.jobs() {
            let window = schedule.get(job.id).unwrap();
            for &successor in &job.successors {
                assert!(schedule.get(successor).unwrap().start >= window.end);
            }
        }
    }
}

#[test]
fn usage_stays_within_capacity() {
    init();
    let mut rng = StdRng::seed_from_u64(10);

    for problem in instances() {
        let schedule = build_schedule(&problem, &shuffled(&problem, &mut rng)).unwrap();

        for resource in problem.resources() {
            let capacity = problem.capacity(&resource.name).unwrap();
            for (time, &available) in capacity.iter().enumerate() {
                let used: u32 = problem
                    .jobs()
                    .iter()
                    .filter(|job| schedule.get(job.id).unwrap().covers(time))
                    .map(|job| job.demand(&resource.name))
                    .sum();

                assert!(used <= available, "{} at t={time}", resource.name);
            }
        }
    }
}

#[test]
fn critical_path_bounds_every_makespan() {
    init();
    let mut rng = StdRng::seed_from_u64(11);

    for problem in instances() {
        let lower_bound = compute_critical_path(&problem).unwrap().lower_bound();

        for _ in 0..10 {
            let schedule = build_schedule(&problem, &shuffled(&problem, &mut rng)).unwrap();
            assert!(lower_bound <= schedule.makespan().unwrap());
        }
    }
}

#[test]
fn search_improves_monotonically() {
    init();
    let problem = instances().pop().unwrap();

    let durations: Vec<usize> = [0, 10, 50, 200]
        .into_iter()
        .map(|iterations| {
            let options = SearchOptions {
                number_of_iterations: iterations,
                seed: Some(42),
                stop_at_lower_bound: false,
                ..Default::default()
            };
            random_restart(&problem, &options).unwrap().duration
        })
        .collect();

    assert!(durations.windows(2).all(|pair| pair[1] <= pair[0]), "{durations:?}");
}

#[test]
fn single_job_chain() {
    init();
    let problem = Problem::builder()
        .job(Job::new(0, 0).with_successor(1))
        .job(Job::new(1, 2).with_demand("R", 1).with_successor(2))
        .job(Job::new(2, 0))
        .resource(Resource::renewable("R", 1))
        .build()
        .unwrap();

    let schedule = build_schedule(&problem, &[0, 1, 2]).unwrap();

    assert_eq!(schedule.get(1), Some(TimeWindow { start: 0, end: 2 }));
    assert_eq!(schedule.get(2), Some(TimeWindow { start: 2, end: 2 }));
    assert_eq!(search_best_schedule(&problem, 10).unwrap(), schedule);
}

fn independent_pair(capacity: u32, demand: u32) -> Problem {
    Problem::builder()
        .job(Job::new(0, 0).with_successors([1, 2]))
        .job(Job::new(1, 3).with_demand("R", demand).with_successor(3))
        .job(Job::new(2, 1).with_demand("R", demand).with_successor(3))
        .job(Job::new(3, 0))
        .resource(Resource::renewable("R", capacity))
        .build()
        .unwrap()
}

#[test]
fn independent_jobs_share_sufficient_capacity() {
    init();
    let problem = independent_pair(4, 2);

    let schedule = build_schedule(&problem, &[1, 2, 3]).unwrap();

    assert_eq!(schedule.get(1), Some(TimeWindow { start: 0, end: 3 }));
    assert_eq!(schedule.get(2), Some(TimeWindow { start: 0, end: 1 }));
    assert_eq!(schedule.makespan(), Some(3));
}

#[test]
fn contested_capacity_serializes_independent_jobs() {
    init();
    let problem = independent_pair(2, 2);

    let schedule = build_schedule(&problem, &[1, 2, 3]).unwrap();

    assert_eq!(schedule.get(1), Some(TimeWindow { start: 0, end: 3 }));
    assert_eq!(schedule.get(2), Some(TimeWindow { start: 3, end: 4 }));
    assert!(satisfy(&problem, &schedule));
}

#[test]
fn unit_demands_follow_capacity() {
    init();

    let shared = build_schedule(&independent_pair(2, 1), &[1, 2, 3]).unwrap();
    assert_eq!(shared.get(1), Some(TimeWindow { start: 0, end: 3 }));
    assert_eq!(shared.get(2), Some(TimeWindow { start: 0, end: 1 }));
    assert_eq!(shared.makespan(), Some(3));

    let contested = build_schedule(&independent_pair(1, 1), &[1, 2, 3]).unwrap();
    assert_eq!(contested.get(1), Some(TimeWindow { start: 0, end: 3 }));
    assert_eq!(contested.get(2), Some(TimeWindow { start: 3, end: 4 }));
    assert_eq!(contested.makespan(), Some(4));
}
