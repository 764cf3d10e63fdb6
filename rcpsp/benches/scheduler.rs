use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use rcpsp::{
    build_schedule, compute_critical_path, psp_gen::random_problem, random_restart, tabu_search,
    SearchOptions, TabuOptions,
};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");
    group.sample_size(50);
    group.sampling_mode(criterion::SamplingMode::Flat);

    for jobs in [30, 60, 120] {
        let mut rng = StdRng::seed_from_u64(jobs as u64);
        let problem = random_problem(&mut rng, jobs).unwrap();
        let permutation: Vec<usize> = (1..=jobs + 1).collect();

        group.bench_with_input(BenchmarkId::new("sgs", jobs), &permutation, |b, permutation| {
            b.iter(|| build_schedule(&problem, permutation).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("cpm", jobs), &problem, |b, problem| {
            b.iter(|| compute_critical_path(problem).unwrap())
        });

        for parallel in [false, true] {
            let mode = if parallel { "parallel" } else { "single" };

            let options = SearchOptions {
                number_of_iterations: 200,
                parallel,
                seed: Some(0),
                stop_at_lower_bound: false,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("random_restart_{mode}"), jobs),
                &options,
                |b, options| b.iter(|| random_restart(&problem, options).unwrap()),
            );

            let options = TabuOptions {
                number_of_iterations: 200,
                max_iter_since_best: 20,
                tabu_list_size: 15,
                swap_range: 10,
                parallel,
                seed: Some(0),
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("tabu_{mode}"), jobs),
                &options,
                |b, options| b.iter(|| tabu_search(&problem, options).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
