use levelforge_core::{GeneratorKnobs, PlayerSpec};
use levelforge_system_generator::LevelGenerator;

/// Concurrent calls with disjoint seeds must not affect each other's
/// outputs: each thread's result must match what the same call produces
/// when run alone.
#[test]
fn concurrent_calls_with_disjoint_seeds_are_independent() {
    let generator = LevelGenerator::new(PlayerSpec::default());
    let knobs = GeneratorKnobs::default();
    let seeds = [10u64, 20, 30, 40, 50, 60, 70, 80];

    let expected: Vec<_> = seeds
        .iter()
        .map(|&seed| generator.generate(seed, knobs).unwrap())
        .collect();

    let concurrent = std::thread::scope(|scope| {
        let handles: Vec<_> = seeds
            .iter()
            .map(|&seed| scope.spawn(move || generator.generate(seed, knobs).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });

    for (want, got) in expected.iter().zip(concurrent.iter()) {
        assert_eq!(want.grid, got.grid);
        assert_eq!(want.footholds, got.footholds);
    }
}
