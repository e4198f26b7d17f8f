use proptest::prelude::*;
use teoc_core::{FixedClock, MutationConfig, SimulationConfig, WorldConfig, WrapMode};
use teoc_world::{MoveOutcome, Simulation, WorldSnapshot};

fn config(seed: u64, width: u32, height: u32, population: usize) -> SimulationConfig {
    SimulationConfig {
        seed: Some(seed),
        world: WorldConfig { width, height },
        initial_population: population,
        ..Default::default()
    }
}

#[test]
fn default_world_runs_and_keeps_its_population() {
    let config = SimulationConfig {
        seed: Some(2024),
        num_ticks: 30,
        ..Default::default()
    };
    let mut sim = Simulation::new(config).unwrap().with_clock(FixedClock(17));

    let result = sim.run().unwrap();

    assert_eq!(result.population, 800);
    assert_eq!(result.census.total(), 800);
    assert!(result.stats.meetings > 0);
    assert_eq!(result.stats.pandemic_meetings, 0);
    sim.check_invariants().unwrap();
}

#[test]
fn same_seed_and_clock_replay_identically() {
    let run = || {
        let mut sim = Simulation::new(config(99, 30, 20, 150))
            .unwrap()
            .with_clock(FixedClock(160));
        for _ in 0..20 {
            sim.tick().unwrap();
        }
        sim.snapshot()
    };

    let a = run();
    let b = run();
    assert_eq!(a.organisms, b.organisms);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn snapshot_survives_disk_round_trip() {
    let mut sim = Simulation::new(config(5, 12, 12, 30)).unwrap();
    sim.tick().unwrap();
    let path = std::env::temp_dir().join(format!("teoc-world-{}.bin", std::process::id()));

    sim.snapshot().save(&path).unwrap();
    let loaded = WorldSnapshot::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let restored = Simulation::restore(config(5, 12, 12, 30), loaded).unwrap();
    restored.check_invariants().unwrap();
    assert_eq!(restored.tick_count(), 1);
    assert_eq!(restored.population(), 30);
}

#[test]
fn legacy_wrap_world_runs() {
    let config = SimulationConfig {
        wrap_mode: WrapMode::Legacy,
        ..config(3, 10, 10, 40)
    };
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..25 {
        sim.tick().unwrap();
    }
    sim.check_invariants().unwrap();
}

#[test]
fn every_move_outcome_keeps_organisms_on_the_grid() {
    let mut sim = Simulation::new(config(12, 9, 7, 40)).unwrap();
    let ids: Vec<_> = sim.organisms().map(|(id, _)| id).collect();

    for id in ids {
        let outcome = sim.move_organism(id).unwrap();
        let position = sim.organism(id).unwrap().position;
        assert!(sim.grid().contains(position));
        match outcome {
            MoveOutcome::Moved { to, .. } | MoveOutcome::Retreated { to, .. } => {
                assert_eq!(to, position)
            }
            MoveOutcome::Met(meet) => assert_eq!(meet.donor, id),
            MoveOutcome::Stayed => {}
        }
    }
    sim.check_invariants().unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn occupancy_holds_across_ticks(
        seed in any::<u64>(),
        width in 2u32..20,
        height in 2u32..20,
        density in 0.05f64..0.9,
        now in any::<i64>(),
        incidence_per in 1u32..1_000,
    ) {
        let cells = (width * height) as usize;
        let population = ((cells as f64 * density) as usize).min(cells - 1);
        let config = SimulationConfig {
            mutation: MutationConfig { incidence_per, ..Default::default() },
            ..config(seed, width, height, population)
        };
        let mut sim = Simulation::new(config).unwrap().with_clock(FixedClock(now));

        for _ in 0..10 {
            sim.tick().unwrap();
            prop_assert!(sim.check_invariants().is_ok());
        }
        prop_assert_eq!(sim.population(), population);
    }
}
