//! Property-based tests for the reactor model
//!
//! Covers: bounded fields stay in range, fuel never increases, scram and
//! auto never coexist, over arbitrary operator sequences.

use bwr_simulator_lib::noise::SeededNoise;
use bwr_simulator_lib::reactor::constants::{MAX_POWER_PERCENT, MAX_XENON_PERCENT, MIN_POWER_PERCENT};
use bwr_simulator_lib::{ReactorMode, ReactorModel, ReactorState};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Tick(f64),
    Scram,
    ResetScram,
    ToggleAuto,
    ToggleCirculation,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (-20.0f64..120.0).prop_map(Op::Tick),
        1 => Just(Op::Scram),
        1 => Just(Op::ResetScram),
        1 => Just(Op::ToggleAuto),
        1 => Just(Op::ToggleCirculation),
    ]
}

fn apply(model: &mut ReactorModel, op: &Op) {
    match op {
        Op::Tick(rods) => model.tick(*rods),
        Op::Scram => model.scram(),
        Op::ResetScram => model.reset_scram(),
        Op::ToggleAuto => {
            model.toggle_auto();
        }
        Op::ToggleCirculation => model.toggle_circulation(),
    }
}

fn assert_bounded(state: &ReactorState) -> Result<(), TestCaseError> {
    prop_assert!(state.thermal_power_percent >= MIN_POWER_PERCENT);
    prop_assert!(state.thermal_power_percent <= MAX_POWER_PERCENT);
    prop_assert!((0.0..=100.0).contains(&state.rods_position_percent));
    prop_assert!((0.0..=100.0).contains(&state.circulation_flow_percent));
    prop_assert!((0.0..=MAX_XENON_PERCENT).contains(&state.xenon_poisoning_percent));
    prop_assert!((0.0..=100.0).contains(&state.fuel_remaining_percent));
    Ok(())
}

// ── Invariants over operator sequences ───────────────────────────────

proptest! {
    /// Bounded fields stay within their domain after every operation.
    #[test]
    fn bounded_fields_stay_in_domain(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut model = ReactorModel::new(SeededNoise::from_seed(seed));
        for op in &ops {
            apply(&mut model, op);
            assert_bounded(model.state())?;
        }
    }

    /// Fuel is non-increasing across any sequence.
    #[test]
    fn fuel_never_increases(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut model = ReactorModel::new(SeededNoise::from_seed(seed));
        let mut fuel = model.state().fuel_remaining_percent;
        for op in &ops {
            apply(&mut model, op);
            let now = model.state().fuel_remaining_percent;
            prop_assert!(now <= fuel);
            fuel = now;
        }
    }

    /// Entering scram always drops auto mode.
    #[test]
    fn scram_excludes_auto(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 0..50),
    ) {
        let mut model = ReactorModel::new(SeededNoise::from_seed(seed));
        for op in &ops {
            apply(&mut model, op);
        }
        model.scram();
        prop_assert!(model.is_scrammed());
        prop_assert!(!model.is_auto());
        prop_assert!(!model.toggle_auto());
        prop_assert_eq!(model.mode(), ReactorMode::Scrammed);
    }

    /// Every scrammed tick decays power by 0.7 and pressure by 0.8.
    #[test]
    fn scram_decay_factors(
        seed in any::<u64>(),
        power in 1.0f64..120.0,
        pressure in 0i64..8000,
        ticks in 1usize..5,
    ) {
        let state = ReactorState {
            thermal_power_percent: power,
            pressure_kpa: pressure,
            mode: ReactorMode::Scrammed,
            ..ReactorState::default()
        };
        let mut model = ReactorModel::with_state(state, SeededNoise::from_seed(seed));
        for _ in 0..ticks {
            let before = model.state().clone();
            model.tick(50.0);
            let after = model.state();

            let expected_power = (before.thermal_power_percent * 0.7).max(MIN_POWER_PERCENT);
            prop_assert!((after.thermal_power_percent - expected_power).abs() < 1e-12);
            prop_assert_eq!(after.pressure_kpa, (before.pressure_kpa as f64 * 0.8) as i64);
            prop_assert_eq!(after.rods_position_percent, before.rods_position_percent);
            prop_assert_eq!(after.fuel_remaining_percent, before.fuel_remaining_percent);
        }
    }

    /// Same seed, same operator sequence, same trajectory.
    #[test]
    fn seeded_runs_are_reproducible(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..100),
    ) {
        let mut a = ReactorModel::new(SeededNoise::from_seed(seed));
        let mut b = ReactorModel::new(SeededNoise::from_seed(seed));
        for op in &ops {
            apply(&mut a, op);
            apply(&mut b, op);
        }
        prop_assert_eq!(a.state(), b.state());
    }
}
