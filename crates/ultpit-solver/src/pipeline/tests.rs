//! Tests for the optimization pipeline.

use proptest::prelude::*;
use ultpit_core::Precedence;
use ultpit_test::deposit::{ore_body, seeded_values};
use ultpit_test::oracle::max_closure_value;
use ultpit_test::scenario::{self, Scenario};

use super::*;

const IN_PROCESS: [EngineKind; 2] = [EngineKind::LerchsGrossmann, EngineKind::MaxFlow];

fn grid_of(s: &Scenario) -> Grid {
    Grid::unit(s.dims[0], s.dims[1], s.dims[2])
}

fn values_of(s: &Scenario) -> BlockValues {
    BlockValues::new(vec![s.values.clone()], s.values.len()).unwrap()
}

fn full_precedence(grid: &Grid, params: &PrecedenceParams) -> Precedence {
    generate(grid, params, &Mask::full(grid.block_count())).unwrap()
}

fn supports_of(pre: &Precedence) -> Vec<Vec<usize>> {
    (0..pre.block_count())
        .map(|i| pre.supports(i).collect())
        .collect()
}

#[test]
fn test_two_by_two_exact_selection() {
    let s = scenario::two_by_two();
    let values = values_of(&s);
    for kind in IN_PROCESS {
        let pipeline =
            Pipeline::new(grid_of(&s), PrecedenceParams::new(s.slope, s.benches)).with_engine(kind);
        let pit = pipeline.run(&values).unwrap();
        assert_eq!(Some(pit.selection(0).to_vec()), s.expected, "{kind:?}");
        assert_eq!(pit.pit_value(&values, 0), s.optimum);
        assert_eq!(pit.relevant_blocks, 2);
        assert_eq!(pit.reports[0].blocks, 2);
        assert_eq!(pit.reports[0].value, 7.0);
    }
}

#[test]
fn test_engines_reach_same_value() {
    let s = scenario::three_by_three();
    let values = values_of(&s);
    let grid = grid_of(&s);
    let params = PrecedenceParams::new(s.slope, s.benches);
    let pre = full_precedence(&grid, &params);

    for kind in IN_PROCESS {
        let pit = Pipeline::new(grid, params).with_engine(kind).run(&values).unwrap();
        assert_eq!(pit.pit_value(&values, 0), s.optimum, "{kind:?}");
        assert!(pre.is_closed(pit.selection(0)), "{kind:?}");
    }
}

#[cfg(unix)]
#[test]
fn test_external_engine_in_pipeline() {
    // A stand-in program that reports the source side as blocks 1 and 2.
    let s = scenario::two_by_two();
    let optimization = OptimizationConfig {
        engine: EngineKind::Dimacs,
        dimacs_path: Some("sh".into()),
        dimacs_args: vec![
            "-c".to_string(),
            "cat > /dev/null; printf 'n 1\\nn 2\\nn 3\\n'".to_string(),
        ],
        ..OptimizationConfig::default()
    };
    let pit = Pipeline::new(grid_of(&s), PrecedenceParams::new(s.slope, s.benches))
        .with_optimization(optimization)
        .run(&values_of(&s))
        .unwrap();
    assert_eq!(Some(pit.selection(0).to_vec()), s.expected);
    assert_eq!(pit.reports[0].engine, "dimacs");
}

#[test]
fn test_deep_column() {
    let s = scenario::deep_column();
    let pit = Pipeline::new(grid_of(&s), PrecedenceParams::new(s.slope, s.benches))
        .run(&values_of(&s))
        .unwrap();
    assert_eq!(Some(pit.selection(0).to_vec()), s.expected);
}

#[test]
fn test_realizations_are_solved_independently() {
    let grid = Grid::unit(1, 1, 2);
    let values = BlockValues::new(vec![vec![5.0, -2.0], vec![1.0, -2.0]], 2).unwrap();
    let pit = Pipeline::new(grid, PrecedenceParams::new(60.0, 1))
        .run(&values)
        .unwrap();
    assert_eq!(pit.realization_count(), 2);
    assert_eq!(pit.selection(0), &[true, true]);
    assert_eq!(pit.selection(1), &[false, false]);
    assert_eq!(pit.selected_count(0), 2);
    assert_eq!(pit.reports[1].realization, 1);
}

#[test]
fn test_air_above_ore_is_mined() {
    // The trimmed air block is pulled back in as a support of the column.
    let grid = Grid::unit(1, 1, 3);
    let values = BlockValues::new(vec![vec![4.0, -1.0, 0.0]], 3).unwrap();
    let pit = Pipeline::new(grid, PrecedenceParams::new(60.0, 1))
        .run(&values)
        .unwrap();
    assert_eq!(pit.selection(0), &[true, true, true]);
}

#[test]
fn test_value_count_mismatch() {
    let values = BlockValues::new(vec![vec![1.0; 4]], 4).unwrap();
    let err = Pipeline::new(Grid::unit(2, 2, 2), PrecedenceParams::new(60.0, 1))
        .run(&values)
        .unwrap_err();
    assert!(matches!(err, UltpitError::InputData(_)));
}

#[test]
fn test_bad_precedence_parameters() {
    let s = scenario::two_by_two();
    let err = Pipeline::new(grid_of(&s), PrecedenceParams::new(89.0, 1))
        .run(&values_of(&s))
        .unwrap_err();
    assert!(matches!(err, UltpitError::Config(_)));
}

#[derive(Debug)]
struct FailingEngine;

impl Engine for FailingEngine {
    fn engine_name(&self) -> &'static str {
        "failing"
    }

    fn solve(
        &mut self,
        _values: &[f64],
        _precedence: &Precedence,
    ) -> std::result::Result<Vec<bool>, EngineError> {
        Err(EngineError::ProcessFailed("exit status 1".to_string()))
    }
}

#[test]
fn test_engine_failure_aborts_run() {
    let s = scenario::two_by_two();
    let pipeline = Pipeline::new(grid_of(&s), PrecedenceParams::new(s.slope, s.benches));
    let err = pipeline
        .run_with(&values_of(&s), || Ok(Box::new(FailingEngine)))
        .unwrap_err();
    assert!(matches!(err, UltpitError::Engine(_)));
    assert!(err.to_string().contains("realization 0"));
}

#[test]
fn test_engine_per_realization() {
    let values = BlockValues::new(vec![vec![1.0, 1.0]; 3], 2).unwrap();
    let mut built = 0;
    Pipeline::new(Grid::unit(1, 1, 2), PrecedenceParams::new(60.0, 1))
        .run_with(&values, || {
            built += 1;
            Ok(Box::new(crate::LerchsGrossmannEngine::new()))
        })
        .unwrap();
    assert_eq!(built, 3);
}

#[test]
fn test_ore_body_is_feasible_for_all_engines() {
    let grid = Grid::unit(6, 6, 4);
    let params = PrecedenceParams::new(40.0, 2);
    let values = BlockValues::new(
        vec![ore_body(6, 6, 4, 7), ore_body(6, 6, 4, 8)],
        grid.block_count(),
    )
    .unwrap();
    let pre = full_precedence(&grid, &params);

    let mut totals = Vec::new();
    for kind in IN_PROCESS {
        let pit = Pipeline::new(grid, params).with_engine(kind).run(&values).unwrap();
        for r in 0..2 {
            assert!(pre.is_closed(pit.selection(r)), "{kind:?} realization {r}");
        }
        totals.push((pit.pit_value(&values, 0), pit.pit_value(&values, 1)));
    }
    assert_eq!(totals[0], totals[1]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_pipeline_matches_brute_force(seed in any::<u64>()) {
        let grid = Grid::unit(3, 2, 2);
        let params = PrecedenceParams::new(40.0, 1);
        let raw = seeded_values(grid.block_count(), seed, -6, 6);
        let values = BlockValues::new(vec![raw.clone()], grid.block_count()).unwrap();
        let pre = full_precedence(&grid, &params);
        let best = max_closure_value(&raw, &supports_of(&pre));

        for kind in IN_PROCESS {
            let pit = Pipeline::new(grid, params).with_engine(kind).run(&values).unwrap();
            prop_assert!(pre.is_closed(pit.selection(0)));
            prop_assert!((pit.pit_value(&values, 0) - best).abs() < 1e-9);
        }
    }
}
