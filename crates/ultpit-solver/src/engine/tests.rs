//! Tests for engine construction.

use ultpit_config::{CutSide, EngineKind, OptimizationConfig};

use super::*;

fn config(engine: EngineKind) -> OptimizationConfig {
    OptimizationConfig {
        engine,
        ..OptimizationConfig::default()
    }
}

#[test]
fn test_build_each_engine() {
    let ctx = EngineContext::new("blocks.txt");
    let engine = build_engine(&config(EngineKind::LerchsGrossmann), &ctx).unwrap();
    assert_eq!(engine.engine_name(), "lerchs_grossmann");

    let engine = build_engine(&config(EngineKind::MaxFlow), &ctx).unwrap();
    assert_eq!(engine.engine_name(), "max_flow");

    let mut dimacs = config(EngineKind::Dimacs);
    dimacs.dimacs_path = Some("hpf".into());
    dimacs.reported_side = CutSide::Sink;
    let engine = build_engine(&dimacs, &ctx).unwrap();
    assert_eq!(engine.engine_name(), "dimacs");
}

#[test]
fn test_dimacs_requires_program() {
    let err = build_engine(&config(EngineKind::Dimacs), &EngineContext::default()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidProblem(_)));
}

#[test]
fn test_engines_agree_on_small_problem() {
    // 0 and 1 share support 2; 3 is a lone negative block.
    let mut pre = Precedence::with_block_count(4);
    let k = pre.add_definition(vec![2]);
    pre.set_key(0, Some(k));
    let k = pre.add_definition(vec![1]);
    pre.set_key(1, Some(k));
    let values = [3.0, 3.0, -4.0, -1.0];

    let ctx = EngineContext::default();
    for kind in [EngineKind::LerchsGrossmann, EngineKind::MaxFlow] {
        let mut engine = build_engine(&config(kind), &ctx).unwrap();
        let selection = engine.solve(&values, &pre).unwrap();
        assert_eq!(selection, vec![true, true, true, false], "{kind:?}");
    }
}

#[test]
fn test_check_problem_rejects_bad_offsets() {
    let pre = Precedence::from_parts(vec![None, Some(0)], vec![vec![1]]);
    assert!(check_problem(&[1.0, 2.0], &pre).is_err());
    assert!(check_problem(&[1.0, f64::INFINITY], &Precedence::with_block_count(2)).is_err());
    assert!(check_problem(&[1.0, 2.0], &Precedence::with_block_count(2)).is_ok());
}
