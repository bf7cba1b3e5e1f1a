//! Tests for run configuration.

use std::io::Write;

use ultpit_core::PrecedenceMethod;

use super::*;

const GRID_JSON: &str = r#"
    "grid": {
        "num_x": 4, "num_y": 3, "num_z": 2,
        "min_x": 0.5, "min_y": 0.5, "min_z": 0.5,
        "siz_x": 1.0, "siz_y": 1.0, "siz_z": 1.0
    }
"#;

#[test]
fn test_json_parsing_with_defaults() {
    let config = UltpitConfig::from_json_str(&format!("{{{GRID_JSON}}}")).unwrap();
    assert_eq!(config.grid.block_count(), 24);
    assert_eq!(config.input, InputConfig::default());
    assert_eq!(config.precedence, PrecedenceParams::default());
    assert_eq!(config.optimization.engine, EngineKind::LerchsGrossmann);
    assert_eq!(config.optimization.precision, 100.0);
    assert_eq!(config.optimization.timeout_seconds, 3600);
    assert_eq!(config.optimization.reported_side, CutSide::Source);
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        [grid]
        num_x = 2
        num_y = 2
        num_z = 2
        min_x = 0.0
        min_y = 0.0
        min_z = 0.0
        siz_x = 1.0
        siz_y = 1.0
        siz_z = 1.0

        [input]
        format = "geoeas"
        ebv_column = 4

        [precedence]
        slope = 60.0
        num_benches = 1

        [optimization]
        engine = "dimacs"
        dimacs_path = "/usr/local/bin/hpf"
        dimacs_args = ["-q"]
        timeout_seconds = 30
        reported_side = "sink"
    "#;

    let config = UltpitConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.input.format, InputFormat::Geoeas);
    assert_eq!(config.input.ebv_column, 4);
    assert_eq!(config.precedence.slope, 60.0);
    assert_eq!(config.precedence.method, PrecedenceMethod::Bench);
    assert_eq!(config.optimization.engine, EngineKind::Dimacs);
    assert_eq!(config.optimization.dimacs_args, vec!["-q".to_string()]);
    assert_eq!(config.optimization.timeout(), Duration::from_secs(30));
    assert_eq!(config.optimization.reported_side, CutSide::Sink);
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        grid:
          num_x: 3
          num_y: 3
          num_z: 2
          min_x: 0.0
          min_y: 0.0
          min_z: 0.0
          siz_x: 1.0
          siz_y: 1.0
          siz_z: 1.0
        optimization:
          engine: max_flow
          precision: 10.0
    "#;

    let config = UltpitConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.optimization.engine, EngineKind::MaxFlow);
    assert_eq!(config.optimization.effective_precision(), 10.0);
}

#[test]
fn test_pseudoflow_alias() {
    let json = format!(r#"{{{GRID_JSON}, "optimization": {{ "engine": "pseudoflow" }}}}"#);
    let config = UltpitConfig::from_json_str(&json).unwrap();
    assert_eq!(config.optimization.engine, EngineKind::MaxFlow);
}

#[test]
fn test_coded_document_layout() {
    let json = r#"{
        "input": {
            "type": 1,
            "grid": {
                "num_x": 60, "min_x": 810.0, "siz_x": 20.0,
                "num_y": 60, "min_y": 110.0, "siz_y": 20.0,
                "num_z": 13, "min_z": 110.0, "siz_z": 20.0
            },
            "ebv_column": 3
        },
        "precedence": { "method": 1, "slope": 45.0, "num_benches": 8 },
        "optimization": { "engine": 1 }
    }"#;

    let config = UltpitConfig::from_json_str(json).unwrap();
    assert_eq!(config.grid.block_count(), 60 * 60 * 13);
    assert_eq!(config.grid.min_x, 810.0);
    assert_eq!(config.input.format, InputFormat::Geoeas);
    assert_eq!(config.input.ebv_column, 3);
    assert_eq!(config.precedence.method, PrecedenceMethod::Bench);
    assert_eq!(config.optimization.engine, EngineKind::LerchsGrossmann);
    assert!(config.validate().is_ok());
}

#[test]
fn test_engine_codes() {
    for (code, engine) in [
        (1, EngineKind::LerchsGrossmann),
        (2, EngineKind::Dimacs),
        (3, EngineKind::MaxFlow),
    ] {
        let json = format!(r#"{{{GRID_JSON}, "optimization": {{ "engine": {code} }}}}"#);
        assert_eq!(UltpitConfig::from_json_str(&json).unwrap().optimization.engine, engine);
    }

    let toml = "engine = 3";
    let opt: OptimizationConfig = toml::from_str(toml).unwrap();
    assert_eq!(opt.engine, EngineKind::MaxFlow);

    for bad in ["4", "0", "-1", "\"hpf\""] {
        let json = format!(r#"{{{GRID_JSON}, "optimization": {{ "engine": {bad} }}}}"#);
        assert!(UltpitConfig::from_json_str(&json).is_err(), "{bad}");
    }
}

#[test]
fn test_grid_location() {
    let err = UltpitConfig::from_json_str("{}").unwrap_err();
    assert!(err.to_string().contains("grid"));

    let json = format!(r#"{{{GRID_JSON}, "input": {{{GRID_JSON}}}}}"#);
    let err = UltpitConfig::from_json_str(&json).unwrap_err();
    assert!(err.to_string().contains("both"));

    let json = format!(r#"{{"input": {{ "type": 2, {GRID_JSON}}}}}"#);
    let config = UltpitConfig::from_json_str(&json).unwrap();
    assert_eq!(config.grid.num_x, 4);
    assert_eq!(config.input.format, InputFormat::Plain);
    assert_eq!(config.input.ebv_column, 1);
}

#[test]
fn test_non_positive_precision_falls_back() {
    let mut opt = OptimizationConfig::default();
    opt.precision = 0.0;
    assert_eq!(opt.effective_precision(), DEFAULT_PRECISION);
    opt.precision = -3.0;
    assert_eq!(opt.effective_precision(), DEFAULT_PRECISION);
}

#[test]
fn test_validate_rejects_bad_values() {
    let base = UltpitConfig::new(Grid::unit(2, 2, 2));
    assert!(base.validate().is_ok());

    let config = base.clone().with_precedence(85.0, 1);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let config = base.clone().with_precedence(45.0, 16);
    assert!(config.validate().is_err());

    let config = UltpitConfig::new(Grid::unit(0, 2, 2));
    assert!(config.validate().is_err());

    let config = UltpitConfig::new(Grid::new([2, 2, 2], [0.0; 3], [1.0, 0.0, 1.0]));
    assert!(config.validate().is_err());

    let config = base.clone().with_engine(EngineKind::Dimacs);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("dimacs_path"));
    assert!(config.with_dimacs_path("hpf").validate().is_ok());

    let mut config = base;
    config.input.ebv_column = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_default_document_round_trips() {
    let json = UltpitConfig::default_json();
    let config = UltpitConfig::from_json_str(&json).unwrap();
    assert_eq!(config, UltpitConfig::default());
    assert_eq!(config.grid.num_x, 60);
    assert_eq!(config.precedence.num_benches, 8);

    let toml = config.to_string_as(ConfigFormat::Toml).unwrap();
    assert_eq!(UltpitConfig::from_toml_str(&toml).unwrap(), config);

    let yaml = config.to_string_as(ConfigFormat::Yaml).unwrap();
    assert_eq!(UltpitConfig::from_yaml_str(&yaml).unwrap(), config);
}

#[test]
fn test_load_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{{{GRID_JSON}}}").unwrap();

    let config = UltpitConfig::load(&path).unwrap();
    assert_eq!(config.grid.num_x, 4);

    let err = UltpitConfig::load(dir.path().join("params.ini")).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));

    let err = UltpitConfig::load(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_config_error_converts_to_config_kind() {
    let err: UltpitError = ConfigError::Invalid("bad".to_string()).into();
    assert!(matches!(err, UltpitError::Config(_)));
}
