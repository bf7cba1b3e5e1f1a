//! Configuration system for ultpit.
//!
//! A run is described by one parameter document: the block grid, how to read
//! block values, the slope precedence, and which optimization engine to use.
//! Documents may be JSON, TOML or YAML; [`UltpitConfig::load`] picks the
//! parser from the file extension.
//!
//! # Examples
//!
//! ```
//! use ultpit_config::{EngineKind, UltpitConfig};
//!
//! let config = UltpitConfig::from_json_str(r#"{
//!     "grid": {
//!         "num_x": 10, "num_y": 10, "num_z": 5,
//!         "min_x": 5.0, "min_y": 5.0, "min_z": 5.0,
//!         "siz_x": 10.0, "siz_y": 10.0, "siz_z": 10.0
//!     },
//!     "precedence": { "method": "bench", "slope": 45.0, "num_benches": 4 },
//!     "optimization": { "engine": "lerchs_grossmann" }
//! }"#).unwrap();
//!
//! assert_eq!(config.grid.block_count(), 500);
//! assert_eq!(config.optimization.engine, EngineKind::LerchsGrossmann);
//! assert!(config.validate().is_ok());
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use ultpit_core::coded::{self, Coded};
use ultpit_core::{Grid, PrecedenceParams, UltpitError};

/// Precision used when none, or a non-positive one, is configured.
pub const DEFAULT_PRECISION: f64 = 100.0;

/// Default wall-clock limit for an external max-flow program.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3600;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for UltpitError {
    fn from(err: ConfigError) -> Self {
        UltpitError::Config(err.to_string())
    }
}

/// Serialization format of a parameter document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFormat {
    #[default]
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Main run configuration.
///
/// The grid may also be given inside the `input` section, the layout of
/// older parameter files.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", try_from = "ConfigDocument")]
pub struct UltpitConfig {
    /// Block grid geometry.
    pub grid: Grid,

    /// Block value input layout.
    #[serde(default)]
    pub input: InputConfig,

    /// Slope precedence.
    #[serde(default)]
    pub precedence: PrecedenceParams,

    /// Engine selection.
    #[serde(default)]
    pub optimization: OptimizationConfig,
}

/// Parameter document as written, before the grid is located.
#[derive(Deserialize)]
struct ConfigDocument {
    grid: Option<Grid>,
    input: Option<InputDocument>,
    #[serde(default)]
    precedence: PrecedenceParams,
    #[serde(default)]
    optimization: OptimizationConfig,
}

#[derive(Deserialize)]
struct InputDocument {
    #[serde(default, alias = "type")]
    format: InputFormat,
    #[serde(default = "default_ebv_column")]
    ebv_column: usize,
    grid: Option<Grid>,
}

impl TryFrom<ConfigDocument> for UltpitConfig {
    type Error = String;

    fn try_from(doc: ConfigDocument) -> Result<Self, Self::Error> {
        let (input, nested_grid) = match doc.input {
            Some(input) => (
                InputConfig {
                    format: input.format,
                    ebv_column: input.ebv_column,
                },
                input.grid,
            ),
            None => (InputConfig::default(), None),
        };
        let grid = match (doc.grid, nested_grid) {
            (Some(_), Some(_)) => {
                return Err("grid given both at the top level and under input".to_string())
            }
            (Some(grid), None) | (None, Some(grid)) => grid,
            (None, None) => return Err("missing field `grid`".to_string()),
        };
        Ok(Self {
            grid,
            input,
            precedence: doc.precedence,
            optimization: doc.optimization,
        })
    }
}

impl Default for UltpitConfig {
    fn default() -> Self {
        Self {
            grid: Grid::new([60, 60, 13], [5.0, 5.0, 5.0], [10.0, 10.0, 10.0]),
            input: InputConfig::default(),
            precedence: PrecedenceParams::default(),
            optimization: OptimizationConfig::default(),
        }
    }
}

impl UltpitConfig {
    /// Creates a configuration for `grid` with every other section defaulted.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    /// Loads configuration from a file, choosing the parser by extension.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, has an unknown extension or
    /// does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => Self::from_json_file(path),
            ConfigFormat::Toml => Self::from_toml_file(path),
            ConfigFormat::Yaml => Self::from_yaml_file(path),
        }
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Renders the configuration as a document in `format`.
    pub fn to_string_as(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        Ok(match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }

    /// The default parameter document as pretty JSON.
    pub fn default_json() -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Sets the precedence slope and bench count.
    pub fn with_precedence(mut self, slope: f64, num_benches: u32) -> Self {
        self.precedence = PrecedenceParams::new(slope, num_benches);
        self
    }

    /// Sets the optimization engine.
    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.optimization.engine = engine;
        self
    }

    /// Sets the external max-flow program.
    pub fn with_dimacs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.optimization.dimacs_path = Some(path.into());
        self
    }

    /// Checks every section for values the pipeline can't run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grid;
        if g.num_x == 0 || g.num_y == 0 || g.num_z == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid dimensions must be positive: {} x {} x {}",
                g.num_x, g.num_y, g.num_z
            )));
        }
        if !(g.siz_x > 0.0 && g.siz_y > 0.0 && g.siz_z > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "block sizes must be positive: {} x {} x {}",
                g.siz_x, g.siz_y, g.siz_z
            )));
        }
        if self.input.ebv_column == 0 {
            return Err(ConfigError::Invalid(
                "ebv_column is 1-based and must be at least 1".to_string(),
            ));
        }
        self.precedence
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.optimization.validate()
    }
}

/// Layout of the block value file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InputConfig {
    /// Text layout of the value stream.
    #[serde(default)]
    pub format: InputFormat,

    /// 1-based column holding the economic value in GEOEAS files.
    #[serde(default = "default_ebv_column")]
    pub ebv_column: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            format: InputFormat::default(),
            ebv_column: default_ebv_column(),
        }
    }
}

fn default_ebv_column() -> usize {
    1
}

/// Text layout of block values.
///
/// Older parameter files give the layout as `"type": 1` (GEOEAS) or
/// `"type": 2` (plain).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// One number per line.
    #[default]
    Plain,
    /// GSLIB GEOEAS file: title, column count, column names, then rows.
    Geoeas,
}

impl Coded for InputFormat {
    const EXPECTING: &'static str = "input format `plain` or `geoeas`, or code 1 or 2";

    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Geoeas),
            2 => Some(Self::Plain),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "plain" => Some(Self::Plain),
            "geoeas" => Some(Self::Geoeas),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for InputFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        coded::deserialize(deserializer)
    }
}

/// Optimization engine family.
///
/// Read by name (`pseudoflow` is accepted for `max_flow`) or by the codes
/// 1, 2 and 3 of older parameter files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Native normalized-tree solver.
    #[default]
    LerchsGrossmann,
    /// External max-flow program fed a DIMACS problem.
    Dimacs,
    /// In-process max-flow solver.
    MaxFlow,
}

impl Coded for EngineKind {
    const EXPECTING: &'static str =
        "engine `lerchs_grossmann`, `dimacs` or `max_flow`, or code 1, 2 or 3";

    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::LerchsGrossmann),
            2 => Some(Self::Dimacs),
            3 => Some(Self::MaxFlow),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "lerchs_grossmann" => Some(Self::LerchsGrossmann),
            "dimacs" => Some(Self::Dimacs),
            "max_flow" | "pseudoflow" => Some(Self::MaxFlow),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for EngineKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        coded::deserialize(deserializer)
    }
}

/// Which side of the minimum cut an external program lists in its `n` lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CutSide {
    #[default]
    Source,
    Sink,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OptimizationConfig {
    #[serde(default)]
    pub engine: EngineKind,

    /// External max-flow executable, required by [`EngineKind::Dimacs`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimacs_path: Option<PathBuf>,

    /// Extra arguments for the external executable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimacs_args: Vec<String>,

    /// Wall-clock limit for one external solve.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Scale from block values to integer flow capacities.
    #[serde(default = "default_precision")]
    pub precision: f64,

    /// Side of the cut reported by the external program.
    #[serde(default)]
    pub reported_side: CutSide,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            dimacs_path: None,
            dimacs_args: Vec::new(),
            timeout_seconds: default_timeout_seconds(),
            precision: default_precision(),
            reported_side: CutSide::default(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_precision() -> f64 {
    DEFAULT_PRECISION
}

impl OptimizationConfig {
    /// Configured precision, or [`DEFAULT_PRECISION`] when it is not positive.
    pub fn effective_precision(&self) -> f64 {
        if self.precision > 0.0 {
            self.precision
        } else {
            DEFAULT_PRECISION
        }
    }

    /// Returns the external solve time limit as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the DIMACS engine has no program
    /// or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine == EngineKind::Dimacs && self.dimacs_path.is_none() {
            return Err(ConfigError::Invalid(
                "dimacs engine requires dimacs_path".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
