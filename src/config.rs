use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Top-level configuration for a tuning run, loaded from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub ga: GaConfig,
    pub render: RenderConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Parameters of the evolutionary optimizer.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GaConfig {
    /// Number of individuals per generation, constant for the whole run
    pub population_size: usize,
    /// Lower bound (inclusive) of the iteration budget genome
    pub min_iterations: u32,
    /// Upper bound (inclusive) of the iteration budget genome
    pub max_iterations: u32,
    /// Probability that a freshly selected child gets its genome perturbed
    pub mutation_probability: f64,
    /// Magnitude of the uniform integer perturbation `[-delta, delta]`
    pub mutation_delta: u32,
    /// How many generations the headless host runs before stopping
    pub num_generations: usize,
    /// Optional seed for a reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Ambient state handed to the evaluator alongside each genome.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RenderConfig {
    pub target_fps: f64,
    pub offscreen_width: usize,
    pub offscreen_height: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    /// Width over height of the presentation surface, used for the pixel mapping
    pub aspect_ratio: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ReportConfig {
    pub log_path: String,
    #[serde(default)]
    pub summary_path: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_path: "run_log.csv".to_string(),
            summary_path: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Checks every start-time constant. The optimizer assumes a validated config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ga = &self.ga;
        if ga.population_size == 0 {
            return Err(invalid("ga.population_size", "must be at least 1"));
        }
        if ga.min_iterations == 0 {
            return Err(invalid("ga.min_iterations", "must be at least 1"));
        }
        if ga.min_iterations > ga.max_iterations {
            return Err(invalid(
                "ga.max_iterations",
                format!(
                    "must not be below min_iterations ({} > {})",
                    ga.min_iterations, ga.max_iterations
                ),
            ));
        }
        if !(0.0..=1.0).contains(&ga.mutation_probability) {
            return Err(invalid(
                "ga.mutation_probability",
                format!("{} is outside [0, 1]", ga.mutation_probability),
            ));
        }

        let render = &self.render;
        if !render.target_fps.is_finite() || render.target_fps <= 0.0 {
            return Err(invalid("render.target_fps", "must be a positive number"));
        }
        if render.offscreen_width < 2 || render.offscreen_height < 2 {
            return Err(invalid(
                "render.offscreen_width/offscreen_height",
                format!(
                    "{}x{} is below the 2x2 minimum",
                    render.offscreen_width, render.offscreen_height
                ),
            ));
        }
        if !render.zoom.is_finite() || render.zoom <= 0.0 {
            return Err(invalid("render.zoom", "must be a positive number"));
        }
        if !render.aspect_ratio.is_finite() || render.aspect_ratio <= 0.0 {
            return Err(invalid("render.aspect_ratio", "must be a positive number"));
        }
        if !render.center_x.is_finite() || !render.center_y.is_finite() {
            return Err(invalid("render.center_x/center_y", "must be finite"));
        }

        if self.report.log_path.trim().is_empty() {
            return Err(invalid("report.log_path", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}
