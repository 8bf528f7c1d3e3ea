//! Reporting for a tuning run.
//!
//! The row-oriented run log records every evaluation and every generation's
//! Pareto front as it happens; the JSON summary snapshots the configuration and
//! the final front once the run is over.

pub mod run_log;

use crate::config::Config;
use crate::evolution::Individual;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use run_log::RunLog;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// End-of-run export with enough metadata to reproduce the run.
#[derive(Serialize, Deserialize, Debug)]
pub struct RunSummary {
    /// Schema version for forward/backward compatibility
    pub schema_version: String,
    /// Unix timestamp when the summary was generated
    pub generated_at: u64,
    /// Snapshot of the configuration the run used
    pub config: Config,
    /// Number of fully evaluated generations
    pub generations: usize,
    /// The last fully evaluated generation
    pub last_generation: GenerationReport,
}

/// What one fully evaluated generation looked like right before it was replaced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    /// Rank-0 members, in population order
    pub pareto_front: Vec<FrontMember>,
    /// Genome with the lowest frame-rate error
    pub best_genome: u32,
    pub best_fps_error: f64,
}

impl GenerationReport {
    /// # Arguments
    /// * `generation` - Index of the generation that was evaluated
    /// * `front` - Rank-0 individuals with their slot index
    /// * `best` - Individual with the lowest frame-rate error
    pub fn new(generation: usize, front: &[(usize, &Individual)], best: &Individual) -> Self {
        Self {
            generation,
            pareto_front: front
                .iter()
                .map(|(slot, individual)| FrontMember::new(*slot, individual))
                .collect(),
            best_genome: best.genome,
            best_fps_error: best.objectives[0],
        }
    }
}

/// One Pareto-front member with its objectives in measured polarity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrontMember {
    pub slot: usize,
    pub genome: u32,
    pub fps_error: f64,
    pub cost_ms: f64,
    pub boundary: f64,
    pub density: f64,
    /// `None` for boundary members, whose crowding distance is infinite
    pub crowding_distance: Option<f64>,
}

impl FrontMember {
    pub fn new(slot: usize, individual: &Individual) -> Self {
        let [fps_error, cost_ms, boundary, density] = individual.raw_objectives();
        Self {
            slot,
            genome: individual.genome,
            fps_error,
            cost_ms,
            boundary,
            density,
            crowding_distance: Some(individual.crowding_distance).filter(|d| d.is_finite()),
        }
    }
}

impl RunSummary {
    /// Creates a summary around the last fully evaluated generation.
    pub fn new(config: Config, last_generation: GenerationReport) -> Self {
        Self {
            schema_version: "1.0.0".to_string(),
            generated_at: chrono::Utc::now().timestamp() as u64,
            config,
            generations: last_generation.generation + 1,
            last_generation,
        }
    }
}

/// Writes the run summary to a JSON file.
pub fn write_summary_to_json(summary: &RunSummary, output_path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// Reads a run summary back from a JSON file.
pub fn read_summary_from_json(input_path: &Path) -> Result<RunSummary, ReportError> {
    let content = std::fs::read_to_string(input_path)?;
    let summary: RunSummary = serde_json::from_str(&content)?;
    Ok(summary)
}
