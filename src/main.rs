use fractal_lod_tuner::config::Config;
use fractal_lod_tuner::evaluation::{MandelbrotEvaluator, Viewport};
use fractal_lod_tuner::evolution::MultiObjectiveOptimizer;
use fractal_lod_tuner::export::{write_summary_to_json, RunLog, RunSummary};
use fractal_lod_tuner::tuner::run_generation;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    log::info!("Booting fractal LOD tuner...");

    // 1. Load and Validate Configuration
    let config = match Config::load(Path::new("config.toml")) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    }
    log::info!("Configuration loaded and validated.");

    // 2. Components
    let mut log_sink = match RunLog::create(Path::new(&config.report.log_path)) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to create run log '{}': {}", config.report.log_path, e);
            process::exit(1);
        }
    };
    let mut evaluator = MandelbrotEvaluator::new(&config.render);
    let view = Viewport::from(&config.render);
    let mut optimizer = MultiObjectiveOptimizer::new(&config.ga);

    // 3. Evolutionary loop, one evaluation per step
    log::info!(
        "--- Tuning for {} generations at {}x{} (target {} fps) ---",
        config.ga.num_generations,
        config.render.offscreen_width,
        config.render.offscreen_height,
        config.render.target_fps
    );
    let mut last_generation = None;
    for _ in 0..config.ga.num_generations {
        match run_generation(&mut optimizer, &mut evaluator, &view, &mut log_sink) {
            Ok(report) => last_generation = Some(report),
            Err(e) => {
                log::error!("Failed to write run log: {}", e);
                process::exit(1);
            }
        }
    }
    log::info!("Run complete. Log written to '{}'", config.report.log_path);

    // 4. Summary of the last evaluated generation
    let Some(report) = last_generation else {
        return;
    };
    println!("\nPareto front of generation {}:", report.generation + 1);
    for member in &report.pareto_front {
        println!(
            "  max_iter={:>5} | fps err={:>8.2} | cost={:>7.3}ms | boundary={:>6} | density={:.5}",
            member.genome, member.fps_error, member.cost_ms, member.boundary, member.density
        );
    }

    if let Some(summary_path) = config.report.summary_path.clone() {
        let summary = RunSummary::new(config, report);
        match write_summary_to_json(&summary, Path::new(&summary_path)) {
            Ok(()) => log::info!("Summary written to '{}'", summary_path),
            Err(e) => {
                log::error!("Failed to write summary: {}", e);
                process::exit(1);
            }
        }
    }
}
