use crate::evaluation::{Evaluator, Viewport};
use crate::evolution::MultiObjectiveOptimizer;
use crate::export::{GenerationReport, ReportError, RunLog};
use log::info;
use rand::Rng;
use std::io::Write;

/// Drives one full generation through the optimizer's cursor.
///
/// Every slot is evaluated exactly once and logged as an `EVAL` row. Once the
/// cursor wraps the population is ranked, the Pareto front is logged as
/// `FRONT` rows and the optimizer evolves into the next generation.
///
/// # Arguments
/// * `optimizer` - The optimizer, positioned at the start of a generation
/// * `evaluator` - Produces the four raw measurements for a genome
/// * `view` - Ambient render state passed to every evaluation
/// * `log` - Row-oriented reporting sink
///
/// # Returns
/// * `Ok(GenerationReport)` - Front and best individual of the generation just evaluated
/// * `Err(ReportError)` - If the log could not be written
pub fn run_generation<R: Rng, E: Evaluator, W: Write>(
    optimizer: &mut MultiObjectiveOptimizer<'_, R>,
    evaluator: &mut E,
    view: &Viewport,
    log: &mut RunLog<W>,
) -> Result<GenerationReport, ReportError> {
    let generation = optimizer.generation();

    loop {
        let slot = optimizer.cursor().slot();
        let genome = optimizer.current_individual().genome;
        let measurement = evaluator.evaluate(genome, view);
        optimizer.record_fitness(
            measurement.fps_error,
            measurement.cost_ms,
            measurement.boundary,
            measurement.density,
        );
        log.eval_row(generation, slot, genome, &measurement)?;

        if optimizer.advance_cursor() {
            break;
        }
    }

    optimizer.recalc_ranks();
    let front = optimizer.pareto_front();
    for (slot, individual) in &front {
        log.front_row(generation, *slot, individual)?;
    }
    let report = GenerationReport::new(generation, &front, optimizer.best());
    log.flush()?;

    info!(
        "Gen {}: Pareto front size={} | Best max_iter={} (fps err {:.2})",
        generation + 1,
        report.pareto_front.len(),
        report.best_genome,
        report.best_fps_error
    );

    optimizer.evolve();
    Ok(report)
}
