use crate::evaluation::Measurement;
use crate::evolution::Individual;
use crate::export::ReportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "tag,gen,idx,max_iter,fps_err,gpu_time_ms,boundary,density,rank";

/// Rank column value for per-evaluation rows, which are not ranked yet
const UNRANKED: i64 = -1;

/// Comma-separated log of a tuning run.
///
/// `EVAL` rows are written for every evaluation, `FRONT` rows for every rank-0
/// individual once a generation has been fully evaluated. Objectives are
/// always written in measured polarity.
pub struct RunLog<W: Write = BufWriter<File>> {
    writer: W,
}

impl RunLog<BufWriter<File>> {
    /// Creates (or truncates) the log file and writes the header.
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(mut writer: W) -> Result<Self, ReportError> {
        writeln!(writer, "{}", HEADER)?;
        Ok(Self { writer })
    }

    pub fn eval_row(
        &mut self,
        generation: usize,
        slot: usize,
        genome: u32,
        measurement: &Measurement,
    ) -> Result<(), ReportError> {
        self.row(
            "EVAL",
            generation,
            slot,
            genome,
            [
                measurement.fps_error,
                measurement.cost_ms,
                measurement.boundary,
                measurement.density,
            ],
            UNRANKED,
        )
    }

    pub fn front_row(
        &mut self,
        generation: usize,
        slot: usize,
        individual: &Individual,
    ) -> Result<(), ReportError> {
        self.row(
            "FRONT",
            generation,
            slot,
            individual.genome,
            individual.raw_objectives(),
            individual.rank as i64,
        )
    }

    fn row(
        &mut self,
        tag: &str,
        generation: usize,
        slot: usize,
        genome: u32,
        values: [f64; 4],
        rank: i64,
    ) -> Result<(), ReportError> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{}",
            tag, generation, slot, genome, values[0], values[1], values[2], values[3], rank
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(mut self) -> Result<W, ReportError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
