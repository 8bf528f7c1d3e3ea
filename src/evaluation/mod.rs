//! Evaluators turn an iteration budget into the four raw measurements the
//! optimizer ranks on.

pub mod mandelbrot;
pub mod metrics;

use crate::config::RenderConfig;
use crate::evolution::Genome;
use log::debug;
use mandelbrot::MandelbrotRenderer;

/// Camera state shared by every evaluation of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    /// Height of the visible region of the complex plane
    pub zoom: f64,
}

impl From<&RenderConfig> for Viewport {
    fn from(config: &RenderConfig) -> Self {
        Self {
            center_x: config.center_x,
            center_y: config.center_y,
            zoom: config.zoom,
        }
    }
}

/// Raw measurements of one evaluation, all non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// |achieved fps - target fps|
    pub fps_error: f64,
    /// Cost of producing the frame, in milliseconds
    pub cost_ms: f64,
    /// Structural detail: number of intensity edges in the frame
    pub boundary: f64,
    /// Tonal variance of the frame
    pub density: f64,
}

/// Anything able to score a genome under the current view.
///
/// Repeated calls with the same inputs should give comparable numbers; exact
/// determinism is not required since only relative ordering matters.
pub trait Evaluator {
    fn evaluate(&mut self, genome: Genome, view: &Viewport) -> Measurement;
}

/// Renders the Mandelbrot set offscreen and measures the frame.
pub struct MandelbrotEvaluator {
    renderer: MandelbrotRenderer,
    target_fps: f64,
}

impl MandelbrotEvaluator {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            renderer: MandelbrotRenderer::new(
                config.offscreen_width,
                config.offscreen_height,
                config.aspect_ratio,
            ),
            target_fps: config.target_fps,
        }
    }

    pub fn renderer(&self) -> &MandelbrotRenderer {
        &self.renderer
    }
}

impl Evaluator for MandelbrotEvaluator {
    fn evaluate(&mut self, genome: Genome, view: &Viewport) -> Measurement {
        let cost_ms = self.renderer.render(genome, view);
        let fps_error = (self.renderer.fps() - self.target_fps).abs();
        let pixels = self.renderer.pixels();
        let boundary =
            metrics::boundary_complexity(pixels, self.renderer.width(), self.renderer.height());
        let density = metrics::density_variance(pixels);

        debug!(
            "Evaluated max_iter={}: cost={:.3}ms fps_err={:.2} boundary={} density={:.5}",
            genome, cost_ms, fps_error, boundary, density
        );

        Measurement {
            fps_error,
            cost_ms,
            boundary: boundary as f64,
            density,
        }
    }
}
