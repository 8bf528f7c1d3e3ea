use crate::evaluation::Viewport;
use rayon::prelude::*;
use std::time::Instant;

/// Floor on the measured frame cost, keeps the fps estimate finite on very fast renders
const MIN_FRAME_MS: f64 = 1e-3;

/// Squared escape radius of the iteration `z <- z^2 + c`
const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Headless escape-time renderer writing one 8-bit intensity per pixel.
///
/// Row 0 is the bottom of the view. Each pixel stores `round(255 * i / max_iter)`
/// where `i` is the iteration at which the orbit escaped (or `max_iter`).
pub struct MandelbrotRenderer {
    width: usize,
    height: usize,
    aspect_ratio: f64,
    pixels: Vec<u8>,
    last_cost_ms: f64,
}

impl MandelbrotRenderer {
    /// # Arguments
    /// * `width`, `height` - Resolution of the offscreen buffer used for metrics
    /// * `aspect_ratio` - Width over height of the presentation surface, stretches the real axis
    ///
    /// # Panics
    /// If `width` or `height` is zero. `Config::validate` requires at least 2x2.
    pub fn new(width: usize, height: usize, aspect_ratio: f64) -> Self {
        assert!(
            width > 0 && height > 0,
            "offscreen buffer must not be empty, got {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            aspect_ratio,
            pixels: vec![0; width * height],
            last_cost_ms: 0.0,
        }
    }

    /// Renders the view with the given iteration budget and times it.
    ///
    /// # Returns
    /// * `f64` - Wall-clock cost of the render in milliseconds
    pub fn render(&mut self, max_iter: u32, view: &Viewport) -> f64 {
        let start = Instant::now();
        let (width, height, aspect) = (self.width, self.height, self.aspect_ratio);
        let max_iter = max_iter.max(1);

        self.pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let v = (y as f64 + 0.5) / height as f64;
                let cy = (v - 0.5) * view.zoom + view.center_y;
                for (x, pixel) in row.iter_mut().enumerate() {
                    let u = (x as f64 + 0.5) / width as f64;
                    let cx = (u - 0.5) * view.zoom * aspect + view.center_x;
                    let t = escape_time(cx, cy, max_iter) as f64 / max_iter as f64;
                    *pixel = (t * 255.0).round() as u8;
                }
            });

        self.last_cost_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.last_cost_ms
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn last_cost_ms(&self) -> f64 {
        self.last_cost_ms
    }

    /// Frame rate the last render would sustain.
    pub fn fps(&self) -> f64 {
        1000.0 / self.last_cost_ms.max(MIN_FRAME_MS)
    }
}

/// Iterations before the orbit of `c` leaves the escape radius, capped at `max_iter`.
fn escape_time(cx: f64, cy: f64, max_iter: u32) -> u32 {
    let (mut zx, mut zy) = (0.0f64, 0.0f64);
    let mut i = 0;
    while i < max_iter && zx * zx + zy * zy < ESCAPE_RADIUS_SQ {
        let next_x = zx * zx - zy * zy + cx;
        zy = 2.0 * zx * zy + cy;
        zx = next_x;
        i += 1;
    }
    i
}
