//! Pixel metrics extracted from an 8-bit single-channel buffer.

/// Counts pixels whose value differs from their left or upper neighbour.
///
/// The first row and column have no full neighbourhood and are skipped, so a
/// `w x h` buffer contributes at most `(w - 1) * (h - 1)` edges.
pub fn boundary_complexity(pixels: &[u8], width: usize, height: usize) -> usize {
    debug_assert_eq!(pixels.len(), width * height);
    let mut edges = 0;
    for y in 1..height {
        let row = &pixels[y * width..(y + 1) * width];
        let above = &pixels[(y - 1) * width..y * width];
        for x in 1..width {
            if row[x] != row[x - 1] || row[x] != above[x] {
                edges += 1;
            }
        }
    }
    edges
}

/// Population variance of the buffer, with each value normalized to `[0, 1]`.
pub fn density_variance(pixels: &[u8]) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }
    let n = pixels.len() as f64;
    // mean from the exact integer sum, so a flat buffer has zero deviations
    let sum: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
    let mean = sum as f64 / n;
    let sum_sq: f64 = pixels
        .iter()
        .map(|&p| {
            let d = f64::from(p) - mean;
            d * d
        })
        .sum();
    sum_sq / n / (255.0 * 255.0)
}
