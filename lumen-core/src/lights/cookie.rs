//! Square cookie mask for spotlights.

/// Mask value at normalized coordinates in `[-1, 1]`.
///
/// Fully lit inside the square of half-size 0.8 under the Chebyshev norm,
/// with a linear soft edge from 0.75 to 0.85.
#[must_use]
pub fn cookie_value(nx: f32, ny: f32) -> f32 {
    let dist = nx.abs().max(ny.abs());
    if dist > 0.75 && dist <= 0.85 {
        1.0 - (dist - 0.75) / 0.1
    } else if dist <= 0.8 {
        1.0
    } else {
        0.0
    }
}

/// A `resolution` x `resolution` mask, row-major.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn square_cookie(resolution: usize) -> Vec<f32> {
    let res = resolution as f32;
    (0..resolution)
        .flat_map(|y| (0..resolution).map(move |x| (x, y)))
        .map(|(x, y)| cookie_value(x as f32 / res * 2.0 - 1.0, y as f32 / res * 2.0 - 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_is_lit_corner_is_dark() {
        assert!((cookie_value(0.0, 0.0) - 1.0).abs() < f32::EPSILON);
        assert!(cookie_value(-1.0, -1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn edge_is_soft() {
        assert!((cookie_value(0.8, 0.0) - 0.5).abs() < 1e-5);
        let v = cookie_value(0.0, -0.78);
        assert!(v > 0.5 && v < 1.0);
        assert!(cookie_value(0.86, 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mask_has_requested_size() {
        let mask = square_cookie(64);
        assert_eq!(mask.len(), 64 * 64);
        assert!((mask[32 * 64 + 32] - 1.0).abs() < f32::EPSILON);
        assert!(mask[0].abs() < f32::EPSILON);
        assert!(square_cookie(0).is_empty());
    }
}
