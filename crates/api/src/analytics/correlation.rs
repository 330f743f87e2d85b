/// Below this many NAV points a fund contributes zero correlation
/// (insufficient data, not an error).
pub const MIN_NAV_POINTS: usize = 10;

/// Pearson coefficient; 0 on length mismatch, empty input or a zero
/// denominator.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|a| a * a).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

fn usable_returns(navs: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(navs.len().saturating_sub(1));
    for w in navs.windows(2) {
        if w[0] <= 0.0 {
            continue;
        }
        out.push((w[1] - w[0]) / w[0]);
    }
    out
}

/// Symmetric NxN matrix over per-fund NAV windows, which must share a
/// consistent ordering. Diagonal fixed at 1.
pub fn correlation_matrix(nav_windows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = nav_windows.len();
    let returns: Vec<Option<Vec<f64>>> = nav_windows
        .iter()
        .map(|w| {
            if w.len() < MIN_NAV_POINTS {
                None
            } else {
                Some(usable_returns(w))
            }
        })
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let value = match (&returns[i], &returns[j]) {
                (Some(a), Some(b)) => pearson(a, b),
                _ => 0.0,
            };
            matrix[i][j] = value;
            matrix[j][i] = value;
        }
    }
    matrix
}
