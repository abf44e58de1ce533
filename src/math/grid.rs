//! Evenly spaced grids and plot bounds.

/// `n` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Min/max of the finite values, padded by `pad` (fraction of the span).
///
/// Falls back to `[-1, 1]` when nothing is finite and widens degenerate
/// (zero-width) ranges so that chart builders always get `lo < hi`.
pub fn padded_bounds<I>(values: I, pad: f64) -> [f64; 2]
where
    I: IntoIterator<Item = f64>,
{
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !(lo.is_finite() && hi.is_finite()) {
        return [-1.0, 1.0];
    }

    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        let half = lo.abs().max(1.0) * 0.5;
        return [lo - half, hi + half];
    }

    [lo - span * pad, hi + span * pad]
}
