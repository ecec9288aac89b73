//! Fit-quality metrics: R², RMSE and MAE.

/// Sums and derived metrics for one set of predictions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub ss_res: f64,
    pub ss_total: f64,
    /// Coefficient of determination, clamped to `[0, 1]`.
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl FitMetrics {
    /// Compute metrics for index-aligned `actual` / `predicted` values.
    ///
    /// Empty input yields all-zero metrics.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return Self {
                ss_res: 0.0,
                ss_total: 0.0,
                r2: 0.0,
                rmse: 0.0,
                mae: 0.0,
            };
        }
        let nf = n as f64;
        let mean = actual[..n].iter().sum::<f64>() / nf;

        let mut ss_total = 0.0;
        let mut ss_res = 0.0;
        let mut abs_res = 0.0;
        for (&a, &p) in actual.iter().zip(predicted).take(n) {
            let d = a - mean;
            let r = a - p;
            ss_total += d * d;
            ss_res += r * r;
            abs_res += r.abs();
        }

        Self {
            ss_res,
            ss_total,
            r2: r_squared(ss_res, ss_total),
            rmse: (ss_res / nf).max(0.0).sqrt(),
            mae: abs_res / nf,
        }
    }
}

/// `1 - SSres/SStotal`, 0 when there is no variance, clamped to `[0, 1]`.
pub fn r_squared(ss_res: f64, ss_total: f64) -> f64 {
    let raw = if ss_total > 0.0 { 1.0 - ss_res / ss_total } else { 0.0 };
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
}

/// Population variance (divides by `n`).
///
/// Values are scaled by their largest magnitude first, so a constant column
/// near `f64::MAX` still reports exactly zero. A spread too wide for `f64`
/// reports `inf`.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|v| v / scale).sum::<f64>() / n;
    let scaled = values
        .iter()
        .map(|v| {
            let d = v / scale - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    scaled * scale * scale
}
