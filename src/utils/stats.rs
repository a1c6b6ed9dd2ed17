//! Small numeric helpers over metric series.
//!
//! Missing values are `None` (the first delta of a series has no
//! predecessor) and are skipped by every aggregate.

use statrs::statistics::{Data, Median, Statistics};

/// Difference to the previous element; the first element has none.
pub fn diff(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        out.push(i.checked_sub(1).map(|prev| value - values[prev]));
    }
    out
}

/// Relative change to the previous element, in percent. Undefined when the
/// previous element is zero.
pub fn percent_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        let change = i
            .checked_sub(1)
            .map(|prev| values[prev])
            .filter(|prev| *prev != 0.0)
            .map(|prev| (value - prev) / prev * 100.0);
        out.push(change);
    }
    out
}

/// Running total that skips missing values. Positions before the first
/// present value stay missing.
pub fn cumulative_sum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut total: Option<f64> = None;
    values
        .iter()
        .map(|value| match value {
            Some(v) => {
                total = Some(total.unwrap_or(0.0) + v);
                total
            }
            None => total,
        })
        .collect()
}

/// `numerator / denominator`, dividing by one when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    }
}

/// Present values only.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(Data::new(values.to_vec()).median())
}

/// Pearson correlation of two equally long series. NaN when either series
/// is constant or shorter than two points.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }
    let sd_a = a.iter().std_dev();
    let sd_b = b.iter().std_dev();
    if sd_a == 0.0 || sd_b == 0.0 {
        return f64::NAN;
    }
    a.iter().covariance(b.iter()) / (sd_a * sd_b)
}

/// Least-squares line `y = slope * x + intercept`.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mean_x = xs.iter().mean();
    let mean_y = ys.iter().mean();
    let var_x = xs.iter().variance();
    if var_x == 0.0 || !var_x.is_finite() {
        return None;
    }
    let slope = xs.iter().covariance(ys.iter()) / var_x;
    Some((slope, mean_y - slope * mean_x))
}

/// Scale to `[0, 1]`. `None` for constant or empty series.
pub fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || max <= min {
        return None;
    }
    Some(values.iter().map(|v| (v - min) / (max - min)).collect())
}

/// One histogram bucket, `[start, end)` except for the last, which is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Split the range of `values` into `bins` equal buckets.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
