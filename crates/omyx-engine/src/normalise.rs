//! Numeric normalisation helpers.
//!
//! Rounding is presentation only: report fields keep full precision in
//! memory and are rounded when serialized, so every threshold comparison in
//! the engine sees unrounded values.

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Mean of the finite cells of a row, with the number of cells used.
/// Returns `None` when the row has no finite cell.
pub fn finite_mean(row: &[f64]) -> Option<(f64, usize)> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for &v in row.iter().filter(|v| v.is_finite()) {
        sum += v;
        n += 1;
    }
    (n > 0).then(|| (sum / n as f64, n))
}

/// Mean and sample variance (n − 1) of the finite cells of a row.
/// Returns `None` when fewer than two finite cells exist.
pub fn finite_mean_variance(row: &[f64]) -> Option<(f64, f64)> {
    let (mean, n) = finite_mean(row)?;
    if n < 2 {
        return None;
    }
    let ss: f64 = row
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| (v - mean) * (v - mean))
        .sum();
    Some((mean, ss / (n - 1) as f64))
}

/// Apportion 100% across non-negative weights at 0.1 resolution.
///
/// Largest-remainder method: every share is its exact percentage truncated
/// to a tenth, then the leftover tenths go to the largest remainders (ties
/// to the earlier index). The result always sums to exactly 100.0 and each
/// share is within 0.1 of its exact value. Non-positive or non-finite totals
/// split evenly.
///
/// This is not the same as rounding each share to one decimal on its own:
/// three equal weights give 33.4/33.3/33.3 rather than 33.3 each, so a share
/// can differ from its independently rounded value by 0.1.
pub fn apportion_percent(weights: &[f64]) -> Vec<f64> {
    const TENTHS: u64 = 1000;

    let n = weights.len();
    if n == 0 {
        return vec![];
    }

    let total: f64 = weights.iter().sum();
    let exact: Vec<f64> = if total > 0.0 && total.is_finite() {
        weights.iter().map(|w| w / total * TENTHS as f64).collect()
    } else {
        vec![TENTHS as f64 / n as f64; n]
    };

    let mut tenths: Vec<u64> = exact.iter().map(|e| e.floor() as u64).collect();
    let assigned: u64 = tenths.iter().sum();
    let leftover = TENTHS.saturating_sub(assigned) as usize;

    let mut by_remainder: Vec<usize> = (0..n).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });
    for &i in by_remainder.iter().take(leftover) {
        tenths[i] += 1;
    }

    tenths.iter().map(|&t| t as f64 / 10.0).collect()
}

/// `serialize_with` adapters that round on the way out.
pub(crate) mod rounded {
    use serde::Serializer;

    use super::round_to;

    pub fn dp1<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(round_to(*v, 1))
    }

    pub fn dp3<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(round_to(*v, 3))
    }

    pub fn dp4<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(round_to(*v, 4))
    }
}
