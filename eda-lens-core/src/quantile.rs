use eda_lens_common::{EdaLensError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear-interpolation quantile over already sorted values.
///
/// The position is `q * (n - 1)`; the result interpolates between the two
/// closest ranks, which matches the numpy/pandas default.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(EdaLensError::InvalidInput(format!(
            "quantile fraction must be in [0, 1], got {q}"
        )));
    }
    if sorted.is_empty() {
        return Err(EdaLensError::EmptyDataset(
            "quantile requested over zero values".into(),
        ));
    }
    if sorted.len() == 1 {
        return Ok(sorted[0]);
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let frac = pos - lower as f64;
    let (a, b) = (sorted[lower], sorted[upper]);
    if frac == 0.0 || a == b {
        return Ok(a);
    }
    Ok(a + (b - a) * frac)
}

/// Quantile over unsorted values.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    quantile_sorted(&sorted_copy(values), q)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantilePoint {
    pub fraction: f64,
    pub value: f64,
}

impl QuantilePoint {
    /// Percent label such as `5%` or `99%`.
    pub fn label(&self) -> String {
        format!("{}%", (self.fraction * 100.0 * 1000.0).round() / 1000.0)
    }
}

/// Count, moments, extremes and selected quantiles of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>, // sample standard deviation, undefined below two values
    pub min: f64,
    pub max: f64,
    pub quantiles: Vec<QuantilePoint>,
}

impl DistributionSummary {
    pub fn quantile(&self, fraction: f64) -> Option<f64> {
        self.quantiles
            .iter()
            .find(|p| (p.fraction - fraction).abs() < 1e-12)
            .map(|p| p.value)
    }
}

/// Summarises `values` at the given fractions.
///
/// Fractions are sorted and de-duplicated and the median is always included.
pub fn describe(values: &[f64], fractions: &[f64]) -> Result<DistributionSummary> {
    if values.is_empty() {
        return Err(EdaLensError::EmptyDataset(
            "cannot describe zero values".into(),
        ));
    }
    let mut fractions = fractions.to_vec();
    fractions.push(0.5);
    fractions.sort_by(f64::total_cmp);
    fractions.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

    let sorted = sorted_copy(values);
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = if sorted.len() > 1 {
        let ss = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        Some((ss / (n - 1.0)).sqrt())
    } else {
        None
    };
    let quantiles = fractions
        .iter()
        .map(|&fraction| {
            Ok(QuantilePoint {
                fraction,
                value: quantile_sorted(&sorted, fraction)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DistributionSummary {
        count: sorted.len(),
        mean,
        std,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        quantiles,
    })
}

impl fmt::Display for DistributionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<8} {}", "count", self.count)?;
        writeln!(f, "{:<8} {:.6}", "mean", self.mean)?;
        match self.std {
            Some(std) => writeln!(f, "{:<8} {:.6}", "std", std)?,
            None => writeln!(f, "{:<8} NaN", "std")?,
        }
        writeln!(f, "{:<8} {:.6}", "min", self.min)?;
        for point in &self.quantiles {
            writeln!(f, "{:<8} {:.6}", point.label(), point.value)?;
        }
        write!(f, "{:<8} {:.6}", "max", self.max)
    }
}
