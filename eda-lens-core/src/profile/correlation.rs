use crate::dataset::{ColumnKind, Dataset};
use eda_lens_common::{EdaLensError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.90;

/// Pearson matrix over the numeric columns plus the columns suggested for dropping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub columns: Vec<String>,
    /// `None` where a pair has fewer than two shared rows or zero variance.
    pub matrix: Vec<Vec<Option<f64>>>,
    pub drop_list: Vec<String>,
}

impl CorrelationReport {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.matrix[i][j]
    }
}

/// Pearson correlation over rows where both values are present.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Flags every numeric column whose absolute correlation with an earlier
/// numeric column exceeds `threshold`.
pub fn high_correlated_cols(dataset: &Dataset, threshold: f64) -> Result<CorrelationReport> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(EdaLensError::InvalidInput(format!(
            "correlation threshold {threshold} is outside [0, 1]"
        )));
    }
    let columns: Vec<String> = dataset
        .column_names()
        .into_iter()
        .zip(dataset.kinds())
        .filter(|(_, kind)| **kind == ColumnKind::Numeric)
        .map(|(name, _)| name)
        .collect();
    let values = columns
        .iter()
        .map(|c| dataset.numeric_column(c))
        .collect::<Result<Vec<_>>>()?;

    let n = columns.len();
    let mut matrix = vec![vec![None; n]; n];
    for i in 0..n {
        matrix[i][i] = pearson(&values[i], &values[i]);
        for j in (i + 1)..n {
            let r = pearson(&values[i], &values[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    let drop_list: Vec<String> = (0..n)
        .filter(|&j| (0..j).any(|i| matrix[i][j].is_some_and(|r| r.abs() > threshold)))
        .map(|j| columns[j].clone())
        .collect();
    debug!(columns = n, dropped = drop_list.len(), threshold, "correlation computed");
    Ok(CorrelationReport {
        columns,
        matrix,
        drop_list,
    })
}

impl fmt::Display for CorrelationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16}", "")?;
        for c in &self.columns {
            write!(f, " {c:>12}")?;
        }
        for (name, row) in self.columns.iter().zip(&self.matrix) {
            write!(f, "\n{name:<16}")?;
            for cell in row {
                match cell {
                    Some(r) => write!(f, " {r:>12.4}")?,
                    None => write!(f, " {:>12}", "NaN")?,
                }
            }
        }
        write!(f, "\ndrop: {:?}", self.drop_list)
    }
}
