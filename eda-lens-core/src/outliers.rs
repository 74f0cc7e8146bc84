use crate::dataset::Dataset;
use crate::quantile::{quantile_sorted, sorted_copy};
use arrow::array::BooleanArray;
use eda_lens_common::{EdaLensError, Result, ThresholdConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Selections larger than this are only previewed partially.
pub const PREVIEW_TRIGGER: usize = 10;
/// Rows shown when a selection is truncated for display.
pub const PREVIEW_ROWS: usize = 5;

/// Interquartile-range multiplier applied on both sides of the quartiles.
const IQR_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOptions {
    pub q1: f64,
    pub q3: f64,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        Self { q1: 0.25, q3: 0.75 }
    }
}

impl From<&ThresholdConfig> for ThresholdOptions {
    fn from(cfg: &ThresholdConfig) -> Self {
        Self {
            q1: cfg.q1,
            q3: cfg.q3,
        }
    }
}

impl ThresholdOptions {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.q1) || !(0.0..=1.0).contains(&self.q3) || self.q1 >= self.q3
        {
            return Err(EdaLensError::InvalidInput(format!(
                "quantile fractions must satisfy 0 <= q1 < q3 <= 1, got q1={} q3={}",
                self.q1, self.q3
            )));
        }
        Ok(())
    }
}

/// Acceptable value range of one numeric column, valid until the column changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierRange {
    pub quartile1: f64,
    pub quartile3: f64,
    pub low_limit: f64,
    pub high_limit: f64,
}

impl OutlierRange {
    pub fn from_values(values: &[f64], opts: &ThresholdOptions) -> Result<Self> {
        opts.validate()?;
        let sorted = sorted_copy(values);
        let quartile1 = quantile_sorted(&sorted, opts.q1)?;
        let quartile3 = quantile_sorted(&sorted, opts.q3)?;
        let iqr = quartile3 - quartile1;
        Ok(Self {
            quartile1,
            quartile3,
            low_limit: quartile1 - IQR_FACTOR * iqr,
            high_limit: quartile3 + IQR_FACTOR * iqr,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.quartile3 - self.quartile1
    }

    /// Inclusive on both limits.
    pub fn contains(&self, v: f64) -> bool {
        v >= self.low_limit && v <= self.high_limit
    }

    pub fn is_outlier(&self, v: f64) -> bool {
        v < self.low_limit || v > self.high_limit
    }

    /// Nearest value inside the range.
    pub fn clip(&self, v: f64) -> f64 {
        if v < self.low_limit {
            self.low_limit
        } else if v > self.high_limit {
            self.high_limit
        } else {
            v
        }
    }
}

/// Computes `(low_limit, high_limit)` for `column` from its non-missing values.
///
/// A constant column collapses both limits onto the constant, so every other
/// value is flagged.
pub fn outlier_thresholds(
    dataset: &Dataset,
    column: &str,
    opts: &ThresholdOptions,
) -> Result<OutlierRange> {
    let values = dataset.numeric_values(column)?;
    if values.is_empty() {
        return Err(EdaLensError::EmptyDataset(format!(
            "column '{column}' has no non-missing values"
        )));
    }
    let range = OutlierRange::from_values(&values, opts)?;
    debug!(
        column,
        low_limit = range.low_limit,
        high_limit = range.high_limit,
        "computed outlier thresholds"
    );
    Ok(range)
}

pub(crate) fn outlier_flags(
    dataset: &Dataset,
    column: &str,
    range: &OutlierRange,
) -> Result<Vec<bool>> {
    Ok(dataset
        .numeric_column(column)?
        .into_iter()
        .map(|v| v.is_some_and(|x| range.is_outlier(x)))
        .collect())
}

pub fn has_outliers(dataset: &Dataset, column: &str, opts: &ThresholdOptions) -> Result<bool> {
    let range = outlier_thresholds(dataset, column, opts)?;
    Ok(outlier_flags(dataset, column, &range)?
        .into_iter()
        .any(|flag| flag))
}

/// Rows whose value lies outside the outlier range, untruncated.
#[derive(Debug, Clone)]
pub struct OutlierSelection {
    pub column: String,
    pub range: OutlierRange,
    rows: Dataset,
    indices: Vec<usize>,
    with_indices: bool,
}

impl OutlierSelection {
    pub fn rows(&self) -> &Dataset {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row positions in the source dataset, when they were requested.
    pub fn indices(&self) -> Option<&[usize]> {
        self.with_indices.then_some(self.indices.as_slice())
    }

    /// The slice meant for display: the first five rows once more than ten were selected.
    pub fn preview(&self) -> Dataset {
        if self.len() > PREVIEW_TRIGGER {
            self.rows.head(PREVIEW_ROWS)
        } else {
            self.rows.clone()
        }
    }

    pub fn is_truncated_for_display(&self) -> bool {
        self.len() > PREVIEW_TRIGGER
    }
}

pub fn collect_outliers(
    dataset: &Dataset,
    column: &str,
    return_indices: bool,
    opts: &ThresholdOptions,
) -> Result<OutlierSelection> {
    let range = outlier_thresholds(dataset, column, opts)?;
    let flags = outlier_flags(dataset, column, &range)?;
    let indices: Vec<usize> = flags
        .iter()
        .enumerate()
        .filter(|(_, flag)| **flag)
        .map(|(i, _)| i)
        .collect();
    let rows = dataset.filter(&BooleanArray::from(flags))?;
    debug!(column, selected = indices.len(), "collected outlier rows");
    Ok(OutlierSelection {
        column: column.to_owned(),
        range,
        rows,
        indices,
        with_indices: return_indices,
    })
}

/// The subset of `columns` that contain at least one outlier.
pub fn columns_with_outliers(
    dataset: &Dataset,
    columns: &[String],
    opts: &ThresholdOptions,
) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for column in columns {
        if has_outliers(dataset, column, opts)? {
            out.push(column.clone());
        }
    }
    Ok(out)
}
