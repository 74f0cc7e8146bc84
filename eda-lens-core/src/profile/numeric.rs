use crate::dataset::Dataset;
use crate::quantile::{describe, DistributionSummary};
use eda_lens_common::{EdaLensError, Result};

pub const NUMERIC_SUMMARY_FRACTIONS: [f64; 12] = [
    0.05, 0.10, 0.20, 0.30, 0.40, 0.50, 0.60, 0.70, 0.80, 0.90, 0.95, 0.99,
];

/// Distributional summary of one numeric column at the fixed fractions above.
pub fn numeric_summary(dataset: &Dataset, column: &str) -> Result<DistributionSummary> {
    let values = dataset.numeric_values(column)?;
    if values.is_empty() {
        return Err(EdaLensError::EmptyDataset(format!(
            "column '{column}' has no non-missing values"
        )));
    }
    describe(&values, &NUMERIC_SUMMARY_FRACTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, Int32Array};
    use std::sync::Arc;

    #[test]
    fn summary_over_one_to_hundred() {
        let ds = Dataset::from_columns(vec![(
            "x",
            Arc::new(Int32Array::from((1..=101).collect::<Vec<i32>>())) as ArrayRef,
        )])
        .unwrap();
        let s = numeric_summary(&ds, "x").unwrap();
        assert_eq!(s.count, 101);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 101.0);
        assert_eq!(s.quantiles.len(), NUMERIC_SUMMARY_FRACTIONS.len());
        assert!((s.quantile(0.05).unwrap() - 6.0).abs() < 1e-9);
        assert!((s.quantile(0.5).unwrap() - 51.0).abs() < 1e-9);
        assert!((s.quantile(0.99).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn all_missing_is_empty() {
        let ds = Dataset::from_columns(vec![(
            "x",
            Arc::new(Float64Array::from(vec![None, Some(f64::NAN)])) as ArrayRef,
        )])
        .unwrap();
        assert!(matches!(
            numeric_summary(&ds, "x"),
            Err(EdaLensError::EmptyDataset(_))
        ));
    }
}
