use crate::dataset::{as_float64, Dataset};
use crate::outliers::{outlier_flags, outlier_thresholds, ThresholdOptions};
use arrow::array::{ArrayRef, BooleanArray, Float64Array};
use arrow::compute::cast;
use arrow::compute::kernels::zip::zip;
use arrow::datatypes::DataType;
use eda_lens_common::Result;
use std::sync::Arc;
use tracing::debug;

/// Returns a new dataset without the rows whose `column` value falls outside
/// the outlier range. Rows with a missing value are kept; order is preserved.
pub fn remove_outliers(
    dataset: &Dataset,
    column: &str,
    opts: &ThresholdOptions,
) -> Result<Dataset> {
    let range = outlier_thresholds(dataset, column, opts)?;
    let keep: Vec<bool> = outlier_flags(dataset, column, &range)?
        .into_iter()
        .map(|flag| !flag)
        .collect();
    let kept = dataset.filter(&BooleanArray::from(keep))?;
    debug!(
        column,
        removed = dataset.row_count() - kept.row_count(),
        "removed outlier rows"
    );
    Ok(kept)
}

/// Winsorizes `column` in place: values below the low limit become the low
/// limit and values above the high limit become the high limit.
///
/// A column with nothing to clip is left as it was. Float32 columns keep
/// their type, and so do integer columns when both limits are whole numbers;
/// other numeric types are stored as Float64 afterwards.
pub fn clip_to_thresholds(
    dataset: &mut Dataset,
    column: &str,
    opts: &ThresholdOptions,
) -> Result<()> {
    let range = outlier_thresholds(dataset, column, opts)?;
    let flags = outlier_flags(dataset, column, &range)?;
    let clipped_count = flags.iter().filter(|f| **f).count();
    if clipped_count == 0 {
        debug!(column, "no values outside thresholds");
        return Ok(());
    }
    let original = dataset.column(column)?.clone();
    let original_type = original.data_type().clone();
    let floats = as_float64(&original)?;
    let clipped: Float64Array = floats
        .iter()
        .map(|v| v.map(|x| if x.is_nan() { x } else { range.clip(x) }))
        .collect();
    let clipped: ArrayRef = Arc::new(clipped);
    let integral_limits = range.low_limit.fract() == 0.0 && range.high_limit.fract() == 0.0;
    let replacement = match original_type {
        DataType::Float32 => cast(&clipped, &DataType::Float32)?,
        ref t if t.is_integer() && integral_limits => {
            // only clipped cells go through the limit cast; the rest stay bit-exact
            let limits = cast(&clipped, t)?;
            zip(&BooleanArray::from(flags), &limits, &original)?
        }
        _ => clipped,
    };
    dataset.replace_column(column, replacement)?;
    debug!(column, clipped = clipped_count, "clipped values to thresholds");
    Ok(())
}
