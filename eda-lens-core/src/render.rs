use crate::profile::FrequencyTable;

/// Drawing backend handed to a [`Reporter`](crate::report::Reporter).
///
/// Implementations decide where charts go; nothing is drawn unless the
/// caller attaches one and turns plotting on in the report config.
pub trait ChartRenderer {
    /// Bar chart of the value counts of a categorical column.
    fn count_plot(&mut self, column: &str, table: &FrequencyTable);

    /// Histogram of the non-missing values of a numeric column.
    fn histogram(&mut self, column: &str, values: &[f64]);
}
