pub mod classify;
pub mod dataset;
pub mod outliers;
pub mod profile;
pub mod quantile;
pub mod reader;
pub mod render;
pub mod report;
pub mod treatment;

pub use classify::{
    classify_columns, partition_columns, ClassificationCounts, ClassifyOptions, ColumnClasses,
};
pub use dataset::{ColumnKind, Dataset, RowsView};
pub use eda_lens_common::{EdaConfig, EdaLensError, Result};
pub use outliers::{
    collect_outliers, columns_with_outliers, has_outliers, outlier_thresholds, OutlierRange,
    OutlierSelection, ThresholdOptions,
};
pub use profile::{
    categorical_summary, high_correlated_cols, missing_flags, missing_value_report,
    missing_vs_target, numeric_summary, structural_summary, target_summary_with_cat,
    target_summary_with_num, CorrelationReport, FrequencyTable, GroupedMeans,
    MissingTargetSummary, MissingValueReport, StructuralSummary,
};
pub use quantile::{describe, quantile, DistributionSummary};
pub use reader::{open_parquet_dataset, read_parquet_bytes};
pub use render::ChartRenderer;
pub use report::{OutlierPreview, Reporter};
pub use treatment::{clip_to_thresholds, remove_outliers};
