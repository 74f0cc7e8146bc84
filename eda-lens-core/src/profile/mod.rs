pub mod correlation;
pub mod frequency;
pub mod missing;
pub mod numeric;
pub mod structure;
pub mod target;

pub use correlation::{high_correlated_cols, CorrelationReport, DEFAULT_CORRELATION_THRESHOLD};
pub use frequency::{categorical_summary, FrequencyEntry, FrequencyTable};
pub use missing::{
    missing_flags, missing_value_report, missing_vs_target, MissingEntry, MissingTargetSummary,
    MissingValueReport, NA_FLAG_SUFFIX,
};
pub use numeric::{numeric_summary, NUMERIC_SUMMARY_FRACTIONS};
pub use structure::{structural_summary, StructuralSummary};
pub use target::{target_summary_with_cat, target_summary_with_num, GroupedMeans};
