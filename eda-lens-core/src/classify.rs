use crate::dataset::{ColumnKind, Dataset};
use eda_lens_common::{ClassifyConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyOptions {
    pub cat_th: usize,
    pub car_th: usize,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            cat_th: 10,
            car_th: 20,
        }
    }
}

impl From<&ClassifyConfig> for ClassifyOptions {
    fn from(cfg: &ClassifyConfig) -> Self {
        Self {
            cat_th: cfg.cat_th,
            car_th: cfg.car_th,
        }
    }
}

/// Partition of a dataset's columns.
///
/// `categorical`, `numeric` and `categorical_high_cardinality` are pairwise
/// disjoint and together name every column exactly once.
/// `numeric_but_categorical` is informational and lies inside `categorical`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnClasses {
    pub categorical: Vec<String>,
    pub numeric: Vec<String>,
    pub categorical_high_cardinality: Vec<String>,
    pub numeric_but_categorical: Vec<String>,
}

/// Sizes reported alongside a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub observations: usize,
    pub variables: usize,
    pub cat_cols: usize,
    pub num_cols: usize,
    pub cat_but_car: usize,
    pub num_but_cat: usize,
}

impl ColumnClasses {
    pub fn counts(&self, dataset: &Dataset) -> ClassificationCounts {
        ClassificationCounts {
            observations: dataset.row_count(),
            variables: dataset.column_count(),
            cat_cols: self.categorical.len(),
            num_cols: self.numeric.len(),
            cat_but_car: self.categorical_high_cardinality.len(),
            num_but_cat: self.numeric_but_categorical.len(),
        }
    }
}

impl fmt::Display for ClassificationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<14} {}", "Observations:", self.observations)?;
        writeln!(f, "{:<14} {}", "Variables:", self.variables)?;
        writeln!(f, "{:<14} {}", "cat_cols:", self.cat_cols)?;
        writeln!(f, "{:<14} {}", "num_cols:", self.num_cols)?;
        writeln!(f, "{:<14} {}", "cat_but_car:", self.cat_but_car)?;
        write!(f, "{:<14} {}", "num_but_cat:", self.num_but_cat)
    }
}

/// Splits columns into categorical, numeric and high-cardinality categorical.
///
/// Numeric columns with fewer than `cat_th` distinct values join the
/// categorical group; categorical-like columns with more than `car_th`
/// distinct values are set aside as cardinal.
pub fn partition_columns(dataset: &Dataset, opts: &ClassifyOptions) -> Result<ColumnClasses> {
    let names = dataset.column_names();
    let mut base_categorical = Vec::new();
    let mut numeric_all = Vec::new();
    let mut numeric_but_categorical = Vec::new();
    let mut categorical_high_cardinality = Vec::new();

    for (name, kind) in names.iter().zip(dataset.kinds()) {
        match kind {
            ColumnKind::Numeric => {
                numeric_all.push(name.clone());
                if dataset.cardinality(name)? < opts.cat_th {
                    numeric_but_categorical.push(name.clone());
                }
            }
            ColumnKind::Categorical | ColumnKind::Boolean => {
                base_categorical.push(name.clone());
                if dataset.cardinality(name)? > opts.car_th {
                    categorical_high_cardinality.push(name.clone());
                }
            }
        }
    }

    let cardinal: HashSet<&String> = categorical_high_cardinality.iter().collect();
    let categorical: Vec<String> = base_categorical
        .iter()
        .chain(numeric_but_categorical.iter())
        .filter(|c| !cardinal.contains(c))
        .cloned()
        .collect();
    let categorical_set: HashSet<&String> = categorical.iter().collect();
    let numeric = numeric_all
        .iter()
        .filter(|c| !categorical_set.contains(c))
        .cloned()
        .collect();

    Ok(ColumnClasses {
        categorical,
        numeric,
        categorical_high_cardinality,
        numeric_but_categorical,
    })
}

/// Classifies the columns and writes the count summary to `out`.
///
/// The counts are a side report; the returned value carries only the names.
pub fn classify_columns<W: Write>(
    dataset: &Dataset,
    opts: &ClassifyOptions,
    out: &mut W,
) -> Result<ColumnClasses> {
    let classes = partition_columns(dataset, opts)?;
    let counts = classes.counts(dataset);
    info!(
        observations = counts.observations,
        variables = counts.variables,
        cat_cols = counts.cat_cols,
        num_cols = counts.num_cols,
        cat_but_car = counts.cat_but_car,
        num_but_cat = counts.num_but_cat,
        "classified columns"
    );
    writeln!(out, "{counts}")?;
    Ok(classes)
}
