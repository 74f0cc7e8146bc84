use crate::dataset::Dataset;
use arrow::array::{ArrayRef, UInt8Array};
use eda_lens_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Suffix of the indicator columns built by [`missing_flags`].
pub const NA_FLAG_SUFFIX: &str = "_NA_FLAG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingEntry {
    pub column: String,
    pub count: usize,
    pub ratio: f64, // percent of rows, two decimals
}

/// Columns with at least one missing value, most missing first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MissingValueReport {
    pub entries: Vec<MissingEntry>,
}

impl MissingValueReport {
    pub fn column_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.column.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn missing_value_report(dataset: &Dataset) -> Result<MissingValueReport> {
    let rows = dataset.row_count();
    let mut entries = Vec::new();
    for name in dataset.column_names() {
        let count = dataset.missing_count(&name)?;
        if count == 0 {
            continue;
        }
        entries.push(MissingEntry {
            ratio: round2(count as f64 / rows as f64 * 100.0),
            column: name,
            count,
        });
    }
    // stable: equal counts keep column order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(MissingValueReport { entries })
}

impl fmt::Display for MissingValueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|e| e.column.len())
            .max()
            .unwrap_or(0)
            .max(6);
        write!(f, "{:<width$}  {:>8}  {:>8}", "", "n_miss", "ratio")?;
        for e in &self.entries {
            write!(f, "\n{:<width$}  {:>8}  {:>8.2}", e.column, e.count, e.ratio)?;
        }
        Ok(())
    }
}

/// A copy of `dataset` with a `<column>_NA_FLAG` indicator (1 = missing) per listed column.
pub fn missing_flags(dataset: &Dataset, na_columns: &[String]) -> Result<Dataset> {
    let mut out = dataset.clone();
    for column in na_columns {
        let flags: UInt8Array = dataset
            .missing_mask(column)?
            .into_iter()
            .map(|m| Some(m as u8))
            .collect();
        out = out.with_column(&format!("{column}{NA_FLAG_SUFFIX}"), Arc::new(flags) as ArrayRef)?;
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagGroup {
    pub flag: u8,
    pub target_mean: Option<f64>,
    pub count: usize, // non-missing target values in the group
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingTargetSummary {
    pub column: String,
    pub groups: Vec<FlagGroup>,
}

impl MissingTargetSummary {
    pub fn group(&self, flag: u8) -> Option<&FlagGroup> {
        self.groups.iter().find(|g| g.flag == flag)
    }
}

/// Mean of `target` split by whether each listed column was missing.
pub fn missing_vs_target(
    dataset: &Dataset,
    target: &str,
    na_columns: &[String],
) -> Result<Vec<MissingTargetSummary>> {
    let target_values = dataset.numeric_column(target)?;
    na_columns
        .iter()
        .map(|column| {
            let mask = dataset.missing_mask(column)?;
            let mut acc: BTreeMap<u8, (f64, usize)> = BTreeMap::new();
            for (missing, value) in mask.into_iter().zip(&target_values) {
                let entry = acc.entry(missing as u8).or_insert((0.0, 0));
                if let Some(v) = value {
                    entry.0 += v;
                    entry.1 += 1;
                }
            }
            let groups = acc
                .into_iter()
                .map(|(flag, (sum, count))| FlagGroup {
                    flag,
                    target_mean: (count > 0).then(|| sum / count as f64),
                    count,
                })
                .collect();
            Ok(MissingTargetSummary {
                column: column.clone(),
                groups,
            })
        })
        .collect()
}

impl fmt::Display for MissingTargetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {:>12} {:>8}",
            format!("{}{NA_FLAG_SUFFIX}", self.column),
            "TARGET_MEAN",
            "Count"
        )?;
        for g in &self.groups {
            match g.target_mean {
                Some(mean) => write!(f, "\n{:<24} {:>12.6} {:>8}", g.flag, mean, g.count)?,
                None => write!(f, "\n{:<24} {:>12} {:>8}", g.flag, "NaN", g.count)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use eda_lens_common::EdaLensError;

    fn data() -> Dataset {
        Dataset::from_columns(vec![
            (
                "a",
                Arc::new(Float64Array::from(vec![
                    Some(1.0),
                    None,
                    None,
                    Some(f64::NAN),
                    Some(5.0),
                    Some(6.0),
                ])) as ArrayRef,
            ),
            (
                "b",
                Arc::new(StringArray::from(vec![
                    Some("x"),
                    Some("y"),
                    None,
                    Some("x"),
                    Some("y"),
                    Some("x"),
                ])) as ArrayRef,
            ),
            (
                "c",
                Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5, 6])) as ArrayRef,
            ),
            (
                "target",
                Arc::new(Int64Array::from(vec![
                    Some(0),
                    Some(1),
                    Some(1),
                    Some(1),
                    None,
                    Some(0),
                ])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn report_lists_only_missing_columns() {
        let report = missing_value_report(&data()).unwrap();
        assert_eq!(report.column_names(), vec!["a", "b", "target"]);
        assert_eq!(report.entries[0].count, 3);
        assert_eq!(report.entries[0].ratio, 50.0);
        assert_eq!(report.entries[1].count, 1);
        assert_eq!(report.entries[1].ratio, 16.67);
    }

    #[test]
    fn clean_dataset_reports_nothing() {
        let ds = Dataset::from_columns(vec![(
            "c",
            Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef,
        )])
        .unwrap();
        assert!(missing_value_report(&ds).unwrap().is_empty());
    }

    #[test]
    fn flags_appended_without_touching_source() {
        let ds = data();
        let flagged = missing_flags(&ds, &["a".to_string()]).unwrap();
        assert_eq!(flagged.column_count(), 5);
        assert_eq!(ds.column_count(), 4);
        assert_eq!(
            flagged.numeric_values("a_NA_FLAG").unwrap(),
            vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn target_mean_by_flag() {
        let na_columns = ["a".to_string(), "b".to_string()];
        let out = missing_vs_target(&data(), "target", &na_columns).unwrap();
        assert_eq!(out.len(), 2);

        let a = &out[0];
        assert_eq!(a.column, "a");
        // present rows 0,4,5 -> targets 0, missing, 0
        let present = a.group(0).unwrap();
        assert_eq!(present.count, 2);
        assert_eq!(present.target_mean, Some(0.0));
        // missing rows 1,2,3 -> targets 1,1,1
        let absent = a.group(1).unwrap();
        assert_eq!(absent.count, 3);
        assert_eq!(absent.target_mean, Some(1.0));

        let b = &out[1];
        assert_eq!(b.group(1).unwrap().count, 1);
        assert!((b.group(0).unwrap().target_mean.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn flagged_dataset_and_repeated_columns_are_accepted() {
        let ds = data();
        let flagged = missing_flags(&ds, &["a".to_string()]).unwrap();
        let direct = missing_vs_target(&ds, "target", &["a".to_string()]).unwrap();
        let again = missing_vs_target(&flagged, "target", &["a".to_string()]).unwrap();
        assert_eq!(direct, again);

        let twice = missing_vs_target(&ds, "target", &["a".to_string(), "a".to_string()]).unwrap();
        assert_eq!(twice.len(), 2);
        assert_eq!(twice[0], twice[1]);
        assert_eq!(twice[0].group(1).unwrap().target_mean, Some(1.0));
    }

    #[test]
    fn target_must_be_numeric() {
        assert!(matches!(
            missing_vs_target(&data(), "b", &["a".to_string()]),
            Err(EdaLensError::TypeMismatch { .. })
        ));
        assert!(matches!(
            missing_vs_target(&data(), "target", &["nope".to_string()]),
            Err(EdaLensError::InvalidColumn(_))
        ));
    }
}
