use crate::dataset::{ColumnKind, Dataset};
use eda_lens_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: Option<f64>,
    pub count: usize,
}

/// Mean of one numeric column per distinct label of another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedMeans {
    pub value_column: String,
    pub group_column: String,
    pub groups: Vec<GroupMean>,
}

impl GroupedMeans {
    pub fn get(&self, group: &str) -> Option<&GroupMean> {
        self.groups.iter().find(|g| g.group == group)
    }
}

fn group_labels(dataset: &Dataset, column: &str) -> Result<Vec<Option<String>>> {
    let kind = dataset.kind_of(column)?;
    Ok(dataset
        .display_values(column)?
        .into_iter()
        .map(|v| {
            v.map(|label| match (kind, label.as_str()) {
                (ColumnKind::Boolean, "true") => "1".to_owned(),
                (ColumnKind::Boolean, "false") => "0".to_owned(),
                _ => label,
            })
        })
        .collect())
}

fn grouped_means(
    dataset: &Dataset,
    value_column: &str,
    group_column: &str,
) -> Result<GroupedMeans> {
    let values = dataset.numeric_column(value_column)?;
    let labels = group_labels(dataset, group_column)?;
    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (label, value) in labels.into_iter().zip(values) {
        // rows without a group label are dropped, as in a group-by
        let Some(label) = label else { continue };
        let entry = acc.entry(label).or_insert((0.0, 0));
        if let Some(v) = value {
            entry.0 += v;
            entry.1 += 1;
        }
    }
    let mut groups: Vec<GroupMean> = acc
        .into_iter()
        .map(|(group, (sum, count))| GroupMean {
            group,
            mean: (count > 0).then(|| sum / count as f64),
            count,
        })
        .collect();
    if dataset.kind_of(group_column)? == ColumnKind::Numeric {
        // numeric labels order by value, not by text
        groups.sort_by(|a, b| {
            let x = a.group.parse::<f64>().unwrap_or(f64::NAN);
            let y = b.group.parse::<f64>().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        });
    }
    Ok(GroupedMeans {
        value_column: value_column.to_owned(),
        group_column: group_column.to_owned(),
        groups,
    })
}

/// Mean of a numeric `target` for every category of `categorical_col`.
pub fn target_summary_with_cat(
    dataset: &Dataset,
    target: &str,
    categorical_col: &str,
) -> Result<GroupedMeans> {
    grouped_means(dataset, target, categorical_col)
}

/// Mean of `numerical_col` for every value of `target`.
pub fn target_summary_with_num(
    dataset: &Dataset,
    target: &str,
    numerical_col: &str,
) -> Result<GroupedMeans> {
    grouped_means(dataset, numerical_col, target)
}

impl fmt::Display for GroupedMeans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} {:>14}", self.group_column, format!("{}_MEAN", self.value_column))?;
        for g in &self.groups {
            match g.mean {
                Some(m) => write!(f, "\n{:<24} {:>14.6}", g.group, m)?,
                None => write!(f, "\n{:<24} {:>14}", g.group, "NaN")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
    use eda_lens_common::EdaLensError;
    use std::sync::Arc;

    fn titanic_like() -> Dataset {
        Dataset::from_columns(vec![
            (
                "sex",
                Arc::new(StringArray::from(vec![
                    Some("male"),
                    Some("female"),
                    Some("female"),
                    Some("male"),
                    None,
                    Some("male"),
                ])) as ArrayRef,
            ),
            (
                "age",
                Arc::new(Float64Array::from(vec![
                    Some(22.0),
                    Some(38.0),
                    Some(26.0),
                    None,
                    Some(35.0),
                    Some(54.0),
                ])) as ArrayRef,
            ),
            (
                "adult_child",
                Arc::new(BooleanArray::from(vec![true, true, true, false, true, true])) as ArrayRef,
            ),
            (
                "survived",
                Arc::new(Int64Array::from(vec![0, 1, 1, 1, 0, 0])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn target_mean_per_category() {
        let out = target_summary_with_cat(&titanic_like(), "survived", "sex").unwrap();
        assert_eq!(out.groups.len(), 2);
        assert_eq!(out.get("female").unwrap().mean, Some(1.0));
        assert!((out.get("male").unwrap().mean.unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(out.get("male").unwrap().count, 3);
    }

    #[test]
    fn boolean_groups_are_integer_coded() {
        let out = target_summary_with_cat(&titanic_like(), "survived", "adult_child").unwrap();
        assert_eq!(out.get("0").unwrap().mean, Some(1.0));
        assert_eq!(out.get("1").unwrap().count, 5);
    }

    #[test]
    fn numeric_mean_per_target() {
        let out = target_summary_with_num(&titanic_like(), "survived", "age").unwrap();
        let died = out.get("0").unwrap();
        assert_eq!(died.count, 3);
        assert!((died.mean.unwrap() - 37.0).abs() < 1e-12);
        let lived = out.get("1").unwrap();
        assert_eq!(lived.count, 2);
        assert!((lived.mean.unwrap() - 32.0).abs() < 1e-12);
    }

    #[test]
    fn numeric_groups_sort_by_value() {
        let ds = Dataset::from_columns(vec![
            (
                "pclass",
                Arc::new(Int64Array::from(vec![10, 2, 1, 10, 2])) as ArrayRef,
            ),
            (
                "fare",
                Arc::new(Float64Array::from(vec![5.0, 20.0, 80.0, 7.0, 30.0])) as ArrayRef,
            ),
        ])
        .unwrap();
        let out = target_summary_with_num(&ds, "pclass", "fare").unwrap();
        let order: Vec<&str> = out.groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(order, vec!["1", "2", "10"]);
        assert_eq!(out.get("10").unwrap().mean, Some(6.0));
    }

    #[test]
    fn target_must_be_numeric() {
        assert!(matches!(
            target_summary_with_cat(&titanic_like(), "sex", "survived"),
            Err(EdaLensError::TypeMismatch { .. })
        ));
    }
}
