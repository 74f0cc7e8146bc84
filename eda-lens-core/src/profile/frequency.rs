use crate::dataset::{ColumnKind, Dataset};
use eda_lens_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: u64,
    pub ratio: f64, // percent of all rows, missing ones included
}

/// Distinct values of one column with their counts, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub column: String,
    pub row_count: u64,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    pub fn get(&self, value: &str) -> Option<&FrequencyEntry> {
        self.entries.iter().find(|e| e.value == value)
    }
}

/// Counts values while remembering first-appearance order for tie breaks.
pub struct FrequencyCounter {
    index: HashMap<String, usize>,
    counts: Vec<(String, u64)>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            counts: Vec::new(),
        }
    }

    pub fn add(&mut self, val: String) {
        match self.index.get(&val) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(val.clone(), self.counts.len());
                self.counts.push((val, 1));
            }
        }
    }

    pub fn finish(self, column: &str, row_count: u64) -> FrequencyTable {
        let mut counts = self.counts;
        // stable: equal counts keep first-appearance order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let entries = counts
            .into_iter()
            .map(|(value, count)| FrequencyEntry {
                ratio: if row_count > 0 {
                    100.0 * count as f64 / row_count as f64
                } else {
                    0.0
                },
                value,
                count,
            })
            .collect();
        FrequencyTable {
            column: column.to_owned(),
            row_count,
            entries,
        }
    }
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Count and percentage of each distinct value of `column`.
///
/// Booleans are integer-coded first, so their labels are `0` and `1`.
pub fn categorical_summary(dataset: &Dataset, column: &str) -> Result<FrequencyTable> {
    let kind = dataset.kind_of(column)?;
    let mut counter = FrequencyCounter::new();
    for value in dataset.display_values(column)?.into_iter().flatten() {
        let label = match (kind, value.as_str()) {
            (ColumnKind::Boolean, "true") => "1".to_owned(),
            (ColumnKind::Boolean, "false") => "0".to_owned(),
            _ => value,
        };
        counter.add(label);
    }
    Ok(counter.finish(column, dataset.row_count() as u64))
}

impl fmt::Display for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|e| e.value.len())
            .chain(std::iter::once(self.column.len()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:<width$}  {:>8}  {:>8}", self.column, "count", "Ratio")?;
        for e in &self.entries {
            writeln!(f, "{:<width$}  {:>8}  {:>8.2}", e.value, e.count, e.ratio)?;
        }
        write!(f, "##########################################")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, BooleanArray, StringArray};
    use std::sync::Arc;

    #[test]
    fn boolean_counts_integer_coded() {
        let flags: Vec<bool> = (0..20).map(|i| i % 5 == 0).collect();
        let ds = Dataset::from_columns(vec![(
            "flag",
            Arc::new(BooleanArray::from(flags)) as ArrayRef,
        )])
        .unwrap();
        let table = categorical_summary(&ds, "flag").unwrap();
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[0].value, "0");
        assert_eq!(table.entries[0].count, 16);
        assert!((table.entries[0].ratio - 80.0).abs() < 1e-9);
        assert_eq!(table.entries[1].value, "1");
        assert_eq!(table.entries[1].count, 4);
        assert!((table.entries[1].ratio - 20.0).abs() < 1e-9);
    }

    #[test]
    fn missing_values_stay_in_denominator() {
        let ds = Dataset::from_columns(vec![(
            "city",
            Arc::new(StringArray::from(vec![Some("x"), None, Some("y"), Some("x")])) as ArrayRef,
        )])
        .unwrap();
        let table = categorical_summary(&ds, "city").unwrap();
        assert_eq!(table.get("x").unwrap().count, 2);
        assert!((table.get("x").unwrap().ratio - 50.0).abs() < 1e-9);
        assert!((table.get("y").unwrap().ratio - 25.0).abs() < 1e-9);
        assert_eq!(table.entries.iter().map(|e| e.count).sum::<u64>(), 3);
    }

    #[test]
    fn ties_keep_first_appearance() {
        let ds = Dataset::from_columns(vec![(
            "c",
            Arc::new(StringArray::from(vec!["b", "a", "a", "b", "c"])) as ArrayRef,
        )])
        .unwrap();
        let table = categorical_summary(&ds, "c").unwrap();
        let order: Vec<&str> = table.entries.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn display_lists_every_value() {
        let ds = Dataset::from_columns(vec![(
            "c",
            Arc::new(StringArray::from(vec!["b", "a", "a"])) as ArrayRef,
        )])
        .unwrap();
        let text = categorical_summary(&ds, "c").unwrap().to_string();
        assert!(text.contains("Ratio"));
        assert!(text.contains("66.67"));
        assert!(text.contains("33.33"));
    }
}
