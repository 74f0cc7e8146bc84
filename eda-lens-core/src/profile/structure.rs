use crate::dataset::{serialize_rows, ColumnKind, Dataset};
use crate::quantile::{describe, DistributionSummary};
use eda_lens_common::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const STRUCTURE_FRACTIONS: [f64; 6] = [0.0, 0.05, 0.50, 0.95, 0.99, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnType {
    pub column: String,
    pub data_type: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDistribution {
    pub column: String,
    pub summary: DistributionSummary,
}

/// Shape, types, trailing rows, missing counts and quantiles of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct StructuralSummary {
    pub rows: usize,
    pub columns: usize,
    pub dtypes: Vec<ColumnType>,
    #[serde(serialize_with = "serialize_rows")]
    pub tail: Dataset,
    pub missing: Vec<MissingCount>,
    pub distribution: Vec<ColumnDistribution>,
}

/// Builds the overview; numeric columns without any value are left out of
/// the distribution section.
pub fn structural_summary(dataset: &Dataset, tail_rows: usize) -> Result<StructuralSummary> {
    let names = dataset.column_names();
    let batch_schema = dataset.batch().schema();
    let dtypes = names
        .iter()
        .zip(dataset.kinds())
        .zip(batch_schema.fields().iter())
        .map(|((name, kind), field)| ColumnType {
            column: name.clone(),
            data_type: field.data_type().to_string(),
            kind: *kind,
        })
        .collect();
    let missing = names
        .iter()
        .map(|name| {
            Ok(MissingCount {
                column: name.clone(),
                count: dataset.missing_count(name)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let mut distribution = Vec::new();
    for (name, kind) in names.iter().zip(dataset.kinds()) {
        if *kind != ColumnKind::Numeric {
            continue;
        }
        let values = dataset.numeric_values(name)?;
        if values.is_empty() {
            debug!(column = name.as_str(), "no values to describe");
            continue;
        }
        distribution.push(ColumnDistribution {
            column: name.clone(),
            summary: describe(&values, &STRUCTURE_FRACTIONS)?,
        });
    }
    Ok(StructuralSummary {
        rows: dataset.row_count(),
        columns: dataset.column_count(),
        dtypes,
        tail: dataset.tail(tail_rows),
        missing,
        distribution,
    })
}

impl fmt::Display for StructuralSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "##################### Shape #####################")?;
        writeln!(f, "({}, {})", self.rows, self.columns)?;
        writeln!(f, "##################### Types #####################")?;
        for t in &self.dtypes {
            writeln!(f, "{:<24} {} ({})", t.column, t.data_type, t.kind)?;
        }
        writeln!(f, "##################### Tail #####################")?;
        match self.tail.pretty() {
            Ok(table) => writeln!(f, "{table}")?,
            Err(_) => writeln!(f, "<unprintable rows>")?,
        }
        writeln!(f, "##################### NA #####################")?;
        for m in &self.missing {
            writeln!(f, "{:<24} {}", m.column, m.count)?;
        }
        write!(f, "##################### Quantiles #####################")?;
        for d in &self.distribution {
            let s = &d.summary;
            write!(f, "\n{:<24} count={} mean={:.4}", d.column, s.count, s.mean)?;
            match s.std {
                Some(std) => write!(f, " std={std:.4}")?,
                None => write!(f, " std=NaN")?,
            }
            for p in &s.quantiles {
                write!(f, " {}={:.4}", p.label(), p.value)?;
            }
        }
        Ok(())
    }
}
