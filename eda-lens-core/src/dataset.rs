use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use eda_lens_common::{EdaLensError, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Semantic tag attached to every column of a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Boolean,
}

impl ColumnKind {
    /// Integer, float and decimal types are numeric, `Boolean` is boolean and
    /// everything else (strings, dictionaries, temporal, binary) is categorical.
    pub fn infer(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => ColumnKind::Numeric,
            DataType::Boolean => ColumnKind::Boolean,
            _ => ColumnKind::Categorical,
        }
    }

    /// Whether a column of `data_type` may carry this tag.
    pub fn accepts(self, data_type: &DataType) -> bool {
        match self {
            // any column can be treated as a set of labels
            ColumnKind::Categorical => true,
            ColumnKind::Numeric | ColumnKind::Boolean => ColumnKind::infer(data_type) == self,
        }
    }

    /// Strings, categories and booleans.
    pub fn is_categorical_like(self) -> bool {
        matches!(self, ColumnKind::Categorical | ColumnKind::Boolean)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// In-memory table: an Arrow record batch plus one [`ColumnKind`] per column.
///
/// Tags are computed once when the dataset is built (or injected by the
/// caller) and are never re-probed by the analysis routines.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
    kinds: Vec<ColumnKind>,
}

impl Dataset {
    pub fn new(batch: RecordBatch) -> Self {
        let kinds = batch
            .schema()
            .fields()
            .iter()
            .map(|f| ColumnKind::infer(f.data_type()))
            .collect();
        Self { batch, kinds }
    }

    /// Builds a dataset with caller-supplied column tags.
    pub fn with_kinds(batch: RecordBatch, kinds: Vec<ColumnKind>) -> Result<Self> {
        if kinds.len() != batch.num_columns() {
            return Err(EdaLensError::InvalidInput(format!(
                "{} column kinds supplied for {} columns",
                kinds.len(),
                batch.num_columns()
            )));
        }
        for (field, kind) in batch.schema().fields().iter().zip(&kinds) {
            if !kind.accepts(field.data_type()) {
                return Err(EdaLensError::TypeMismatch {
                    column: field.name().clone(),
                    expected: kind.to_string(),
                    actual: field.data_type().to_string(),
                });
            }
        }
        Ok(Self { batch, kinds })
    }

    /// Builds a dataset from named arrays; every field is nullable.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, ArrayRef)>) -> Result<Self> {
        let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = columns
            .into_iter()
            .map(|(name, array)| {
                (
                    Field::new(name.into(), array.data_type().clone(), true),
                    array,
                )
            })
            .unzip();
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self::new(batch))
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.batch.num_rows()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.batch
            .schema()
            .index_of(name)
            .map_err(|_| EdaLensError::InvalidColumn(name.to_owned()))
    }

    pub fn kind_of(&self, name: &str) -> Result<ColumnKind> {
        Ok(self.kinds[self.column_index(name)?])
    }

    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        Ok(self.batch.column(self.column_index(name)?))
    }

    pub fn data_type(&self, name: &str) -> Result<DataType> {
        Ok(self.column(name)?.data_type().clone())
    }

    /// Fails with `TypeMismatch` unless `name` is tagged numeric.
    pub fn require_numeric(&self, name: &str) -> Result<usize> {
        let idx = self.column_index(name)?;
        if self.kinds[idx] != ColumnKind::Numeric {
            return Err(EdaLensError::TypeMismatch {
                column: name.to_owned(),
                expected: ColumnKind::Numeric.to_string(),
                actual: self.kinds[idx].to_string(),
            });
        }
        Ok(idx)
    }

    /// Per-row values of a numeric column as `f64`; missing values (null or NaN) are `None`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.require_numeric(name)?;
        let floats = as_float64(self.batch.column(idx))?;
        Ok(floats
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// Non-missing values of a numeric column, in row order.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.numeric_column(name)?.into_iter().flatten().collect())
    }

    /// `true` at every row where the column is null, or NaN for float columns.
    pub fn missing_mask(&self, name: &str) -> Result<Vec<bool>> {
        missing_mask(self.column(name)?)
    }

    pub fn missing_count(&self, name: &str) -> Result<usize> {
        Ok(self.missing_mask(name)?.into_iter().filter(|m| *m).count())
    }

    /// Display rendering of each row; missing rows are `None`.
    pub fn display_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let array = self.column(name)?;
        let missing = missing_mask(array)?;
        let options = FormatOptions::default();
        let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
        Ok(missing
            .iter()
            .enumerate()
            .map(|(row, &m)| {
                if m {
                    None
                } else {
                    Some(formatter.value(row).to_string())
                }
            })
            .collect())
    }

    /// Number of distinct non-missing values.
    pub fn cardinality(&self, name: &str) -> Result<usize> {
        let distinct: HashSet<String> = self.display_values(name)?.into_iter().flatten().collect();
        Ok(distinct.len())
    }

    /// The last `n` rows (all rows when `n` exceeds the row count).
    pub fn tail(&self, n: usize) -> Dataset {
        let rows = self.row_count();
        let n = n.min(rows);
        self.slice(rows - n, n)
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        self.slice(0, n.min(self.row_count()))
    }

    fn slice(&self, offset: usize, len: usize) -> Dataset {
        Dataset {
            batch: self.batch.slice(offset, len),
            kinds: self.kinds.clone(),
        }
    }

    /// Rows where `mask` is true, in their original order.
    pub fn filter(&self, mask: &BooleanArray) -> Result<Dataset> {
        Ok(Dataset {
            batch: filter_record_batch(&self.batch, mask)?,
            kinds: self.kinds.clone(),
        })
    }

    /// Swaps the array stored under `name`, updating the schema when the type changes.
    ///
    /// The column keeps its tag while the tag still accepts the new type.
    pub fn replace_column(&mut self, name: &str, array: ArrayRef) -> Result<()> {
        let idx = self.column_index(name)?;
        let schema = self.batch.schema();
        let fields: Vec<Field> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| {
                if i == idx {
                    f.as_ref().clone().with_data_type(array.data_type().clone())
                } else {
                    f.as_ref().clone()
                }
            })
            .collect();
        let mut columns = self.batch.columns().to_vec();
        columns[idx] = array;
        let new_schema = Schema::new_with_metadata(fields, schema.metadata().clone());
        self.batch = RecordBatch::try_new(Arc::new(new_schema), columns)?;
        let new_type = self.batch.column(idx).data_type();
        if !self.kinds[idx].accepts(new_type) {
            self.kinds[idx] = ColumnKind::infer(new_type);
        }
        Ok(())
    }

    /// A new dataset with `array` appended as a nullable column named `name`.
    pub fn with_column(&self, name: &str, array: ArrayRef) -> Result<Dataset> {
        if self.column_index(name).is_ok() {
            return Err(EdaLensError::InvalidInput(format!(
                "column '{name}' already exists"
            )));
        }
        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        fields.push(Field::new(name, array.data_type().clone(), true));
        let mut columns = self.batch.columns().to_vec();
        let kind = ColumnKind::infer(array.data_type());
        columns.push(array);
        let new_schema = Schema::new_with_metadata(fields, schema.metadata().clone());
        let mut kinds = self.kinds.clone();
        kinds.push(kind);
        Ok(Dataset {
            batch: RecordBatch::try_new(Arc::new(new_schema), columns)?,
            kinds,
        })
    }

    /// Renders the rows as an ASCII table.
    pub fn pretty(&self) -> Result<String> {
        Ok(arrow::util::pretty::pretty_format_batches(&[self.batch.clone()])?.to_string())
    }

    /// Column names plus display-rendered rows, for serialized reports.
    pub fn rows_view(&self) -> Result<RowsView> {
        let columns = self.column_names();
        let rendered: Vec<Vec<Option<String>>> = columns
            .iter()
            .map(|c| self.display_values(c))
            .collect::<Result<_>>()?;
        let rows = (0..self.row_count())
            .map(|r| rendered.iter().map(|col| col[r].clone()).collect())
            .collect();
        Ok(RowsView { columns, rows })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// `serialize_with` adapter writing a dataset as its [`RowsView`].
pub fn serialize_rows<S: Serializer>(
    dataset: &Dataset,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let view = dataset.rows_view().map_err(serde::ser::Error::custom)?;
    view.serialize(serializer)
}

pub(crate) fn as_float64(array: &ArrayRef) -> Result<Float64Array> {
    let casted = cast(array, &DataType::Float64)?;
    casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| {
            EdaLensError::Other("cast to Float64 produced a different array type".into())
        })
}

pub(crate) fn missing_mask(array: &ArrayRef) -> Result<Vec<bool>> {
    match array.data_type() {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => Ok(as_float64(array)?
            .iter()
            .map(|v| v.map_or(true, |x| x.is_nan()))
            .collect()),
        _ => Ok((0..array.len()).map(|row| array.is_null(row)).collect()),
    }
}
