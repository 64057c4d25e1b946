use std::collections::BTreeSet;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray,
};
use arrow::compute::{cast, max, min, nullif};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};

// ---------------------------------------------------------------------------
// Well-known column names
// ---------------------------------------------------------------------------

/// Column added by the loader recording which file a row came from.
pub const SOURCE_FILE_COLUMN: &str = "source_file";
/// Optional column driving the year-range filter and the trend chart.
pub const YEAR_COLUMN: &str = "year";
/// Optional categorical column naming the measured subject (country, group, ...).
pub const ENTITY_COLUMN: &str = "entity";

/// Placeholder shown for null cells.
pub const NULL_LABEL: &str = "<null>";

// ---------------------------------------------------------------------------
// SurveyTable – the unified table and every view derived from it
// ---------------------------------------------------------------------------

/// An immutable, column-typed table backed by a single Arrow `RecordBatch`.
///
/// The unified table built by the loader and every filtered view share this
/// type; filtering produces a new `SurveyTable` and never touches the source.
#[derive(Debug, Clone)]
pub struct SurveyTable {
    batch: RecordBatch,
}

impl SurveyTable {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Columns whose Arrow type is numeric (booleans excluded).
    pub fn numeric_columns(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .filter(|f| f.data_type().is_numeric())
            .map(|f| f.name().clone())
            .collect()
    }

    /// Grouping column for ranked charts: `entity` when present, else the first column.
    pub fn category_column(&self) -> Option<String> {
        if self.has_column(ENTITY_COLUMN) {
            return Some(ENTITY_COLUMN.to_string());
        }
        self.column_names().into_iter().next()
    }

    /// The first `n` rows (or all of them, if fewer).
    pub fn head(&self, n: usize) -> SurveyTable {
        let n = n.min(self.len());
        SurveyTable::new(self.batch.slice(0, n))
    }

    /// Column cast to `Float64`. Cells that are null, non-numeric or NaN become null.
    pub fn float_column(&self, name: &str) -> Result<Option<Float64Array>, ArrowError> {
        let Some(col) = self.column(name) else {
            return Ok(None);
        };
        let floats = cast(col, &DataType::Float64)?;
        let nan: BooleanArray = floats
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| Some(v.is_some_and(f64::is_nan)))
            .collect();
        let cleaned = nullif(&floats, &nan)?;
        Ok(Some(cleaned.as_primitive::<Float64Type>().clone()))
    }

    /// Column cast to `Int64` (fractional values truncate).
    pub fn int_column(&self, name: &str) -> Result<Option<Int64Array>, ArrowError> {
        let Some(col) = self.column(name) else {
            return Ok(None);
        };
        let ints = cast(col, &DataType::Int64)?;
        Ok(Some(ints.as_primitive::<Int64Type>().clone()))
    }

    /// Column cast to `Utf8`, used as grouping keys.
    pub fn key_column(&self, name: &str) -> Result<Option<StringArray>, ArrowError> {
        let Some(col) = self.column(name) else {
            return Ok(None);
        };
        let keys = cast(col, &DataType::Utf8)?;
        Ok(Some(keys.as_string::<i32>().clone()))
    }

    /// Column values as `f64`. Cells that are null, non-numeric or NaN become `None`.
    pub fn f64_values(&self, name: &str) -> Result<Option<Vec<Option<f64>>>, ArrowError> {
        Ok(self.float_column(name)?.map(|a| a.iter().collect()))
    }

    /// Column values as `i64` (fractional values truncate).
    pub fn i64_values(&self, name: &str) -> Result<Option<Vec<Option<i64>>>, ArrowError> {
        Ok(self.int_column(name)?.map(|a| a.iter().collect()))
    }

    /// Column values rendered as text; null cells become `None`.
    pub fn text_values(&self, name: &str) -> Result<Option<Vec<Option<String>>>, ArrowError> {
        let Some(col) = self.column(name) else {
            return Ok(None);
        };
        Ok(Some(format_column(col.as_ref())?))
    }

    /// Distinct non-null values of a column, sorted. Empty when the column is absent.
    pub fn distinct_text(&self, name: &str) -> Result<BTreeSet<String>, ArrowError> {
        Ok(self
            .text_values(name)?
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect())
    }

    /// Smallest and largest value of the `year` column, if it has any.
    pub fn year_bounds(&self) -> Result<Option<(i64, i64)>, ArrowError> {
        let Some(years) = self.int_column(YEAR_COLUMN)? else {
            return Ok(None);
        };
        Ok(min(&years).zip(max(&years)))
    }

    /// Every cell rendered as text, row-major, with nulls shown as [`NULL_LABEL`].
    pub fn display_rows(&self) -> Result<Vec<Vec<String>>, ArrowError> {
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|c| format_column(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((0..self.len())
            .map(|row| {
                columns
                    .iter()
                    .map(|col| col[row].clone().unwrap_or_else(|| NULL_LABEL.to_string()))
                    .collect()
            })
            .collect())
    }
}

fn format_column(array: &dyn Array) -> Result<Vec<Option<String>>, ArrowError> {
    let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
    Ok((0..array.len())
        .map(|i| {
            if array.is_null(i) {
                None
            } else {
                Some(formatter.value(i).to_string())
            }
        })
        .collect())
}
