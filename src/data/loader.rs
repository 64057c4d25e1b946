use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, new_null_array};
use arrow::compute::{cast, concat_batches};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use thiserror::Error;

use super::model::{SOURCE_FILE_COLUMN, SurveyTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read data directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no .csv files found in {0}")]
    NoCsvFiles(PathBuf),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: ArrowError,
    },

    #[error("failed to merge input files: {0}")]
    Merge(#[source] ArrowError),
}

// ---------------------------------------------------------------------------
// Load-once cache
// ---------------------------------------------------------------------------

static UNIFIED: OnceCell<SurveyTable> = OnceCell::new();

/// Load the unified table on first call and hand out the cached copy afterwards.
///
/// The directory is only consulted by the call that performs the load; once the
/// table exists there is no way to rebuild or mutate it.
pub fn load_cached(dir: &Path) -> Result<&'static SurveyTable, LoadError> {
    UNIFIED.get_or_try_init(|| load_directory(dir))
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Lowercase a header, then collapse every run of characters outside
/// `[a-z0-9_]` into a single underscore.
pub fn normalize_column_name(name: &str) -> String {
    static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_]+").unwrap());
    NON_WORD.replace_all(&name.to_lowercase(), "_").into_owned()
}

/// All `*.csv` files directly inside `dir`, sorted by file name.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("csv"))
        .collect();
    files.sort();
    Ok(files)
}

/// Read every CSV in `dir` and merge them into one table.
///
/// Fails with [`LoadError::NoCsvFiles`] when there is nothing to merge.
pub fn load_directory(dir: &Path) -> Result<SurveyTable, LoadError> {
    let files = discover_csv_files(dir)?;
    if files.is_empty() {
        return Err(LoadError::NoCsvFiles(dir.to_path_buf()));
    }

    let batches = files
        .iter()
        .map(|path| load_csv(path))
        .collect::<Result<Vec<_>, _>>()?;

    let table = unify(&batches).map_err(LoadError::Merge)?;
    log::info!(
        "Loaded {} rows from {} file(s) with columns {:?}",
        table.len(),
        files.len(),
        table.column_names()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse one comma-delimited file with a header row, append the
/// `source_file` column and normalize the column names.
fn load_csv(path: &Path) -> Result<RecordBatch, LoadError> {
    let csv_err = |source: ArrowError| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let open_err = |source: std::io::Error| LoadError::Open {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(open_err)?;
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(&mut file, None).map_err(csv_err)?;
    file.rewind().map_err(open_err)?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(file)
        .map_err(csv_err)?;
    let parts = reader.collect::<Result<Vec<_>, _>>().map_err(csv_err)?;
    let batch = concat_batches(&schema, &parts).map_err(csv_err)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| Field::new(normalize_column_name(f.name()), f.data_type().clone(), true))
        .collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    fields.push(Field::new(SOURCE_FILE_COLUMN, DataType::Utf8, true));
    columns.push(Arc::new(StringArray::from(vec![file_name.as_str(); batch.num_rows()])));

    log::debug!("Parsed {} rows from {}", batch.num_rows(), path.display());
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(csv_err)
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Common type for a column seen with two different types.
fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        _ if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        _ if a.is_numeric() && b.is_numeric() => DataType::Float64,
        _ => DataType::Utf8,
    }
}

/// Union of all columns in first-seen order, each with its widened type.
fn union_schema(batches: &[RecordBatch]) -> Schema {
    let mut fields: Vec<(String, DataType)> = Vec::new();
    for batch in batches {
        for field in batch.schema().fields() {
            match fields.iter_mut().find(|(name, _)| name == field.name()) {
                Some((_, ty)) => *ty = widen(ty, field.data_type()),
                None => fields.push((field.name().clone(), field.data_type().clone())),
            }
        }
    }
    Schema::new(
        fields
            .into_iter()
            .map(|(name, ty)| Field::new(name, ty, true))
            .collect::<Vec<_>>(),
    )
}

/// Concatenate per-file batches row-wise.
///
/// Columns a file lacks are filled with nulls. When two headers of the same file
/// normalize to one name, the right-most column wins.
fn unify(batches: &[RecordBatch]) -> Result<SurveyTable, ArrowError> {
    let schema = Arc::new(union_schema(batches));

    let aligned = batches
        .iter()
        .map(|batch| {
            let own = batch.schema();
            let columns = schema
                .fields()
                .iter()
                .map(|target| {
                    let matches = own.fields().iter().filter(|f| f.name() == target.name()).count();
                    if matches > 1 {
                        log::warn!("Column name '{}' collides after normalization", target.name());
                    }
                    match own.fields().iter().rposition(|f| f.name() == target.name()) {
                        Some(idx) => cast(batch.column(idx), target.data_type()),
                        None => Ok(new_null_array(target.data_type(), batch.num_rows())),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            RecordBatch::try_new(schema.clone(), columns)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SurveyTable::new(concat_batches(&schema, &aligned)?))
}
