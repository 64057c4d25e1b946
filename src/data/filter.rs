use std::fmt;

use arrow::array::BooleanArray;
use arrow::compute::filter_record_batch;
use arrow::error::ArrowError;

use super::model::{SOURCE_FILE_COLUMN, SurveyTable, YEAR_COLUMN};

// ---------------------------------------------------------------------------
// Filter inputs
// ---------------------------------------------------------------------------

/// Dataset-source selector: every file, or the rows of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceSelection {
    #[default]
    All,
    File(String),
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelection::All => write!(f, "All"),
            SourceSelection::File(name) => write!(f, "{name}"),
        }
    }
}

/// Selector options: "All" followed by each distinct `source_file`, sorted.
pub fn source_options(table: &SurveyTable) -> Result<Vec<SourceSelection>, ArrowError> {
    let files = table.distinct_text(SOURCE_FILE_COLUMN)?;
    Ok(std::iter::once(SourceSelection::All)
        .chain(files.into_iter().map(SourceSelection::File))
        .collect())
}

/// Current filter selections.
///
/// `years` is an inclusive `(min, max)` pair and only has an effect when the
/// table carries a `year` column; `None` means "no year restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub source: SourceSelection,
    pub years: Option<(i64, i64)>,
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Rows of `table` belonging to the selected source.
pub fn select_source(
    table: &SurveyTable,
    source: &SourceSelection,
) -> Result<SurveyTable, ArrowError> {
    let SourceSelection::File(wanted) = source else {
        return Ok(table.clone());
    };
    let Some(files) = table.text_values(SOURCE_FILE_COLUMN)? else {
        return Ok(table.clone());
    };
    let mask: BooleanArray = files
        .iter()
        .map(|f| Some(f.as_deref() == Some(wanted.as_str())))
        .collect();
    Ok(SurveyTable::new(filter_record_batch(table.batch(), &mask)?))
}

/// Allowed year-slider range for a source selection: the min/max `year`
/// among that source's rows. `None` when there is no usable `year` column.
pub fn year_span(
    table: &SurveyTable,
    source: &SourceSelection,
) -> Result<Option<(i64, i64)>, ArrowError> {
    if !table.has_column(YEAR_COLUMN) {
        return Ok(None);
    }
    select_source(table, source)?.year_bounds()
}

/// Produce the filtered view. The input table is never modified.
///
/// A range covering every year of the selected source is no restriction at all,
/// so rows with a null `year` stay. A narrower range drops them.
pub fn apply(table: &SurveyTable, filters: &FilterState) -> Result<SurveyTable, ArrowError> {
    let view = select_source(table, &filters.source)?;

    let Some((lo, hi)) = filters.years else {
        return Ok(view);
    };
    let covers_span = match view.year_bounds()? {
        Some((first, last)) => lo <= first && last <= hi,
        None => true,
    };
    if covers_span {
        return Ok(view);
    }
    let Some(years) = view.int_column(YEAR_COLUMN)? else {
        return Ok(view);
    };
    let mask: BooleanArray = years
        .iter()
        .map(|y| Some(y.is_some_and(|y| lo <= y && y <= hi)))
        .collect();
    let view = SurveyTable::new(filter_record_batch(view.batch(), &mask)?);

    log::debug!(
        "Filter {} / {lo}..={hi} keeps {} of {} rows",
        filters.source,
        view.len(),
        table.len()
    );
    Ok(view)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;
    use crate::data::model::tests::sample_table;

    fn file(name: &str) -> SourceSelection {
        SourceSelection::File(name.to_string())
    }

    #[test]
    fn options_start_with_all_then_sorted_files() {
        let opts = source_options(&sample_table()).unwrap();
        assert_eq!(opts, vec![SourceSelection::All, file("a.csv"), file("b.csv")]);
        assert_eq!(opts[0].to_string(), "All");
    }

    #[test]
    fn all_with_full_span_keeps_every_row() {
        let table = sample_table();
        let span = year_span(&table, &SourceSelection::All).unwrap();
        assert_eq!(span, Some((2000, 2002)));
        let filters = FilterState {
            source: SourceSelection::All,
            years: span,
        };
        assert_eq!(apply(&table, &filters).unwrap().len(), table.len());
    }

    #[test]
    fn source_selection_restricts_rows_and_year_span() {
        let table = sample_table();
        let filters = FilterState {
            source: file("a.csv"),
            years: None,
        };
        assert_eq!(apply(&table, &filters).unwrap().len(), 3);
        assert_eq!(year_span(&table, &file("b.csv")).unwrap(), Some((2001, 2002)));
    }

    #[test]
    fn year_range_is_inclusive() {
        let table = sample_table();
        let filters = FilterState {
            source: SourceSelection::All,
            years: Some((2001, 2001)),
        };
        let view = apply(&table, &filters).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.year_bounds().unwrap(), Some((2001, 2001)));
    }

    #[test]
    fn filtering_never_grows_and_is_idempotent() {
        let table = sample_table();
        for source in source_options(&table).unwrap() {
            for years in [None, Some((2000, 2000)), Some((2001, 2002)), Some((1990, 1991))] {
                let filters = FilterState {
                    source: source.clone(),
                    years,
                };
                let once = apply(&table, &filters).unwrap();
                let twice = apply(&once, &filters).unwrap();
                assert!(once.len() <= table.len());
                assert_eq!(once.batch(), twice.batch());
            }
        }
        assert_eq!(table.len(), 5);
    }

    fn table_with_missing_years() -> SurveyTable {
        let schema = Schema::new(vec![
            Field::new(YEAR_COLUMN, DataType::Int64, true),
            Field::new(SOURCE_FILE_COLUMN, DataType::Utf8, false),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![Some(2000), Some(2001), None])),
                Arc::new(StringArray::from(vec!["a.csv", "a.csv", "b.csv"])),
            ],
        )
        .unwrap();
        SurveyTable::new(batch)
    }

    #[test]
    fn full_span_keeps_rows_without_a_year() {
        let table = table_with_missing_years();
        let filters = FilterState {
            source: SourceSelection::All,
            years: year_span(&table, &SourceSelection::All).unwrap(),
        };
        assert_eq!(filters.years, Some((2000, 2001)));
        assert_eq!(apply(&table, &filters).unwrap().len(), 3);
    }

    #[test]
    fn narrowed_range_drops_rows_without_a_year() {
        let table = table_with_missing_years();
        let filters = FilterState {
            source: SourceSelection::All,
            years: Some((2001, 2001)),
        };
        let view = apply(&table, &filters).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.year_bounds().unwrap(), Some((2001, 2001)));

        let only_nulls = FilterState {
            source: file("b.csv"),
            years: Some((2001, 2001)),
        };
        assert_eq!(apply(&table, &only_nulls).unwrap().len(), 1);
    }

    #[test]
    fn unknown_source_yields_empty_view() {
        let view = select_source(&sample_table(), &file("zzz.csv")).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.column_names().len(), 5);
    }
}
