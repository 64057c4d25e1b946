use arrow::error::ArrowError;

use super::model::{ENTITY_COLUMN, SurveyTable};

/// The three summary tiles shown above the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kpis {
    pub rows: usize,
    pub numeric_columns: usize,
    pub entities: usize,
}

/// Rows in the view, size of the numeric column set, and distinct `entity`
/// values in the view (0 without an `entity` column).
pub fn summarize(view: &SurveyTable, numeric_columns: &[String]) -> Result<Kpis, ArrowError> {
    Ok(Kpis {
        rows: view.len(),
        numeric_columns: numeric_columns.len(),
        entities: view.distinct_text(ENTITY_COLUMN)?.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterState, SourceSelection, apply};
    use crate::data::model::tests::sample_table;

    #[test]
    fn counts_rows_numeric_columns_and_entities() {
        let table = sample_table();
        let numeric = table.numeric_columns();
        let kpis = summarize(&table, &numeric).unwrap();
        assert_eq!(
            kpis,
            Kpis {
                rows: 5,
                numeric_columns: 3,
                entities: 2
            }
        );
    }

    #[test]
    fn numeric_count_is_independent_of_the_view() {
        let table = sample_table();
        let numeric = table.numeric_columns();
        let filters = FilterState {
            source: SourceSelection::File("b.csv".into()),
            years: None,
        };
        let view = apply(&table, &filters).unwrap();
        let kpis = summarize(&view, &numeric).unwrap();
        assert_eq!(kpis.rows, 2);
        assert_eq!(kpis.numeric_columns, 3);
        assert_eq!(kpis.entities, 1);
    }

    #[test]
    fn missing_entity_column_counts_zero() {
        let table = sample_table();
        let batch = table.batch().project(&[1, 2]).unwrap();
        let view = SurveyTable::new(batch);
        assert_eq!(summarize(&view, &[]).unwrap().entities, 0);
    }
}
