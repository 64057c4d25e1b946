use crate::config::PREVIEW_ROWS;
use crate::data::model::SurveyTable;

use super::ChartOutput;

/// The first rows of the filtered view, rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Always renders, even for an empty view.
pub fn build(view: &SurveyTable) -> ChartOutput {
    let head = view.head(PREVIEW_ROWS);
    match head.display_rows() {
        Ok(rows) => ChartOutput::Preview(PreviewTable {
            columns: head.column_names(),
            rows,
        }),
        Err(e) => ChartOutput::Warning(format!("Cannot display rows: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    #[test]
    fn shows_at_most_fifteen_rows() {
        let ChartOutput::Preview(table) = build(&sample_table()) else {
            panic!("expected a preview");
        };
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.columns.len(), 5);
        assert_eq!(table.rows[1], vec!["Chile", "2001", "20.0", "2.0", "a.csv"]);
    }

    #[test]
    fn empty_view_still_renders() {
        let empty = sample_table().head(0);
        let output = build(&empty);
        assert!(matches!(output, ChartOutput::Preview(ref t) if t.rows.is_empty()));
        assert_eq!(output.series_len(), 0);
    }
}
