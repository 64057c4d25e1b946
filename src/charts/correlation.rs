use arrow::error::ArrowError;

use crate::data::aggregate::correlation_matrix;
use crate::data::model::SurveyTable;

use super::ChartOutput;

/// Pairwise Pearson coefficients; `values[i][j]` pairs `columns[i]` with `columns[j]`.
/// Undefined coefficients are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Correlate every numeric column present in the view. Fewer than two columns
/// simply give a 1x1 or empty matrix.
pub fn build(view: &SurveyTable, numeric_columns: &[String]) -> ChartOutput {
    match correlate(view, numeric_columns) {
        Ok(matrix) => ChartOutput::Heatmap(matrix),
        Err(e) => ChartOutput::Warning(format!("Cannot compute correlations: {e}")),
    }
}

fn correlate(
    view: &SurveyTable,
    numeric_columns: &[String],
) -> Result<CorrelationMatrix, ArrowError> {
    let mut columns = Vec::new();
    let mut series = Vec::new();
    for name in numeric_columns {
        if let Some(values) = view.float_column(name)? {
            columns.push(name.clone());
            series.push(values);
        }
    }
    Ok(CorrelationMatrix {
        columns,
        values: correlation_matrix(&series)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    #[test]
    fn matrix_covers_numeric_columns() {
        let table = sample_table();
        let ChartOutput::Heatmap(m) = build(&table, &table.numeric_columns()) else {
            panic!("expected a heatmap");
        };
        assert_eq!(m.columns, vec!["year", "gap_", "score"]);
        assert_eq!(m.values.len(), 3);
        assert!((m.values[2][2] - 1.0).abs() < 1e-12);
        assert_eq!(m.values[0][2], m.values[2][0]);
    }

    #[test]
    fn single_column_degenerates_to_one_cell() {
        let table = sample_table();
        let output = build(&table, &["score".to_string()]);
        assert_eq!(output.series_len(), 1);
        assert_eq!(build(&table, &[]).series_len(), 0);
    }
}
