use arrow::error::ArrowError;

use crate::data::aggregate::group_mean_by_year;
use crate::data::model::{SurveyTable, YEAR_COLUMN};

use super::ChartOutput;

/// Yearly mean of one metric, ordered by year.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub metric: String,
    /// `[year, mean]` points.
    pub points: Vec<[f64; 2]>,
}

pub fn build(view: &SurveyTable, metric: Option<&str>) -> ChartOutput {
    if !view.has_column(YEAR_COLUMN) {
        return ChartOutput::Warning("This dataset does not contain a 'year' column.".into());
    }
    let Some(metric) = metric else {
        return ChartOutput::Warning("No numeric column available for a trend.".into());
    };
    match yearly_means(view, metric) {
        Ok(Some(points)) => ChartOutput::Trend(TrendLine {
            metric: metric.to_string(),
            points,
        }),
        Ok(None) => ChartOutput::Warning(format!("Column '{metric}' is not in the filtered data.")),
        Err(e) => ChartOutput::Warning(format!("Cannot build a trend of '{metric}': {e}")),
    }
}

fn yearly_means(view: &SurveyTable, metric: &str) -> Result<Option<Vec<[f64; 2]>>, ArrowError> {
    let years = view.int_column(YEAR_COLUMN)?;
    let values = view.float_column(metric)?;
    let (Some(years), Some(values)) = (years, values) else {
        return Ok(None);
    };
    Ok(Some(
        group_mean_by_year(&years, &values)?
            .into_iter()
            .map(|(year, mean)| [year as f64, mean])
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    #[test]
    fn averages_metric_per_year() {
        let ChartOutput::Trend(line) = build(&sample_table(), Some("gap_")) else {
            panic!("expected a trend line");
        };
        assert_eq!(line.metric, "gap_");
        assert_eq!(
            line.points,
            vec![[2000.0, 20.0], [2001.0, 12.5]]
        );
    }

    #[test]
    fn missing_year_column_warns_without_chart() {
        let table = sample_table();
        let view = SurveyTable::new(table.batch().project(&[0, 2, 3]).unwrap());
        let output = build(&view, Some("score"));
        assert_eq!(
            output,
            ChartOutput::Warning("This dataset does not contain a 'year' column.".into())
        );
        assert_eq!(output.series_len(), 0);
    }
}
