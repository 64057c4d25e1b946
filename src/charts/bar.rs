use arrow::error::ArrowError;

use crate::data::aggregate::{GroupMean, group_mean};
use crate::data::model::SurveyTable;

use super::{ChartOutput, SortOrder};

pub const TITLE: &str = "Top Entities Ranked";

/// Per-category means of one metric, ranked and truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedBars {
    pub category: String,
    pub metric: String,
    pub bars: Vec<GroupMean>,
}

/// Group by the category column, average `metric`, sort, keep `top_n`.
pub fn build(
    view: &SurveyTable,
    metric: Option<&str>,
    top_n: usize,
    order: SortOrder,
) -> ChartOutput {
    let Some(metric) = metric else {
        return ChartOutput::Warning("No numeric column available to rank.".into());
    };
    let Some(category) = view.category_column() else {
        return ChartOutput::Warning("The filtered data has no columns.".into());
    };
    match rank(view, &category, metric, top_n, order) {
        Ok(Some(bars)) => ChartOutput::Bars(RankedBars {
            category,
            metric: metric.to_string(),
            bars,
        }),
        Ok(None) => ChartOutput::Warning(format!("Column '{metric}' is not in the filtered data.")),
        Err(e) => ChartOutput::Warning(format!("Cannot rank by '{metric}': {e}")),
    }
}

fn rank(
    view: &SurveyTable,
    category: &str,
    metric: &str,
    top_n: usize,
    order: SortOrder,
) -> Result<Option<Vec<GroupMean>>, ArrowError> {
    let (Some(keys), Some(values)) = (view.key_column(category)?, view.float_column(metric)?) else {
        return Ok(None);
    };
    let mut groups = group_mean(&keys, &values)?;
    match order {
        SortOrder::HighestFirst => groups.sort_by(|a, b| b.mean.total_cmp(&a.mean)),
        SortOrder::LowestFirst => groups.sort_by(|a, b| a.mean.total_cmp(&b.mean)),
    }
    groups.truncate(top_n);
    Ok(Some(groups))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    fn bars(output: ChartOutput) -> RankedBars {
        match output {
            ChartOutput::Bars(b) => b,
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn highest_first_is_non_increasing() {
        let b = bars(build(&sample_table(), Some("score"), 10, SortOrder::HighestFirst));
        assert_eq!(b.category, "entity");
        let keys: Vec<_> = b.bars.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Peru", "Chile"]);
        assert!(b.bars.windows(2).all(|w| w[0].mean >= w[1].mean));
    }

    #[test]
    fn lowest_first_is_non_decreasing() {
        let b = bars(build(&sample_table(), Some("score"), 10, SortOrder::LowestFirst));
        assert_eq!(b.bars[0].mean, 1.5);
        assert!(b.bars.windows(2).all(|w| w[0].mean <= w[1].mean));
    }

    #[test]
    fn length_is_min_of_n_and_categories() {
        let table = sample_table();
        for n in [1, 2, 3, 20] {
            let b = bars(build(&table, Some("score"), n, SortOrder::HighestFirst));
            assert_eq!(b.bars.len(), n.min(2));
        }
    }

    #[test]
    fn falls_back_to_first_column_without_entity() {
        let table = sample_table();
        let view = SurveyTable::new(table.batch().project(&[1, 3]).unwrap());
        let b = bars(build(&view, Some("score"), 10, SortOrder::HighestFirst));
        assert_eq!(b.category, "year");
        assert_eq!(b.bars.len(), 3);
        assert_eq!(b.bars[0].key, "2002");
    }

    #[test]
    fn missing_metric_warns() {
        let output = build(&sample_table(), None, 10, SortOrder::HighestFirst);
        assert!(matches!(output, ChartOutput::Warning(_)));
        let output = build(&sample_table(), Some("nope"), 10, SortOrder::HighestFirst);
        assert!(matches!(output, ChartOutput::Warning(_)));
    }
}
