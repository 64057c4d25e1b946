use arrow::error::ArrowError;

use crate::config::PIE_SLICES;
use crate::data::aggregate::{GroupMean, group_mean};
use crate::data::model::SurveyTable;

use super::ChartOutput;

/// Substrings that mark a column as a treatment-gap style metric, checked in order
/// against each column name.
pub const GAP_MARKERS: [&str; 2] = ["gap", "percent"];

/// The largest per-category means of the gap metric.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlices {
    pub category: String,
    pub metric: String,
    pub slices: Vec<GroupMean>,
}

impl PieSlices {
    /// Each slice's share of the total, in percent.
    pub fn shares(&self) -> Vec<f64> {
        let total: f64 = self.slices.iter().map(|s| s.mean).sum();
        self.slices
            .iter()
            .map(|s| if total == 0.0 { 0.0 } else { s.mean / total * 100.0 })
            .collect()
    }
}

/// First column (in table order) whose name contains any of [`GAP_MARKERS`].
pub fn gap_column(view: &SurveyTable) -> Option<String> {
    view.column_names()
        .into_iter()
        .find(|name| GAP_MARKERS.iter().any(|m| name.contains(m)))
}

pub fn build(view: &SurveyTable) -> ChartOutput {
    let Some(metric) = gap_column(view) else {
        return ChartOutput::Warning("No gap column found.".into());
    };
    let Some(category) = view.category_column() else {
        return ChartOutput::Warning("The filtered data has no columns.".into());
    };
    match largest_groups(view, &category, &metric) {
        Ok(slices) => ChartOutput::Pie(PieSlices {
            category,
            metric,
            slices,
        }),
        Err(e) => ChartOutput::Warning(format!("Cannot summarize '{metric}': {e}")),
    }
}

fn largest_groups(
    view: &SurveyTable,
    category: &str,
    metric: &str,
) -> Result<Vec<GroupMean>, ArrowError> {
    let (Some(keys), Some(values)) = (view.key_column(category)?, view.float_column(metric)?) else {
        return Ok(Vec::new());
    };
    let mut groups = group_mean(&keys, &values)?;
    groups.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    groups.truncate(PIE_SLICES);
    Ok(groups)
}
