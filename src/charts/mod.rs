//! Chart dispatch: one active [`ViewMode`] routes the filtered view to one renderer.
//!
//! Renderers are pure: they read the view and return a [`ChartOutput`] that the
//! UI layer draws. A renderer with nothing applicable to show returns
//! [`ChartOutput::Warning`] instead of failing.

pub mod bar;
pub mod correlation;
pub mod pie;
pub mod preview;
pub mod trend;

use std::fmt;

use crate::config::DEFAULT_TOP_N;
use crate::data::model::SurveyTable;

pub use bar::RankedBars;
pub use correlation::CorrelationMatrix;
pub use pie::PieSlices;
pub use preview::PreviewTable;
pub use trend::TrendLine;

// ---------------------------------------------------------------------------
// View modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    DataPreview,
    BarChart,
    TrendOverTime,
    TreatmentGapPie,
    Correlation,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::DataPreview,
        ViewMode::BarChart,
        ViewMode::TrendOverTime,
        ViewMode::TreatmentGapPie,
        ViewMode::Correlation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::DataPreview => "Data Preview",
            ViewMode::BarChart => "Bar Chart",
            ViewMode::TrendOverTime => "Trend Over Time",
            ViewMode::TreatmentGapPie => "Treatment Gap Pie",
            ViewMode::Correlation => "Correlation",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bar chart ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    HighestFirst,
    LowestFirst,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::HighestFirst, SortOrder::LowestFirst];

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::HighestFirst => "Highest First",
            SortOrder::LowestFirst => "Lowest First",
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters and output
// ---------------------------------------------------------------------------

/// User-chosen chart parameters. Only the active mode reads its own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartParams {
    pub bar_metric: Option<String>,
    pub top_n: usize,
    pub order: SortOrder,
    pub trend_metric: Option<String>,
}

impl ChartParams {
    /// Metric selectors start on the first numeric column.
    pub fn new(numeric_columns: &[String]) -> Self {
        let first = numeric_columns.first().cloned();
        Self {
            bar_metric: first.clone(),
            top_n: DEFAULT_TOP_N,
            order: SortOrder::default(),
            trend_metric: first,
        }
    }
}

/// The artifact produced by one renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutput {
    Preview(PreviewTable),
    Bars(RankedBars),
    Trend(TrendLine),
    Pie(PieSlices),
    Heatmap(CorrelationMatrix),
    /// Inline, non-blocking message shown in place of a chart.
    Warning(String),
}

impl ChartOutput {
    /// Number of data points in the artifact (rows, bars, points, slices, cells).
    pub fn series_len(&self) -> usize {
        match self {
            ChartOutput::Preview(t) => t.rows.len(),
            ChartOutput::Bars(b) => b.bars.len(),
            ChartOutput::Trend(t) => t.points.len(),
            ChartOutput::Pie(p) => p.slices.len(),
            ChartOutput::Heatmap(m) => m.values.iter().map(Vec::len).sum(),
            ChartOutput::Warning(_) => 0,
        }
    }
}

/// Route the filtered view to the renderer for `mode`.
pub fn render(
    mode: ViewMode,
    view: &SurveyTable,
    numeric_columns: &[String],
    params: &ChartParams,
) -> ChartOutput {
    let output = match mode {
        ViewMode::DataPreview => preview::build(view),
        ViewMode::BarChart => {
            bar::build(view, params.bar_metric.as_deref(), params.top_n, params.order)
        }
        ViewMode::TrendOverTime => trend::build(view, params.trend_metric.as_deref()),
        ViewMode::TreatmentGapPie => pie::build(view),
        ViewMode::Correlation => correlation::build(view, numeric_columns),
    };
    if let ChartOutput::Warning(msg) = &output {
        log::warn!("{mode}: {msg}");
    }
    output
}
