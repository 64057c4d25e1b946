use crate::charts::{self, ChartOutput, ChartParams, SortOrder, ViewMode};
use crate::config::TOP_N_RANGE;
use crate::data::filter::{self, FilterState, SourceSelection};
use crate::data::kpi::{self, Kpis};
use crate::data::model::SurveyTable;

// ---------------------------------------------------------------------------
// Input events
// ---------------------------------------------------------------------------

/// A single user interaction coming from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectSource(SourceSelection),
    SetYearRange(i64, i64),
    SelectMode(ViewMode),
    SetBarMetric(String),
    SetTopN(usize),
    SetSortOrder(SortOrder),
    SetTrendMetric(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The unified table is borrowed and never reloaded; each event recomputes only
/// what it invalidates (filter events rebuild the view, everything re-renders
/// the active chart).
pub struct AppState<'a> {
    table: &'a SurveyTable,

    /// Numeric columns of the unified table, computed once.
    numeric_columns: Vec<String>,

    /// "All" plus every source file, sorted.
    sources: Vec<SourceSelection>,

    filters: FilterState,

    /// Slider bounds for the current source; `None` without a `year` column.
    year_span: Option<(i64, i64)>,

    mode: ViewMode,
    params: ChartParams,

    view: SurveyTable,
    kpis: Kpis,
    output: ChartOutput,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl<'a> AppState<'a> {
    pub fn new(table: &'a SurveyTable) -> Self {
        let numeric_columns = table.numeric_columns();
        let params = ChartParams::new(&numeric_columns);
        let mut state = Self {
            table,
            numeric_columns,
            sources: vec![SourceSelection::All],
            filters: FilterState::default(),
            year_span: None,
            mode: ViewMode::default(),
            params,
            view: table.clone(),
            kpis: Kpis::default(),
            output: ChartOutput::Warning(String::new()),
            status_message: None,
        };

        match filter::source_options(table) {
            Ok(sources) => state.sources = sources,
            Err(e) => state.report(format!("Cannot list source files: {e}")),
        }
        let span = state.source_span(&SourceSelection::All);
        state.refilter(
            FilterState {
                source: SourceSelection::All,
                years: span,
            },
            span,
        );
        state
    }

    pub fn sources(&self) -> &[SourceSelection] {
        &self.sources
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn year_span(&self) -> Option<(i64, i64)> {
        self.year_span
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn params(&self) -> &ChartParams {
        &self.params
    }

    pub fn view(&self) -> &SurveyTable {
        &self.view
    }

    pub fn kpis(&self) -> Kpis {
        self.kpis
    }

    pub fn output(&self) -> &ChartOutput {
        &self.output
    }

    /// Apply one interaction and recompute what it invalidates.
    pub fn apply(&mut self, event: UiEvent) {
        log::debug!("{event:?}");
        match event {
            UiEvent::SelectSource(source) => {
                if source == self.filters.source {
                    return;
                }
                let span = self.source_span(&source);
                self.refilter(FilterState { source, years: span }, span);
            }
            UiEvent::SetYearRange(lo, hi) => {
                let Some((min, max)) = self.year_span else {
                    return;
                };
                let lo = lo.clamp(min, max);
                let hi = hi.clamp(lo, max);
                let filters = FilterState {
                    source: self.filters.source.clone(),
                    years: Some((lo, hi)),
                };
                self.refilter(filters, self.year_span);
            }
            UiEvent::SelectMode(mode) => {
                self.mode = mode;
                self.rerender();
            }
            UiEvent::SetBarMetric(metric) => {
                self.params.bar_metric = Some(metric);
                self.rerender();
            }
            UiEvent::SetTopN(n) => {
                self.params.top_n = n.clamp(*TOP_N_RANGE.start(), *TOP_N_RANGE.end());
                self.rerender();
            }
            UiEvent::SetSortOrder(order) => {
                self.params.order = order;
                self.rerender();
            }
            UiEvent::SetTrendMetric(metric) => {
                self.params.trend_metric = Some(metric);
                self.rerender();
            }
        }
    }

    /// Full year span of `source`, used to re-seed the year slider.
    fn source_span(&mut self, source: &SourceSelection) -> Option<(i64, i64)> {
        match filter::year_span(self.table, source) {
            Ok(span) => span,
            Err(e) => {
                self.report(format!("Cannot read years: {e}"));
                None
            }
        }
    }

    /// Filter with `filters` and, on success, commit them together with the new
    /// view and slider span. On failure the previous selection and view stay in
    /// place. KPIs and the chart are recomputed from whichever view is current.
    fn refilter(&mut self, filters: FilterState, year_span: Option<(i64, i64)>) {
        match filter::apply(self.table, &filters) {
            Ok(view) => {
                self.filters = filters;
                self.year_span = year_span;
                self.view = view;
            }
            Err(e) => self.report(format!("Filtering failed: {e}")),
        }
        match kpi::summarize(&self.view, &self.numeric_columns) {
            Ok(kpis) => self.kpis = kpis,
            Err(e) => self.report(format!("Cannot compute summary: {e}")),
        }
        self.rerender();
    }

    fn rerender(&mut self) {
        self.output = charts::render(self.mode, &self.view, &self.numeric_columns, &self.params);
    }

    fn report(&mut self, message: String) {
        log::error!("{message}");
        self.status_message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{BinaryArray, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use tempfile::TempDir;

    use super::*;
    use crate::data::loader::load_directory;
    use crate::data::model::tests::sample_table;

    #[test]
    fn starts_on_preview_with_everything_visible() {
        let table = sample_table();
        let state = AppState::new(&table);
        assert_eq!(state.mode(), ViewMode::DataPreview);
        assert_eq!(state.kpis().rows, 5);
        assert_eq!(state.year_span(), Some((2000, 2002)));
        assert!(matches!(state.output(), ChartOutput::Preview(_)));
        assert_eq!(state.sources().len(), 3);
    }

    #[test]
    fn source_change_reseeds_year_range() {
        let table = sample_table();
        let mut state = AppState::new(&table);
        state.apply(UiEvent::SetYearRange(2000, 2000));
        assert_eq!(state.kpis().rows, 2);

        state.apply(UiEvent::SelectSource(SourceSelection::File("b.csv".into())));
        assert_eq!(state.year_span(), Some((2001, 2002)));
        assert_eq!(state.filters().years, Some((2001, 2002)));
        assert_eq!(state.kpis().rows, 2);
    }

    #[test]
    fn year_range_is_clamped_to_span() {
        let table = sample_table();
        let mut state = AppState::new(&table);
        state.apply(UiEvent::SetYearRange(1900, 2001));
        assert_eq!(state.filters().years, Some((2000, 2001)));
        state.apply(UiEvent::SetYearRange(2002, 2000));
        assert_eq!(state.filters().years, Some((2002, 2002)));
        assert_eq!(state.view().len(), 1);
    }

    #[test]
    fn mode_and_params_rerender_without_refiltering() {
        let table = sample_table();
        let mut state = AppState::new(&table);
        state.apply(UiEvent::SelectSource(SourceSelection::File("a.csv".into())));
        state.apply(UiEvent::SelectMode(ViewMode::BarChart));
        state.apply(UiEvent::SetBarMetric("score".into()));
        state.apply(UiEvent::SetTopN(1));
        assert_eq!(state.params().top_n, 3);

        let ChartOutput::Bars(bars) = state.output() else {
            panic!("expected bars");
        };
        assert_eq!(bars.bars.len(), 2);
        assert_eq!(state.kpis().rows, 3);

        state.apply(UiEvent::SetSortOrder(SortOrder::LowestFirst));
        let ChartOutput::Bars(bars) = state.output() else {
            panic!("expected bars");
        };
        assert_eq!(bars.bars[0].key, "Chile");
    }

    #[test]
    fn trend_mode_uses_selected_metric() {
        let table = sample_table();
        let mut state = AppState::new(&table);
        state.apply(UiEvent::SelectMode(ViewMode::TrendOverTime));
        state.apply(UiEvent::SetTrendMetric("score".into()));
        assert_eq!(state.output().series_len(), 3);
    }

    #[test]
    fn startup_keeps_rows_from_files_without_years() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.csv"),
            "Entity,Year,Gap (%)\nChile,2000,10\nPeru,2001,20\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.csv"), "Entity,Gap (%)\nIndia,30\n").unwrap();
        let table = load_directory(dir.path()).unwrap();
        assert_eq!(table.len(), 3);

        let mut state = AppState::new(&table);
        assert_eq!(state.year_span(), Some((2000, 2001)));
        assert_eq!(state.view().len(), 3);
        assert_eq!(state.kpis().rows, 3);

        state.apply(UiEvent::SetYearRange(2000, 2000));
        assert_eq!(state.kpis().rows, 1);
        state.apply(UiEvent::SetYearRange(2000, 2001));
        assert_eq!(state.kpis().rows, 3);

        state.apply(UiEvent::SelectSource(SourceSelection::File("b.csv".into())));
        assert_eq!(state.year_span(), None);
        assert_eq!(state.kpis().rows, 1);
    }

    #[test]
    fn failed_filter_keeps_previous_selection_and_view() {
        let schema = Schema::new(vec![
            Field::new("year", DataType::Binary, true),
            Field::new("source_file", DataType::Utf8, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(BinaryArray::from(vec![b"20".as_ref(), b"21".as_ref()])),
                Arc::new(StringArray::from(vec!["a.csv", "a.csv"])),
            ],
        )
        .unwrap();
        let table = SurveyTable::new(batch);
        let mut state = AppState::new(&table);
        assert_eq!(state.filters(), &FilterState::default());
        assert_eq!(state.view().len(), 2);

        state.status_message = None;
        let wanted = FilterState {
            source: SourceSelection::All,
            years: Some((2000, 2001)),
        };
        state.refilter(wanted, Some((2000, 2001)));

        assert_eq!(state.filters(), &FilterState::default());
        assert_eq!(state.year_span(), None);
        assert_eq!(state.view().len(), 2);
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Filtering failed")));
    }
}
