use std::path::Path;

use anyhow::Result;

use crate::color::ColorMap;
use crate::config::SurveySchema;
use crate::data::loader::load_file;
use crate::data::model::SurveyTable;
use crate::pipeline::selector::{FeatureSelector, ImportantFieldSet};
use crate::pipeline::stats::{CorrelationMatrix, DistributionAnalyzer, DistributionReport};

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Which chart the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartView {
    #[default]
    ValueShares,
    Correlation,
    FieldBars,
}

/// Everything derived from one cleaned file.
#[derive(Debug, Clone)]
pub struct LoadedAnalysis {
    pub table: SurveyTable,
    pub report: DistributionReport,
    pub important: ImportantFieldSet,
    pub correlation: CorrelationMatrix,
}

impl LoadedAnalysis {
    /// Analyze an already-cleaned, indexed table.
    pub fn from_table(table: SurveyTable, schema: &SurveySchema) -> Self {
        let report = DistributionAnalyzer::new(&schema.analysis).analyze(&table);
        let important = FeatureSelector::new(&schema.analysis).select(&report);
        let correlation = CorrelationMatrix::compute(&table);
        Self {
            table,
            report,
            important,
            correlation,
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub schema: SurveySchema,

    /// Loaded analysis (None until user loads a file).
    pub analysis: Option<LoadedAnalysis>,

    pub view: ChartView,

    /// Important field shown in the bar chart view.
    pub bar_field: Option<String>,

    /// Colours for the bar chart field's values.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(schema: SurveySchema) -> Self {
        Self {
            schema,
            analysis: None,
            view: ChartView::default(),
            bar_field: None,
            color_map: None,
            status_message: None,
        }
    }

    /// Ingest a newly analyzed table and point the bar chart at the first
    /// important field.
    pub fn set_analysis(&mut self, analysis: LoadedAnalysis) {
        self.bar_field = analysis.important.fields.first().cloned();
        self.analysis = Some(analysis);
        self.rebuild_color_map();
        self.status_message = None;
    }

    /// Load and analyze a cleaned file.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let table = load_file(path)?;
        let analysis = LoadedAnalysis::from_table(table, &self.schema);
        log::info!(
            "Viewer loaded {} rows, {} important fields",
            analysis.table.row_count(),
            analysis.important.len()
        );
        self.set_analysis(analysis);
        Ok(())
    }

    pub fn set_bar_field(&mut self, field: String) {
        self.bar_field = Some(field);
        self.rebuild_color_map();
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = match (&self.analysis, &self.bar_field) {
            (Some(analysis), Some(field)) => analysis.report.get(field).map(|stats| {
                let mut values: Vec<_> = stats.shares.iter().map(|s| &s.value).collect();
                values.sort();
                ColorMap::new(field, values)
            }),
            _ => None,
        };
    }
}
