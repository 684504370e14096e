/// Cleaning and feature-ranking pipeline.
///
/// Each stage takes the previous stage's artifact explicitly, so any stage
/// can be fed a hand-built input:
/// ```text
///   SurveyTable ──cleaner──▶ CleanedTable ──stats──▶ DistributionReport
///                                                         │
///                  RiskScore ◀──scorer── ImportantFieldSet ◀──selector
/// ```

pub mod cleaner;
pub mod outlook;
pub mod rules;
pub mod scorer;
pub mod selector;
pub mod stats;

use crate::config::SurveySchema;
use crate::data::model::SurveyTable;
use crate::error::Result;

use cleaner::{CleanedTable, DatasetCleaner};
use selector::{FeatureSelector, ImportantFieldSet};
use stats::{DistributionAnalyzer, DistributionReport};

/// Output of one full pass over a raw table.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub cleaned: CleanedTable,
    /// Cleaned table with its leading index column; statistics refer to it.
    pub indexed: SurveyTable,
    pub report: DistributionReport,
    pub important: ImportantFieldSet,
}

/// Clean, analyze and select in one go.
pub fn run(schema: &SurveySchema, table: SurveyTable) -> Result<PipelineRun> {
    let rules = schema.resolve()?;
    let cleaned = DatasetCleaner::new(&rules).clean(table)?;
    let indexed = cleaned.indexed();
    let report = DistributionAnalyzer::new(&schema.analysis).analyze(&indexed);
    let important = FeatureSelector::new(&schema.analysis).select(&report);
    Ok(PipelineRun {
        cleaned,
        indexed,
        report,
        important,
    })
}
