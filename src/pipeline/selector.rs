use serde::Serialize;

use crate::config::AnalysisPlan;
use crate::pipeline::stats::{ColumnStatistics, DistributionReport};

/// Columns flagged as candidate indicators, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportantFieldSet {
    pub fields: Vec<String>,
}

impl ImportantFieldSet {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Flags a column when the frequency of its most common value exceeds the
/// column mean.
///
/// This compares a probability mass with a raw mean, which are not in the
/// same units. It is a heuristic kept for compatibility with existing
/// rankings; reports label its output accordingly.
pub struct FeatureSelector<'a> {
    plan: &'a AnalysisPlan,
}

impl<'a> FeatureSelector<'a> {
    pub fn new(plan: &'a AnalysisPlan) -> Self {
        Self { plan }
    }

    /// Whether one column passes `peak > mean`. Any NaN side fails.
    pub fn is_important(stats: &ColumnStatistics) -> bool {
        match (stats.peak(), stats.mean()) {
            (Some(peak), Some(mean)) => peak.frequency > mean,
            _ => false,
        }
    }

    pub fn select(&self, report: &DistributionReport) -> ImportantFieldSet {
        let fields: Vec<String> = report
            .columns
            .iter()
            .filter(|stats| !self.plan.is_excluded(&stats.name))
            .filter(|stats| Self::is_important(stats))
            .map(|stats| stats.name.clone())
            .collect();
        log::info!("Selected {} important fields: {:?}", fields.len(), fields);
        ImportantFieldSet { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::pipeline::stats::{Moments, ValueShare};

    fn stats(name: &str, frequencies: &[f64], mean: Option<f64>) -> ColumnStatistics {
        ColumnStatistics {
            name: name.to_string(),
            total_rows: 10,
            observed: 10,
            shares: frequencies
                .iter()
                .enumerate()
                .map(|(i, f)| ValueShare {
                    value: CellValue::Integer(i as i64),
                    count: (f * 10.0).round() as usize,
                    frequency: *f,
                })
                .collect(),
            moments: mean.map(|mean| Moments {
                mean,
                variance: 0.0,
            }),
        }
    }

    #[test]
    fn test_peak_above_mean_is_important() {
        assert!(FeatureSelector::is_important(&stats("x", &[0.6, 0.4], Some(0.5))));
    }

    #[test]
    fn test_peak_below_mean_is_not_important() {
        assert!(!FeatureSelector::is_important(&stats("x", &[0.4, 0.3, 0.3], Some(0.5))));
    }

    #[test]
    fn test_equal_peak_and_mean_is_not_important() {
        assert!(!FeatureSelector::is_important(&stats("x", &[0.5, 0.5], Some(0.5))));
    }

    #[test]
    fn test_nan_mean_never_selects() {
        assert!(!FeatureSelector::is_important(&stats("x", &[1.0], Some(f64::NAN))));
        assert!(!FeatureSelector::is_important(&stats("x", &[], Some(0.0))));
    }

    #[test]
    fn test_select_keeps_column_order_and_skips_excluded() {
        let plan = AnalysisPlan::default();
        let report = DistributionReport {
            columns: vec![
                stats("Age", &[0.9, 0.1], Some(32.0)),
                stats("treatment", &[0.6, 0.4], Some(0.4)),
                stats("Country", &[0.9, 0.1], Some(0.0)),
                stats("benefits", &[0.7, 0.3], Some(0.3)),
            ],
        };
        let selected = FeatureSelector::new(&plan).select(&report);
        assert_eq!(selected.fields, vec!["treatment", "benefits"]);
    }
}
