use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::AnalysisPlan;
use crate::data::model::{CellValue, Column, SurveyTable};

// ---------------------------------------------------------------------------
// Column statistics
// ---------------------------------------------------------------------------

/// How often one distinct value occurs in a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueShare {
    pub value: CellValue,
    pub count: usize,
    /// `count / observed`; missing rows are not in the denominator.
    pub frequency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    /// NaN when the column has no numeric values.
    pub mean: f64,
    /// Sample variance (n − 1); NaN with fewer than two numeric values.
    pub variance: f64,
}

/// Snapshot of one column's distribution. Recomputed on every analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub name: String,
    pub total_rows: usize,
    /// Non-missing rows.
    pub observed: usize,
    /// Distinct values, most frequent first; ties in value order.
    pub shares: Vec<ValueShare>,
    /// Present for columns where central tendency is meaningful.
    pub moments: Option<Moments>,
}

impl ColumnStatistics {
    /// Distribution of `column`; `with_moments` adds mean and variance.
    pub fn compute(column: &Column, with_moments: bool) -> Self {
        let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
        for cell in column.present() {
            *counts.entry(cell).or_insert(0) += 1;
        }
        let observed: usize = counts.values().sum();

        let mut shares: Vec<ValueShare> = counts
            .into_iter()
            .map(|(value, count)| ValueShare {
                value: value.clone(),
                count,
                frequency: count as f64 / observed as f64,
            })
            .collect();
        // Stable sort keeps value order among equal counts.
        shares.sort_by(|a, b| b.count.cmp(&a.count));

        let moments = with_moments.then(|| moments(column.cells.iter().filter_map(CellValue::as_f64)));

        ColumnStatistics {
            name: column.name.clone(),
            total_rows: column.cells.len(),
            observed,
            shares,
            moments,
        }
    }

    /// The most frequent value.
    pub fn peak(&self) -> Option<&ValueShare> {
        self.shares.first()
    }

    /// Share of `share` over every row, missing ones included. This is the
    /// denominator the value-share chart plots.
    pub fn row_share(&self, share: &ValueShare) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        share.count as f64 / self.total_rows as f64
    }

    pub fn top(&self, n: usize) -> &[ValueShare] {
        &self.shares[..n.min(self.shares.len())]
    }

    pub fn frequency_sum(&self) -> f64 {
        self.shares.iter().map(|s| s.frequency).sum()
    }

    pub fn mean(&self) -> Option<f64> {
        self.moments.map(|m| m.mean)
    }
}

/// Mean and sample variance of the values, in two passes.
pub fn moments(values: impl Iterator<Item = f64>) -> Moments {
    let values: Vec<f64> = values.collect();
    let n = values.len();
    if n == 0 {
        return Moments {
            mean: f64::NAN,
            variance: f64::NAN,
        };
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = if n < 2 {
        f64::NAN
    } else {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    };
    Moments { mean, variance }
}

// ---------------------------------------------------------------------------
// DistributionAnalyzer
// ---------------------------------------------------------------------------

/// Per-column statistics for every analyzed column, in table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionReport {
    pub columns: Vec<ColumnStatistics>,
}

impl DistributionReport {
    pub fn get(&self, name: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub struct DistributionAnalyzer<'a> {
    plan: &'a AnalysisPlan,
}

impl<'a> DistributionAnalyzer<'a> {
    pub fn new(plan: &'a AnalysisPlan) -> Self {
        Self { plan }
    }

    /// Analyze the columns inside the plan's positional range. Excluded
    /// (free-text/location) columns get frequencies only.
    pub fn analyze(&self, table: &SurveyTable) -> DistributionReport {
        let range = self.plan.range(table.columns.len());
        let columns: Vec<ColumnStatistics> = table.columns[range]
            .iter()
            .map(|column| {
                let stats = ColumnStatistics::compute(column, !self.plan.is_excluded(&column.name));
                if stats.mean().is_some_and(f64::is_nan) {
                    log::warn!("Column '{}' has no numeric values; mean is undefined", column.name);
                }
                log::debug!(
                    "Column '{}': {} distinct values over {} observed rows",
                    column.name,
                    stats.shares.len(),
                    stats.observed
                );
                stats
            })
            .collect();
        log::info!("Analyzed {} columns", columns.len());
        DistributionReport { columns }
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation between numeric columns, square and symmetric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate every column whose present values are all numeric, skipping
    /// the unnamed row-index column. Each pair uses the rows where both values
    /// are present.
    pub fn compute(table: &SurveyTable) -> Self {
        let numeric: Vec<&Column> = table
            .columns
            .iter()
            .filter(|c| !c.name.is_empty())
            .filter(|c| c.present().next().is_some() && c.present().all(|v| v.as_f64().is_some()))
            .collect();

        let values = numeric
            .iter()
            .map(|a| numeric.iter().map(|b| pearson(&a.cells, &b.cells)).collect())
            .collect();

        CorrelationMatrix {
            columns: numeric.iter().map(|c| c.name.clone()).collect(),
            values,
        }
    }
}

/// Pairwise-complete Pearson correlation; NaN for fewer than two pairs or a
/// constant side.
pub fn pearson(a: &[CellValue], b: &[CellValue]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x * var_y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[Option<i64>]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| v.map_or(CellValue::Missing, CellValue::Integer))
            .collect()
    }

    #[test]
    fn test_frequencies_sum_to_one() {
        let column = Column::new("benefits", ints(&[Some(1), Some(0), Some(1), Some(1), Some(0)]));
        let stats = ColumnStatistics::compute(&column, true);
        assert!((stats.frequency_sum() - 1.0).abs() < 1e-9);
        let peak = stats.peak().expect("has values");
        assert_eq!(peak.value, CellValue::Integer(1));
        assert!((peak.frequency - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_missing_excluded_from_denominator() {
        let column = Column::new("seek_help", ints(&[Some(1), None, Some(0), None, Some(1), Some(1)]));
        let stats = ColumnStatistics::compute(&column, true);
        assert_eq!(stats.observed, 4);
        assert_eq!(stats.total_rows, 6);
        assert!((stats.frequency_sum() - 1.0).abs() < 1e-9);
        assert!((stats.peak().expect("has values").frequency - 0.75).abs() < 1e-9);
        let m = stats.moments.expect("moments requested");
        assert!((m.mean - 0.75).abs() < 1e-9);
        // values 1,0,1,1: squared deviations sum to 0.75, over n-1 = 3
        assert!((m.variance - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_all_missing_column_has_nan_moments() {
        let column = Column::new("anonymity", ints(&[None, None]));
        let stats = ColumnStatistics::compute(&column, true);
        assert!(stats.shares.is_empty());
        assert_eq!(stats.frequency_sum(), 0.0);
        let m = stats.moments.expect("moments requested");
        assert!(m.mean.is_nan());
        assert!(m.variance.is_nan());
    }

    #[test]
    fn test_ties_fall_back_to_value_order() {
        let column = Column::new("leave", ints(&[Some(2), Some(0), Some(2), Some(0), Some(1)]));
        let stats = ColumnStatistics::compute(&column, false);
        let order: Vec<&CellValue> = stats.shares.iter().map(|s| &s.value).collect();
        assert_eq!(
            order,
            vec![&CellValue::Integer(0), &CellValue::Integer(2), &CellValue::Integer(1)]
        );
        assert!(stats.moments.is_none());
    }

    #[test]
    fn test_analyzer_uses_positional_range_and_exclusions() {
        let table = SurveyTable::from_columns(vec![
            Column::new("", ints(&[Some(0), Some(1)])),
            Column::new("Timestamp", vec![CellValue::Text("t".into()); 2]),
            Column::new("Age", ints(&[Some(30), Some(40)])),
            Column::new("Country", vec![CellValue::Text("Canada".into()); 2]),
            Column::new("treatment", ints(&[Some(1), Some(0)])),
            Column::new("comments", vec![CellValue::Missing; 2]),
        ]);
        let plan = AnalysisPlan::default();
        let report = DistributionAnalyzer::new(&plan).analyze(&table);
        let names: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Age", "Country", "treatment"]);
        assert!(report.get("Country").expect("analyzed").moments.is_none());
        let age = report.get("Age").expect("analyzed").moments.expect("numeric");
        assert!((age.mean - 35.0).abs() < 1e-9);
        assert!((age.variance - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_skips_text_columns() {
        let table = SurveyTable::from_columns(vec![
            Column::new("", ints(&[Some(0), Some(1), Some(2)])),
            Column::new("Timestamp", vec![CellValue::Text("t".into()); 3]),
            Column::new("a", ints(&[Some(1), Some(2), Some(3)])),
            Column::new("b", ints(&[Some(3), Some(2), Some(1)])),
            Column::new("c", ints(&[Some(1), None, Some(3)])),
            Column::new("state", vec![CellValue::Text("CA".into()); 3]),
            Column::new("comments", vec![CellValue::Missing; 3]),
        ]);
        let matrix = CorrelationMatrix::compute(&table);
        assert_eq!(matrix.columns, vec!["a", "b", "c"]);
        assert!((matrix.values[0][1] + 1.0).abs() < 1e-9);
        assert!((matrix.values[0][0] - 1.0).abs() < 1e-9);
        assert!((matrix.values[0][2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_covers_numeric_columns_outside_analysis_range() {
        let table = SurveyTable::from_columns(vec![
            Column::new("", ints(&[Some(0), Some(1), Some(2)])),
            Column::new("Age", ints(&[Some(20), Some(30), Some(40)])),
            Column::new("Country", ints(&[Some(1), Some(1), Some(2)])),
            Column::new("comments", ints(&[Some(4), Some(6), Some(8)])),
        ]);
        let matrix = CorrelationMatrix::compute(&table);
        assert_eq!(matrix.columns, vec!["Age", "Country", "comments"]);
        assert!((matrix.values[0][2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_whole_floats_share_a_bucket_with_integers() {
        let table = crate::data::loader::read_csv("Age\n30\n30.0\n40\n".as_bytes())
            .expect("valid csv");
        let column = table.column("Age").expect("Age column");
        let stats = ColumnStatistics::compute(column, true);
        assert_eq!(stats.shares.len(), 2);
        let peak = stats.peak().expect("has values");
        assert_eq!(peak.value, CellValue::Integer(30));
        assert_eq!(peak.count, 2);
        assert!((peak.frequency - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_row_share_counts_missing_rows() {
        let column = Column::new("benefits", ints(&[Some(1), None, Some(1), Some(0)]));
        let stats = ColumnStatistics::compute(&column, false);
        let peak = stats.peak().expect("has values").clone();
        assert!((peak.frequency - 2.0 / 3.0).abs() < 1e-9);
        assert!((stats.row_share(&peak) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_needs_two_pairs() {
        assert!(pearson(&ints(&[Some(1)]), &ints(&[Some(2)])).is_nan());
        assert!(pearson(&ints(&[Some(1), Some(1)]), &ints(&[Some(2), Some(3)])).is_nan());
    }
}
