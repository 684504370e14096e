use serde::Serialize;

use crate::data::model::{CellValue, SurveyTable};
use crate::error::{PipelineError, Result};
use crate::pipeline::selector::ImportantFieldSet;

/// Heuristic average of a record's codes over the important fields.
/// Not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskScore {
    pub row: usize,
    pub value: f64,
    /// Divisor used: the number of important fields.
    pub fields: usize,
}

pub struct RecordScorer;

impl RecordScorer {
    /// Sum the row's present values over `important` and divide by the
    /// number of important fields. Missing values add nothing to the sum but
    /// still count in the divisor.
    ///
    /// An empty field set gives `0 / 0 = NaN`; callers check
    /// `important.is_empty()` first.
    pub fn score(table: &SurveyTable, row: usize, important: &ImportantFieldSet) -> Result<RiskScore> {
        let rows = table.row_count();
        if row >= rows {
            return Err(PipelineError::RowOutOfRange { row, rows });
        }
        if important.is_empty() {
            log::warn!("Scoring row {row} against an empty important-field set; score is NaN");
        }

        let mut sum = 0.0;
        for field in important.iter() {
            let column = table
                .column(field)
                .ok_or_else(|| PipelineError::MissingColumn(field.to_string()))?;
            match &column.cells[row] {
                CellValue::Missing => {}
                cell => {
                    sum += cell.as_f64().ok_or_else(|| PipelineError::NonNumericCell {
                        column: field.to_string(),
                        row,
                        value: cell.to_string(),
                    })?;
                }
            }
        }

        let value = sum / important.len() as f64;
        log::debug!("Row {row} scored {value} over {} fields", important.len());
        Ok(RiskScore {
            row,
            value,
            fields: important.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn table() -> SurveyTable {
        SurveyTable::from_columns(vec![
            Column::new("f1", vec![CellValue::Integer(1), CellValue::Integer(0)]),
            Column::new("f2", vec![CellValue::Missing, CellValue::Integer(1)]),
            Column::new("f3", vec![CellValue::Integer(0), CellValue::Integer(2)]),
            Column::new("Country", vec![CellValue::Text("Canada".into()); 2]),
        ])
    }

    fn fields(names: &[&str]) -> ImportantFieldSet {
        ImportantFieldSet::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_missing_counts_in_divisor() {
        let score = RecordScorer::score(&table(), 0, &fields(&["f1", "f2", "f3"])).expect("scores");
        assert!((score.value - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(score.fields, 3);
    }

    #[test]
    fn test_score_can_exceed_one_with_multi_valued_codes() {
        let score = RecordScorer::score(&table(), 1, &fields(&["f1", "f2", "f3"])).expect("scores");
        assert!((score.value - 1.0).abs() < 1e-9);
        let score = RecordScorer::score(&table(), 1, &fields(&["f3"])).expect("scores");
        assert!((score.value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_field_set_is_nan() {
        let score = RecordScorer::score(&table(), 0, &ImportantFieldSet::default()).expect("scores");
        assert!(score.value.is_nan());
    }

    #[test]
    fn test_row_out_of_range() {
        let err = RecordScorer::score(&table(), 5, &fields(&["f1"])).expect_err("no row 5");
        assert!(matches!(err, PipelineError::RowOutOfRange { row: 5, rows: 2 }));
    }

    #[test]
    fn test_unknown_and_text_fields_fail() {
        assert!(matches!(
            RecordScorer::score(&table(), 0, &fields(&["f9"])),
            Err(PipelineError::MissingColumn(_))
        ));
        assert!(matches!(
            RecordScorer::score(&table(), 0, &fields(&["Country"])),
            Err(PipelineError::NonNumericCell { .. })
        ));
    }
}
