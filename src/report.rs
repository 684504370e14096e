use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipeline::outlook::DisclosureOutlook;
use crate::pipeline::scorer::RiskScore;
use crate::pipeline::selector::ImportantFieldSet;
use crate::pipeline::stats::{ColumnStatistics, DistributionReport};

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// Per column: name, the two most frequent values as percentages, and the
/// variance and mean where computed.
pub fn write_column<W: Write>(out: &mut W, stats: &ColumnStatistics) -> Result<()> {
    writeln!(out, "{}:", stats.name)?;
    if stats.shares.is_empty() {
        writeln!(out, "  (no values)")?;
    }
    for share in stats.top(2) {
        writeln!(out, "  {:<24} {:>7.3}%", share.value.to_string(), share.frequency * 100.0)?;
    }
    if let Some(m) = stats.moments {
        writeln!(out, "Variance - {}", m.variance)?;
        writeln!(out, "Mean - {}", m.mean)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn write_distribution<W: Write>(out: &mut W, report: &DistributionReport) -> Result<()> {
    for stats in &report.columns {
        write_column(out, stats)?;
    }
    Ok(())
}

pub fn write_important<W: Write>(out: &mut W, important: &ImportantFieldSet) -> Result<()> {
    writeln!(
        out,
        "Potential key indicators (heuristic: peak share > column mean) - {:?}",
        important.fields
    )?;
    Ok(())
}

pub fn write_score<W: Write>(out: &mut W, score: &RiskScore) -> Result<()> {
    writeln!(
        out,
        "Record #{} risk score {:.5}% (heuristic average over {} fields)",
        score.row, score.value, score.fields
    )?;
    Ok(())
}

pub fn write_outlook<W: Write>(out: &mut W, outlook: &DisclosureOutlook) -> Result<()> {
    writeln!(out, "Seeking treatment - {:.2}%", outlook.treatment_confirm)?;
    writeln!(out, "Not seeking treatment - {:.2}%", outlook.treatment_decline)?;
    for w in &outlook.interference {
        writeln!(out, "Work interference code {} - {:.4}%", w.code, w.weight)?;
    }
    writeln!(
        out,
        "Willing to discuss with coworkers - {:.4}%",
        outlook.coworker_disclosure
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a> {
    pub columns: &'a [ColumnStatistics],
    pub important: &'a [String],
    /// Always true: the selection rule is a heuristic.
    pub heuristic: bool,
}

pub fn write_json<W: Write>(
    out: W,
    report: &DistributionReport,
    important: &ImportantFieldSet,
) -> Result<()> {
    let export = AnalysisExport {
        columns: &report.columns,
        important: &important.fields,
        heuristic: true,
    };
    serde_json::to_writer_pretty(out, &export).context("writing JSON report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    #[test]
    fn test_column_report_shows_top_two_and_moments() {
        let column = Column::new(
            "benefits",
            vec![
                CellValue::Integer(1),
                CellValue::Integer(1),
                CellValue::Integer(0),
                CellValue::Missing,
            ],
        );
        let stats = ColumnStatistics::compute(&column, true);
        let mut out = Vec::new();
        write_column(&mut out, &stats).expect("writes");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("benefits:\n"));
        assert!(text.contains("66.667%"));
        assert!(text.contains("33.333%"));
        assert!(text.contains("Mean - 0.6666"));
        assert!(text.contains("Variance - 0.3333"));
    }

    #[test]
    fn test_excluded_column_has_no_moments_line() {
        let column = Column::new("Country", vec![CellValue::Text("Canada".into())]);
        let stats = ColumnStatistics::compute(&column, false);
        let mut out = Vec::new();
        write_column(&mut out, &stats).expect("writes");
        let text = String::from_utf8(out).expect("utf8");
        assert!(!text.contains("Mean"));
    }

    #[test]
    fn test_json_export_marks_heuristic() {
        let report = DistributionReport::default();
        let important = ImportantFieldSet::new(vec!["treatment".into()]);
        let mut out = Vec::new();
        write_json(&mut out, &report, &important).expect("writes");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
        assert_eq!(value["heuristic"], serde_json::Value::Bool(true));
        assert_eq!(value["important"][0], "treatment");
    }
}
