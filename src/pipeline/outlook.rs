//! Ad-hoc disclosure indicators computed from group shares of a cleaned
//! table. Shares divide by the full row count, so missing rows dilute them
//! while forming no group of their own. Like the risk score these are
//! heuristics, not probabilities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{CellValue, SurveyTable};
use crate::error::{PipelineError, Result};

pub const TREATMENT_FIELD: &str = "treatment";
pub const COWORKERS_FIELD: &str = "coworkers";
pub const INTERFERENCE_FIELD: &str = "work_interfere";

/// Present values of a column grouped and counted, in ascending value order.
pub fn group_counts(table: &SurveyTable, column: &str) -> Result<Vec<(CellValue, usize)>> {
    let column = table
        .column(column)
        .ok_or_else(|| PipelineError::MissingColumn(column.to_string()))?;
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for cell in column.present() {
        *counts.entry(cell).or_insert(0) += 1;
    }
    Ok(counts.into_iter().map(|(v, n)| (v.clone(), n)).collect())
}

fn require_groups(
    column: &str,
    groups: Vec<(CellValue, usize)>,
    needed: usize,
) -> Result<Vec<(CellValue, usize)>> {
    if groups.len() < needed {
        return Err(PipelineError::InsufficientCategories {
            column: column.to_string(),
            found: groups.len(),
            needed,
        });
    }
    Ok(groups)
}

/// `p1·(p1 + p0/p1·p0) / (p0 + p1)` over the no/yes shares.
pub fn treatment_confirm(p_no: f64, p_yes: f64) -> f64 {
    p_yes * (p_yes + p_no / p_yes * p_no) / (p_no + p_yes)
}

/// `(n0 + (n1 + n0)/(n1·n0)) / N` over the no/yes counts.
pub fn treatment_decline(n_no: f64, n_yes: f64, total: f64) -> f64 {
    (n_no + (n_yes + n_no) / (n_yes * n_no)) / total
}

/// `p1·((p1 + p0)/p1·p0) / (p0 + p1)` over the no/yes shares.
pub fn coworker_disclosure(p_no: f64, p_yes: f64) -> f64 {
    p_yes * ((p_yes + p_no) / p_yes * p_no) / (p_no + p_yes)
}

/// For each share `p_k`: `S_k²·P / p_k²`, where `S_k` sums the other
/// shares and `P` multiplies all of them.
pub fn interference_weights(shares: &[f64]) -> Vec<f64> {
    let total: f64 = shares.iter().sum();
    let product: f64 = shares.iter().product();
    shares
        .iter()
        .map(|p| {
            let others = total - p;
            others * others * product / (p * p)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterferenceWeight {
    pub code: CellValue,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisclosureOutlook {
    pub treatment_confirm: f64,
    pub treatment_decline: f64,
    pub coworker_disclosure: f64,
    pub interference: Vec<InterferenceWeight>,
}

impl DisclosureOutlook {
    /// Binary columns need both codes present; the interference column
    /// needs at least two codes.
    pub fn compute(table: &SurveyTable) -> Result<Self> {
        let total = table.row_count() as f64;

        let treatment = require_groups(TREATMENT_FIELD, group_counts(table, TREATMENT_FIELD)?, 2)?;
        let (n_no, n_yes) = (treatment[0].1 as f64, treatment[1].1 as f64);

        let coworkers = require_groups(COWORKERS_FIELD, group_counts(table, COWORKERS_FIELD)?, 2)?;
        let (c_no, c_yes) = (coworkers[0].1 as f64 / total, coworkers[1].1 as f64 / total);

        let interference =
            require_groups(INTERFERENCE_FIELD, group_counts(table, INTERFERENCE_FIELD)?, 2)?;
        let shares: Vec<f64> = interference.iter().map(|(_, n)| *n as f64 / total).collect();
        let weights = interference_weights(&shares);

        let outlook = DisclosureOutlook {
            treatment_confirm: treatment_confirm(n_no / total, n_yes / total),
            treatment_decline: treatment_decline(n_no, n_yes, total),
            coworker_disclosure: coworker_disclosure(c_no, c_yes),
            interference: interference
                .into_iter()
                .zip(weights)
                .map(|((code, _), weight)| InterferenceWeight { code, weight })
                .collect(),
        };
        log::info!(
            "Outlook: treatment confirm {:.4}, decline {:.4}",
            outlook.treatment_confirm,
            outlook.treatment_decline
        );
        Ok(outlook)
    }
}
