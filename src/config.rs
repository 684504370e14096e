use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::pipeline::rules::{NormalizationRule, PrefixBucket};

// ---------------------------------------------------------------------------
// Declarative schema: column → rule kind
// ---------------------------------------------------------------------------

/// Which normalization a column receives, as written in a schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Keep numeric values inside `[min, max]`, everything else is missing.
    Range { min: f64, max: f64 },
    /// Case-insensitive prefix match; later buckets overwrite earlier ones.
    PrefixBucket {
        buckets: Vec<PrefixBucket>,
        fallback: i64,
    },
    /// Code distinct values by first appearance.
    RunLocalIndex,
    /// Exact, case-sensitive yes/no literals.
    ExactBinary { yes: String, no: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub column: String,
    pub rule: RuleSpec,
}

/// Positional analysis range and the free-text columns left out of
/// mean/variance and feature selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPlan {
    /// Leading columns skipped (index + raw timestamp in a cleaned file).
    #[serde(default = "default_skip_leading")]
    pub skip_leading: usize,
    /// Trailing columns skipped (free-text comments).
    #[serde(default = "default_skip_trailing")]
    pub skip_trailing: usize,
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,
}

fn default_skip_leading() -> usize {
    2
}

fn default_skip_trailing() -> usize {
    1
}

fn default_excluded() -> Vec<String> {
    vec!["Country".to_string(), "state".to_string()]
}

impl Default for AnalysisPlan {
    fn default() -> Self {
        Self {
            skip_leading: default_skip_leading(),
            skip_trailing: default_skip_trailing(),
            excluded: default_excluded(),
        }
    }
}

impl AnalysisPlan {
    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded.iter().any(|c| c == column)
    }

    /// Column positions analyzed in a table with `n_columns` columns.
    pub fn range(&self, n_columns: usize) -> std::ops::Range<usize> {
        let end = n_columns.saturating_sub(self.skip_trailing);
        self.skip_leading.min(end)..end
    }
}

/// Full survey schema: ordered rules plus the analysis plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySchema {
    pub rules: Vec<RuleEntry>,
    #[serde(default)]
    pub analysis: AnalysisPlan,
}

pub const AGE_FIELD: &str = "Age";
pub const GENDER_FIELD: &str = "Gender";

pub const CATEGORICAL_FIELDS: &[&str] = &["leave", "no_employees", "work_interfere"];

pub const BINARY_FIELDS: &[&str] = &[
    "family_history",
    "treatment",
    "remote_work",
    "tech_company",
    "benefits",
    "care_options",
    "wellness_program",
    "seek_help",
    "anonymity",
    "mental_health_consequence",
    "phys_health_consequence",
    "coworkers",
    "supervisor",
    "mental_health_interview",
    "phys_health_interview",
    "mental_vs_physical",
    "obs_consequence",
    "self_employed",
];

impl Default for SurveySchema {
    fn default() -> Self {
        let mut rules = vec![
            RuleEntry {
                column: AGE_FIELD.to_string(),
                rule: RuleSpec::Range {
                    min: 15.0,
                    max: 100.0,
                },
            },
            RuleEntry {
                column: GENDER_FIELD.to_string(),
                rule: RuleSpec::PrefixBucket {
                    buckets: vec![
                        PrefixBucket {
                            prefix: "m".to_string(),
                            code: 0,
                        },
                        PrefixBucket {
                            prefix: "f".to_string(),
                            code: 1,
                        },
                    ],
                    fallback: 2,
                },
            },
        ];
        rules.extend(CATEGORICAL_FIELDS.iter().map(|c| RuleEntry {
            column: (*c).to_string(),
            rule: RuleSpec::RunLocalIndex,
        }));
        rules.extend(BINARY_FIELDS.iter().map(|c| RuleEntry {
            column: (*c).to_string(),
            rule: RuleSpec::ExactBinary {
                yes: "Yes".to_string(),
                no: "No".to_string(),
            },
        }));
        Self {
            rules,
            analysis: AnalysisPlan::default(),
        }
    }
}

/// A rule bound to its column, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRule {
    pub column: String,
    pub rule: NormalizationRule,
}

impl SurveySchema {
    /// Read a schema from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading schema {}", path.display()))?;
        let schema: SurveySchema = serde_json::from_str(&text)
            .with_context(|| format!("parsing schema {}", path.display()))?;
        log::info!(
            "Loaded schema with {} rules from {}",
            schema.rules.len(),
            path.display()
        );
        Ok(schema)
    }

    /// Resolve the declarative table into typed rules, once, before any
    /// table is touched.
    pub fn resolve(&self) -> Result<Vec<ColumnRule>> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|entry| {
                if !seen.insert(entry.column.as_str()) {
                    return Err(PipelineError::DuplicateRule(entry.column.clone()));
                }
                Ok(ColumnRule {
                    column: entry.column.clone(),
                    rule: NormalizationRule::from_spec(&entry.column, &entry.rule)?,
                })
            })
            .collect()
    }
}
