use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::RuleSpec;
use crate::data::model::CellValue;
use crate::error::{PipelineError, Result};

/// One `prefix → code` arm of a prefix-bucket rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixBucket {
    pub prefix: String,
    pub code: i64,
}

/// A resolved normalization rule. Each variant is a pure
/// `raw value → normalized value | Missing` mapping, except
/// `RunLocalIndex`, which needs the whole column to assign codes.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationRule {
    Range { min: f64, max: f64 },
    PrefixBucket {
        /// Lowercased prefixes, evaluated in order.
        buckets: Vec<PrefixBucket>,
        fallback: i64,
    },
    RunLocalIndex,
    ExactBinary { yes: String, no: String },
}

impl NormalizationRule {
    pub fn from_spec(column: &str, spec: &RuleSpec) -> Result<Self> {
        let invalid = |reason: &str| PipelineError::InvalidRule {
            column: column.to_string(),
            reason: reason.to_string(),
        };
        let rule = match spec {
            RuleSpec::Range { min, max } => {
                if min.is_nan() || max.is_nan() || min > max {
                    return Err(invalid("range bounds must be ordered numbers"));
                }
                NormalizationRule::Range {
                    min: *min,
                    max: *max,
                }
            }
            RuleSpec::PrefixBucket { buckets, fallback } => {
                if buckets.iter().any(|b| b.prefix.is_empty()) {
                    return Err(invalid("prefix must not be empty"));
                }
                NormalizationRule::PrefixBucket {
                    buckets: buckets
                        .iter()
                        .map(|b| PrefixBucket {
                            prefix: b.prefix.to_lowercase(),
                            code: b.code,
                        })
                        .collect(),
                    fallback: *fallback,
                }
            }
            RuleSpec::RunLocalIndex => NormalizationRule::RunLocalIndex,
            RuleSpec::ExactBinary { yes, no } => {
                if yes == no {
                    return Err(invalid("yes and no literals must differ"));
                }
                NormalizationRule::ExactBinary {
                    yes: yes.clone(),
                    no: no.clone(),
                }
            }
        };
        Ok(rule)
    }

    /// Normalize a whole column in place.
    pub fn apply(&self, cells: &mut [CellValue]) {
        match self {
            NormalizationRule::Range { min, max } => {
                for cell in cells.iter_mut() {
                    *cell = normalize_range(cell, *min, *max);
                }
            }
            NormalizationRule::PrefixBucket { buckets, fallback } => {
                for cell in cells.iter_mut() {
                    *cell = normalize_prefix(cell, buckets, *fallback);
                }
            }
            NormalizationRule::RunLocalIndex => {
                let coded = RunLocalIndexer::code_column(cells);
                for (cell, code) in cells.iter_mut().zip(coded) {
                    *cell = code;
                }
            }
            NormalizationRule::ExactBinary { yes, no } => {
                for cell in cells.iter_mut() {
                    *cell = normalize_binary(cell, yes, no);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rule families
// ---------------------------------------------------------------------------

/// Keep a numeric value inside the inclusive `[min, max]` range.
/// Text that does not parse as a number is missing.
pub fn normalize_range(value: &CellValue, min: f64, max: f64) -> CellValue {
    let numeric = match value {
        CellValue::Integer(_) | CellValue::Float(_) => value.clone(),
        CellValue::Text(s) => match CellValue::from_raw(s.trim()) {
            v @ (CellValue::Integer(_) | CellValue::Float(_)) => v,
            _ => return CellValue::Missing,
        },
        CellValue::Missing => return CellValue::Missing,
    };
    match numeric.as_f64() {
        Some(v) if v >= min && v <= max => numeric,
        _ => CellValue::Missing,
    }
}

/// Bucket a value by lowercase prefix. The fallback is assigned first, then
/// each matching bucket overwrites it, so the last matching bucket wins.
/// Missing and non-text values land in the fallback.
pub fn normalize_prefix(value: &CellValue, buckets: &[PrefixBucket], fallback: i64) -> CellValue {
    let mut code = fallback;
    if let Some(text) = value.as_str() {
        let lower = text.to_lowercase();
        for bucket in buckets {
            if lower.starts_with(&bucket.prefix) {
                code = bucket.code;
            }
        }
    }
    CellValue::Integer(code)
}

/// Exact, case-sensitive yes/no mapping. Any other literal is missing.
pub fn normalize_binary(value: &CellValue, yes: &str, no: &str) -> CellValue {
    match value.as_str() {
        Some(s) if s == yes => CellValue::Integer(1),
        Some(s) if s == no => CellValue::Integer(0),
        _ => CellValue::Missing,
    }
}

/// Assigns zero-based codes to distinct values in order of first appearance.
///
/// Codes are local to one pass: the same value may get a different code when
/// rows arrive in a different order.
#[derive(Debug, Default)]
pub struct RunLocalIndexer {
    codes: HashMap<CellValue, i64>,
    next: i64,
}

impl RunLocalIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Code for `value`. A missing value reserves the next code the first
    /// time it is seen but always stays missing, since it never compares
    /// equal to anything.
    pub fn code(&mut self, value: &CellValue) -> CellValue {
        let code = match self.codes.get(value) {
            Some(code) => *code,
            None => {
                let code = self.next;
                self.next += 1;
                self.codes.insert(value.clone(), code);
                code
            }
        };
        if value.is_missing() {
            CellValue::Missing
        } else {
            CellValue::Integer(code)
        }
    }

    pub fn code_column(cells: &[CellValue]) -> Vec<CellValue> {
        let mut indexer = Self::new();
        cells.iter().map(|c| indexer.code(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn gender_buckets() -> Vec<PrefixBucket> {
        vec![
            PrefixBucket {
                prefix: "m".into(),
                code: 0,
            },
            PrefixBucket {
                prefix: "f".into(),
                code: 1,
            },
        ]
    }

    #[test]
    fn test_age_bounds_are_inclusive() {
        for age in [-1726, 0, 5, 14, 101, 329, 99_999_999_999] {
            assert_eq!(
                normalize_range(&CellValue::Integer(age), 15.0, 100.0),
                CellValue::Missing,
                "age {age} should be missing"
            );
        }
        for age in [15, 16, 37, 99, 100] {
            assert_eq!(
                normalize_range(&CellValue::Integer(age), 15.0, 100.0),
                CellValue::Integer(age)
            );
        }
        assert_eq!(
            normalize_range(&CellValue::Float(14.9), 15.0, 100.0),
            CellValue::Missing
        );
        assert_eq!(
            normalize_range(&CellValue::Float(100.0), 15.0, 100.0),
            CellValue::Float(100.0)
        );
    }

    #[test]
    fn test_age_text_values() {
        assert_eq!(normalize_range(&text(" 42 "), 15.0, 100.0), CellValue::Integer(42));
        assert_eq!(normalize_range(&text("old"), 15.0, 100.0), CellValue::Missing);
        assert_eq!(normalize_range(&CellValue::Missing, 15.0, 100.0), CellValue::Missing);
    }

    #[test]
    fn test_gender_buckets() {
        let buckets = gender_buckets();
        let cases = [
            ("Female", 1),
            ("female", 1),
            ("f", 1),
            ("FTM", 1),
            ("M", 0),
            ("Male", 0),
            ("male-ish", 0),
            ("Nonbinary", 2),
            ("queer/she/they", 2),
            ("", 2),
            (" Male", 2),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                normalize_prefix(&text(raw), &buckets, 2),
                CellValue::Integer(expected),
                "gender {raw:?}"
            );
        }
        assert_eq!(
            normalize_prefix(&CellValue::Missing, &buckets, 2),
            CellValue::Integer(2)
        );
        assert_eq!(
            normalize_prefix(&CellValue::Integer(7), &buckets, 2),
            CellValue::Integer(2)
        );
    }

    #[test]
    fn test_later_bucket_wins() {
        let buckets = vec![
            PrefixBucket {
                prefix: "tr".into(),
                code: 5,
            },
            PrefixBucket {
                prefix: "trans".into(),
                code: 6,
            },
        ];
        assert_eq!(
            normalize_prefix(&text("Trans-female"), &buckets, 2),
            CellValue::Integer(6)
        );
        assert_eq!(normalize_prefix(&text("Tr"), &buckets, 2), CellValue::Integer(5));
    }

    #[test]
    fn test_binary_is_exact() {
        assert_eq!(normalize_binary(&text("Yes"), "Yes", "No"), CellValue::Integer(1));
        assert_eq!(normalize_binary(&text("No"), "Yes", "No"), CellValue::Integer(0));
        for raw in ["yes", "NO", "maybe", "Don't know", "Not sure", ""] {
            assert_eq!(
                normalize_binary(&text(raw), "Yes", "No"),
                CellValue::Missing,
                "binary {raw:?}"
            );
        }
        assert_eq!(
            normalize_binary(&CellValue::Missing, "Yes", "No"),
            CellValue::Missing
        );
    }

    #[test]
    fn test_run_local_codes_follow_first_appearance() {
        let cells = vec![text("A"), text("B"), text("A"), text("C")];
        assert_eq!(
            RunLocalIndexer::code_column(&cells),
            vec![
                CellValue::Integer(0),
                CellValue::Integer(1),
                CellValue::Integer(0),
                CellValue::Integer(2),
            ]
        );
    }

    #[test]
    fn test_run_local_codes_depend_on_row_order() {
        let forward = RunLocalIndexer::code_column(&[text("Often"), text("Never")]);
        let reversed = RunLocalIndexer::code_column(&[text("Never"), text("Often")]);
        assert_eq!(forward[0], CellValue::Integer(0));
        assert_eq!(reversed[1], CellValue::Integer(1));
    }

    #[test]
    fn test_whole_float_spelling_shares_a_code() {
        let cells: Vec<CellValue> = ["30", "30.0", "40"]
            .into_iter()
            .map(CellValue::from_raw)
            .collect();
        assert_eq!(
            RunLocalIndexer::code_column(&cells),
            vec![
                CellValue::Integer(0),
                CellValue::Integer(0),
                CellValue::Integer(1),
            ]
        );
    }

    #[test]
    fn test_missing_reserves_a_code() {
        let cells = vec![CellValue::Missing, text("Often"), CellValue::Missing, text("Never")];
        assert_eq!(
            RunLocalIndexer::code_column(&cells),
            vec![
                CellValue::Missing,
                CellValue::Integer(1),
                CellValue::Missing,
                CellValue::Integer(2),
            ]
        );
    }

    #[test]
    fn test_from_spec_rejects_bad_rules() {
        let bad_range = RuleSpec::Range {
            min: 100.0,
            max: 15.0,
        };
        assert!(NormalizationRule::from_spec("Age", &bad_range).is_err());
        let bad_binary = RuleSpec::ExactBinary {
            yes: "Yes".into(),
            no: "Yes".into(),
        };
        assert!(NormalizationRule::from_spec("treatment", &bad_binary).is_err());
    }
}
