use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the survey table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a survey export mixes.
/// Distributions are keyed by `BTreeMap<CellValue, _>`, so `CellValue` must be `Ord`.
///
/// Numbers compare by value: `Integer(30)` and `Float(30.0)` are the same
/// value, hash alike and land in the same distribution bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    /// The missing sentinel. Skipped by every aggregate.
    Missing,
}

/// The integer a float is exactly equal to, if any.
fn whole_number(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn cmp_int_float(i: i64, f: f64) -> Ordering {
    match whole_number(f) {
        Some(j) => i.cmp(&j),
        None => match (i as f64).total_cmp(&f) {
            // Only an in-range whole float can equal an integer.
            Ordering::Equal => Ordering::Less,
            other => other,
        },
    }
}

// -- Manual Eq/Ord so we can put CellValue in BTreeMap keys --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Integer(_) | Float(_) => 1,
                Text(_) => 2,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => cmp_int_float(*a, *b),
            (Float(a), Integer(b)) => cmp_int_float(*b, *a).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Missing => 0u8.hash(state),
            CellValue::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            CellValue::Float(f) => match whole_number(*f) {
                Some(i) => {
                    1u8.hash(state);
                    i.hash(state);
                }
                None => {
                    2u8.hash(state);
                    f.to_bits().hash(state);
                }
            },
            CellValue::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Missing => Ok(()),
        }
    }
}

/// Tokens read as missing, matching the NA spellings survey exports use.
const NA_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "#N/A", "None"];

impl CellValue {
    /// Classify a raw text cell: NA token → `Missing`, then integer, float, text.
    pub fn from_raw(s: &str) -> Self {
        if s.is_empty() || NA_TOKENS.contains(&s) {
            return CellValue::Missing;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_nan() {
                return CellValue::Missing;
            }
            return CellValue::Float(f);
        }
        CellValue::Text(s.to_string())
    }

    /// Numeric view of the value; `None` for text and missing cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// Column – one named dimension of the table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            cells,
        }
    }

    /// Cells that are not the missing sentinel.
    pub fn present(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().filter(|c| !c.is_missing())
    }
}

// ---------------------------------------------------------------------------
// SurveyTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered, named columns aligned by row position. Rows have no identity
/// beyond their index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyTable {
    pub columns: Vec<Column>,
}

impl SurveyTable {
    /// Build a table from columns; shorter columns are padded with `Missing`
    /// so every column has the same length.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let rows = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
        for col in &mut columns {
            col.cells.resize(rows, CellValue::Missing);
        }
        SurveyTable { columns }
    }

    /// Build a table from a header and row-major records.
    pub fn from_rows(headers: &[String], rows: Vec<Vec<CellValue>>) -> Self {
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|h| Column::new(h.clone(), Vec::with_capacity(rows.len())))
            .collect();
        for row in rows {
            let mut cells = row.into_iter();
            for col in &mut columns {
                col.cells.push(cells.next().unwrap_or(CellValue::Missing));
            }
        }
        SurveyTable { columns }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column(column).and_then(|c| c.cells.get(row))
    }

    /// Copy of the table with a leading unnamed column holding `0..n`,
    /// the same shape the writer persists.
    pub fn with_row_index(&self) -> SurveyTable {
        let index = Column::new(
            "",
            (0..self.row_count())
                .map(|i| CellValue::Integer(i as i64))
                .collect(),
        );
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(index);
        columns.extend(self.columns.iter().cloned());
        SurveyTable { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_classifies_cells() {
        assert_eq!(CellValue::from_raw(""), CellValue::Missing);
        assert_eq!(CellValue::from_raw("NA"), CellValue::Missing);
        assert_eq!(CellValue::from_raw("37"), CellValue::Integer(37));
        assert_eq!(CellValue::from_raw("2.5"), CellValue::Float(2.5));
        assert_eq!(
            CellValue::from_raw("Female"),
            CellValue::Text("Female".to_string())
        );
    }

    #[test]
    fn test_missing_sorts_first() {
        let mut vals = vec![
            CellValue::Text("a".into()),
            CellValue::Integer(3),
            CellValue::Missing,
            CellValue::Integer(1),
        ];
        vals.sort();
        assert_eq!(vals[0], CellValue::Missing);
        assert_eq!(vals[1], CellValue::Integer(1));
    }

    #[test]
    fn test_whole_floats_equal_integers() {
        use std::collections::HashSet;

        assert_eq!(CellValue::Integer(30), CellValue::Float(30.0));
        assert_eq!(CellValue::from_raw("30.0"), CellValue::from_raw("30"));
        assert_ne!(CellValue::Integer(30), CellValue::Float(30.5));
        assert!(CellValue::Integer(30) < CellValue::Float(30.5));
        assert!(CellValue::Float(29.5) < CellValue::Integer(30));

        let set: HashSet<CellValue> = [
            CellValue::Integer(30),
            CellValue::Float(30.0),
            CellValue::Float(30.5),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_with_row_index_prepends_positions() {
        let table = SurveyTable::from_columns(vec![Column::new(
            "Age",
            vec![CellValue::Integer(30), CellValue::Missing],
        )]);
        let indexed = table.with_row_index();
        assert_eq!(indexed.column_names(), vec!["", "Age"]);
        assert_eq!(indexed.cell(1, ""), Some(&CellValue::Integer(1)));
        assert_eq!(indexed.row_count(), 2);
    }
}
