use crate::config::ColumnRule;
use crate::data::model::SurveyTable;
use crate::error::{PipelineError, Result};

/// A table whose rule columns have been normalized. Read-only from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable(SurveyTable);

impl CleanedTable {
    /// Wrap a table that is already clean, e.g. one reloaded from disk.
    pub fn assume_clean(table: SurveyTable) -> Self {
        CleanedTable(table)
    }

    pub fn table(&self) -> &SurveyTable {
        &self.0
    }

    /// The cleaned table with the leading index column the writer persists.
    pub fn indexed(&self) -> SurveyTable {
        self.0.with_row_index()
    }
}

/// Runs each resolved rule over its column, in rule order.
pub struct DatasetCleaner<'a> {
    rules: &'a [ColumnRule],
}

impl<'a> DatasetCleaner<'a> {
    pub fn new(rules: &'a [ColumnRule]) -> Self {
        Self { rules }
    }

    /// Fail before touching anything if a rule's column is absent.
    fn check_columns(&self, table: &SurveyTable) -> Result<()> {
        match self
            .rules
            .iter()
            .find(|r| table.column_index(&r.column).is_none())
        {
            Some(rule) => Err(PipelineError::MissingColumn(rule.column.clone())),
            None => Ok(()),
        }
    }

    /// Normalize the rule columns in place and hand the table back for
    /// chaining. Columns without a rule are left untouched.
    pub fn clean_in_place<'t>(&self, table: &'t mut SurveyTable) -> Result<&'t mut SurveyTable> {
        self.check_columns(table)?;
        for rule in self.rules {
            let column = table
                .column_mut(&rule.column)
                .ok_or_else(|| PipelineError::MissingColumn(rule.column.clone()))?;
            rule.rule.apply(&mut column.cells);
            log::debug!("Normalized column '{}'", rule.column);
        }
        log::info!(
            "Cleaned {} rows across {} rule columns",
            table.row_count(),
            self.rules.len()
        );
        Ok(table)
    }

    pub fn clean(&self, mut table: SurveyTable) -> Result<CleanedTable> {
        self.clean_in_place(&mut table)?;
        Ok(CleanedTable(table))
    }
}
