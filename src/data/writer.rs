use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::{CellValue, Column, SurveyTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Save a table, choosing the format by extension (`.csv` or `.parquet`).
///
/// The table is written as given; callers that want the leading index column
/// pass [`SurveyTable::with_row_index`].
pub fn save_file(table: &SurveyTable, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::create(path).context("creating CSV file")?;
            write_csv(table, file)
        }
        "parquet" | "pq" => save_parquet(table, path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    log::info!(
        "Wrote {} rows x {} columns to {}",
        table.row_count(),
        table.columns.len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

pub fn write_csv<W: std::io::Write>(table: &SurveyTable, output: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;

    for row in 0..table.row_count() {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|c| format_cell(&c.cells[row]))
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Floats keep a decimal point so they read back as floats.
fn format_cell(value: &CellValue) -> String {
    match value {
        CellValue::Float(v) => format!("{v:?}"),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

/// Storage type for a column: all-integer → Int64, all-numeric → Float64,
/// anything else → Utf8. Missing cells become nulls.
fn column_type(column: &Column) -> DataType {
    let mut saw_float = false;
    for cell in column.present() {
        match cell {
            CellValue::Integer(_) => {}
            CellValue::Float(_) => saw_float = true,
            _ => return DataType::Utf8,
        }
    }
    if saw_float {
        DataType::Float64
    } else {
        DataType::Int64
    }
}

fn column_array(column: &Column, data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Int64 => Arc::new(Int64Array::from(
            column
                .cells
                .iter()
                .map(|c| match c {
                    CellValue::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            column.cells.iter().map(CellValue::as_f64).collect::<Vec<_>>(),
        )),
        _ => Arc::new(StringArray::from(
            column
                .cells
                .iter()
                .map(|c| (!c.is_missing()).then(|| c.to_string()))
                .collect::<Vec<_>>(),
        )),
    }
}

fn save_parquet(table: &SurveyTable, path: &Path) -> Result<()> {
    let types: Vec<DataType> = table.columns.iter().map(column_type).collect();

    let schema = Arc::new(Schema::new(
        table
            .columns
            .iter()
            .zip(&types)
            .map(|(c, t)| Field::new(c.name.clone(), t.clone(), true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = table
        .columns
        .iter()
        .zip(&types)
        .map(|(c, t)| column_array(c, t))
        .collect();

    let batch =
        RecordBatch::try_new(schema.clone(), arrays).context("building parquet record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    #[test]
    fn test_write_csv_blanks_missing_cells() {
        let table = SurveyTable::from_columns(vec![
            Column::new("Age", vec![CellValue::Missing, CellValue::Integer(40)]),
            Column::new("score", vec![CellValue::Float(2.0), CellValue::Missing]),
        ]);
        let mut out = Vec::new();
        write_csv(&table, &mut out).expect("should write csv");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "Age,score\n,2.0\n40,\n");

        let back = read_csv(text.as_bytes()).expect("should read back");
        assert_eq!(back, table);
    }

    #[test]
    fn test_column_type_falls_back_to_text() {
        let mixed = Column::new(
            "Country",
            vec![CellValue::Text("Canada".into()), CellValue::Integer(3)],
        );
        assert_eq!(column_type(&mixed), DataType::Utf8);
        let codes = Column::new("leave", vec![CellValue::Integer(0), CellValue::Missing]);
        assert_eq!(column_type(&codes), DataType::Int64);
    }
}
