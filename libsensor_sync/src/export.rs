use csv::Writer;
use std::fs::File;
use std::path::Path;
use time::format_description::well_known::Rfc3339;

use super::error::ExportError;
use super::sensor_table::{AlignedTable, Column, SensorTable, Timestamps};

// CSV layout: one header record of column names, then one record per row.
// Missing values are written as empty fields.

fn value_field(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn push_columns(record: &mut Vec<String>, columns: &[Column], row: usize) {
    record.extend(columns.iter().map(|c| value_field(c.values[row])));
}

fn finish(mut writer: Writer<File>) -> Result<(), ExportError> {
    writer.flush()?;
    Ok(())
}

/// Write an aligned table to a csv file. Timestamps are written as RFC 3339 (UTC).
pub fn write_aligned_csv(table: &AlignedTable, path: &Path) -> Result<(), ExportError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    let mut record: Vec<String> = Vec::with_capacity(table.columns.len() + 1);
    for (row, ts) in table.timestamps.iter().enumerate() {
        record.clear();
        record.push(ts.format(&Rfc3339)?);
        push_columns(&mut record, &table.columns, row);
        writer.write_record(&record)?;
    }
    finish(writer)
}

/// Write a raw sensor table to a csv file. Timestamps are written as stored.
pub fn write_sensor_csv(table: &SensorTable, path: &Path) -> Result<(), ExportError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    let mut record: Vec<String> = Vec::with_capacity(table.columns.len() + 1);
    for row in 0..table.n_rows() {
        record.clear();
        match &table.timestamps {
            Some(Timestamps::Nanoseconds(ts)) => record.push(ts[row].to_string()),
            Some(Timestamps::Seconds(ts)) => record.push(value_field(ts[row])),
            None => (),
        }
        push_columns(&mut record, &table.columns, row);
        writer.write_record(&record)?;
    }
    finish(writer)
}
