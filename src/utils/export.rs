use crate::models::employee::{ExportRow, EXPORT_HEADER};

pub const EXPORT_FILENAME: &str = "employees_export.csv";

/// Serializes the header and `rows` as CSV.
pub fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for row in rows {
        writer.write_record(&row.0)?;
    }
    writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}
