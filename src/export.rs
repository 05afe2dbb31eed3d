use std::io;

use crate::errors::{AttendanceError, Result};
use crate::models::Report;

pub const EXPORT_FILENAME: &str = "attendance_report.csv";

pub const HEADER: [&str; 11] = [
    "Student ID",
    "Name",
    "Status",
    "Date",
    "Day",
    "Month",
    "Month Name",
    "Year",
    "Time",
    "Full Timestamp",
    "Readable Timestamp",
];

pub type ExportRow = [String; 11];

/// Rows ordered by ascending student id, then by insertion order.
pub fn export_rows(report: &Report) -> Vec<ExportRow> {
    let mut rows = Vec::new();

    for (student_id, records) in report.students.iter() {
        for record in records {
            let ts = &record.timestamp;
            rows.push([
                student_id.to_string(),
                record.name.clone(),
                record.status.to_string(),
                ts.date.clone(),
                ts.day.clone(),
                ts.month.clone(),
                ts.month_name.clone(),
                ts.year.clone(),
                ts.time.clone(),
                ts.full_timestamp.clone(),
                ts.readable_timestamp.clone(),
            ]);
        }
    }

    rows
}

pub fn write_csv<W: io::Write>(report: &Report, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;
    for row in export_rows(report) {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(report: &Report) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(report, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| AttendanceError::internal(format!("csv output is not utf-8: {err}")))
}
