use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Duration};

use crate::models::StudentId;
use crate::service::AttendanceService;

/// Loads mark events from a CSV file with columns
/// `student_id,name,status[,timestamp]`. Rows without a timestamp are stamped
/// with the service clock.
pub fn import_csv(service: &AttendanceService, csv_path: &Path) -> anyhow::Result<usize> {
    let reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    import_reader(service, reader)
}

#[derive(serde::Deserialize)]
struct CsvRow {
    student_id: String,
    name: String,
    status: String,
    #[serde(default)]
    timestamp: Option<String>,
}

fn import_reader<R: std::io::Read>(
    service: &AttendanceService,
    mut reader: csv::Reader<R>,
) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // header occupies line 1
        let line = index + 2;
        let row = result.with_context(|| format!("malformed row on line {line}"))?;

        let student_id: StudentId = row
            .student_id
            .parse()
            .with_context(|| format!("line {line}"))?;
        let instant = match row.timestamp.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("line {line}: timestamp {raw:?} is not RFC 3339"))?,
            _ => service.clock().now(),
        };

        service
            .store()
            .insert(student_id, &row.name, &row.status, instant)
            .with_context(|| format!("line {line}"))?;
        inserted += 1;
    }

    tracing::info!(inserted, "mark events imported");
    Ok(inserted)
}

pub fn seed(service: &AttendanceService) -> anyhow::Result<usize> {
    let students = [
        (101, "Avery Lee", ["Present", "Present", "Absent"]),
        (102, "Jules Moreno", ["Present", "Late", "Present"]),
        (103, "Kiara Patel", ["Absent", "Present", "Excused"]),
    ];

    let start = service.clock().now() - Duration::days(2);
    let mut inserted = 0usize;

    for (raw_id, name, statuses) in students {
        let student_id = StudentId::new(raw_id).context("seed ids are positive")?;
        for (day, status) in statuses.iter().enumerate() {
            let instant = start + Duration::days(day as i64);
            service.store().insert(student_id, name, status, instant)?;
            inserted += 1;
        }
    }

    Ok(inserted)
}
