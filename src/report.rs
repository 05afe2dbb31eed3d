use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::models::Report;
use crate::store::AttendanceStore;

/// Builds the report from one consistent snapshot of the store.
///
/// `total_students` counts distinct students while `present`/`absent` count
/// records, so one student marked present twice adds 1 and 2 respectively.
pub fn aggregate(store: &AttendanceStore) -> Report {
    let students = store.snapshot();
    let mut present = 0usize;
    let mut absent = 0usize;

    for records in students.values() {
        for record in records {
            if record.status.is_present() {
                present += 1;
            } else if record.status.is_absent() {
                absent += 1;
            }
        }
    }

    Report {
        total_students: students.len(),
        present,
        absent,
        students,
    }
}

pub fn report_title(instant: DateTime<FixedOffset>) -> String {
    format!("Attendance Report – {}", instant.format("%B %Y"))
}

pub fn render_summary(title: &str, report: &Report) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{} | Total Students: {} | Present: {} | Absent: {}",
        title, report.total_students, report.present, report.absent
    );

    if report.students.is_empty() {
        let _ = writeln!(output, "No detailed student records yet.");
        return output;
    }

    for (student_id, records) in report.students.iter() {
        for record in records {
            let _ = writeln!(
                output,
                "- {} ({}) {} on {}",
                record.name, student_id, record.status, record.timestamp.readable_timestamp
            );
        }
    }

    output
}
