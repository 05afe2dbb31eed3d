//! Request/response boundary over a shared store: mark, query and report.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::Clock;
use crate::errors::{AttendanceError, Result};
use crate::export;
use crate::models::{AttendanceRecord, Report, StudentId};
use crate::report;
use crate::store::AttendanceStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkRequest {
    #[serde(default, deserialize_with = "raw_student_id")]
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkResponse {
    pub message: String,
    pub student_id: StudentId,
    #[serde(flatten)]
    pub record: AttendanceRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default, deserialize_with = "raw_student_id")]
    pub student_id: Option<String>,
}

// Ids arrive as JSON numbers or strings; both are parsed by `StudentId::from_str`.
fn raw_student_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Number(number) => number.to_string(),
        RawId::Text(text) => text,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    pub student_id: StudentId,
    pub attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRequest {
    pub export: Option<String>,
}

impl ReportRequest {
    pub fn wants_csv(&self) -> bool {
        self.export
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("csv"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub report: String,
    #[serde(flatten)]
    pub data: Report,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    pub filename: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Summary(ReportSummary),
    Csv(CsvDocument),
}

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<AttendanceStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(store: Arc<AttendanceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &AttendanceStore {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn mark(&self, request: MarkRequest) -> Result<MarkResponse> {
        let outcome = self.try_mark(request);
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "mark rejected");
        }
        outcome
    }

    fn try_mark(&self, request: MarkRequest) -> Result<MarkResponse> {
        let (Some(raw_id), Some(name), Some(status)) =
            (request.student_id, request.name, request.status)
        else {
            return Err(AttendanceError::invalid(
                "student_id, name and status required",
            ));
        };

        let student_id: StudentId = raw_id.parse()?;
        let record = self
            .store
            .insert(student_id, &name, &status, self.clock.now())?;

        let message = format!(
            "Attendance marked for {} (ID: {}) at {}",
            record.name, student_id, record.timestamp.readable_timestamp
        );
        tracing::info!(student_id = %student_id, status = %record.status, "attendance marked");

        Ok(MarkResponse {
            message,
            student_id,
            record,
        })
    }

    pub fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        let raw_id = request
            .student_id
            .ok_or_else(|| AttendanceError::invalid("student_id required"))?;
        let student_id: StudentId = raw_id.parse().inspect_err(|err| {
            tracing::warn!(error = %err, "query rejected");
        })?;

        Ok(QueryResponse {
            student_id,
            attendance: self.store.lookup(student_id),
        })
    }

    pub fn report(&self, request: ReportRequest) -> Result<ReportOutcome> {
        let data = report::aggregate(&self.store);
        tracing::info!(
            total_students = data.total_students,
            present = data.present,
            absent = data.absent,
            csv = request.wants_csv(),
            "report generated"
        );

        if request.wants_csv() {
            let body = export::to_csv_string(&data).map_err(|err| {
                tracing::error!(error = %err, "csv export failed");
                AttendanceError::internal("failed to export attendance report")
            })?;
            return Ok(ReportOutcome::Csv(CsvDocument {
                filename: export::EXPORT_FILENAME,
                body,
            }));
        }

        Ok(ReportOutcome::Summary(ReportSummary {
            report: report::report_title(self.clock.now()),
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::clock::FixedClock;

    fn service() -> AttendanceService {
        let instant = DateTime::parse_from_rfc3339("2024-01-05T15:45:12+00:00").unwrap();
        AttendanceService::new(Arc::new(AttendanceStore::new()), Arc::new(FixedClock(instant)))
    }

    fn mark(student_id: &str, name: &str, status: &str) -> MarkRequest {
        MarkRequest {
            student_id: Some(student_id.to_string()),
            name: Some(name.to_string()),
            status: Some(status.to_string()),
        }
    }

    fn query(student_id: &str) -> QueryRequest {
        QueryRequest {
            student_id: Some(student_id.to_string()),
        }
    }

    #[test]
    fn mark_returns_record_and_confirmation() {
        let response = service().mark(mark("17", "Avery Lee", "Present")).unwrap();
        assert_eq!(response.student_id.get(), 17);
        assert_eq!(response.record.status.as_str(), "Present");
        assert_eq!(
            response.message,
            "Attendance marked for Avery Lee (ID: 17) at January 05, 2024 at 03:45:12 PM"
        );
    }

    #[test]
    fn mark_with_missing_fields_is_invalid_and_stores_nothing() {
        let service = service();
        let incomplete = [
            MarkRequest::default(),
            MarkRequest {
                name: None,
                ..mark("1", "Avery Lee", "Present")
            },
            MarkRequest {
                status: None,
                ..mark("1", "Avery Lee", "Present")
            },
            mark("", "Avery Lee", "Present"),
            mark("1", "", "Present"),
            mark("1", "Avery Lee", " "),
        ];

        for request in incomplete {
            let err = service.mark(request).unwrap_err();
            assert!(err.is_client_error());
        }
        assert!(service.store().is_empty());
    }

    #[test]
    fn mark_request_accepts_numeric_and_string_ids() {
        let service = service();
        let numeric: MarkRequest =
            serde_json::from_str(r#"{"student_id": 17, "name": "Avery Lee", "status": "Present"}"#)
                .unwrap();
        let text: MarkRequest =
            serde_json::from_str(r#"{"student_id": "17", "name": "Avery Lee", "status": "Absent"}"#)
                .unwrap();
        assert_eq!(numeric.student_id.as_deref(), Some("17"));
        assert_eq!(text.student_id.as_deref(), Some("17"));

        service.mark(numeric).unwrap();
        service.mark(text).unwrap();
        assert_eq!(service.query(query("17")).unwrap().attendance.len(), 2);
    }

    #[test]
    fn mark_request_with_unusable_id_is_invalid() {
        let service = service();
        for raw in [
            r#"{"student_id": 0, "name": "Avery Lee", "status": "Present"}"#,
            r#"{"student_id": -4, "name": "Avery Lee", "status": "Present"}"#,
            r#"{"student_id": 2.5, "name": "Avery Lee", "status": "Present"}"#,
            r#"{"student_id": null, "name": "Avery Lee", "status": "Present"}"#,
            r#"{"name": "Avery Lee", "status": "Present"}"#,
        ] {
            let request: MarkRequest = serde_json::from_str(raw).unwrap();
            assert!(service.mark(request).unwrap_err().is_client_error(), "{raw}");
        }
        assert!(service.store().is_empty());
    }

    #[test]
    fn query_request_accepts_numeric_and_string_ids() {
        let service = service();
        service.mark(mark("8", "Jules Moreno", "Present")).unwrap();
        for raw in [r#"{"student_id": 8}"#, r#"{"student_id": "8"}"#] {
            let request: QueryRequest = serde_json::from_str(raw).unwrap();
            let response = service.query(request).unwrap();
            assert_eq!(response.student_id.get(), 8);
            assert_eq!(response.attendance.len(), 1);
        }
    }

    #[test]
    fn query_returns_history_in_mark_order() {
        let service = service();
        for status in ["Present", "Absent", "Present"] {
            service.mark(mark("3", "Kiara Patel", status)).unwrap();
        }
        let response = service.query(query("3")).unwrap();
        let statuses: Vec<&str> = response.attendance.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(statuses, ["Present", "Absent", "Present"]);
    }

    #[test]
    fn query_for_unmarked_student_is_empty() {
        let response = service().query(query("404")).unwrap();
        assert_eq!(response.student_id.get(), 404);
        assert!(response.attendance.is_empty());
    }

    #[test]
    fn query_with_non_integer_id_is_invalid() {
        let service = service();
        assert!(service.query(query("abc")).unwrap_err().is_client_error());
        assert!(service
            .query(QueryRequest::default())
            .unwrap_err()
            .is_client_error());
    }

    #[test]
    fn report_summary_carries_title_and_counts() {
        let service = service();
        service.mark(mark("1", "Avery Lee", "Present")).unwrap();
        service.mark(mark("1", "Avery Lee", "Present")).unwrap();
        service.mark(mark("1", "Avery Lee", "Absent")).unwrap();
        service.mark(mark("2", "Jules Moreno", "Present")).unwrap();

        let ReportOutcome::Summary(summary) = service.report(ReportRequest::default()).unwrap()
        else {
            panic!("expected a summary");
        };
        assert_eq!(summary.report, "Attendance Report – January 2024");
        assert_eq!(summary.data.total_students, 2);
        assert_eq!(summary.data.present, 3);
        assert_eq!(summary.data.absent, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_students"], 2);
        assert_eq!(json["students"]["1"].as_array().unwrap().len(), 3);
        assert_eq!(json["students"]["2"][0]["name"], "Jules Moreno");
    }

    #[test]
    fn report_export_is_case_insensitive() {
        let service = service();
        service.mark(mark("1", "Avery Lee", "Present")).unwrap();

        for export in ["csv", "CSV", "Csv"] {
            let outcome = service
                .report(ReportRequest {
                    export: Some(export.to_string()),
                })
                .unwrap();
            let ReportOutcome::Csv(document) = outcome else {
                panic!("expected csv for {export:?}");
            };
            assert_eq!(document.filename, "attendance_report.csv");
            assert_eq!(document.body.lines().count(), 2);
        }

        let outcome = service
            .report(ReportRequest {
                export: Some("xlsx".to_string()),
            })
            .unwrap();
        assert!(matches!(outcome, ReportOutcome::Summary(_)));
    }

    #[test]
    fn consecutive_reports_are_identical() {
        let service = service();
        service.mark(mark("1", "Avery Lee", "Present")).unwrap();
        let first = service.report(ReportRequest::default()).unwrap();
        let second = service.report(ReportRequest::default()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_marks_for_distinct_students() {
        let service = service();
        let handles: Vec<_> = (1..=32)
            .map(|n| {
                let service = service.clone();
                tokio::spawn(async move {
                    service.mark(mark(&n.to_string(), &format!("Student {n}"), "Present"))
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let ReportOutcome::Summary(summary) = service.report(ReportRequest::default()).unwrap()
        else {
            panic!("expected a summary");
        };
        assert_eq!(summary.data.total_students, 32);
        assert_eq!(summary.data.present, 32);
        assert!(summary.data.students.values().all(|records| records.len() == 1));
    }
}
