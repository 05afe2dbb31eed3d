use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, FixedOffset};

use crate::errors::{AttendanceError, Result};
use crate::models::{AttendanceRecord, Status, StudentId};
use crate::timestamp::derive_fields;

/// Append-only attendance history keyed by student.
///
/// A single mutex guards the whole map. Every key maps to a non-empty
/// history; records are fully built before the lock is taken.
#[derive(Debug, Default)]
pub struct AttendanceStore {
    records: Mutex<BTreeMap<StudentId, Vec<AttendanceRecord>>>,
}

impl AttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        student_id: StudentId,
        name: &str,
        status: &str,
        instant: DateTime<FixedOffset>,
    ) -> Result<AttendanceRecord> {
        if name.trim().is_empty() {
            return Err(AttendanceError::invalid("name required"));
        }
        if status.trim().is_empty() {
            return Err(AttendanceError::invalid("status required"));
        }

        let record = AttendanceRecord {
            status: Status::new(status),
            name: name.to_string(),
            timestamp: derive_fields(instant),
        };

        let mut records = self.lock();
        let history = records.entry(student_id).or_default();
        history.push(record.clone());
        tracing::debug!(
            student_id = %student_id,
            status,
            history_len = history.len(),
            "attendance record appended"
        );

        Ok(record)
    }

    /// Full history in insertion order; empty when nothing was marked yet.
    pub fn lookup(&self, student_id: StudentId) -> Vec<AttendanceRecord> {
        self.lock().get(&student_id).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<StudentId, Vec<AttendanceRecord>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Appends happen after the record is built, so a poisoned map is still whole.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<StudentId, Vec<AttendanceRecord>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
