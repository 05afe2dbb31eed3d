use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AttendanceError;
use crate::timestamp::TimestampFields;

pub const STATUS_PRESENT: &str = "Present";
pub const STATUS_ABSENT: &str = "Absent";

/// Key identifying a student in the store. Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct StudentId(u64);

impl StudentId {
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for StudentId {
    type Error = AttendanceError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        StudentId::new(value)
            .ok_or_else(|| AttendanceError::invalid("student_id must be a positive integer"))
    }
}

impl From<StudentId> for u64 {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StudentId {
    type Err = AttendanceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AttendanceError::invalid("student_id required"));
        }
        trimmed
            .parse::<u64>()
            .ok()
            .and_then(StudentId::new)
            .ok_or_else(|| {
                AttendanceError::invalid(format!(
                    "student_id must be a positive integer, got {trimmed:?}"
                ))
            })
    }
}

/// Only [`STATUS_PRESENT`] and [`STATUS_ABSENT`] are bucketed by the report;
/// any other label is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(String);

impl Status {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_present(&self) -> bool {
        self.0 == STATUS_PRESENT
    }

    pub fn is_absent(&self) -> bool {
        self.0 == STATUS_ABSENT
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub status: Status,
    pub name: String,
    #[serde(flatten)]
    pub timestamp: TimestampFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub total_students: usize,
    pub present: usize,
    pub absent: usize,
    pub students: BTreeMap<StudentId, Vec<AttendanceRecord>>,
}
