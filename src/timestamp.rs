use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampFields {
    pub date: String,
    pub day: String,
    pub month: String,
    pub month_name: String,
    pub year: String,
    pub time: String,
    pub full_timestamp: String,
    pub readable_timestamp: String,
    pub created_at: String,
}

pub fn derive_fields(instant: DateTime<FixedOffset>) -> TimestampFields {
    let date = instant.format("%Y-%m-%d").to_string();
    let time = instant.format("%H:%M:%S").to_string();

    TimestampFields {
        day: instant.format("%d").to_string(),
        month: instant.format("%m").to_string(),
        month_name: instant.format("%B").to_string(),
        year: instant.format("%Y").to_string(),
        full_timestamp: format!("{date} {time}"),
        readable_timestamp: instant.format("%B %d, %Y at %I:%M:%S %p").to_string(),
        created_at: instant.to_rfc3339_opts(SecondsFormat::Secs, false),
        date,
        time,
    }
}
