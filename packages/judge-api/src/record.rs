use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RecordError;

/// Display format of `submission_time`, second precision.
pub const SUBMISSION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A submission as it is stored locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub judge_id: i64,
    pub user_id: String,
    pub problem_id: String,
    pub language: String,
    pub version: String,
    /// Wall-clock time in the display timezone, truncated to seconds.
    pub submission_time: NaiveDateTime,
    pub cpu_time: i32,
    pub memory: i32,
}

/// Wire shape of one element of a `/solutions/...` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubmission {
    judge_id: i64,
    user_id: String,
    problem_id: String,
    language: String,
    version: String,
    /// Milliseconds since the Unix epoch.
    submission_date: i64,
    cpu_time: i32,
    memory: i32,
}

impl RawSubmission {
    fn into_record(self, offset: FixedOffset) -> Result<SubmissionRecord, String> {
        let submission_time = normalize_submission_time(self.submission_date, offset)
            .ok_or_else(|| format!("submissionDate {} is out of range", self.submission_date))?;

        Ok(SubmissionRecord {
            judge_id: self.judge_id,
            user_id: self.user_id,
            problem_id: self.problem_id,
            language: self.language,
            version: self.version,
            submission_time,
            cpu_time: self.cpu_time,
            memory: self.memory,
        })
    }
}

/// Convert an epoch-millisecond timestamp into local wall-clock time at
/// `offset`, dropping the sub-second part.
pub fn normalize_submission_time(epoch_millis: i64, offset: FixedOffset) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(epoch_millis)?
        .with_timezone(&offset)
        .naive_local()
        .with_nanosecond(0)
}

/// Decode every element of an upstream response.
///
/// All-or-nothing: the first malformed element rejects the whole batch so that
/// callers never persist a partial page.
pub fn decode_batch(
    items: Vec<Value>,
    offset: FixedOffset,
) -> Result<Vec<SubmissionRecord>, RecordError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<RawSubmission>(item)
                .map_err(|e| e.to_string())
                .and_then(|raw| raw.into_record(offset))
                .map_err(|reason| RecordError { index, reason })
        })
        .collect()
}
