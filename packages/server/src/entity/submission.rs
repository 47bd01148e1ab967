use judge_api::SubmissionRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A judge submission mirrored from upstream.
///
/// Rows are written once, on first sight of a `judge_id`, and never updated.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub judge_id: i64,
    pub user_id: String,
    pub problem_id: String,
    pub language: String,
    pub version: String,
    /// Wall-clock time in the display timezone, second precision.
    pub submission_time: DateTime,
    pub cpu_time: i32,
    pub memory: i32,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<SubmissionRecord> for Model {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            judge_id: record.judge_id,
            user_id: record.user_id,
            problem_id: record.problem_id,
            language: record.language,
            version: record.version,
            submission_time: record.submission_time,
            cpu_time: record.cpu_time,
            memory: record.memory,
        }
    }
}
