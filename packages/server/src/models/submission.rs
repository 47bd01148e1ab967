use chrono::NaiveDateTime;
use judge_api::{SUBMISSION_TIME_FORMAT, SearchFilter};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AppError;
use crate::search::RankedSubmission;

/// Request body for a submission search.
///
/// Empty or missing filter fields mean "no filter on this field". PascalCase
/// field names are accepted as well as camelCase.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchSubmissionsRequest {
    #[serde(default, alias = "UserId")]
    #[schema(example = "alice")]
    pub user_id: String,
    #[serde(default, alias = "ProblemId")]
    #[schema(example = "ITP1_1_A")]
    pub problem_id: String,
    #[serde(default, alias = "Language")]
    #[schema(example = "C++17")]
    pub language: String,
    /// Zero-based page index.
    #[serde(alias = "PageId")]
    #[schema(example = 0)]
    pub page_id: u64,
    /// Rows per page, counted in ranks.
    #[serde(alias = "PageSize")]
    #[schema(example = 20)]
    pub page_size: u64,
}

impl SearchSubmissionsRequest {
    pub fn into_filter(self, max_page_size: u64) -> Result<SearchFilter, AppError> {
        if self.page_size == 0 || self.page_size > max_page_size {
            return Err(AppError::Validation(format!(
                "pageSize must be between 1 and {max_page_size}"
            )));
        }

        Ok(SearchFilter::new(self.page_id, self.page_size)
            .with_user(&self.user_id)
            .with_problem(&self.problem_id)
            .with_language(&self.language))
    }
}

/// One mirrored submission.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    #[schema(example = 8812345)]
    pub judge_id: i64,
    #[schema(example = "alice")]
    pub user_id: String,
    #[schema(example = "ITP1_1_A")]
    pub problem_id: String,
    #[schema(example = "C++17")]
    pub language: String,
    #[schema(example = "gcc 13.2")]
    pub version: String,
    /// Local time in the configured display timezone.
    #[serde(serialize_with = "serialize_submission_time")]
    #[schema(value_type = String, example = "2024-01-01 09:00:00")]
    pub submission_time: NaiveDateTime,
    /// Milliseconds.
    #[schema(example = 10)]
    pub cpu_time: i32,
    /// Kilobytes.
    #[schema(example = 3456)]
    pub memory: i32,
}

fn serialize_submission_time<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&time.format(SUBMISSION_TIME_FORMAT))
}

impl From<RankedSubmission> for SubmissionResponse {
    fn from(row: RankedSubmission) -> Self {
        let s = row.submission;
        Self {
            judge_id: s.judge_id,
            user_id: s.user_id,
            problem_id: s.problem_id,
            language: s.language,
            version: s.version,
            submission_time: s.submission_time,
            cpu_time: s.cpu_time,
            memory: s.memory,
        }
    }
}
