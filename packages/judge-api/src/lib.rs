pub mod client;
pub mod error;
pub mod filter;
pub mod record;

pub use client::{JudgeClient, Route};
pub use error::{ApiError, RecordError};
pub use filter::SearchFilter;
pub use record::{SUBMISSION_TIME_FORMAT, SubmissionRecord, decode_batch};
