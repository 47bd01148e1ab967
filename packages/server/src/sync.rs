use std::time::Duration;

use chrono::FixedOffset;
use judge_api::{
    ApiError, JudgeClient, RecordError, Route, SearchFilter, SubmissionRecord, decode_batch,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, IntoActiveModel, TransactionSession, TransactionTrait,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::UpstreamConfig;
use crate::entity::submission;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("judge API unavailable: {0}")]
    UpstreamUnavailable(#[source] ApiError),

    #[error("judge API response could not be decoded: {0}")]
    UpstreamDecode(#[source] ApiError),

    #[error(transparent)]
    MalformedRecord(#[from] RecordError),

    #[error("database unavailable: {0}")]
    StorageUnavailable(#[source] DbErr),

    #[error("failed to store submissions: {0}")]
    StorageWrite(#[source] DbErr),
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode(_) => SyncError::UpstreamDecode(err),
            _ => SyncError::UpstreamUnavailable(err),
        }
    }
}

impl From<DbErr> for SyncError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => SyncError::StorageUnavailable(err),
            _ => SyncError::StorageWrite(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Client(#[from] ApiError),

    #[error("display UTC offset of {0} seconds is out of range")]
    InvalidOffset(i32),
}

/// Outcome of one synchronization pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Submissions returned by the judge.
    pub fetched: usize,
    /// Submissions that were new locally.
    pub inserted: u64,
}

/// Copies one page of upstream submissions into the local store.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    client: JudgeClient,
    display_offset: FixedOffset,
}

impl Synchronizer {
    pub fn new(client: JudgeClient, display_offset: FixedOffset) -> Self {
        Self {
            client,
            display_offset,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, SetupError> {
        let display_offset = FixedOffset::east_opt(config.display_utc_offset_secs)
            .ok_or(SetupError::InvalidOffset(config.display_utc_offset_secs))?;
        let client = JudgeClient::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::new(client, display_offset))
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_offset
    }

    /// Fetch the page described by `filter` and insert every submission not
    /// yet stored. Existing rows are never modified, so repeating a sync is a
    /// no-op for the store.
    ///
    /// A filter without any predicate has no upstream listing and is skipped.
    #[instrument(skip(self, db), fields(page = filter.page_index, size = filter.page_size))]
    pub async fn sync<C>(&self, db: &C, filter: &SearchFilter) -> Result<SyncReport, SyncError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let Some(route) = Route::for_filter(filter) else {
            debug!("No predicate given, serving stored submissions only");
            return Ok(SyncReport::default());
        };

        let items = self
            .client
            .fetch_solutions(&route, filter.page_index, filter.page_size)
            .await?;
        let records = decode_batch(items, self.display_offset)?;
        let fetched = records.len();

        let inserted = store_submissions(db, records).await?;
        info!(fetched, inserted, "Synchronized submissions from judge API");

        Ok(SyncReport { fetched, inserted })
    }
}

/// Insert-or-ignore by `judge_id` in one transaction. Returns the number of
/// rows that were actually new.
pub async fn store_submissions<C>(db: &C, records: Vec<SubmissionRecord>) -> Result<u64, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    if records.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let mut inserted = 0;

    for record in records {
        let model = submission::Model::from(record).into_active_model();
        let result = submission::Entity::insert(model)
            .on_conflict(
                OnConflict::column(submission::Column::JudgeId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await;

        match result {
            Ok(rows) => inserted += rows,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    txn.commit().await?;
    Ok(inserted)
}
