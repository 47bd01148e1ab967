//! Ranked, filtered, paginated search over mirrored submissions.
//!
//! Every matching row gets a dense rank by recency (`submission_time` desc,
//! then `user_id` asc, then `problem_id` asc) and a page is a contiguous
//! window of ranks. Because ranks are dense, rows tied on all three keys
//! share a rank and land on the same page.

use judge_api::SearchFilter;
use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, FromQueryResult, QueryResult, Statement, Value,
};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::entity::submission;

const RANKED_COLUMNS: &str =
    "judge_id, user_id, problem_id, language, version, submission_time, cpu_time, memory";

const RANK_EXPR: &str =
    "DENSE_RANK() OVER (ORDER BY submission_time DESC, user_id ASC, problem_id ASC)";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid page: {0}")]
    InvalidPage(String),

    #[error("search query failed: {0}")]
    Query(#[from] DbErr),
}

/// Inclusive, 1-based range of ranks making up one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub first_rank: i64,
    pub last_rank: i64,
}

impl PageWindow {
    /// `[page_size * page_index + 1, page_size * (page_index + 1)]`
    pub fn new(page_index: u64, page_size: u64) -> Result<Self, SearchError> {
        if page_size == 0 {
            return Err(SearchError::InvalidPage("page size must be positive".into()));
        }

        let bounds = i64::try_from(page_size)
            .ok()
            .zip(i64::try_from(page_index).ok())
            .and_then(|(size, index)| {
                let skipped = size.checked_mul(index)?;
                let last = skipped.checked_add(size)?;
                Some((skipped + 1, last))
            });

        match bounds {
            Some((first_rank, last_rank)) => Ok(Self {
                first_rank,
                last_rank,
            }),
            None => Err(SearchError::InvalidPage(format!(
                "page {page_index} of size {page_size} is out of range"
            ))),
        }
    }
}

/// A stored submission together with its dense rank in the filtered set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedSubmission {
    pub rank: i64,
    pub submission: submission::Model,
}

impl FromQueryResult for RankedSubmission {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            rank: res.try_get(pre, "submission_rank")?,
            submission: submission::Model::from_query_result(res, pre)?,
        })
    }
}

/// Query builder for one ranked page.
///
/// The SQL text depends only on which predicates are present; every filter
/// value and both window bounds travel as bound parameters.
#[derive(Debug, Clone)]
pub struct SubmissionSearch<'a> {
    filter: &'a SearchFilter,
    window: PageWindow,
}

impl<'a> SubmissionSearch<'a> {
    pub fn new(filter: &'a SearchFilter) -> Result<Self, SearchError> {
        let window = PageWindow::new(filter.page_index, filter.page_size)?;
        Ok(Self { filter, window })
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Present predicates in a fixed order, as `(column, value)`.
    fn predicates(&self) -> impl Iterator<Item = (&'static str, &'a str)> {
        [
            ("user_id", self.filter.user_id.as_deref()),
            ("problem_id", self.filter.problem_id.as_deref()),
            ("language", self.filter.language.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
    }

    pub fn build(&self, backend: DbBackend) -> Statement {
        let mut params = Params::new(backend);

        let mut sql = format!(
            "SELECT {RANKED_COLUMNS}, submission_rank FROM (\
             SELECT {RANKED_COLUMNS}, {RANK_EXPR} AS submission_rank FROM submission"
        );

        for (i, (column, value)) in self.predicates().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            let placeholder = params.push(value);
            sql.push_str(&format!(" {keyword} {column} = {placeholder}"));
        }

        let first = params.push(self.window.first_rank);
        let last = params.push(self.window.last_rank);
        sql.push_str(&format!(
            ") AS ranked WHERE submission_rank BETWEEN {first} AND {last} \
             ORDER BY submission_rank ASC, judge_id ASC"
        ));

        Statement::from_sql_and_values(backend, sql, params.values)
    }
}

/// Ordered bind parameters with backend-specific placeholders.
struct Params {
    backend: DbBackend,
    values: Vec<Value>,
}

impl Params {
    fn new(backend: DbBackend) -> Self {
        Self {
            backend,
            values: Vec::new(),
        }
    }

    fn push(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        match self.backend {
            DbBackend::Postgres => format!("${}", self.values.len()),
            _ => "?".to_string(),
        }
    }
}

/// Run the ranked search for one page. Read-only.
#[instrument(skip(db))]
pub async fn search_submissions<C: ConnectionTrait>(
    db: &C,
    filter: &SearchFilter,
) -> Result<Vec<RankedSubmission>, SearchError> {
    let search = SubmissionSearch::new(filter)?;
    let stmt = search.build(db.get_database_backend());

    let rows = RankedSubmission::find_by_statement(stmt).all(db).await?;
    debug!(
        count = rows.len(),
        first_rank = search.window().first_rank,
        "Ranked search finished"
    );

    Ok(rows)
}
