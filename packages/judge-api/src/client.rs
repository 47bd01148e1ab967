use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::filter::SearchFilter;

/// An endpoint of the judge API's `/solutions` family.
///
/// The judge can filter by user and problem together, or by either one plus a
/// language, but not by all three at once. When both user and problem are
/// requested the language predicate is left for the local search to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    UserProblem {
        user: &'a str,
        problem: &'a str,
    },
    User {
        user: &'a str,
        language: Option<&'a str>,
    },
    Problem {
        problem: &'a str,
        language: Option<&'a str>,
    },
    Language {
        language: &'a str,
    },
}

impl<'a> Route<'a> {
    /// Pick the endpoint for a filter. `None` when the filter has no predicate,
    /// since the judge offers no unfiltered listing.
    pub fn for_filter(filter: &'a SearchFilter) -> Option<Self> {
        let user = filter.user_id.as_deref();
        let problem = filter.problem_id.as_deref();
        let language = filter.language.as_deref();

        match (user, problem, language) {
            (Some(user), Some(problem), _) => Some(Route::UserProblem { user, problem }),
            (Some(user), None, language) => Some(Route::User { user, language }),
            (None, Some(problem), language) => Some(Route::Problem { problem, language }),
            (None, None, Some(language)) => Some(Route::Language { language }),
            (None, None, None) => None,
        }
    }

    fn segments(&self) -> Vec<&'a str> {
        let mut segments = vec!["solutions"];
        match *self {
            Route::UserProblem { user, problem } => {
                segments.extend(["users", user, "problems", problem]);
            }
            Route::User { user, language } => {
                segments.extend(["users", user]);
                segments.extend(language.map(|l| ["lang", l]).into_iter().flatten());
            }
            Route::Problem { problem, language } => {
                segments.extend(["problems", problem]);
                segments.extend(language.map(|l| ["lang", l]).into_iter().flatten());
            }
            Route::Language { language } => {
                segments.extend(["lang", language]);
            }
        }
        segments
    }
}

/// Thin client over the judge's public submissions API.
#[derive(Debug, Clone)]
pub struct JudgeClient {
    http: Client,
    base_url: Url,
}

impl JudgeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the request URL for one page of a route. Path values are
    /// percent-encoded; `page` and `size` are always present.
    pub fn solutions_url(
        &self,
        route: &Route<'_>,
        page_index: u64,
        page_size: u64,
    ) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(route.segments());
        url.query_pairs_mut()
            .append_pair("page", &page_index.to_string())
            .append_pair("size", &page_size.to_string());
        Ok(url)
    }

    /// Fetch one page of submissions as raw JSON objects.
    #[instrument(skip(self))]
    pub async fn fetch_solutions(
        &self,
        route: &Route<'_>,
        page_index: u64,
        page_size: u64,
    ) -> Result<Vec<Value>, ApiError> {
        let url = self.solutions_url(route, page_index, page_size)?;
        debug!(%url, "Requesting submissions from judge API");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let items: Vec<Value> = serde_json::from_slice(&body).map_err(ApiError::Decode)?;
        debug!(count = items.len(), "Judge API returned submissions");

        Ok(items)
    }
}
