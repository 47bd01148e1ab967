/// Which slice of submissions a request is interested in, plus the page it wants.
///
/// Empty predicate values are normalized to `None` on the builder methods, so
/// an absent predicate is never confused with a column value equal to `""`.
/// Any other value is kept as given and matched exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub user_id: Option<String>,
    pub problem_id: Option<String>,
    pub language: Option<String>,
    /// Zero-based page number.
    pub page_index: u64,
    /// Number of ranks per page. Must be positive for a search to run.
    pub page_size: u64,
}

impl SearchFilter {
    pub fn new(page_index: u64, page_size: u64) -> Self {
        Self {
            page_index,
            page_size,
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl AsRef<str>) -> Self {
        self.user_id = non_empty(user_id.as_ref());
        self
    }

    pub fn with_problem(mut self, problem_id: impl AsRef<str>) -> Self {
        self.problem_id = non_empty(problem_id.as_ref());
        self
    }

    pub fn with_language(mut self, language: impl AsRef<str>) -> Self {
        self.language = non_empty(language.as_ref());
        self
    }

    /// True when no user, problem, or language predicate is present.
    pub fn is_unfiltered(&self) -> bool {
        self.user_id.is_none() && self.problem_id.is_none() && self.language.is_none()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
