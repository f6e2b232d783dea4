// src/github/query.rs
// =============================================================================
// Building blocks for search queries:
// - RepoSlug: the "owner/name" repository identifier
// - ClosedWindow: an inclusive range of closing dates
// - SearchQuery: the `q=` string sent to /search/issues
//
// GitHub search syntax reference:
//   repo:google/blockly is:pr base:master closed:2024-01-01..2024-03-31
// =============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use thiserror::Error;

// Lookback used to find the last merge: three 30-day "months"
pub const LOOKBACK_DAYS: i64 = 3 * 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("repository must look like OWNER/NAME, got '{0}'")]
    InvalidRepo(String),

    #[error("start date {start} is after end date {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    owner: String,
    name: String,
}

impl RepoSlug {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepoSlug {
    type Err = QueryError;

    // Accepts "owner/name" as well as a pasted github.com URL
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let path = input
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.")
            .trim_start_matches("github.com/")
            .trim_end_matches('/');

        let mut parts = path.split('/');
        let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(QueryError::InvalidRepo(input.to_string()));
        };
        let name = name.trim_end_matches(".git");

        if owner.is_empty() || name.is_empty() {
            return Err(QueryError::InvalidRepo(input.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Inclusive range of closing dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ClosedWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, QueryError> {
        if start > end {
            return Err(QueryError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window ending on `today` and reaching back [`LOOKBACK_DAYS`].
    pub fn lookback(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(LOOKBACK_DAYS),
            end: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

// Formats as the value of a `closed:` qualifier
impl fmt::Display for ClosedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    fn qualifier(self) -> &'static str {
        match self {
            ItemKind::Issue => "is:issue",
            ItemKind::PullRequest => "is:pr",
        }
    }
}

/// A search over one repository's closed issues or pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    repo: RepoSlug,
    kind: ItemKind,
    window: ClosedWindow,
    base: Option<String>,
}

impl SearchQuery {
    pub fn new(repo: RepoSlug, kind: ItemKind, window: ClosedWindow) -> Self {
        Self {
            repo,
            kind,
            window,
            base: None,
        }
    }

    /// Restricts pull requests to those targeting `branch`.
    pub fn with_base(mut self, branch: impl Into<String>) -> Self {
        self.base = Some(branch.into());
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// The `q=` parameter, before URL encoding.
    pub fn to_q(&self) -> String {
        let mut q = format!("repo:{} {}", self.repo, self.kind.qualifier());
        if let Some(base) = &self.base {
            q.push_str(&format!(" base:{base}"));
        }
        q.push_str(&format!(" closed:{}", self.window));
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_repo_slug() {
        let repo: RepoSlug = "google/blockly".parse().unwrap();
        assert_eq!(repo.owner(), "google");
        assert_eq!(repo.name(), "blockly");
        assert_eq!(repo.to_string(), "google/blockly");
    }

    #[test]
    fn test_parse_repo_slug_from_url() {
        let repo: RepoSlug = "https://github.com/google/blockly.git".parse().unwrap();
        assert_eq!(repo.to_string(), "google/blockly");
    }

    #[test]
    fn test_parse_invalid_repo_slug() {
        assert!("blockly".parse::<RepoSlug>().is_err());
        assert!("a/b/c".parse::<RepoSlug>().is_err());
        assert!("/b".parse::<RepoSlug>().is_err());
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let err = ClosedWindow::new(date("2024-02-01"), date("2024-01-01")).unwrap_err();
        assert!(matches!(err, QueryError::InvertedWindow { .. }));
    }

    #[test]
    fn test_window_single_day_and_display() {
        let window = ClosedWindow::new(date("2024-01-05"), date("2024-01-05")).unwrap();
        assert_eq!(window.to_string(), "2024-01-05..2024-01-05");
    }

    #[test]
    fn test_lookback_is_ninety_days() {
        let window = ClosedWindow::lookback(date("2024-04-01"));
        assert_eq!(window.start(), date("2024-01-02"));
        assert_eq!(window.end(), date("2024-04-01"));
    }

    #[test]
    fn test_query_strings() {
        let repo: RepoSlug = "google/blockly".parse().unwrap();
        let window = ClosedWindow::new(date("2024-01-01"), date("2024-01-31")).unwrap();

        let issues = SearchQuery::new(repo.clone(), ItemKind::Issue, window);
        assert_eq!(
            issues.to_q(),
            "repo:google/blockly is:issue closed:2024-01-01..2024-01-31"
        );

        let merged = SearchQuery::new(repo, ItemKind::PullRequest, window).with_base("master");
        assert_eq!(
            merged.to_q(),
            "repo:google/blockly is:pr base:master closed:2024-01-01..2024-01-31"
        );
    }
}
