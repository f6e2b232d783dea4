// src/github/models.rs
// =============================================================================
// Data shapes returned by the GitHub search API (`GET /search/issues`).
//
// Only the fields we actually render are declared; serde ignores the rest of
// the (large) JSON objects GitHub sends back.
// =============================================================================

use serde::{Deserialize, Serialize};

// One page of search results
//
// `total_count` is the size of the whole result set, not of this page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

/// A closed issue as listed by the search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueItem {
    pub title: String,
    pub number: u64,
    #[serde(default)]
    pub closed_at: Option<String>,
}

/// A closed pull request as listed by the search API.
///
/// Pull requests come back from the same endpoint as issues; the only extra
/// field we need is the author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullItem {
    pub title: String,
    pub number: u64,
    #[serde(default)]
    pub closed_at: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}
