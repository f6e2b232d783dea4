// src/github/mod.rs
// =============================================================================
// This module talks to the GitHub search API.
//
// Submodules:
// - client: HTTP requests and the page-by-page collection loop
// - link:   parsing the `Link` pagination header
// - models: the JSON shapes we decode
// - query:  repository, date window and `q=` string building
// =============================================================================

mod client;
mod link;
mod models;
mod query;

pub use client::{Accumulator, Page, SearchClient, SearchError, DEFAULT_API_BASE, MAX_PER_PAGE};
pub use link::Links;
pub use models::{IssueItem, PullItem, SearchPage, User};
pub use query::{ClosedWindow, ItemKind, QueryError, RepoSlug, SearchQuery};
