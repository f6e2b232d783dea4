// src/notes/mod.rs
// =============================================================================
// This module turns search results into release-note HTML.
//
// Submodules:
// - issues: closed issues -> list of titles with links
// - pulls:  closed pull requests -> author tally + list
// - tally:  per-author PR counts
// - seed:   date of the last merged PR (start of the next window)
//
// Every fetcher returns its finished notes instead of writing them anywhere;
// main.rs decides where the HTML ends up.
// =============================================================================

mod issues;
mod pulls;
mod seed;
mod tally;

pub use issues::{fetch_issue_notes, IssueNotes};
pub use pulls::{fetch_pull_notes, PullNotes};
pub use seed::{last_merge_date, SeedError, DEFAULT_BASE_BRANCH};

use serde::Serialize;
use url::Url;

use crate::github::RepoSlug;

pub const DEFAULT_WEB_BASE: &str = "https://github.com";

// Builds the human-facing links for items of one repository
#[derive(Debug, Clone)]
pub struct ItemLinks {
    repo_root: String,
}

impl ItemLinks {
    pub fn new(web_base: &Url, repo: &RepoSlug) -> Self {
        let base = web_base.as_str().trim_end_matches('/');
        Self {
            repo_root: format!("{base}/{repo}"),
        }
    }

    pub fn issue(&self, number: u64) -> String {
        format!("{}/issues/{number}", self.repo_root)
    }

    pub fn pull(&self, number: u64) -> String {
        format!("{}/pull/{number}", self.repo_root)
    }
}

/// One rendered line of a note list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub title: String,
    pub number: u64,
    pub url: String,
}

impl NoteEntry {
    fn to_html(&self) -> String {
        format!("{} ({})\n<br>", escape_html(&self.title), self.url)
    }
}

// Titles are user-written text and end up inside HTML
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
