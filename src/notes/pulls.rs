// src/notes/pulls.rs
// =============================================================================
// Pull request notes: a contributor summary followed by the PR list.
//
//   12 PRs submitted:
//   <br>1 PR: bob, carol
//   <br>10 PRs: alice
//   <br>
//   <br>Fix crash (https://github.com/owner/repo/pull/42)
//   <br>...
//
// The header total is the `total_count` of the first page. The per-count lines
// are sorted by count, ascending.
// =============================================================================

use serde::Serialize;

use super::tally::{pr_label, AuthorTally};
use super::{ItemLinks, NoteEntry};
use crate::github::{
    Accumulator, ClosedWindow, ItemKind, PullItem, RepoSlug, SearchClient, SearchError,
    SearchPage, SearchQuery,
};

#[derive(Debug, Clone, Serialize)]
pub struct PullNotes {
    #[serde(skip)]
    links: ItemLinks,
    pub total_count: Option<u64>,
    pub authors: AuthorTally,
    pub entries: Vec<NoteEntry>,
}

impl PullNotes {
    pub fn new(links: ItemLinks) -> Self {
        Self {
            links,
            total_count: None,
            authors: AuthorTally::default(),
            entries: Vec::new(),
        }
    }

    /// Header with the author summary, a blank line, then the PR list.
    pub fn render(&self) -> String {
        let total = self.total_count.unwrap_or(0);
        let mut html = format!("{total} PRs submitted:\n<br>");

        for (count, authors) in self.authors.by_count() {
            html.push_str(&format!(
                "{count} {}: {}\n<br>",
                pr_label(count),
                authors.join(", ")
            ));
        }
        html.push_str("\n<br>");

        for entry in &self.entries {
            html.push_str(&entry.to_html());
        }
        html
    }
}

impl Accumulator<PullItem> for PullNotes {
    fn absorb(&mut self, page: SearchPage<PullItem>) {
        self.total_count.get_or_insert(page.total_count);

        for item in page.items {
            self.authors.record(&item.user.login);
            self.entries.push(NoteEntry {
                url: self.links.pull(item.number),
                title: item.title,
                number: item.number,
            });
        }
    }
}

/// Lists every pull request of `repo` closed within `window`, with a
/// per-author tally.
pub async fn fetch_pull_notes(
    client: &SearchClient,
    links: ItemLinks,
    repo: &RepoSlug,
    window: ClosedWindow,
) -> Result<PullNotes, SearchError> {
    let query = SearchQuery::new(repo.clone(), ItemKind::PullRequest, window);
    tracing::info!(%repo, %window, "collecting closed pull requests");

    let (notes, requests) = client.collect(&query, PullNotes::new(links)).await?;
    tracing::debug!(
        requests,
        authors = notes.authors.iter().count(),
        "pull request tally complete"
    );
    Ok(notes)
}
