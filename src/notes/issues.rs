// src/notes/issues.rs
// =============================================================================
// Issue notes: every issue closed inside the window, one line each.
//
//   Fix crash (https://github.com/owner/repo/issues/42)
//   <br>
//
// Lines keep the order the API returned them in, page after page.
// =============================================================================

use serde::Serialize;

use super::{ItemLinks, NoteEntry};
use crate::github::{
    Accumulator, ClosedWindow, IssueItem, ItemKind, RepoSlug, SearchClient, SearchError,
    SearchPage, SearchQuery,
};

#[derive(Debug, Clone, Serialize)]
pub struct IssueNotes {
    #[serde(skip)]
    links: ItemLinks,
    pub total_count: u64,
    pub entries: Vec<NoteEntry>,
}

impl IssueNotes {
    pub fn new(links: ItemLinks) -> Self {
        Self {
            links,
            total_count: 0,
            entries: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        self.entries.iter().map(NoteEntry::to_html).collect()
    }
}

impl Accumulator<IssueItem> for IssueNotes {
    fn absorb(&mut self, page: SearchPage<IssueItem>) {
        self.total_count = page.total_count;
        for item in page.items {
            self.entries.push(NoteEntry {
                url: self.links.issue(item.number),
                title: item.title,
                number: item.number,
            });
        }
    }
}

/// Lists every issue of `repo` closed within `window`.
pub async fn fetch_issue_notes(
    client: &SearchClient,
    links: ItemLinks,
    repo: &RepoSlug,
    window: ClosedWindow,
) -> Result<IssueNotes, SearchError> {
    let query = SearchQuery::new(repo.clone(), ItemKind::Issue, window);
    tracing::info!(%repo, %window, "collecting closed issues");

    let (notes, _) = client.collect(&query, IssueNotes::new(links)).await?;
    Ok(notes)
}
