// src/notes/seed.rs
// =============================================================================
// Finds where the next release window should start: the closing date of the
// most recent pull request merged into the base branch.
//
// Only the last three 30-day "months" are searched, and only the first page
// is read. The first item is taken as the most recent one.
// =============================================================================

use chrono::NaiveDate;
use thiserror::Error;

use crate::github::{
    ClosedWindow, ItemKind, PullItem, RepoSlug, SearchClient, SearchError, SearchQuery,
};

pub const DEFAULT_BASE_BRANCH: &str = "master";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("pull request #{number} has no usable closing date ({value:?})")]
    ClosedAt { number: u64, value: Option<String> },
}

/// Date the latest merged pull request was closed, or `None` if nothing was
/// merged into `base` during the lookback window ending `today`.
pub async fn last_merge_date(
    client: &SearchClient,
    repo: &RepoSlug,
    base: &str,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, SeedError> {
    let window = ClosedWindow::lookback(today);
    let query = SearchQuery::new(repo.clone(), ItemKind::PullRequest, window).with_base(base);
    tracing::info!(%repo, base, %window, "looking up last merge");

    let url = client.search_url(&query)?;
    let page = client.fetch_page::<PullItem>(&url).await?;

    let Some(latest) = page.body.items.into_iter().next() else {
        return Ok(None);
    };

    closing_date(latest.closed_at.as_deref())
        .map(Some)
        .ok_or(SeedError::ClosedAt {
            number: latest.number,
            value: latest.closed_at,
        })
}

// "2024-03-01T10:00:00Z" -> 2024-03-01
fn closing_date(closed_at: Option<&str>) -> Option<NaiveDate> {
    let day = closed_at?.split('T').next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
