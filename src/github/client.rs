// src/github/client.rs
// =============================================================================
// HTTP side of the search: one reqwest client, one GET per page.
//
// Pagination is sequential. Each step fetches a page, hands its items to an
// accumulator, and follows the `next` URL from the Link header until there is
// none. Only then does the caller get the accumulator back to render it.
//
//   ISSUING -> AWAITING_RESPONSE -> next link?  yes -> ISSUING
//                                               no  -> DONE
//
// A non-success status ends the sequence with SearchError::Status instead of
// leaving it waiting forever.
// =============================================================================

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LINK, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::link::Links;
use super::models::SearchPage;
use super::query::SearchQuery;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const MAX_PER_PAGE: u8 = 100;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub answered {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("could not decode search results from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

// One decoded page plus the pagination links that came with it
#[derive(Debug)]
pub struct Page<T> {
    pub body: SearchPage<T>,
    pub links: Links,
}

/// Something that collects search results page by page.
pub trait Accumulator<T> {
    fn absorb(&mut self, page: SearchPage<T>);
}

#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    api_base: Url,
    per_page: Option<u8>,
}

impl SearchClient {
    pub fn new(api_base: Url) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("release-notes/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| SearchError::Request {
                url: api_base.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            api_base,
            per_page: None,
        })
    }

    /// Page size requested for the first page; later pages inherit it from
    /// the `next` URL.
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = Some(per_page.clamp(1, MAX_PER_PAGE));
        self
    }

    /// URL of the first page for `query`.
    pub fn search_url(&self, query: &SearchQuery) -> Result<Url, SearchError> {
        let base = self.api_base.as_str().trim_end_matches('/');
        let raw = format!("{base}/search/issues");
        let mut url = Url::parse(&raw).map_err(|source| SearchError::InvalidUrl { url: raw, source })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &query.to_q());
            if let Some(per_page) = self.per_page {
                pairs.append_pair("per_page", &per_page.to_string());
            }
        }

        Ok(url)
    }

    /// Fetches and decodes a single page.
    pub async fn fetch_page<T: DeserializeOwned>(&self, url: &Url) -> Result<Page<T>, SearchError> {
        tracing::debug!(%url, "requesting search page");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SearchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let links = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(Links::parse)
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(|source| SearchError::Request {
            url: url.to_string(),
            source,
        })?;
        let body = serde_json::from_slice(&bytes).map_err(|source| SearchError::Decode {
            url: url.to_string(),
            source,
        })?;

        Ok(Page { body, links })
    }

    /// Runs `query` to the last page, feeding every page into `acc`.
    ///
    /// Returns the accumulator once no `next` link remains, together with the
    /// number of requests issued.
    pub async fn collect<T, A>(&self, query: &SearchQuery, mut acc: A) -> Result<(A, usize), SearchError>
    where
        T: DeserializeOwned,
        A: Accumulator<T>,
    {
        let mut url = self.search_url(query)?;
        let mut requests = 0;

        loop {
            let page: Page<T> = self.fetch_page(&url).await?;
            requests += 1;

            tracing::debug!(
                kind = ?query.kind(),
                page = requests,
                items = page.body.items.len(),
                rels = ?page.links.rels().collect::<Vec<_>>(),
                "received search page"
            );

            let next = page
                .links
                .next()
                .map(|next| {
                    Url::parse(next).map_err(|source| SearchError::InvalidUrl {
                        url: next.to_string(),
                        source,
                    })
                })
                .transpose()?;

            acc.absorb(page.body);

            match next {
                // A server pointing back at the same page would loop forever
                Some(next) if next == url => {
                    tracing::warn!(%url, "next link points at the current page, stopping");
                    break;
                }
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::info!(kind = ?query.kind(), requests, "search finished");
        Ok((acc, requests))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait for the accumulator?
//    - The loop does not care whether it collects issues or pull requests
//    - Anything implementing Accumulator<T> can be fed pages of T
//    - The caller gets the accumulator back, so nothing is rendered mid-way
//
// 2. What is DeserializeOwned?
//    - A serde bound meaning "can be built from JSON without borrowing it"
//    - We decode from a temporary byte buffer, so borrowing is not possible
//
// 3. Why map_err everywhere?
//    - reqwest and serde_json errors do not know which URL failed
//    - Wrapping them in SearchError keeps the URL next to the cause
//
// 4. Option::transpose
//    - Turns Option<Result<Url, E>> into Result<Option<Url>, E>
//    - That lets `?` reject a bad next URL while "no next URL" stays None
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::models::IssueItem;
    use crate::github::query::{ClosedWindow, ItemKind, RepoSlug};
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Default)]
    struct Titles(Vec<String>);

    impl Accumulator<IssueItem> for Titles {
        fn absorb(&mut self, page: SearchPage<IssueItem>) {
            self.0.extend(page.items.into_iter().map(|item| item.title));
        }
    }

    fn issue_query() -> SearchQuery {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        SearchQuery::new(
            "google/blockly".parse::<RepoSlug>().unwrap(),
            ItemKind::Issue,
            ClosedWindow::new(start, end).unwrap(),
        )
    }

    fn page_body(titles: &[&str]) -> serde_json::Value {
        let items: Vec<_> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| serde_json::json!({ "title": title, "number": i + 1 }))
            .collect();
        serde_json::json!({ "total_count": 99, "items": items })
    }

    #[test]
    fn test_search_url_encodes_query() {
        let client = SearchClient::new(Url::parse("https://api.github.com/").unwrap())
            .unwrap()
            .with_per_page(100);
        let url = client.search_url(&issue_query()).unwrap();

        assert_eq!(url.path(), "/search/issues");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "q".to_string(),
                    "repo:google/blockly is:issue closed:2024-01-01..2024-01-31".to_string()
                ),
                ("per_page".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_per_page_is_clamped() {
        let client = SearchClient::new(Url::parse("https://api.github.com").unwrap())
            .unwrap()
            .with_per_page(250);
        let url = client.search_url(&issue_query()).unwrap();
        assert!(url.query().unwrap().ends_with("per_page=100"));
    }

    #[tokio::test]
    async fn test_collect_follows_next_links_until_last_page() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{uri}/search/issues?page=3>; rel=\"next\"").as_str())
                    .set_body_json(page_body(&["b"])),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&["c"])))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{uri}/search/issues?page=2>; rel=\"next\"").as_str())
                    .set_body_json(page_body(&["a"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = SearchClient::new(Url::parse(&uri).unwrap()).unwrap();
        let (titles, requests) = client.collect(&issue_query(), Titles::default()).await.unwrap();

        assert_eq!(requests, 3);
        assert_eq!(titles.0, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_collect_reports_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let client = SearchClient::new(Url::parse(&server.uri()).unwrap()).unwrap();
        let err = client
            .collect(&issue_query(), Titles::default())
            .await
            .unwrap_err();

        match err {
            SearchError::Status { status, .. } => assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_collect_reports_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SearchClient::new(Url::parse(&server.uri()).unwrap()).unwrap();
        let err = client
            .collect(&issue_query(), Titles::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_collect_stops_on_self_referencing_next() {
        let server = MockServer::start().await;
        let client = SearchClient::new(Url::parse(&server.uri()).unwrap()).unwrap();
        let first = client.search_url(&issue_query()).unwrap();

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{first}>; rel=\"next\"").as_str())
                    .set_body_json(page_body(&["a"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (titles, requests) = client.collect(&issue_query(), Titles::default()).await.unwrap();
        assert_eq!(requests, 1);
        assert_eq!(titles.0, vec!["a"]);
    }
}
