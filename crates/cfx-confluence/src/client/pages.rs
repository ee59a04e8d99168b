//! Page operations for Confluence API.

use cfx_tree::{PageId, PageSummary};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{ContentPage, Page};

impl ConfluenceClient {
    /// List every current page of a space, following pagination.
    pub fn list_pages(&self, space_key: &str) -> Result<Vec<PageSummary>, ConfluenceError> {
        let base = format!(
            "{}/content?spaceKey={}&type=page&status=current",
            self.api_url(),
            utf8_percent_encode(space_key, NON_ALPHANUMERIC)
        );

        info!("Listing pages in space {}", space_key);

        let pages = self.collect_all(&base)?;
        info!("Found {} pages in space {}", pages.len(), space_key);
        Ok(pages)
    }

    /// List the direct child pages of a page, following pagination.
    pub fn child_pages(&self, page_id: &PageId) -> Result<Vec<PageSummary>, ConfluenceError> {
        let base = format!(
            "{}/content/{}/child/page?",
            self.api_url(),
            utf8_percent_encode(page_id.as_str(), NON_ALPHANUMERIC)
        );

        let children = self.collect_all(&base)?;
        debug!("Page {} has {} children", page_id, children.len());
        Ok(children)
    }

    /// Get a page with its rendered body and version.
    pub fn get_page(&self, page_id: &PageId) -> Result<Page, ConfluenceError> {
        let url = format!(
            "{}/content/{}?expand=body.view,version",
            self.api_url(),
            utf8_percent_encode(page_id.as_str(), NON_ALPHANUMERIC)
        );

        info!("Getting page {}", page_id);

        self.get_json(&url)
    }

    /// Get web URL for a page.
    pub fn page_url(&self, page: &Page) -> String {
        if let Some(links) = &page.links
            && let Some(webui) = &links.webui
        {
            return format!("{}{}", self.base_url.as_str().trim_end_matches('/'), webui);
        }

        format!("{}pages/viewpage.action?pageId={}", self.base_url, page.id)
    }

    /// Fetch every result of a paginated listing.
    ///
    /// `base` is the listing URL including its query separator; `start` and
    /// `limit` are appended for each request.
    fn collect_all<T: DeserializeOwned>(&self, base: &str) -> Result<Vec<T>, ConfluenceError> {
        collect_pages(self.page_size as usize, |start| {
            self.get_json(&paged_url(base, start, self.page_size))
        })
    }
}

/// Drive a paginated listing, calling `fetch` with the offset of each page.
///
/// The offset advances by the number of results actually returned, since
/// the server may cap `limit` below what was asked for.
fn collect_pages<T, E, F>(limit: usize, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(usize) -> Result<ContentPage<T>, E>,
{
    let mut results = Vec::new();
    let mut start = 0;

    loop {
        let page = fetch(start)?;
        let more = page.has_more(limit);
        start += page.results.len();
        results.extend(page.results);
        if !more {
            break;
        }
    }

    Ok(results)
}

/// Append `start`/`limit` to a listing URL.
fn paged_url(base: &str, start: usize, limit: u32) -> String {
    let separator = if base.ends_with('?') { "" } else { "&" };
    format!("{base}{separator}start={start}&limit={limit}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::client::ClientConfig;
    use crate::types::Links;
    use crate::Credentials;

    fn client() -> ConfluenceClient {
        ConfluenceClient::new(ClientConfig::new(
            "https://acme.atlassian.net/wiki",
            Credentials::Bearer {
                token: "t".to_owned(),
            },
        ))
        .unwrap()
    }

    fn page(links: Option<Links>) -> Page {
        Page {
            id: "101".to_owned(),
            title: "Home".to_owned(),
            version: None,
            body: None,
            links,
        }
    }

    #[test]
    fn test_paged_url_after_query() {
        assert_eq!(
            paged_url("https://x/rest/api/content?spaceKey=DOCS", 50, 25),
            "https://x/rest/api/content?spaceKey=DOCS&start=50&limit=25"
        );
    }

    #[test]
    fn test_paged_url_after_separator() {
        assert_eq!(
            paged_url("https://x/rest/api/content/1/child/page?", 0, 25),
            "https://x/rest/api/content/1/child/page?start=0&limit=25"
        );
    }

    fn listing(ids: &[&str], next: bool) -> ContentPage<PageSummary> {
        ContentPage {
            results: ids.iter().map(|id| PageSummary::new(*id, *id)).collect(),
            links: Some(Links {
                webui: None,
                next: next.then(|| "/rest/api/content?start=n".to_owned()),
            }),
        }
    }

    #[test]
    fn test_collect_pages_follows_next_links() {
        let mut responses = vec![
            listing(&["1", "2"], true),
            listing(&["3", "4"], true),
            listing(&["5"], false),
        ]
        .into_iter();
        let mut starts = Vec::new();

        let pages = collect_pages(2, |start| {
            starts.push(start);
            Ok::<_, ConfluenceError>(responses.next().unwrap())
        })
        .unwrap();

        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(starts, vec![0, 2, 4]);
    }

    #[test]
    fn test_collect_pages_advances_by_returned_count() {
        // Server caps the page size at 1 although 2 were requested.
        let mut responses = vec![listing(&["1"], true), listing(&["2"], false)].into_iter();
        let mut starts = Vec::new();

        let pages = collect_pages(2, |start| {
            starts.push(start);
            Ok::<_, ConfluenceError>(responses.next().unwrap())
        })
        .unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(starts, vec![0, 1]);
    }

    #[test]
    fn test_collect_pages_stops_on_error() {
        let mut calls = 0;

        let result: Result<Vec<PageSummary>, ConfluenceError> = collect_pages(2, |start| {
            calls += 1;
            if start == 0 {
                Ok(listing(&["1", "2"], true))
            } else {
                Err(ConfluenceError::ForeignHost("x".to_owned()))
            }
        });

        assert!(matches!(result, Err(ConfluenceError::ForeignHost(_))));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_page_url_from_webui_link() {
        let page = page(Some(Links {
            webui: Some("/spaces/DOCS/pages/101/Home".to_owned()),
            next: None,
        }));

        assert_eq!(
            client().page_url(&page),
            "https://acme.atlassian.net/wiki/spaces/DOCS/pages/101/Home"
        );
    }

    #[test]
    fn test_page_url_fallback() {
        assert_eq!(
            client().page_url(&page(None)),
            "https://acme.atlassian.net/wiki/pages/viewpage.action?pageId=101"
        );
    }
}
