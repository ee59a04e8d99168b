//! Page content source.

use cfx_confluence::{ConfluenceClient, ConfluenceError};
use cfx_tree::PageId;
use url::Url;

/// Rendered body and metadata of one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageBody {
    /// Rendered HTML.
    pub html: String,
    /// Version number, if known.
    pub version: Option<u32>,
    /// Last modification timestamp (ISO 8601), if known.
    pub updated: Option<String>,
    /// Link to the page on the instance.
    pub web_url: Option<String>,
}

/// Where the exporter reads page bodies and images from.
pub trait PageContent {
    /// Error returned by the remote operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Base URL image sources are resolved against.
    fn base_url(&self) -> &Url;

    /// Fetch the rendered body of a page.
    fn page_body(&self, id: &PageId) -> Result<PageBody, Self::Error>;

    /// Download a same-host resource.
    fn download(&self, url: &Url) -> Result<Vec<u8>, Self::Error>;
}

impl PageContent for ConfluenceClient {
    type Error = ConfluenceError;

    fn base_url(&self) -> &Url {
        ConfluenceClient::base_url(self)
    }

    fn page_body(&self, id: &PageId) -> Result<PageBody, Self::Error> {
        let page = self.get_page(id)?;
        Ok(PageBody {
            html: page.view_html().to_owned(),
            version: page.version.as_ref().map(|v| v.number),
            updated: page.version.as_ref().and_then(|v| v.when.clone()),
            web_url: Some(self.page_url(&page)),
        })
    }

    fn download(&self, url: &Url) -> Result<Vec<u8>, Self::Error> {
        ConfluenceClient::download(self, url)
    }
}
