//! HTML templates for exported pages and the space index.

use std::fmt::Write;

/// Inline stylesheet shared by every generated document.
const STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif; \
margin: 0 auto; max-width: 60rem; padding: 1.5rem; color: rgb(17 24 39); line-height: 1.6; }
img { max-width: 100%; height: auto; }
.breadcrumbs { font-size: 0.875rem; color: rgb(75 85 99); margin-bottom: 1.5rem; }
.breadcrumb-item::after { content: \"/\"; margin: 0 0.5rem; color: rgb(156 163 175); }
.breadcrumb-item:last-child::after { content: none; }
.breadcrumbs ol { list-style: none; display: flex; flex-wrap: wrap; padding: 0; margin: 0; }
.meta { font-size: 0.75rem; color: rgb(107 114 128); margin-top: 3rem; }
";

/// Data for a breadcrumb entry.
pub struct BreadcrumbData {
    pub title: String,
    pub path: String,
}

/// All data needed to render one exported page.
pub struct PageData {
    pub title: String,
    pub html_content: String,
    pub breadcrumbs: Vec<BreadcrumbData>,
    /// Relative path back to `index.html`.
    pub index_path: String,
    /// Link to the page on the Confluence instance.
    pub source_url: Option<String>,
    pub version: Option<u32>,
    /// Last modification timestamp (ISO 8601).
    pub updated: Option<String>,
}

/// One line of the index, in depth-first pre-order.
pub struct IndexEntryData {
    pub depth: usize,
    pub title: String,
    pub path: String,
}

/// All data needed to render the space index.
pub struct IndexData {
    pub title: String,
    pub entries: Vec<IndexEntryData>,
}

/// Render a complete exported page.
pub fn render_page(page: &PageData) -> String {
    let mut html = String::with_capacity(page.html_content.len() + 2048);

    render_head(&mut html, &page.title);

    html.push_str("<nav class=\"breadcrumbs\">\n<ol>\n");
    let _ = writeln!(
        html,
        "<li class=\"breadcrumb-item\"><a href=\"{}\">Index</a></li>",
        escape(&page.index_path)
    );
    for crumb in &page.breadcrumbs {
        let _ = writeln!(
            html,
            "<li class=\"breadcrumb-item\"><a href=\"{}\">{}</a></li>",
            escape(&crumb.path),
            escape(&crumb.title),
        );
    }
    html.push_str("</ol>\n</nav>\n");

    html.push_str("<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(&page.title));
    html.push_str("<article>\n");
    html.push_str(&page.html_content);
    html.push_str("\n</article>\n</main>\n");

    render_meta(&mut html, page);

    html.push_str("</body>\n</html>\n");
    html
}

/// Render the space index as nested lists.
///
/// Entries must be in depth-first pre-order with every depth at most one
/// deeper than the previous entry.
pub fn render_index(index: &IndexData) -> String {
    let mut html = String::with_capacity(256 + index.entries.len() * 96);

    render_head(&mut html, &index.title);

    html.push_str("<main>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape(&index.title));

    if index.entries.is_empty() {
        html.push_str("<p>This space has no pages.</p>\n");
    } else {
        html.push_str("<nav>\n<ul>\n");
        let mut depth = 0;
        for (i, entry) in index.entries.iter().enumerate() {
            if i > 0 {
                if entry.depth > depth {
                    html.push_str("\n<ul>\n");
                } else {
                    html.push_str("</li>\n");
                    for _ in entry.depth..depth {
                        html.push_str("</ul>\n</li>\n");
                    }
                }
            }
            depth = entry.depth;
            let _ = write!(
                html,
                "<li><a href=\"{}\">{}</a>",
                escape(&entry.path),
                escape(&entry.title),
            );
        }
        html.push_str("</li>\n");
        for _ in 0..depth {
            html.push_str("</ul>\n</li>\n");
        }
        html.push_str("</ul>\n</nav>\n");
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_head(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(title));
    let _ = writeln!(html, "<style>\n{STYLE}</style>");
    html.push_str("</head>\n<body>\n");
}

/// Render the source footer, if there is anything to show.
fn render_meta(html: &mut String, page: &PageData) {
    let updated = page.updated.as_deref().map(date_part);
    if page.source_url.is_none() && page.version.is_none() && updated.is_none() {
        return;
    }
    html.push_str("<footer class=\"meta\">\n");
    let mut parts = Vec::new();
    match (page.version, updated) {
        (Some(version), Some(date)) => {
            parts.push(format!("Version {version}, updated {}", escape(date)));
        }
        (Some(version), None) => parts.push(format!("Version {version}")),
        (None, Some(date)) => parts.push(format!("Updated {}", escape(date))),
        (None, None) => {}
    }
    if let Some(url) = &page.source_url {
        parts.push(format!("<a href=\"{}\">View in Confluence</a>", escape(url)));
    }
    html.push_str(&parts.join(" &middot; "));
    html.push_str("\n</footer>\n");
}

/// Calendar date of an ISO 8601 timestamp: `2024-05-01T10:00:00Z` becomes `2024-05-01`.
fn date_part(timestamp: &str) -> &str {
    timestamp.split_once('T').map_or(timestamp, |(date, _)| date)
}

/// Escape HTML special characters.
fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
