//! Image reference rewriting for offline pages.
//!
//! Confluence renders attachments as `<img>` tags pointing back at the
//! instance. For the mirror those tags are repointed at a page-local
//! `images/` directory and the original URLs are collected for download.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use cfx_confluence::same_host;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use url::Url;

use crate::sanitize::{href_segment, sanitize_filename};

/// Directory, relative to the page, that holds downloaded images.
pub const IMAGES_DIR: &str = "images";

/// Name used when a URL has no usable last path segment.
const FALLBACK_IMAGE_NAME: &str = "image";

/// Regex to match a complete `<img>` start tag.
static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());

/// Regex to match the `src` attribute inside a tag.
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\ssrc\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

/// Regex to match the `srcset` attribute including its leading whitespace.
static SRCSET_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+srcset\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap()
});

/// Regex to match one character reference: named, decimal or hexadecimal.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:(amp|quot|apos|lt|gt)|#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6}));").unwrap()
});

/// Image to download for a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    /// Absolute URL on the Confluence host.
    pub url: Url,
    /// File name inside the page's `images/` directory.
    pub file_name: String,
}

/// Page HTML with local image references.
#[derive(Debug)]
pub struct RewrittenHtml {
    /// HTML with same-host `<img>` tags pointing into `images/`.
    pub html: String,
    /// Images referenced by the rewritten HTML, each URL once.
    pub images: Vec<ImageRef>,
}

/// Repoint same-host images at `images/<file>`.
///
/// Each `src` is resolved against `base_url`. Images served by the same
/// host get a local `src` and lose their `srcset`; everything else
/// (foreign hosts, `data:` URIs, unparsable values) is left untouched.
#[must_use]
pub fn rewrite_images(html: &str, base_url: &Url) -> RewrittenHtml {
    let mut files = ImageFiles::default();

    let html = IMG_TAG_RE
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            rewrite_tag(tag, base_url, &mut files).unwrap_or_else(|| tag.to_owned())
        })
        .into_owned();

    RewrittenHtml {
        html,
        images: files.images,
    }
}

/// Rewrite one `<img>` tag, or `None` to keep it as is.
fn rewrite_tag(tag: &str, base_url: &Url, files: &mut ImageFiles) -> Option<String> {
    let caps = SRC_ATTR_RE.captures(tag)?;
    let src = caps.get(2).or_else(|| caps.get(3))?.as_str();
    let url = base_url.join(&decode_entities(src)).ok()?;
    if !same_host(base_url, &url) {
        return None;
    }

    let file_name = files.file_for(url);
    let whole = caps.get(0)?;
    let rewritten = format!(
        "{}{}\"{IMAGES_DIR}/{}\"{}",
        &tag[..whole.start()],
        &caps[1],
        href_segment(&file_name),
        &tag[whole.end()..],
    );
    Some(SRCSET_ATTR_RE.replace_all(&rewritten, "").into_owned())
}

/// Undo the entity escaping Confluence applies inside attribute values.
///
/// Decodes in a single left-to-right pass, so `&amp;quot;` yields the
/// literal text `&quot;`. Unknown or invalid references are kept verbatim.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_owned();
    }
    ENTITY_RE
        .replace_all(value, |caps: &Captures| {
            let decoded = if let Some(name) = caps.get(1) {
                match name.as_str() {
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "lt" => Some('<'),
                    _ => Some('>'),
                }
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse().ok().and_then(char::from_u32)
            } else {
                caps.get(3)
                    .and_then(|hex| u32::from_str_radix(hex.as_str(), 16).ok())
                    .and_then(char::from_u32)
            };
            decoded.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

/// Per-page registry of downloaded files.
#[derive(Default)]
struct ImageFiles {
    images: Vec<ImageRef>,
    by_url: HashMap<Url, String>,
    taken: HashSet<String>,
}

impl ImageFiles {
    /// File name for `url`, allocating a fresh one on first sight.
    fn file_for(&mut self, url: Url) -> String {
        if let Some(name) = self.by_url.get(&url) {
            return name.clone();
        }

        let base = file_name_from_url(&url);
        let mut name = base.clone();
        let mut n = 2;
        while !self.taken.insert(name.to_lowercase()) {
            name = numbered(&base, n);
            n += 1;
        }

        self.by_url.insert(url.clone(), name.clone());
        self.images.push(ImageRef {
            url,
            file_name: name.clone(),
        });
        name
    }
}

/// Sanitized last path segment of a URL.
fn file_name_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    if decoded.trim().is_empty() {
        return FALLBACK_IMAGE_NAME.to_owned();
    }
    sanitize_filename(&decoded)
}

/// Insert `-n` before the extension: `diagram.png` becomes `diagram-2.png`.
fn numbered(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{name}-{n}"),
    }
}
