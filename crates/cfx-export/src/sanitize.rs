//! File and directory names derived from page titles.

use std::collections::HashSet;

use cfx_tree::PageId;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Bytes escaped when a name is used as one segment of a relative href.
const HREF_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Longest name produced by [`sanitize_filename`], in characters.
pub const MAX_NAME_LEN: usize = 120;

/// Name used when a title sanitizes to nothing.
const FALLBACK_NAME: &str = "untitled";

/// Characters rejected by at least one common filesystem.
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows refuses as file names, with or without extension.
const RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Turn a page title into a portable file name.
///
/// Forbidden and control characters become `_`, whitespace runs collapse to
/// one space, leading and trailing dots and spaces are trimmed, and the
/// result is cut to [`MAX_NAME_LEN`] characters. Windows device names get a
/// `_` suffix. Titles with nothing left become `untitled`.
#[must_use]
pub fn sanitize_filename(title: &str) -> String {
    let mut cleaned = String::with_capacity(title.len());
    let mut pending_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !cleaned.is_empty() {
            cleaned.push(' ');
        }
        pending_space = false;
        if FORBIDDEN.contains(&c) || c.is_control() {
            cleaned.push('_');
        } else {
            cleaned.push(c);
        }
    }

    let trimmed = cleaned.trim_matches(is_trimmed);
    let truncated: String = trimmed.chars().take(MAX_NAME_LEN).collect();
    let name = truncated.trim_end_matches(is_trimmed);

    if name.is_empty() {
        return FALLBACK_NAME.to_owned();
    }

    let stem = name.split('.').next().unwrap_or(name);
    if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem)) {
        return format!("{stem}_{}", &name[stem.len()..]);
    }

    name.to_owned()
}

fn is_trimmed(c: char) -> bool {
    c == '.' || c == ' '
}

/// Escape a file or directory name for use inside a relative href.
pub(crate) fn href_segment(name: &str) -> String {
    utf8_percent_encode(name, HREF_SEGMENT).to_string()
}

/// Hands out unique names within one directory.
///
/// Names are compared case-insensitively so the result is safe on
/// case-insensitive filesystems. A clash is resolved by appending the page
/// id, which is unique within a space.
#[derive(Debug)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Create an allocator with `reserved` names already taken.
    #[must_use]
    pub fn with_reserved(reserved: &[&str]) -> Self {
        Self {
            taken: reserved.iter().map(|name| name.to_lowercase()).collect(),
        }
    }

    /// Allocate a name for a page.
    pub fn allocate(&mut self, title: &str, page_id: &PageId) -> String {
        let base = sanitize_filename(title);
        if self.claim(&base) {
            return base;
        }

        let id = sanitize_filename(page_id.as_str());
        let with_id = format!("{base} ({id})");
        if self.claim(&with_id) {
            return with_id;
        }

        // Only reachable when another title already looks like "<base> (<id>)".
        let mut n = 2;
        loop {
            let candidate = format!("{base} ({id}-{n})");
            if self.claim(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn claim(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_lowercase())
    }
}
