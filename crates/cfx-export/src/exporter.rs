//! Offline mirror writer.

use std::fs;
use std::path::{Path, PathBuf};

use cfx_tree::{NodeId, PageId, PageTree};
use tracing::{info, warn};

use crate::error::ExportError;
use crate::images::{IMAGES_DIR, rewrite_images};
use crate::sanitize::{NameAllocator, href_segment};
use crate::source::PageContent;
use crate::template::{
    BreadcrumbData, IndexData, IndexEntryData, PageData, render_index, render_page,
};

/// Name of the index file at the root of the mirror.
pub const INDEX_FILE: &str = "index.html";

/// Settings for one export run.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Root directory of the mirror. Created if missing.
    pub output_dir: PathBuf,
    /// Download same-host images and point pages at the local copies.
    pub download_images: bool,
    /// Title of the index page, usually the space key.
    pub title: String,
}

/// Outcome of a successful export.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages written.
    pub pages: usize,
    /// Images downloaded.
    pub images: usize,
    /// Problems that did not stop the export.
    pub warnings: Vec<String>,
}

/// Writes a [`PageTree`] to disk as linked HTML files.
///
/// Layout:
///
/// ```text
/// <output_dir>/index.html
/// <output_dir>/<Title>/<Title>.html
/// <output_dir>/<Title>/images/<file>
/// ```
pub struct Exporter<'a, C> {
    content: &'a C,
    options: ExportOptions,
}

impl<'a, C: PageContent> Exporter<'a, C> {
    /// Create an exporter reading pages from `content`.
    #[must_use]
    pub fn new(content: &'a C, options: ExportOptions) -> Self {
        Self { content, options }
    }

    /// Export every page reachable from the roots of `tree`.
    ///
    /// Pages are fetched one at a time in depth-first order. Image download
    /// failures become warnings; fetch and write failures abort.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Fetch`] naming the page whose body could not be
    /// fetched, or [`ExportError::Io`] if the mirror cannot be written.
    pub fn export(&self, tree: &PageTree) -> Result<ExportSummary, ExportError> {
        let out = &self.options.output_dir;
        create_dir(out)?;

        let order: Vec<(usize, NodeId)> = tree.walk().collect();
        let names = allocate_names(tree, &order);
        let name_of = |id: NodeId| names[id.index()].as_deref().unwrap_or_default();

        let mut summary = ExportSummary::default();
        if tree.unreachable() > 0 {
            let message = format!(
                "{} pages are not reachable from any root and were skipped",
                tree.unreachable()
            );
            warn!("{}", message);
            summary.warnings.push(message);
        }

        for (position, &(_, id)) in order.iter().enumerate() {
            let node = tree.node(id);
            let dir_name = name_of(id);
            info!(
                "Exporting page {} ({}/{}): {}",
                node.id,
                position + 1,
                order.len(),
                node.title
            );

            let body = self
                .content
                .page_body(&node.id)
                .map_err(|e| ExportError::Fetch {
                    page_id: node.id.clone(),
                    source: Box::new(e),
                })?;

            let page_dir = out.join(dir_name);
            create_dir(&page_dir)?;

            let html = if self.options.download_images {
                self.localize_images(&node.id, &body.html, &page_dir, &mut summary)?
            } else {
                body.html
            };

            let breadcrumbs = tree
                .ancestors(id)
                .into_iter()
                .map(|ancestor| BreadcrumbData {
                    title: tree.node(ancestor).title.clone(),
                    path: format!("../{}", page_href(name_of(ancestor))),
                })
                .collect();

            let rendered = render_page(&PageData {
                title: node.title.clone(),
                html_content: html,
                breadcrumbs,
                index_path: format!("../{INDEX_FILE}"),
                source_url: body.web_url,
                version: body.version,
                updated: body.updated,
            });
            write_file(&page_dir.join(format!("{dir_name}.html")), rendered.as_bytes())?;
            summary.pages += 1;
        }

        let entries = order
            .iter()
            .map(|&(depth, id)| IndexEntryData {
                depth,
                title: tree.node(id).title.clone(),
                path: page_href(name_of(id)),
            })
            .collect();
        let index = render_index(&IndexData {
            title: self.options.title.clone(),
            entries,
        });
        write_file(&out.join(INDEX_FILE), index.as_bytes())?;

        info!(
            pages = summary.pages,
            images = summary.images,
            warnings = summary.warnings.len(),
            "Export finished"
        );
        Ok(summary)
    }

    /// Download the page's images and return HTML pointing at them.
    fn localize_images(
        &self,
        page_id: &PageId,
        html: &str,
        page_dir: &Path,
        summary: &mut ExportSummary,
    ) -> Result<String, ExportError> {
        let rewritten = rewrite_images(html, self.content.base_url());
        if rewritten.images.is_empty() {
            return Ok(rewritten.html);
        }

        let images_dir = page_dir.join(IMAGES_DIR);
        create_dir(&images_dir)?;

        for image in &rewritten.images {
            match self.content.download(&image.url) {
                Ok(bytes) => {
                    write_file(&images_dir.join(&image.file_name), &bytes)?;
                    summary.images += 1;
                }
                Err(e) => {
                    let message =
                        format!("page {page_id}: failed to download {}: {e}", image.url);
                    warn!("{}", message);
                    summary.warnings.push(message);
                }
            }
        }

        Ok(rewritten.html)
    }
}

/// Directory name per node, indexed by [`NodeId::index`].
///
/// Names are allocated in traversal order so earlier pages keep the plain
/// title on a clash. Unreachable nodes get no name.
fn allocate_names(tree: &PageTree, order: &[(usize, NodeId)]) -> Vec<Option<String>> {
    let mut allocator = NameAllocator::with_reserved(&[INDEX_FILE]);
    let mut names = vec![None; tree.len()];
    for &(_, id) in order {
        let node = tree.node(id);
        names[id.index()] = Some(allocator.allocate(&node.title, &node.id));
    }
    names
}

/// Href of a page relative to the mirror root.
fn page_href(dir_name: &str) -> String {
    let segment = href_segment(dir_name);
    format!("{segment}/{segment}.html")
}

fn create_dir(path: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
