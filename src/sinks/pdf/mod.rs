//! Paginated PDF output.
//!
//! Rendering happens in two passes. [`rendering::paginate`] lays the content tree out into
//! positioned text and images page by page, then [`writer::write`] serialises those pages
//! with the font family embedded.

mod config;
mod fonts;
mod layout;
mod rendering;
mod writer;

pub use config::PDF;
pub use fonts::{FontFamily, FontProvider, SystemFonts};

#[cfg(test)]
pub(crate) use fonts::testing;

use super::Render;
use crate::document::{ContentNode, ContentTree};
use anyhow::{Context, Result};

pub struct PdfRenderer {
    config: PDF,
    fonts: FontFamily,
}

impl PdfRenderer {
    pub fn new(config: PDF, fonts: FontFamily) -> PdfRenderer {
        PdfRenderer { config, fonts }
    }

    /// Bookmark titles of the laid-out book, in page order.
    #[cfg(test)]
    pub(crate) fn outline(&self, tree: &ContentTree) -> Vec<String> {
        rendering::paginate(&self.config, &self.fonts, tree)
            .bookmarks
            .into_iter()
            .map(|bookmark| bookmark.title)
            .collect()
    }
}

impl Render for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, tree: &ContentTree) -> Result<Vec<u8>> {
        let pagination = rendering::paginate(&self.config, &self.fonts, tree);
        let cover = tree.blocks.iter().find_map(|block| match &block.node {
            ContentNode::CoverImage { art, .. } => Some(art),
            _ => None,
        });
        writer::write(
            &pagination,
            &self.fonts,
            tree,
            cover,
            self.config.page_size(),
        )
        .with_context(|| "Failed to write PDF")
    }
}

impl std::fmt::Debug for PdfRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfRenderer")
            .field("config", &self.config)
            .field("font", &self.fonts.regular.name())
            .finish()
    }
}
