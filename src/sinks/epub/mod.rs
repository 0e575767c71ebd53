//! EPUB generation.
//!
//! Converts the content tree into a reflowable EPUB 3 book with:
//! - Cover page and cover image (if a cover is configured)
//! - Title page (if a title or author is configured)
//! - Table of contents page
//! - Front matter (if present)
//! - One document per chapter
//!
//! Reading systems paginate for themselves, so the tree's page breaks only survive as the
//! document boundaries and a `break-before` class for stylesheets that care.

mod rendering;
mod styles;

use crate::document::CoverArt;

/// Packages a content tree as an EPUB.
#[derive(Debug, Default)]
pub struct EpubPackager {
    /// Replaces the tree's cover in the EPUB only
    cover: Option<CoverArt>,
}

impl EpubPackager {
    pub fn new(cover: Option<CoverArt>) -> EpubPackager {
        EpubPackager { cover }
    }
}
