//! EPUB rendering orchestration.
//!
//! The content tree is first split into [`Unit`]s, one XHTML document each, in reading
//! order: cover, title page, table of contents, front matter, then every chapter. The units
//! are then handed to `epub-builder`, which takes care of the packaging requirements (OPF
//! manifest, navigation documents, ZIP structure with the uncompressed MIME type first).

mod chapter;
mod cover;
mod title_page;
mod toc;

use super::styles::{self, STYLESHEET_HREF};
use super::EpubPackager;
use crate::sinks::Render;
use crate::document::{Block, ContentNode, ContentTree, CoverArt, Section};
use anyhow::{anyhow, Context, Result};
use epub_builder::{EpubBuilder, EpubContent, EpubVersion, ReferenceType, ZipLibrary};

/// File name of the cover image inside the package, without extension.
const COVER_IMAGE_NAME: &str = "cover";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Cover,
    TitlePage,
    Toc,
    FrontMatter,
    Chapter,
}

/// One XHTML document of the book.
#[derive(Debug, Clone, PartialEq)]
struct Unit {
    kind: UnitKind,
    href: String,
    title: String,
    html: String,
}

impl Render for EpubPackager {
    fn extension(&self) -> &'static str {
        "epub"
    }

    fn render(&self, tree: &ContentTree) -> Result<Vec<u8>> {
        let zip = ZipLibrary::new()
            .map_err(epub_err)
            .with_context(|| "Failed to create ZIP library for EPUB")?;
        let mut builder = EpubBuilder::new(zip)
            .map_err(epub_err)
            .with_context(|| "Failed to build builder")?;
        builder.epub_version(EpubVersion::V30);

        let title = tree.title.clone().unwrap_or_else(|| "Untitled".to_string());
        builder
            .metadata("title", &title)
            .map_err(epub_err)
            .with_context(|| "Failed to set title metadata")?;
        if let Some(author) = &tree.author {
            builder
                .metadata("author", author)
                .map_err(epub_err)
                .with_context(|| format!("Failed to add author metadata for author: {author}"))?;
        }
        builder
            .metadata("generator", "bindery")
            .map_err(epub_err)
            .with_context(|| "Failed to set generator metadata")?;
        builder
            .metadata("lang", &tree.language)
            .map_err(epub_err)
            .with_context(|| "Failed to set language metadata")?;

        builder
            .stylesheet(styles::generate_stylesheet().as_bytes())
            .map_err(epub_err)
            .with_context(|| "Failed to add stylesheet")?;

        let cover = self.cover_art(tree);
        let cover_image = cover.and_then(|art| match art.format {
            Some(format) => Some((
                format!("{COVER_IMAGE_NAME}.{}", format.extension()),
                art,
                format.mime_type(),
            )),
            None => {
                log::warn!("cover image is neither PNG nor JPEG, leaving it out of the EPUB");
                None
            }
        });
        if let Some((file_name, art, mime)) = &cover_image {
            builder
                .add_cover_image(file_name, art.bytes.as_slice(), *mime)
                .map_err(epub_err)
                .with_context(|| "Failed to add cover image to EPUB")?;
        }

        let cover_file = cover_image.as_ref().map(|(file_name, _, _)| file_name.as_str());
        for unit in units(tree, cover_file) {
            let mut content = EpubContent::new(&unit.href, unit.html.as_bytes()).title(&unit.title);
            if let Some(reftype) = reference_type(unit.kind, &unit.href) {
                content = content.reftype(reftype);
            }
            builder
                .add_content(content)
                .map_err(epub_err)
                .with_context(|| format!("Failed to add {} to EPUB", unit.href))?;
        }

        let mut bytes = Vec::new();
        builder
            .generate(&mut bytes)
            .map_err(epub_err)
            .with_context(|| "Failed to generate EPUB file")?;
        log::info!("packaged EPUB ({} bytes)", bytes.len());
        Ok(bytes)
    }
}

impl EpubPackager {
    /// Titles of the front matter and chapter documents, in spine order.
    #[cfg(test)]
    pub(crate) fn navigation(&self, tree: &ContentTree) -> Vec<String> {
        units(tree, None)
            .into_iter()
            .filter(|unit| matches!(unit.kind, UnitKind::FrontMatter | UnitKind::Chapter))
            .map(|unit| unit.title)
            .collect()
    }

    /// The EPUB's own cover if it has one, otherwise the book's.
    fn cover_art<'a>(&'a self, tree: &'a ContentTree) -> Option<&'a CoverArt> {
        self.cover.as_ref().or_else(|| {
            tree.blocks.iter().find_map(|block| match &block.node {
                ContentNode::CoverImage { art, .. } => Some(art),
                _ => None,
            })
        })
    }
}

/// `epub-builder` reports through `eyre`, whose report is not a `std::error::Error`.
fn epub_err(e: eyre::Report) -> anyhow::Error {
    anyhow!("{e:#}")
}

fn reference_type(kind: UnitKind, href: &str) -> Option<ReferenceType> {
    match kind {
        UnitKind::Cover => Some(ReferenceType::Cover),
        UnitKind::TitlePage => Some(ReferenceType::TitlePage),
        UnitKind::Toc => Some(ReferenceType::Toc),
        // reading starts at the first chapter
        UnitKind::Chapter if href == chapter_href(0) => Some(ReferenceType::Text),
        UnitKind::Chapter | UnitKind::FrontMatter => None,
    }
}

fn chapter_href(index: usize) -> String {
    format!("chapter_{:03}.xhtml", index + 1)
}

const FRONT_MATTER_HREF: &str = "front_matter.xhtml";

/// Split the tree into documents in reading order.
///
/// Every chapter gets a document even if it came out empty, so navigation always has one
/// entry per chapter file.
fn units(tree: &ContentTree, cover_file: Option<&str>) -> Vec<Unit> {
    let sections = tree.sections();
    let blocks_of = |wanted: Section| -> Option<&[Block]> {
        sections
            .iter()
            .find(|(section, _)| *section == wanted)
            .map(|(_, blocks)| *blocks)
    };
    let lang = tree.language.as_str();
    let mut units = Vec::new();

    if let Some(file_name) = cover_file {
        units.push(Unit {
            kind: UnitKind::Cover,
            href: "cover.xhtml".to_string(),
            title: "Cover".to_string(),
            html: cover::render(file_name, tree.title.as_deref(), lang),
        });
    }

    if blocks_of(Section::TitlePage).is_some() {
        units.push(Unit {
            kind: UnitKind::TitlePage,
            href: "title.xhtml".to_string(),
            title: tree.section_title(Section::TitlePage),
            html: title_page::render(tree.title.as_deref(), tree.author.as_deref(), lang),
        });
    }

    let mut contents = Vec::new();
    let mut body = Vec::new();
    if let Some(blocks) = blocks_of(Section::FrontMatter) {
        let title = tree.section_title(Section::FrontMatter);
        contents.push((FRONT_MATTER_HREF.to_string(), title.clone()));
        body.push(Unit {
            kind: UnitKind::FrontMatter,
            href: FRONT_MATTER_HREF.to_string(),
            html: chapter::render(blocks, &title, lang),
            title,
        });
    }
    for index in 0..tree.chapter_count {
        let section = Section::Chapter(index);
        let title = tree.section_title(section);
        let href = chapter_href(index);
        contents.push((href.clone(), title.clone()));
        body.push(Unit {
            kind: UnitKind::Chapter,
            html: chapter::render(blocks_of(section).unwrap_or(&[]), &title, lang),
            href,
            title,
        });
    }

    units.push(Unit {
        kind: UnitKind::Toc,
        href: "toc.xhtml".to_string(),
        title: "Table of Contents".to_string(),
        html: toc::render(&contents, tree.title.as_deref(), lang),
    });
    units.extend(body);
    units
}

/// Wrap a body in an XHTML document linked to the stylesheet.
fn xhtml(title: &str, lang: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{lang}" lang="{lang}">
<head>
    <meta charset="UTF-8"/>
    <title>{title}</title>
    <link rel="stylesheet" type="text/css" href="{STYLESHEET_HREF}"/>
</head>
<body>
{body}
</body>
</html>"#,
        lang = html_escape::encode_double_quoted_attribute(lang),
        title = html_escape::encode_text(title),
    )
}
