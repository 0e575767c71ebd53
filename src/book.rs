//! The build pipeline.
//!
//! Everything that can fail for a reason the user can fix (language, covers, chapters,
//! fonts) is checked before rendering starts, and nothing is written until every output
//! has rendered. A failed build therefore never leaves a new or truncated file behind.

use crate::config::BuildOptions;
use crate::document::{assemble, CoverArt};
use crate::error::BookError;
use crate::language;
use crate::sinks::pdf::{FontProvider, PDF};
use crate::sinks::{self, EpubPackager, PdfRenderer, Render};
use crate::source;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What a successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub chapter_files: Vec<String>,
    pub front_matter: bool,
    pub outputs: Vec<PathBuf>,
}

pub fn build(
    options: &BuildOptions,
    pdf: PDF,
    fonts: &dyn FontProvider,
    progress: &ProgressBar,
) -> Result<BuildReport> {
    let heading_word = language::heading_word(Some(options.language()))?;

    let cover = options
        .cover()
        .map(|path| read_cover(path, BookError::CoverNotFound))
        .transpose()?;
    // only a cover of its own overrides the book's cover in the EPUB
    let epub_cover = match (options.epub_cover(), options.cover()) {
        (Some(epub), Some(main)) if epub == main => None,
        (Some(epub), _) => Some(read_cover(epub, BookError::EpubCoverNotFound)?),
        (None, _) => None,
    };

    progress.set_message("Reading chapters...");
    let manuscript = source::load(
        options.directory(),
        heading_word,
        options.front_matter(),
        progress,
    )?;

    let family = fonts.family().with_context(|| "Failed to load fonts")?;

    let tree = assemble(&manuscript, cover, options, heading_word, pdf.page_size());

    let pdf = PdfRenderer::new(pdf, family);
    let epub = EpubPackager::new(epub_cover);
    let mut renderers: Vec<&dyn Render> = vec![&pdf];
    if options.epub() {
        renderers.push(&epub);
    }

    progress.set_message("Rendering...");
    // the renderers report no progress of their own
    progress.enable_steady_tick(Duration::from_millis(100));
    let outputs = sinks::render_all(&renderers, &tree);
    progress.disable_steady_tick();
    let outputs = outputs?;

    let files: Vec<(PathBuf, &[u8])> = outputs
        .iter()
        .map(|output| (options.output_path(output.extension), output.bytes.as_slice()))
        .collect();
    let written = sinks::write_atomically(&files)?;

    Ok(BuildReport {
        chapter_files: manuscript
            .chapters
            .iter()
            .map(|chapter| chapter.file_name.clone())
            .collect(),
        front_matter: manuscript.front_matter.is_some(),
        outputs: written,
    })
}

fn read_cover(path: &Path, missing: fn(PathBuf) -> BookError) -> Result<CoverArt> {
    if !path.is_file() {
        return Err(missing(path.to_path_buf()).into());
    }
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read cover image: {}", path.display()))?;
    Ok(CoverArt::new(bytes))
}
