//! Reading a manuscript folder.
//!
//! A manuscript is a directory of `chapter_*.md` files plus an optional `front_matter.md`.
//! Chapters are bound in file name order. That order is lexicographic, so `chapter_10.md`
//! sorts before `chapter_9.md`; authors zero-pad their chapter numbers to get the order they
//! want, and changing the sort would silently reorder their books.

mod inline;
mod normalizer;

pub use inline::{parse_inline, typographic_substitutions, TextSpan};
pub use normalizer::parse_chapter;

use crate::error::BookError;
use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// File name pattern for chapter files.
pub const CHAPTER_GLOB: &str = "chapter_*.md";

/// File name of the optional front matter.
pub const FRONT_MATTER_FILE: &str = "front_matter.md";

/// One structural element of a chapter, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterElement {
    Heading(String),
    Subtitle(String),
    SceneBreak,
    Paragraph(String),
}

/// A parsed chapter (or the front matter, which has the same shape).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chapter {
    /// The file this chapter was read from, for diagnostics
    pub file_name: String,
    pub elements: Vec<ChapterElement>,
}

impl Chapter {
    pub fn new<S: ToString>(file_name: S, elements: Vec<ChapterElement>) -> Chapter {
        Chapter {
            file_name: file_name.to_string(),
            elements,
        }
    }

    /// The first heading's text, if the chapter has one.
    pub fn heading(&self) -> Option<&str> {
        self.elements.iter().find_map(|element| match element {
            ChapterElement::Heading(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Everything read from the manuscript folder.
#[derive(Debug, Clone, Default)]
pub struct Manuscript {
    pub chapters: Vec<Chapter>,
    pub front_matter: Option<Chapter>,
}

fn chapter_matcher() -> Result<GlobMatcher> {
    Ok(Glob::new(CHAPTER_GLOB)
        .with_context(|| format!("Failed to compile chapter pattern {CHAPTER_GLOB}"))?
        .compile_matcher())
}

/// List chapter files in `directory`, sorted by file name.
pub fn chapter_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let matcher = chapter_matcher()?;

    let mut files = Vec::new();
    let entries = std::fs::read_dir(directory)
        .with_context(|| format!("Failed to read directory {}", directory.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to list directory {}", directory.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name() {
            if matcher.is_match(name) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(BookError::NoChaptersFound {
            directory: directory.to_path_buf(),
        }
        .into());
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn read_chapter(path: &Path, heading_word: &str) -> Result<Chapter> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} as UTF-8 text", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let chapter = Chapter::new(file_name, parse_chapter(&text, Some(heading_word)));
    log::debug!(
        "{}: {} elements, heading {:?}",
        chapter.file_name,
        chapter.elements.len(),
        chapter.heading()
    );
    Ok(chapter)
}

/// Read and parse every chapter, plus the front matter when wanted and present.
pub fn load(
    directory: &Path,
    heading_word: &str,
    include_front_matter: bool,
    progress: &ProgressBar,
) -> Result<Manuscript> {
    let files = chapter_files(directory)?;
    progress.set_length(files.len() as u64);

    let mut chapters = Vec::with_capacity(files.len());
    for file in files.iter() {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        progress.set_message(name);
        chapters.push(read_chapter(file, heading_word)?);
        progress.inc(1);
    }

    let front_matter_path = directory.join(FRONT_MATTER_FILE);
    let front_matter = if include_front_matter && front_matter_path.is_file() {
        Some(read_chapter(&front_matter_path, heading_word)?)
    } else {
        None
    };

    log::info!(
        "read {} chapters{}",
        chapters.len(),
        if front_matter.is_some() {
            " and front matter"
        } else {
            ""
        }
    );

    Ok(Manuscript {
        chapters,
        front_matter,
    })
}
