use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort a build before any output is written.
///
/// Malformed metadata fences and stray emphasis markers are deliberately absent:
/// those degrade to literal text instead of failing.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("No chapter_*.md files found in {}", directory.display())]
    NoChaptersFound { directory: PathBuf },

    #[error("Unsupported language '{code}'. Supported languages: {}", supported.join(", "))]
    UnsupportedLanguage { code: String, supported: Vec<String> },

    #[error("Cover image not found: {}", .0.display())]
    CoverNotFound(PathBuf),

    #[error("EPUB cover image not found: {}", .0.display())]
    EpubCoverNotFound(PathBuf),

    #[error("No serif font available. Searched: {}", searched.join(", "))]
    NoSerifFontAvailable { searched: Vec<String> },
}
