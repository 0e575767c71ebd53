//! Localised chapter headings.
//!
//! Chapter files conventionally open with `# Chapter 1`. When the book is built for another
//! language, the leading `Chapter` is swapped for that language's word so the body text can
//! stay exactly as the author wrote it. Only the heading word is localised; nothing else in
//! the manuscript is translated.

use crate::error::BookError;

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// The placeholder word recognised at the start of a level-1 heading.
pub const HEADING_PLACEHOLDER: &str = "Chapter";

/// Language code to the word for "Chapter", sorted by code.
const HEADING_WORDS: &[(&str, &str)] = &[
    ("ar", "الفصل"),
    ("bg", "Глава"),
    ("ca", "Capítol"),
    ("cs", "Kapitola"),
    ("cy", "Pennod"),
    ("da", "Kapitel"),
    ("de", "Kapitel"),
    ("el", "Κεφάλαιο"),
    ("en", "Chapter"),
    ("eo", "Ĉapitro"),
    ("es", "Capítulo"),
    ("et", "Peatükk"),
    ("eu", "Kapitulua"),
    ("fi", "Luku"),
    ("fr", "Chapitre"),
    ("ga", "Caibidil"),
    ("he", "פרק"),
    ("hi", "अध्याय"),
    ("hr", "Poglavlje"),
    ("hu", "Fejezet"),
    ("id", "Bab"),
    ("is", "Kafli"),
    ("it", "Capitolo"),
    ("ja", "章"),
    ("ko", "장"),
    ("la", "Caput"),
    ("lt", "Skyrius"),
    ("lv", "Nodaļa"),
    ("nl", "Hoofdstuk"),
    ("no", "Kapittel"),
    ("pl", "Rozdział"),
    ("pt", "Capítulo"),
    ("ro", "Capitolul"),
    ("ru", "Глава"),
    ("sk", "Kapitola"),
    ("sl", "Poglavje"),
    ("sr", "Поглавље"),
    ("sv", "Kapitel"),
    ("tr", "Bölüm"),
    ("uk", "Розділ"),
    ("vi", "Chương"),
    ("zh", "章"),
];

/// All supported language codes, in sorted order.
pub fn supported_languages() -> Vec<String> {
    HEADING_WORDS
        .iter()
        .map(|(code, _)| code.to_string())
        .collect()
}

/// Look up the word for "Chapter" in the given language.
///
/// Codes are matched case-insensitively; `None` selects [`DEFAULT_LANGUAGE`].
pub fn heading_word(code: Option<&str>) -> Result<&'static str, BookError> {
    let code = code.unwrap_or(DEFAULT_LANGUAGE).trim();
    HEADING_WORDS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, word)| *word)
        .ok_or_else(|| BookError::UnsupportedLanguage {
            code: code.to_string(),
            supported: supported_languages(),
        })
}
