//! Table of contents rendering for EPUB.
//!
//! Generates a navigable contents page listing the front matter and every chapter. This
//! complements the EPUB's built-in navigation document with a human-readable page that
//! readers can browse.

use super::xhtml;

/// Render the contents page from `(href, title)` entries in reading order.
pub fn render(entries: &[(String, String)], book_title: Option<&str>, lang: &str) -> String {
    let items = entries
        .iter()
        .map(|(href, title)| {
            format!(
                r#"<li><a href="{}">{}</a></li>"#,
                html_escape::encode_double_quoted_attribute(href),
                html_escape::encode_text(title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let title = match book_title {
        Some(book) => format!("Table of Contents - {book}"),
        None => "Table of Contents".to_string(),
    };
    let body = format!(
        r#"<nav class="toc">
<h2>Table of Contents</h2>
<ol>
{items}
</ol>
</nav>"#
    );
    xhtml(&title, lang, &body)
}
