//! Cover page rendering for EPUB.
//!
//! The cover page shows nothing but the cover image. It is marked with EPUB's cover
//! reference type so e-readers display it appropriately in library views.

use super::xhtml;

pub fn render(image_file: &str, title: Option<&str>, lang: &str) -> String {
    let alt = title.unwrap_or("Cover");
    let body = format!(
        r#"<div class="cover">
<img src="{}" alt="{}"/>
</div>"#,
        html_escape::encode_double_quoted_attribute(image_file),
        html_escape::encode_double_quoted_attribute(alt),
    );
    xhtml("Cover", lang, &body)
}
