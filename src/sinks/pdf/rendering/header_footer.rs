//! Page number footers.
//!
//! Numbers are centred below the content box on every page after the unnumbered leading
//! pages (cover and title page). Numbering still counts those pages, so the first numbered
//! page of a book with a cover and a title page shows `3`.

use super::{Item, PageLayout, TextRun};
use crate::sinks::pdf::config::PDF;
use crate::sinks::pdf::fonts::{FontFamily, FontStyle};

pub fn render_page_numbers(
    config: &PDF,
    fonts: &FontFamily,
    pages: &mut [PageLayout],
    unnumbered: usize,
) {
    let size = config.font_size_small_pt;
    let face = fonts.face(FontStyle::Regular);

    for (index, page) in pages.iter_mut().enumerate() {
        let n = index + 1;
        if n <= unnumbered {
            continue;
        }
        let text = n.to_string();
        let content = config.content_box(index);
        let width = face.measure(&text, size);
        page.items.push(Item::Text(TextRun {
            x: content.x1 + (content.width() - width) / 2.0,
            y: config.footer_baseline(),
            size,
            style: FontStyle::Regular,
            text,
        }));
    }
}
