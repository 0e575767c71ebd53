//! Chapter body rendering: headings, subtitles, scene breaks and paragraphs.

use super::Pager;
use crate::sinks::pdf::fonts::FontStyle;
use crate::sinks::pdf::layout;
use crate::source::TextSpan;

/// Centred glyphs marking a scene break.
const SCENE_BREAK: &str = "*   *   *";

/// A heading that opens a page drops down to leave white space above it; one that lands
/// mid-page gets a blank line before it instead.
pub fn render_heading(pager: &mut Pager<'_>, text: &str) {
    let config = pager.config;
    let at_top = pager.at_page_top();
    pager.room(0.0);
    if at_top {
        pager.skip(config.chapter_drop());
    } else {
        pager.skip(config.line_height(config.font_size_body_pt));
    }
    pager.centred_text(text, FontStyle::Bold, config.font_size_heading_pt);
    pager.skip(config.line_height(config.font_size_body_pt));
}

pub fn render_subtitle(pager: &mut Pager<'_>, text: &str) {
    let config = pager.config;
    pager.centred_text(text, FontStyle::Italic, config.font_size_subheading_pt);
    pager.skip(config.line_height(config.font_size_body_pt));
}

pub fn render_scene_break(pager: &mut Pager<'_>) {
    let config = pager.config;
    let half_line = config.line_height(config.font_size_body_pt) / 2.0;
    if !pager.at_page_top() {
        pager.skip(half_line);
    }
    pager.centred_text(SCENE_BREAK, FontStyle::Regular, config.font_size_body_pt);
    pager.skip(half_line);
}

/// Justified body text. The last line is left ragged and an indented paragraph's first line
/// starts one indent in.
pub fn render_paragraph(pager: &mut Pager<'_>, spans: &[TextSpan], indented: bool) {
    let config = pager.config;
    let size = config.font_size_body_pt;
    let line_height = config.line_height(size);
    let space = pager.fonts.face(FontStyle::Regular).measure(" ", size);
    let indent = if indented {
        config.paragraph_indent_em * size
    } else {
        0.0
    };

    let words = layout::words(spans, pager.fonts, size);
    let width = pager.content_box().width();
    let lines = layout::break_lines(&words, width - indent, width, space);
    let last = lines.len().saturating_sub(1);

    for (i, range) in lines.into_iter().enumerate() {
        pager.room(line_height);
        let content = pager.content_box();
        let baseline = pager.line(line_height);
        let lead = if i == 0 { indent } else { 0.0 };
        let line = &words[range];
        let offsets = layout::word_offsets(line, width - lead, space, i == last);
        pager.place_words(line, &offsets, content.x1 + lead, baseline, size);
    }
}
