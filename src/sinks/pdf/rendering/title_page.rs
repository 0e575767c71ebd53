//! Title page rendering.
//!
//! The title (bold, title size) and the author (italic, subheading size) are stacked and
//! the block as a whole is centred vertically on its page. Either may be missing. Long
//! titles wrap, each line centred.

use super::Pager;
use crate::sinks::pdf::fonts::FontStyle;
use crate::sinks::pdf::layout;

pub fn render(pager: &mut Pager<'_>, title: Option<&str>, author: Option<&str>) {
    let config = pager.config;
    let title_size = config.font_size_title_pt;
    let author_size = config.font_size_subheading_pt;
    let gap = config.line_height(config.font_size_body_pt) * 2.0;

    pager.room(0.0);
    let title_lines = title.map_or(0, |t| line_count(pager, t, FontStyle::Bold, title_size));
    let author_lines = author.map_or(0, |a| line_count(pager, a, FontStyle::Italic, author_size));

    let mut height = title_lines as f32 * config.line_height(title_size)
        + author_lines as f32 * config.line_height(author_size);
    if title_lines > 0 && author_lines > 0 {
        height += gap;
    }

    let content = pager.content_box();
    let middle = (content.y1 + content.y2) / 2.0;
    pager.set_cursor((middle + height / 2.0).min(content.y2));

    if let Some(title) = title {
        pager.centred_text(title, FontStyle::Bold, title_size);
    }
    if title.is_some() && author.is_some() {
        pager.skip(gap);
    }
    if let Some(author) = author {
        pager.centred_text(author, FontStyle::Italic, author_size);
    }
}

fn line_count(pager: &Pager<'_>, text: &str, style: FontStyle, size: f32) -> usize {
    let words = layout::styled_words(text, style, pager.fonts, size);
    let space = pager.fonts.face(style).measure(" ", size);
    let width = pager.content_box().width();
    layout::break_lines(&words, width, width, space).len()
}

#[cfg(test)]
mod tests {
    use super::super::{paginate, Item};
    use crate::config::BuildOptionsBuilder;
    use crate::document::assemble;
    use crate::sinks::pdf::fonts::testing::fixed_family;
    use crate::sinks::pdf::PDF;
    use crate::source::{parse_chapter, Chapter, Manuscript};

    #[test]
    fn title_block_is_vertically_centred() {
        let options = BuildOptionsBuilder::default()
            .directory("book")
            .title("Title")
            .author("Author")
            .build()
            .unwrap();
        let manuscript = Manuscript {
            chapters: vec![Chapter::new("chapter_1.md", parse_chapter("Text.", None))],
            front_matter: None,
        };
        let config = PDF::default();
        let tree = assemble(&manuscript, None, &options, "Chapter", config.page_size());
        let pagination = paginate(&config, &fixed_family(), &tree);

        let runs: Vec<_> = pagination.pages[0]
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Text(run) => Some(run),
                _ => None,
            })
            .collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Title");
        assert_eq!(runs[1].text, "Author");

        let content = config.content_box(0);
        let middle = (content.y1 + content.y2) / 2.0;
        assert!(runs[0].y > middle);
        assert!(runs[1].y < middle);
    }
}
