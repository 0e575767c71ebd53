//! Pagination.
//!
//! Walks the content tree and places every block on pages, producing a [`Pagination`]: the
//! positioned text and images of each page plus one bookmark per navigable section. Nothing
//! here touches PDF objects; [`crate::sinks::pdf::writer`] turns the result into a file.
//!
//! ## Page breaks
//!
//! Breaks are lazy. A forced break only marks the current page closed; the next piece of
//! content opens a fresh one. Consecutive breaks therefore collapse and a break on an empty
//! page does nothing, so the book never contains blank pages.
//!
//! ## Coordinates
//!
//! Everything is in points with the origin at the bottom-left of the page, as PDF has it.
//! The pager keeps a cursor at the top of the next line and moves it down as content is
//! placed.

mod chapter;
mod cover;
mod header_footer;
mod title_page;

use crate::document::{ContentNode, ContentTree, Section};
use crate::sinks::pdf::config::{ContentBox, PDF};
use crate::sinks::pdf::fonts::{FontFamily, FontStyle};
use crate::sinks::pdf::layout::{self, Word};

/// Where within a line's height its baseline sits, measured from the top.
const BASELINE_RATIO: f32 = 0.78;

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text(TextRun),
    /// The cover image, stretched over the given rectangle
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub title: String,
    pub page_index: usize,
    /// Top of the bookmarked content
    pub top: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    pub pages: Vec<PageLayout>,
    pub bookmarks: Vec<Bookmark>,
}

/// Lay out the whole book.
pub fn paginate(config: &PDF, fonts: &FontFamily, tree: &ContentTree) -> Pagination {
    let mut pager = Pager::new(config, fonts);

    for (section, blocks) in tree.sections() {
        if matches!(section, Section::FrontMatter | Section::Chapter(_)) {
            pager.bookmark(tree.section_title(section));
        }

        for block in blocks {
            if block.page_break_before {
                pager.break_page();
            }
            match &block.node {
                ContentNode::CoverImage { placement, .. } => cover::render(&mut pager, placement),
                ContentNode::TitleBlock { title, author } => {
                    title_page::render(&mut pager, title.as_deref(), author.as_deref())
                }
                ContentNode::HeadingBlock { text, .. } => chapter::render_heading(&mut pager, text),
                ContentNode::SubtitleBlock { text } => chapter::render_subtitle(&mut pager, text),
                ContentNode::SceneBreakBlock => chapter::render_scene_break(&mut pager),
                ContentNode::ParagraphBlock { spans, indented } => {
                    chapter::render_paragraph(&mut pager, spans, *indented)
                }
            }
            if block.page_break_after {
                pager.break_page();
            }
        }
    }

    let mut pagination = pager.finish();
    header_footer::render_page_numbers(
        config,
        fonts,
        &mut pagination.pages,
        tree.front_matter_page_count,
    );
    log::info!(
        "laid out {} pages with {} bookmarks",
        pagination.pages.len(),
        pagination.bookmarks.len()
    );
    pagination
}

/// Places content on pages top to bottom.
pub(crate) struct Pager<'a> {
    pub config: &'a PDF,
    pub fonts: &'a FontFamily,
    pages: Vec<PageLayout>,
    cursor: f32,
    /// The current page is closed; the next content opens a new one
    needs_page: bool,
    pending_bookmark: Option<String>,
    bookmarks: Vec<Bookmark>,
}

impl<'a> Pager<'a> {
    fn new(config: &'a PDF, fonts: &'a FontFamily) -> Pager<'a> {
        Pager {
            config,
            fonts,
            pages: Vec::new(),
            cursor: 0.0,
            needs_page: true,
            pending_bookmark: None,
            bookmarks: Vec::new(),
        }
    }

    fn finish(self) -> Pagination {
        Pagination {
            pages: self.pages,
            bookmarks: self.bookmarks,
        }
    }

    /// Mark the next content as the target of a bookmark.
    fn bookmark(&mut self, title: String) {
        self.pending_bookmark = Some(title);
    }

    /// Close the current page unless nothing has been placed on it.
    pub fn break_page(&mut self) {
        if !self.at_page_top() {
            self.needs_page = true;
        }
    }

    /// Whether the next content would be the first on its page.
    pub fn at_page_top(&self) -> bool {
        self.needs_page || self.pages.last().map_or(true, |page| page.items.is_empty())
    }

    /// Make sure `height` fits below the cursor, starting a new page if it doesn't.
    pub fn room(&mut self, height: f32) {
        if self.needs_page || self.pages.is_empty() {
            self.start_page();
        } else if self.cursor - height < self.content_box().y1 && !self.at_page_top() {
            self.start_page();
        }

        if let Some(title) = self.pending_bookmark.take() {
            self.bookmarks.push(Bookmark {
                title,
                page_index: self.pages.len() - 1,
                top: self.cursor,
            });
        }
    }

    fn start_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.cursor = self.content_box().y2;
        self.needs_page = false;
    }

    /// The content box of the current page.
    pub fn content_box(&self) -> ContentBox {
        self.config
            .content_box(self.pages.len().saturating_sub(1))
    }

    pub fn page_height(&self) -> f32 {
        self.config.page_size().height
    }

    /// Move the cursor down by `height`.
    pub fn skip(&mut self, height: f32) {
        self.cursor -= height;
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    /// Claim a line of `line_height`, returning its baseline.
    pub fn line(&mut self, line_height: f32) -> f32 {
        let baseline = self.cursor - line_height * BASELINE_RATIO;
        self.cursor -= line_height;
        baseline
    }

    pub fn push(&mut self, item: Item) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    /// Place a line of words starting at `x`, one run per styled fragment.
    pub fn place_words(&mut self, line: &[Word], offsets: &[f32], x: f32, y: f32, size: f32) {
        for (word, offset) in line.iter().zip(offsets) {
            let mut x = x + offset;
            for fragment in &word.fragments {
                self.push(Item::Text(TextRun {
                    x,
                    y,
                    size,
                    style: fragment.style,
                    text: fragment.text.clone(),
                }));
                x += fragment.width;
            }
        }
    }

    /// Set `text` in `style`, wrapped and centred between the margins.
    pub fn centred_text(&mut self, text: &str, style: FontStyle, size: f32) {
        let words = layout::styled_words(text, style, self.fonts, size);
        let space = self.fonts.face(style).measure(" ", size);
        let line_height = self.config.line_height(size);
        let width = self.content_box().width();

        for range in layout::break_lines(&words, width, width, space) {
            self.room(line_height);
            let content = self.content_box();
            let baseline = self.line(line_height);
            let line = &words[range];
            let natural = layout::natural_width(line, space);
            let offsets = layout::word_offsets(line, width, space, true);
            let x = content.x1 + (content.width() - natural).max(0.0) / 2.0;
            self.place_words(line, &offsets, x, baseline, size);
        }
    }
}

/// Text content of a page, in placement order. Used by tests to see what landed where.
#[cfg(test)]
pub(crate) fn page_text(page: &PageLayout) -> String {
    page.items
        .iter()
        .filter_map(|item| match item {
            Item::Text(run) => Some(run.text.as_str()),
            Item::Image { .. } => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptionsBuilder;
    use crate::document::{assemble, CoverArt};
    use crate::sinks::pdf::fonts::testing::fixed_family;
    use crate::source::{parse_chapter, Chapter, Manuscript};

    fn tree(chapters: &[&str], title: Option<&str>, cover: bool) -> ContentTree {
        let mut options = BuildOptionsBuilder::default();
        options.directory("book");
        if let Some(title) = title {
            options.title(title);
        }
        let options = options.build().unwrap();
        let manuscript = Manuscript {
            chapters: chapters
                .iter()
                .enumerate()
                .map(|(i, text)| Chapter::new(format!("chapter_{i}.md"), parse_chapter(text, None)))
                .collect(),
            front_matter: None,
        };
        let cover = cover.then(|| CoverArt::new(b"not an image".to_vec()));
        assemble(&manuscript, cover, &options, "Chapter", PDF::default().page_size())
    }

    #[test]
    fn each_chapter_starts_a_page() {
        let fonts = fixed_family();
        let tree = tree(&["# One\n\nA.", "# Two\n\nB.", "# Three\n\nC."], None, false);
        let pagination = paginate(&PDF::default(), &fonts, &tree);

        assert_eq!(pagination.pages.len(), 3);
        assert!(page_text(&pagination.pages[0]).starts_with("One A."));
        assert!(page_text(&pagination.pages[1]).starts_with("Two B."));
        let titles: Vec<(&str, usize)> = pagination
            .bookmarks
            .iter()
            .map(|b| (b.title.as_str(), b.page_index))
            .collect();
        assert_eq!(titles, vec![("One", 0), ("Two", 1), ("Three", 2)]);
    }

    #[test]
    fn cover_and_title_pages_carry_no_numbers() {
        let fonts = fixed_family();
        let tree = tree(&["# One\n\nA."], Some("The Book"), true);
        let pagination = paginate(&PDF::default(), &fonts, &tree);

        assert_eq!(pagination.pages.len(), 3);
        assert!(matches!(pagination.pages[0].items[..], [Item::Image { .. }]));
        assert_eq!(page_text(&pagination.pages[1]), "The Book");
        // the first chapter page is page 3 and is numbered
        assert!(page_text(&pagination.pages[2]).ends_with('3'));
    }

    #[test]
    fn long_chapters_flow_onto_new_pages() {
        let fonts = fixed_family();
        let paragraph = "word ".repeat(120);
        let text = format!("# One\n\n{}", vec![paragraph.as_str(); 10].join("\n\n"));
        let tree = tree(&[text.as_str()], None, false);
        let pagination = paginate(&PDF::default(), &fonts, &tree);

        let config = PDF::default();
        assert!(pagination.pages.len() > 1);
        let floor = config.content_box(0).y1;
        for page in &pagination.pages {
            for item in &page.items {
                if let Item::Text(run) = item {
                    if run.size == config.font_size_body_pt {
                        assert!(run.y >= floor);
                    }
                }
            }
        }
    }

    #[test]
    fn breaks_never_leave_blank_pages() {
        let fonts = fixed_family();
        let config = PDF::default();
        let mut pager = Pager::new(&config, &fonts);
        pager.break_page();
        pager.centred_text("first", FontStyle::Regular, 11.0);
        pager.break_page();
        pager.break_page();
        pager.centred_text("second", FontStyle::Regular, 11.0);
        let pagination = pager.finish();
        assert_eq!(pagination.pages.len(), 2);
    }
}
