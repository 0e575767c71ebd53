//! The backend-neutral content tree.
//!
//! Parsed chapters, front matter, title and cover are assembled here into one flat list of
//! blocks, each tagged with the section it belongs to and with explicit page break
//! directives. Both renderers consume this list and nothing else, so the PDF and the EPUB
//! always contain the same chapters, in the same order, with the same headings, scene breaks,
//! emphasis and indentation.
//!
//! ## Indentation
//!
//! The first paragraph after a heading, subtitle or scene break is set flush left; paragraphs
//! that directly follow another paragraph get a first-line indent. The flag is threaded
//! through each chapter as explicit fold state and starts out suppressed for every chapter.
//!
//! ## Page breaks
//!
//! The cover, the title page and the front matter each end with a forced break. Every chapter
//! after the first starts with one. The first chapter never does: whatever precedes it already
//! broke the page, and if nothing precedes it a break would only produce a blank first page.

use crate::config::BuildOptions;
use crate::image_header::{sniff_dimensions, Dimensions, ImageFormat};
use crate::source::{
    parse_inline, typographic_substitutions, Chapter, ChapterElement, Manuscript, TextSpan,
};

/// Which part of the book a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Cover,
    TitlePage,
    FrontMatter,
    /// Zero-based chapter index
    Chapter(usize),
}

/// Where the cover sits on the page, in points measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Placement {
    /// Scale `image` to fit within `page` keeping its aspect ratio, centred on both axes.
    pub fn fit(image: Dimensions, page: Dimensions) -> Placement {
        let scale = (page.width / image.width).min(page.height / image.height);
        let width = image.width * scale;
        let height = image.height * scale;
        Placement {
            width,
            height,
            offset_x: (page.width - width) / 2.0,
            offset_y: (page.height - height) / 2.0,
        }
    }
}

/// Raw cover image bytes, carried through to the renderers for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    pub bytes: Vec<u8>,
    pub format: Option<ImageFormat>,
}

impl CoverArt {
    pub fn new(bytes: Vec<u8>) -> CoverArt {
        let format = ImageFormat::detect(&bytes);
        CoverArt { bytes, format }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    CoverImage {
        art: CoverArt,
        placement: Placement,
    },
    TitleBlock {
        title: Option<String>,
        author: Option<String>,
    },
    HeadingBlock {
        text: String,
        suppress_leading_page_break: bool,
    },
    SubtitleBlock {
        text: String,
    },
    SceneBreakBlock,
    ParagraphBlock {
        spans: Vec<TextSpan>,
        indented: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub node: ContentNode,
    pub section: Section,
    pub page_break_before: bool,
    pub page_break_after: bool,
}

impl Block {
    fn new(node: ContentNode, section: Section) -> Block {
        Block {
            node,
            section,
            page_break_before: false,
            page_break_after: false,
        }
    }
}

/// The assembled book.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTree {
    pub blocks: Vec<Block>,
    /// Pages before chapter content that carry no page number (cover and title page)
    pub front_matter_page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: String,
    /// Localised word for "Chapter", used to name chapters that have no heading
    pub heading_word: String,
    pub chapter_count: usize,
}

impl ContentTree {
    /// Consecutive runs of blocks sharing a section, in book order.
    pub fn sections(&self) -> Vec<(Section, &[Block])> {
        let mut sections = Vec::new();
        let mut start = 0;
        for i in 1..=self.blocks.len() {
            if i == self.blocks.len() || self.blocks[i].section != self.blocks[start].section {
                sections.push((self.blocks[start].section, &self.blocks[start..i]));
                start = i;
            }
        }
        sections
    }

    /// A human-readable name for a section, used for navigation.
    pub fn section_title(&self, section: Section) -> String {
        match section {
            Section::Cover => "Cover".to_string(),
            Section::TitlePage => self.title.clone().unwrap_or_else(|| "Title Page".to_string()),
            Section::FrontMatter => self
                .first_heading(section)
                .unwrap_or_else(|| "Front Matter".to_string()),
            Section::Chapter(index) => self
                .first_heading(section)
                .unwrap_or_else(|| format!("{} {}", self.heading_word, index + 1)),
        }
    }

    fn first_heading(&self, section: Section) -> Option<String> {
        self.blocks
            .iter()
            .filter(|block| block.section == section)
            .find_map(|block| match &block.node {
                ContentNode::HeadingBlock { text, .. } => Some(text.clone()),
                _ => None,
            })
    }
}

/// Build the content tree.
///
/// `cover` is present exactly when a cover is configured; `page` is the paginated page size
/// in points, used to scale and centre it.
pub fn assemble(
    manuscript: &Manuscript,
    cover: Option<CoverArt>,
    options: &BuildOptions,
    heading_word: &str,
    page: Dimensions,
) -> ContentTree {
    let mut blocks = Vec::new();
    let mut front_matter_page_count = 0;

    if let Some(art) = cover {
        let placement = Placement::fit(sniff_dimensions(&art.bytes, page), page);
        let mut block = Block::new(ContentNode::CoverImage { art, placement }, Section::Cover);
        block.page_break_after = true;
        blocks.push(block);
        front_matter_page_count += 1;
    }

    let title = options.title().map(typographic_substitutions);
    let author = options.author().map(typographic_substitutions);
    if title.is_some() || author.is_some() {
        let mut block = Block::new(
            ContentNode::TitleBlock {
                title: title.clone(),
                author: author.clone(),
            },
            Section::TitlePage,
        );
        block.page_break_after = true;
        blocks.push(block);
        front_matter_page_count += 1;
    }

    if let Some(front_matter) = &manuscript.front_matter {
        let mut front = assemble_chapter(front_matter, Section::FrontMatter, false);
        if let Some(last) = front.last_mut() {
            last.page_break_after = true;
        }
        blocks.extend(front);
    }

    for (index, chapter) in manuscript.chapters.iter().enumerate() {
        blocks.extend(assemble_chapter(chapter, Section::Chapter(index), index > 0));
    }

    log::info!(
        "assembled {} blocks, {} unnumbered leading pages",
        blocks.len(),
        front_matter_page_count
    );

    ContentTree {
        blocks,
        front_matter_page_count,
        title,
        author,
        language: options.language().to_string(),
        heading_word: heading_word.to_string(),
        chapter_count: manuscript.chapters.len(),
    }
}

/// Turn one chapter's elements into blocks, starting with indentation suppressed.
fn assemble_chapter(chapter: &Chapter, section: Section, leading_break: bool) -> Vec<Block> {
    let (mut blocks, _) = chapter.elements.iter().fold(
        (Vec::with_capacity(chapter.elements.len()), true),
        |(mut blocks, suppressed), element| {
            let (node, suppressed) = assemble_element(element, suppressed);
            blocks.push(Block::new(node, section));
            (blocks, suppressed)
        },
    );

    if leading_break {
        if let Some(first) = blocks.first_mut() {
            first.page_break_before = true;
            if let ContentNode::HeadingBlock {
                suppress_leading_page_break,
                ..
            } = &mut first.node
            {
                *suppress_leading_page_break = false;
            }
        }
    }
    blocks
}

/// One step of the indentation fold: the node for `element` and the flag for the next one.
fn assemble_element(element: &ChapterElement, suppressed: bool) -> (ContentNode, bool) {
    match element {
        ChapterElement::Heading(text) => (
            ContentNode::HeadingBlock {
                text: typographic_substitutions(text),
                suppress_leading_page_break: true,
            },
            true,
        ),
        ChapterElement::Subtitle(text) => (
            ContentNode::SubtitleBlock {
                text: typographic_substitutions(text),
            },
            true,
        ),
        ChapterElement::SceneBreak => (ContentNode::SceneBreakBlock, true),
        ChapterElement::Paragraph(text) => (
            ContentNode::ParagraphBlock {
                spans: parse_inline(&typographic_substitutions(text)),
                indented: !suppressed,
            },
            false,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptionsBuilder;
    use crate::source::parse_chapter;

    const PAGE: Dimensions = Dimensions {
        width: 432.0,
        height: 648.0,
    };

    fn options() -> BuildOptionsBuilder {
        let mut builder = BuildOptionsBuilder::default();
        builder.directory("book");
        builder
    }

    fn manuscript(chapters: &[&str]) -> Manuscript {
        Manuscript {
            chapters: chapters
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    Chapter::new(format!("chapter_{i:02}.md"), parse_chapter(text, None))
                })
                .collect(),
            front_matter: None,
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes
    }

    fn indents(tree: &ContentTree) -> Vec<bool> {
        tree.blocks
            .iter()
            .filter_map(|b| match &b.node {
                ContentNode::ParagraphBlock { indented, .. } => Some(*indented),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bare_book_starts_with_first_heading() {
        let options = options().build().unwrap();
        let tree = assemble(&manuscript(&["# Chapter 1\n\nText."]), None, &options, "Chapter", PAGE);

        assert_eq!(tree.front_matter_page_count, 0);
        let first = &tree.blocks[0];
        assert!(!first.page_break_before);
        assert_eq!(
            first.node,
            ContentNode::HeadingBlock {
                text: "Chapter 1".to_string(),
                suppress_leading_page_break: true,
            }
        );
    }

    #[test]
    fn cover_and_title_count_as_unnumbered_pages() {
        let options = options().title("A Book").build().unwrap();
        let tree = assemble(
            &manuscript(&["# Chapter 1"]),
            Some(CoverArt::new(png(800, 1200))),
            &options,
            "Chapter",
            PAGE,
        );

        assert_eq!(tree.front_matter_page_count, 2);
        assert_eq!(tree.blocks[0].section, Section::Cover);
        assert!(tree.blocks[0].page_break_after);
        assert_eq!(tree.blocks[1].section, Section::TitlePage);
        assert!(tree.blocks[1].page_break_after);
        assert!(!tree.blocks[2].page_break_before);
    }

    #[test]
    fn author_alone_makes_a_title_page() {
        let options = options().author("Someone").build().unwrap();
        let tree = assemble(&manuscript(&["Text."]), None, &options, "Chapter", PAGE);
        assert_eq!(tree.front_matter_page_count, 1);
        assert_eq!(
            tree.blocks[0].node,
            ContentNode::TitleBlock {
                title: None,
                author: Some("Someone".to_string()),
            }
        );
    }

    #[test]
    fn cover_is_scaled_to_fit_and_centred() {
        let close = |a: f32, b: f32| (a - b).abs() < 0.01;

        let placement = Placement::fit(Dimensions::new(800.0, 600.0), PAGE);
        assert!(close(placement.width, 432.0));
        assert!(close(placement.height, 324.0));
        assert!(close(placement.offset_x, 0.0));
        assert!(close(placement.offset_y, 162.0));

        // small images grow to fit the page
        let placement = Placement::fit(Dimensions::new(108.0, 324.0), PAGE);
        assert!(close(placement.width, 216.0));
        assert!(close(placement.height, 648.0));
        assert!(close(placement.offset_x, 108.0));
        assert!(close(placement.offset_y, 0.0));
    }

    #[test]
    fn unreadable_cover_fills_the_page() {
        let options = options().build().unwrap();
        let tree = assemble(
            &manuscript(&["Text."]),
            Some(CoverArt::new(b"not an image".to_vec())),
            &options,
            "Chapter",
            PAGE,
        );
        match &tree.blocks[0].node {
            ContentNode::CoverImage { placement, .. } => {
                assert_eq!(
                    *placement,
                    Placement {
                        width: 432.0,
                        height: 648.0,
                        offset_x: 0.0,
                        offset_y: 0.0,
                    }
                );
            }
            other => panic!("expected a cover, got {other:?}"),
        }
    }

    #[test]
    fn indentation_resets_after_structure() {
        let text = "# Chapter 1\n## Sub\n\nA.\n\nB.\n\n* * *\n\nC.\n\nD.\n\nE.";
        let options = options().build().unwrap();
        let tree = assemble(&manuscript(&[text]), None, &options, "Chapter", PAGE);
        assert_eq!(indents(&tree), vec![false, true, false, true, true]);
    }

    #[test]
    fn indentation_resets_per_chapter() {
        let options = options().build().unwrap();
        let tree = assemble(
            &manuscript(&["A.\n\nB.", "C.\n\nD."]),
            None,
            &options,
            "Chapter",
            PAGE,
        );
        assert_eq!(indents(&tree), vec![false, true, false, true]);
    }

    #[test]
    fn front_matter_sits_between_title_and_first_chapter() {
        let options = options().title("T").build().unwrap();
        let mut book = manuscript(&["# Chapter 1\n\nBody."]);
        book.front_matter = Some(Chapter::new(
            "front_matter.md",
            parse_chapter("For A.\n\nAnd B.", None),
        ));
        let tree = assemble(&book, None, &options, "Chapter", PAGE);

        let sections: Vec<Section> = tree.sections().iter().map(|(s, _)| *s).collect();
        assert_eq!(
            sections,
            vec![Section::TitlePage, Section::FrontMatter, Section::Chapter(0)]
        );
        // front matter text doesn't count towards unnumbered pages
        assert_eq!(tree.front_matter_page_count, 1);
        let front: Vec<&Block> = tree
            .blocks
            .iter()
            .filter(|b| b.section == Section::FrontMatter)
            .collect();
        assert!(front.last().unwrap().page_break_after);
        assert_eq!(indents(&tree), vec![false, true, false]);
    }

    #[test]
    fn later_chapters_break_before_their_heading() {
        let options = options().build().unwrap();
        let tree = assemble(
            &manuscript(&["# Chapter 1\n\nA.", "# Chapter 2\n\nB.", "No heading."]),
            None,
            &options,
            "Chapter",
            PAGE,
        );
        let leading: Vec<(Section, bool)> = tree
            .sections()
            .iter()
            .map(|(s, blocks)| (*s, blocks[0].page_break_before))
            .collect();
        assert_eq!(
            leading,
            vec![
                (Section::Chapter(0), false),
                (Section::Chapter(1), true),
                (Section::Chapter(2), true),
            ]
        );
        assert_eq!(
            tree.blocks[2].node,
            ContentNode::HeadingBlock {
                text: "Chapter 2".to_string(),
                suppress_leading_page_break: false,
            }
        );
        assert_eq!(tree.section_title(Section::Chapter(2)), "Chapter 3");
    }

    #[test]
    fn applies_em_dashes_everywhere() {
        let options = options().title("Before--After").build().unwrap();
        let tree = assemble(
            &manuscript(&["# Chapter 1--Start\n## one--two\n\nthree--four"]),
            None,
            &options,
            "Chapter",
            PAGE,
        );
        assert_eq!(tree.title.as_deref(), Some("Before\u{2014}After"));
        assert_eq!(
            tree.blocks[1].node,
            ContentNode::HeadingBlock {
                text: "Chapter 1\u{2014}Start".to_string(),
                suppress_leading_page_break: true,
            }
        );
        assert_eq!(
            tree.blocks[2].node,
            ContentNode::SubtitleBlock {
                text: "one\u{2014}two".to_string()
            }
        );
        assert_eq!(
            tree.blocks[3].node,
            ContentNode::ParagraphBlock {
                spans: vec![TextSpan::plain("three\u{2014}four")],
                indented: false,
            }
        );
    }
}
