use crate::image_header::Dimensions;
use serde::{Deserialize, Serialize};

const POINTS_PER_INCH: f32 = 72.0;

/// PDF output configuration, the `[pdf]` table of `book.toml`.
///
/// Margins are asymmetric to suit a bound book: the inner margin sits on the binding side
/// and swaps sides between recto and verso pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PDF {
    /// Font family base path (`./fonts/MyFont`); searched among installed serif fonts if unset
    pub font: Option<String>,
    /// Page width in inches
    pub page_width_in: f32,
    /// Page height in inches
    pub page_height_in: f32,
    pub margin_top_in: f32,
    pub margin_bottom_in: f32,
    /// Binding side margin
    pub margin_inner_in: f32,
    pub margin_outer_in: f32,
    pub font_size_title_pt: f32,
    pub font_size_heading_pt: f32,
    pub font_size_subheading_pt: f32,
    pub font_size_body_pt: f32,
    pub font_size_small_pt: f32,
    /// Line height as a multiple of the font size
    pub line_spacing: f32,
    /// First-line indent of indented paragraphs, in ems of the body font
    pub paragraph_indent_em: f32,
    /// Blank space above a heading that opens a page
    pub chapter_drop_in: f32,
}

impl Default for PDF {
    fn default() -> Self {
        PDF {
            font: None,
            page_width_in: 6.0,
            page_height_in: 9.0,
            margin_top_in: 0.75,
            margin_bottom_in: 0.75,
            margin_inner_in: 0.875,
            margin_outer_in: 0.625,
            font_size_title_pt: 28.0,
            font_size_heading_pt: 20.0,
            font_size_subheading_pt: 13.0,
            font_size_body_pt: 11.0,
            font_size_small_pt: 9.0,
            line_spacing: 1.4,
            paragraph_indent_em: 1.5,
            chapter_drop_in: 1.5,
        }
    }
}

/// The area of a page that content may occupy, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl ContentBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }
}

impl PDF {
    /// Page size in points.
    pub fn page_size(&self) -> Dimensions {
        Dimensions::new(
            self.page_width_in * POINTS_PER_INCH,
            self.page_height_in * POINTS_PER_INCH,
        )
    }

    /// The content box of the page at `page_index`.
    ///
    /// Even indices are right-hand (recto) pages, so their binding edge is on the left.
    pub fn content_box(&self, page_index: usize) -> ContentBox {
        let page = self.page_size();
        let inner = self.margin_inner_in * POINTS_PER_INCH;
        let outer = self.margin_outer_in * POINTS_PER_INCH;
        let (left, right) = if page_index % 2 == 0 {
            (inner, outer)
        } else {
            (outer, inner)
        };
        ContentBox {
            x1: left,
            y1: self.margin_bottom_in * POINTS_PER_INCH,
            x2: page.width - right,
            y2: page.height - self.margin_top_in * POINTS_PER_INCH,
        }
    }

    pub fn chapter_drop(&self) -> f32 {
        self.chapter_drop_in * POINTS_PER_INCH
    }

    /// Baseline of the page number footer.
    pub fn footer_baseline(&self) -> f32 {
        self.margin_bottom_in * POINTS_PER_INCH / 2.0
    }

    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_spacing
    }
}
