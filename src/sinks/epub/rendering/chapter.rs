//! Chapter and front matter documents.

use super::xhtml;
use crate::document::{Block, ContentNode};
use crate::source::TextSpan;

const SCENE_BREAK: &str = "* * *";

/// Render a run of blocks as one XHTML document.
pub fn render(blocks: &[Block], title: &str, lang: &str) -> String {
    let body = blocks
        .iter()
        .filter_map(render_block)
        .collect::<Vec<_>>()
        .join("\n");
    xhtml(title, lang, &format!("<section class=\"chapter\">\n{body}\n</section>"))
}

fn render_block(block: &Block) -> Option<String> {
    let mut classes: Vec<&str> = Vec::new();
    if block.page_break_before {
        classes.push("break-before");
    }

    let html = match &block.node {
        ContentNode::HeadingBlock {
            text,
            suppress_leading_page_break,
        } => {
            if *suppress_leading_page_break {
                classes.retain(|c| *c != "break-before");
            }
            format!("<h1{}>{}</h1>", class_attr(&classes), html_escape::encode_text(text))
        }
        ContentNode::SubtitleBlock { text } => {
            classes.insert(0, "subtitle");
            format!("<h2{}>{}</h2>", class_attr(&classes), html_escape::encode_text(text))
        }
        ContentNode::SceneBreakBlock => {
            classes.insert(0, "scene-break");
            format!("<p{}>{SCENE_BREAK}</p>", class_attr(&classes))
        }
        ContentNode::ParagraphBlock { spans, indented } => {
            if !indented {
                classes.insert(0, "no-indent");
            }
            format!("<p{}>{}</p>", class_attr(&classes), render_spans(spans))
        }
        // the cover and title page have documents of their own
        ContentNode::CoverImage { .. } | ContentNode::TitleBlock { .. } => return None,
    };
    Some(html)
}

fn class_attr(classes: &[&str]) -> String {
    if classes.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", classes.join(" "))
    }
}

pub fn render_spans(spans: &[TextSpan]) -> String {
    spans
        .iter()
        .map(|span| {
            let text = html_escape::encode_text(&span.text);
            match (span.bold, span.italic) {
                (false, false) => text.to_string(),
                (true, false) => format!("<strong>{text}</strong>"),
                (false, true) => format!("<em>{text}</em>"),
                (true, true) => format!("<strong><em>{text}</em></strong>"),
            }
        })
        .collect()
}
