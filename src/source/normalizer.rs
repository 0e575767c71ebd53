//! Chapter text to structural elements.
//!
//! A chapter file is a lightly marked-up manuscript: `#` for the chapter heading, `##` for an
//! optional subtitle, `* * *` for a scene break, and blank lines between paragraphs. Hard line
//! breaks inside a paragraph are joined back together, including words that were hyphenated
//! across a line break.

use super::ChapterElement;
use crate::language::HEADING_PLACEHOLDER;

const METADATA_FENCE: &str = "---";
const SCENE_BREAK: &str = "* * *";

/// Decompose one chapter's text into ordered elements.
///
/// If `heading_word` is given, a level-1 heading that starts with the `Chapter` placeholder
/// has that word replaced, keeping whatever follows it (usually the chapter number).
pub fn parse_chapter(text: &str, heading_word: Option<&str>) -> Vec<ChapterElement> {
    let lines: Vec<&str> = text.lines().collect();
    let body = strip_metadata(&lines);

    let mut elements = Vec::new();
    let mut paragraph = String::new();

    for line in body {
        let stripped = line.trim();

        if let Some((level, text)) = heading(stripped) {
            flush(&mut paragraph, &mut elements);
            if level == 1 {
                let text = match heading_word {
                    Some(word) => localize_heading(text, word),
                    None => text.to_string(),
                };
                elements.push(ChapterElement::Heading(text));
            } else {
                elements.push(ChapterElement::Subtitle(text.to_string()));
            }
        } else if stripped == SCENE_BREAK {
            flush(&mut paragraph, &mut elements);
            elements.push(ChapterElement::SceneBreak);
        } else if stripped.is_empty() {
            flush(&mut paragraph, &mut elements);
        } else {
            push_line(&mut paragraph, stripped);
        }
    }

    flush(&mut paragraph, &mut elements);
    elements
}

/// Drop a leading `---` … `---` block and any blank lines right after it.
///
/// Without a closing fence nothing is dropped; the opening line is then just text.
fn strip_metadata<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    match lines.first() {
        Some(first) if first.trim() == METADATA_FENCE => {}
        _ => return lines,
    }

    let Some(close) = lines[1..]
        .iter()
        .position(|line| line.trim() == METADATA_FENCE)
    else {
        log::warn!("metadata fence is never closed, treating it as text");
        return lines;
    };

    let mut rest = &lines[close + 2..];
    while let Some(line) = rest.first() {
        if !line.trim().is_empty() {
            break;
        }
        rest = &rest[1..];
    }
    rest
}

/// Recognise `# text` (level 1) and `## text` (level 2).
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if !(1..=2).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, rest.trim()))
}

fn localize_heading(text: &str, word: &str) -> String {
    let Some(prefix) = text.get(..HEADING_PLACEHOLDER.len()) else {
        return text.to_string();
    };
    if !prefix.eq_ignore_ascii_case(HEADING_PLACEHOLDER) {
        return text.to_string();
    }

    let rest = &text[HEADING_PLACEHOLDER.len()..];
    // whole word only: "Chapters" is left alone
    if rest.chars().next().is_some_and(char::is_alphanumeric) {
        return text.to_string();
    }

    let shouting = prefix.chars().all(char::is_uppercase);
    if shouting {
        format!("{}{rest}", word.to_uppercase())
    } else {
        format!("{word}{rest}")
    }
}

/// Append a source line to the pending paragraph.
///
/// A single trailing hyphen means the word was wrapped, so the next line is glued on directly
/// with the hyphen kept. Two or more hyphens are a dash and get the usual space.
fn push_line(paragraph: &mut String, line: &str) {
    if !paragraph.is_empty() && !ends_with_wrap_hyphen(paragraph) {
        paragraph.push(' ');
    }
    paragraph.push_str(line);
}

fn ends_with_wrap_hyphen(text: &str) -> bool {
    text.ends_with('-') && !text.ends_with("--")
}

fn flush(paragraph: &mut String, elements: &mut Vec<ChapterElement>) {
    if !paragraph.is_empty() {
        elements.push(ChapterElement::Paragraph(std::mem::take(paragraph)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ChapterElement::*;

    fn para(s: &str) -> ChapterElement {
        Paragraph(s.to_string())
    }

    #[test]
    fn can_parse_structure_in_order() {
        let text = "# Chapter 1\n## The Beginning\n\nFirst line\nsecond line.\n\n* * *\n\nAfter.\n";
        assert_eq!(
            parse_chapter(text, None),
            vec![
                Heading("Chapter 1".to_string()),
                Subtitle("The Beginning".to_string()),
                para("First line second line."),
                SceneBreak,
                para("After."),
            ]
        );
    }

    #[test]
    fn rejoins_hyphen_wrapped_words() {
        let text = "a hyphen-\nated word\nand a dash--\nthen more";
        assert_eq!(
            parse_chapter(text, None),
            vec![para("a hyphen-ated word and a dash-- then more")]
        );
    }

    #[test]
    fn only_a_single_hyphen_glues_lines() {
        let text = "wait---\nno\n\nre-\nenter";
        assert_eq!(
            parse_chapter(text, None),
            vec![para("wait--- no"), para("re-enter")]
        );
    }

    #[test]
    fn trailing_blank_lines_do_not_matter() {
        let text = "# Chapter 2\n\nOne.\n\nTwo.";
        let padded = format!("{text}\n\n\n\n");
        assert_eq!(parse_chapter(text, None), parse_chapter(&padded, None));
    }

    #[test]
    fn strips_metadata_fence_entirely() {
        let text = "---\ntitle: Something\n# Not a heading\n---\n\n\n# Chapter 3\nBody.";
        assert_eq!(
            parse_chapter(text, None),
            vec![Heading("Chapter 3".to_string()), para("Body.")]
        );
    }

    #[test]
    fn unclosed_fence_is_kept_as_text() {
        let text = "---\nkey: value\n\nBody.";
        assert_eq!(
            parse_chapter(text, None),
            vec![para("--- key: value"), para("Body.")]
        );
    }

    #[test]
    fn fence_must_open_the_file() {
        let text = "Intro.\n---\nstill text\n---";
        let elements = parse_chapter(text, None);
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn can_localize_heading_word() {
        let elements = parse_chapter("# Chapter 7\n## Seven", Some("Kapitel"));
        assert_eq!(elements[0], Heading("Kapitel 7".to_string()));
        // subtitles are never rewritten
        assert_eq!(elements[1], Subtitle("Seven".to_string()));
    }

    #[test]
    fn localization_keeps_upper_case_headings_upper_case() {
        let elements = parse_chapter("# CHAPTER 4", Some("Chapitre"));
        assert_eq!(elements[0], Heading("CHAPITRE 4".to_string()));
    }

    #[test]
    fn localization_only_touches_the_leading_word() {
        let elements = parse_chapter("# Chapters of Chapter", Some("Kapitel"));
        assert_eq!(elements[0], Heading("Chapters of Chapter".to_string()));
        let elements = parse_chapter("# Prologue", Some("Kapitel"));
        assert_eq!(elements[0], Heading("Prologue".to_string()));
    }

    #[test]
    fn deeper_headings_are_paragraph_text() {
        let elements = parse_chapter("### small\n#nospace", None);
        assert_eq!(elements, vec![para("### small #nospace")]);
    }

    #[test]
    fn scene_break_must_be_exact() {
        let elements = parse_chapter("***\n\n*  *  *\n\n  * * *  ", None);
        assert_eq!(elements, vec![para("***"), para("*  *  *"), SceneBreak]);
    }

    #[test]
    fn empty_input_has_no_elements() {
        assert!(parse_chapter("", None).is_empty());
        assert!(parse_chapter("\n\n  \n", None).is_empty());
    }
}
