//! Words, line breaking and justification.
//!
//! Lines are filled greedily. Justified lines stretch the gaps between words to reach the
//! full measure; the last line of a paragraph keeps natural spacing and sits flush left.

use super::fonts::{FontFamily, FontStyle};
use crate::source::TextSpan;
use std::ops::Range;

/// A run of same-styled text within a word.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub style: FontStyle,
    pub width: f32,
}

/// Text between spaces. A word may change style partway, as in `*word*,`.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub fragments: Vec<Fragment>,
    pub width: f32,
}

impl Word {
    fn push(&mut self, ch: char, style: FontStyle) {
        match self.fragments.last_mut() {
            Some(fragment) if fragment.style == style => fragment.text.push(ch),
            _ => self.fragments.push(Fragment {
                text: ch.to_string(),
                style,
                width: 0.0,
            }),
        }
    }

    fn measure(mut self, fonts: &FontFamily, size: f32) -> Word {
        for fragment in self.fragments.iter_mut() {
            fragment.width = fonts.face(fragment.style).measure(&fragment.text, size);
        }
        self.width = self.fragments.iter().map(|f| f.width).sum();
        self
    }
}

/// Split styled spans into measured words.
pub fn words(spans: &[TextSpan], fonts: &FontFamily, size: f32) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current = Word {
        fragments: Vec::new(),
        width: 0.0,
    };

    for span in spans {
        let style = FontStyle::of(span.bold, span.italic);
        for ch in span.text.chars() {
            if ch.is_whitespace() {
                if !current.fragments.is_empty() {
                    words.push(std::mem::replace(
                        &mut current,
                        Word {
                            fragments: Vec::new(),
                            width: 0.0,
                        },
                    ));
                }
            } else {
                current.push(ch, style);
            }
        }
    }
    if !current.fragments.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|word| word.measure(fonts, size))
        .collect()
}

/// Words of plain text set in a single style.
pub fn styled_words(text: &str, style: FontStyle, fonts: &FontFamily, size: f32) -> Vec<Word> {
    let span = TextSpan {
        text: text.to_string(),
        bold: matches!(style, FontStyle::Bold | FontStyle::BoldItalic),
        italic: matches!(style, FontStyle::Italic | FontStyle::BoldItalic),
    };
    words(&[span], fonts, size)
}

/// Greedy line breaking.
///
/// The first line may be narrower than the rest (to leave room for an indent). A word wider
/// than the measure gets a line to itself.
pub fn break_lines(words: &[Word], first_width: f32, width: f32, space: f32) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut line_width = 0.0;

    for (i, word) in words.iter().enumerate() {
        if i == start {
            line_width = word.width;
            continue;
        }
        let available = if lines.is_empty() { first_width } else { width };
        let candidate = line_width + space + word.width;
        if candidate > available {
            lines.push(start..i);
            start = i;
            line_width = word.width;
        } else {
            line_width = candidate;
        }
    }
    if start < words.len() {
        lines.push(start..words.len());
    }
    lines
}

/// Natural width of a line set with ordinary spaces.
pub fn natural_width(line: &[Word], space: f32) -> f32 {
    let words: f32 = line.iter().map(|w| w.width).sum();
    words + space * line.len().saturating_sub(1) as f32
}

/// Horizontal offset of each word in a line.
///
/// Unless `ragged`, the gaps grow so the line spans exactly `width`. Gaps never shrink below
/// `space`.
pub fn word_offsets(line: &[Word], width: f32, space: f32, ragged: bool) -> Vec<f32> {
    let gaps = line.len().saturating_sub(1);
    let gap = if ragged || gaps == 0 {
        space
    } else {
        let words: f32 = line.iter().map(|w| w.width).sum();
        ((width - words) / gaps as f32).max(space)
    };

    let mut x = 0.0;
    line.iter()
        .map(|word| {
            let offset = x;
            x += word.width + gap;
            offset
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::pdf::fonts::testing::fixed_family;

    // the fixed face makes every character 5pt wide at 10pt
    const SIZE: f32 = 10.0;
    const SPACE: f32 = 5.0;

    #[test]
    fn can_split_words_across_styles() {
        let fonts = fixed_family();
        let spans = vec![
            TextSpan::plain("a "),
            TextSpan {
                text: "bold".to_string(),
                bold: true,
                italic: false,
            },
            TextSpan::plain(", c"),
        ];
        let words = words(&spans, &fonts, SIZE);
        assert_eq!(words.len(), 3);
        assert_eq!(words[1].fragments.len(), 2);
        assert_eq!(words[1].fragments[0].style, FontStyle::Bold);
        assert_eq!(words[1].fragments[1].text, ",");
        assert_eq!(words[1].width, 25.0);
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        let fonts = fixed_family();
        let words = words(&[TextSpan::plain("  one   two ")], &fonts, SIZE);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn can_break_lines_greedily() {
        let fonts = fixed_family();
        // each word is 15pt, two words with a space are 35pt
        let words = styled_words("aaa bbb ccc ddd ddd", FontStyle::Regular, &fonts, SIZE);
        let lines = break_lines(&words, 35.0, 35.0, SPACE);
        assert_eq!(lines, vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn first_line_can_be_narrower() {
        let fonts = fixed_family();
        let words = styled_words("aaa bbb ccc ddd", FontStyle::Regular, &fonts, SIZE);
        let lines = break_lines(&words, 20.0, 35.0, SPACE);
        assert_eq!(lines, vec![0..1, 1..3, 3..4]);
    }

    #[test]
    fn overlong_words_get_their_own_line() {
        let fonts = fixed_family();
        let words = styled_words("a supercalifragilistic b", FontStyle::Regular, &fonts, SIZE);
        let lines = break_lines(&words, 30.0, 30.0, SPACE);
        assert_eq!(lines, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn can_justify_lines() {
        let fonts = fixed_family();
        let words = styled_words("aa bb cc", FontStyle::Regular, &fonts, SIZE);
        // 30pt of words across 50pt leaves two 10pt gaps
        assert_eq!(word_offsets(&words, 50.0, SPACE, false), vec![0.0, 20.0, 40.0]);
        assert_eq!(word_offsets(&words, 50.0, SPACE, true), vec![0.0, 15.0, 30.0]);
        assert_eq!(natural_width(&words, SPACE), 40.0);
    }
}
