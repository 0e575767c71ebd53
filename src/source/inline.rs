//! Inline emphasis within a paragraph.
//!
//! Emphasis uses `*` or `_`: one for italic, two for bold, three for both. Markers are matched
//! left to right, longest run first, each closing at the next identical run. Anything that
//! doesn't close is left in the text as-is.

/// A run of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl TextSpan {
    pub fn plain<S: Into<String>>(text: S) -> TextSpan {
        TextSpan {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }
}

const DELIMITERS: [char; 2] = ['*', '_'];

/// Replace a double hyphen with an em dash.
///
/// This runs before [`parse_inline`] so dash sequences are never mistaken for markup.
pub fn typographic_substitutions(text: &str) -> String {
    text.replace("--", "\u{2014}")
}

/// Split a paragraph into styled spans.
///
/// Always returns at least one span; empty input gives a single empty plain span.
pub fn parse_inline(text: &str) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while let Some(ch) = text[i..].chars().next() {
        if DELIMITERS.contains(&ch) {
            if let Some((span, consumed)) = match_emphasis(&text[i..], ch) {
                if !plain.is_empty() {
                    spans.push(TextSpan::plain(std::mem::take(&mut plain)));
                }
                spans.push(span);
                i += consumed;
                continue;
            }
        }
        plain.push(ch);
        i += ch.len_utf8();
    }

    if !plain.is_empty() || spans.is_empty() {
        spans.push(TextSpan::plain(plain));
    }
    spans
}

/// Try to match an emphasis run at the start of `text`.
///
/// Returns the styled span and the number of bytes consumed, markers included.
fn match_emphasis(text: &str, delimiter: char) -> Option<(TextSpan, usize)> {
    for run in [3, 2, 1] {
        let marker: String = std::iter::repeat(delimiter).take(run).collect();
        let Some(body) = text.strip_prefix(marker.as_str()) else {
            continue;
        };
        // the emphasised text can't be empty
        let Some(first) = body.chars().next() else {
            continue;
        };
        let skip = first.len_utf8();
        if let Some(pos) = body[skip..].find(marker.as_str()) {
            let end = skip + pos;
            let span = TextSpan {
                text: body[..end].to_string(),
                bold: run >= 2,
                italic: run != 2,
            };
            return Some((span, run + end + run));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(text: &str, bold: bool, italic: bool) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            bold,
            italic,
        }
    }

    #[test]
    fn plain_text_is_one_span() {
        assert_eq!(parse_inline("plain"), vec![TextSpan::plain("plain")]);
    }

    #[test]
    fn can_parse_each_emphasis_level() {
        assert_eq!(parse_inline("*i*"), vec![styled("i", false, true)]);
        assert_eq!(parse_inline("**b**"), vec![styled("b", true, false)]);
        assert_eq!(parse_inline("***bi***"), vec![styled("bi", true, true)]);
        assert_eq!(parse_inline("_i_"), vec![styled("i", false, true)]);
        assert_eq!(parse_inline("__b__"), vec![styled("b", true, false)]);
        assert_eq!(parse_inline("___bi___"), vec![styled("bi", true, true)]);
    }

    #[test]
    fn keeps_surrounding_text() {
        assert_eq!(
            parse_inline("a *b* c"),
            vec![
                TextSpan::plain("a "),
                styled("b", false, true),
                TextSpan::plain(" c"),
            ]
        );
    }

    #[test]
    fn delimiters_do_not_mix() {
        assert_eq!(
            parse_inline("*a_ and _b*"),
            vec![styled("a_ and _b", false, true)]
        );
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(parse_inline("5 * 3 = 15"), vec![TextSpan::plain("5 * 3 = 15")]);
        assert_eq!(parse_inline("**"), vec![TextSpan::plain("**")]);
        assert_eq!(parse_inline("a **b"), vec![TextSpan::plain("a **b")]);
    }

    #[test]
    fn empty_input_gives_one_empty_span() {
        assert_eq!(parse_inline(""), vec![TextSpan::plain("")]);
    }

    #[test]
    fn first_closed_run_wins() {
        // the double run closes early, leaving the stray marker as text
        assert_eq!(
            parse_inline("**a***"),
            vec![styled("a", true, false), TextSpan::plain("*")]
        );
    }

    #[test]
    fn handles_multibyte_text() {
        assert_eq!(
            parse_inline("é *ü* ñ"),
            vec![
                TextSpan::plain("é "),
                styled("ü", false, true),
                TextSpan::plain(" ñ"),
            ]
        );
    }

    #[test]
    fn can_substitute_em_dashes() {
        assert_eq!(typographic_substitutions("wait--what"), "wait\u{2014}what");
        assert_eq!(typographic_substitutions("a - b"), "a - b");
    }
}
