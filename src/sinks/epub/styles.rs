//! The EPUB stylesheet.
//!
//! Mirrors the PDF's typography where a reflowable format can: serif body text with
//! first-line indents, centred bold headings, italic subtitles and centred scene breaks.

pub const STYLESHEET_HREF: &str = "stylesheet.css";

pub fn generate_stylesheet() -> String {
    r#"/* Base styles */
body {
    font-family: serif;
    line-height: 1.4;
    margin: 1em;
}

p {
    margin: 0;
    text-align: justify;
    text-indent: 1.5em;
}

p.no-indent {
    text-indent: 0;
}

h1 {
    font-size: 1.6em;
    font-weight: bold;
    text-align: center;
    margin: 2em 0 1em;
}

h2.subtitle {
    font-size: 1.1em;
    font-style: italic;
    font-weight: normal;
    text-align: center;
    margin: -0.5em 0 1em;
}

.break-before {
    page-break-before: always;
    break-before: page;
}

p.scene-break {
    text-align: center;
    text-indent: 0;
    margin: 1em 0;
}

/* Cover */
.cover {
    text-align: center;
    margin: 0;
    padding: 0;
}

.cover img {
    max-width: 100%;
    max-height: 100%;
}

/* Title page */
.title-page {
    text-align: center;
    margin-top: 30%;
}

.title-page h1.title {
    font-size: 2.2em;
    margin: 0 0 1.5em;
}

.title-page p.author {
    font-style: italic;
    font-size: 1.2em;
    text-indent: 0;
    text-align: center;
}

/* Table of contents */
.toc ol {
    list-style-type: none;
    padding-left: 0;
}

.toc li {
    margin: 0.4em 0;
}
"#
    .to_string()
}
