use super::xhtml;

pub fn render(title: Option<&str>, author: Option<&str>, lang: &str) -> String {
    let mut body = String::from("<div class=\"title-page\">\n");
    if let Some(title) = title {
        body.push_str(&format!(
            "<h1 class=\"title\">{}</h1>\n",
            html_escape::encode_text(title)
        ));
    }
    if let Some(author) = author {
        body.push_str(&format!(
            "<p class=\"author\">{}</p>\n",
            html_escape::encode_text(author)
        ));
    }
    body.push_str("</div>");
    xhtml(title.unwrap_or("Title Page"), lang, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_only_title_page() {
        let html = render(None, Some("Someone"), "en");
        assert!(html.contains("<p class=\"author\">Someone</p>"));
        assert!(!html.contains("<h1"));
    }
}
