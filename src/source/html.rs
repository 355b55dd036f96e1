//! Small helpers shared by the HTML-scraping adapters.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use scraper::{ElementRef, Html, Selector};

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

/// Text content of an element with runs of whitespace collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Send a request and return the body, treating non-2xx as an error.
pub(crate) fn send_text(request: RequestBuilder, what: &str) -> Result<String> {
    request
        .send()
        .with_context(|| format!("{what}: request failed"))?
        .error_for_status()
        .with_context(|| format!("{what}: non-2xx"))?
        .text()
        .with_context(|| format!("{what}: reading body"))
}

/// GET a detail page and pick the text of one `<p>` from it.
pub(crate) fn fetch_paragraph(client: &Client, url: &str, pick: Paragraph) -> Result<String> {
    let body = send_text(client.get(url), url)?;
    paragraph_text(&body, pick)
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Paragraph {
    First,
    Last,
}

pub(crate) fn paragraph_text(body: &str, pick: Paragraph) -> Result<String> {
    let document = Html::parse_document(body);
    let p = selector("p")?;
    let mut paragraphs = document.select(&p);
    let found = match pick {
        Paragraph::First => paragraphs.next(),
        Paragraph::Last => paragraphs.last(),
    };
    found
        .map(element_text)
        .ok_or_else(|| anyhow!("detail page has no <p> element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <p>Intro
           text</p>
        <div><p>Middle</p></div>
        <p>  Closing   words </p>
    </body></html>"#;

    #[test]
    fn picks_first_and_last_paragraphs() {
        assert_eq!(paragraph_text(PAGE, Paragraph::First).unwrap(), "Intro text");
        assert_eq!(paragraph_text(PAGE, Paragraph::Last).unwrap(), "Closing words");
    }

    #[test]
    fn missing_paragraph_is_an_error() {
        assert!(paragraph_text("<html><body>nothing</body></html>", Paragraph::First).is_err());
    }

    #[test]
    fn bad_selector_is_an_error() {
        assert!(selector("td[").is_err());
    }
}
