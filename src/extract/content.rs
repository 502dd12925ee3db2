//! Article body text extraction

use crate::extract::metadata::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};

/// Containers that commonly hold the story body, most specific first
const BODY_CONTAINERS: &[&str] = &[
    r#"[itemprop="articleBody"]"#,
    "article",
    ".article-body",
    ".article__body",
    ".article-content",
    ".story-body",
    ".entry-content",
    ".post-content",
    "main",
    "body",
];

/// Ancestors whose paragraphs are page chrome rather than story text
const BOILERPLATE_ANCESTORS: &[&str] = &["nav", "header", "footer", "aside", "form", "figcaption"];

/// A container is accepted once its paragraphs hold this many characters
const MIN_BODY_CHARS: usize = 200;

/// Paragraphs shorter than this are bylines, captions, or buttons
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Extracts the story text as paragraphs separated by blank lines
///
/// Containers are tried in order; the first whose paragraphs reach
/// `MIN_BODY_CHARS` wins. Otherwise the container with the most text is
/// used. Returns an empty string when the page has no paragraph text.
pub fn extract_body(document: &Html) -> String {
    let Ok(paragraph) = Selector::parse("p") else {
        return String::new();
    };

    let mut best: Vec<String> = Vec::new();
    let mut best_len = 0;

    for css in BODY_CONTAINERS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };

        for container in document.select(&selector) {
            let paragraphs = container_paragraphs(container, &paragraph);
            let len: usize = paragraphs.iter().map(|p| p.chars().count()).sum();

            if len >= MIN_BODY_CHARS {
                return paragraphs.join("\n\n");
            }

            if len > best_len {
                best_len = len;
                best = paragraphs;
            }
        }
    }

    best.join("\n\n")
}

fn container_paragraphs(container: ElementRef<'_>, paragraph: &Selector) -> Vec<String> {
    let mut seen = Vec::new();

    for p in container.select(paragraph) {
        if inside_boilerplate(p) || mostly_links(p) {
            continue;
        }

        let text = collapse_whitespace(&p.text().collect::<String>());
        if text.chars().count() < MIN_PARAGRAPH_CHARS {
            continue;
        }

        // Nested containers can repeat a paragraph
        if !seen.contains(&text) {
            seen.push(text);
        }
    }

    seen
}

fn inside_boilerplate(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            let name = ancestor.value().name();
            BOILERPLATE_ANCESTORS.iter().any(|tag| *tag == name)
        })
}

/// True when more than half of the paragraph's text is link text
fn mostly_links(element: ElementRef<'_>) -> bool {
    let Ok(anchor) = Selector::parse("a") else {
        return false;
    };

    let total: usize = element.text().map(|t| t.trim().chars().count()).sum();
    if total == 0 {
        return false;
    }

    let linked: usize = element
        .select(&anchor)
        .flat_map(|a| a.text())
        .map(|t| t.trim().chars().count())
        .sum();

    linked * 2 > total
}
