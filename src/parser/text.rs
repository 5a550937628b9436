use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-z0-9_.+-]+@[a-z0-9-]+\.[a-z0-9.-]+").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+?\d[\d\s().-]{6,}\d").unwrap());

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript"];
const MIN_PHONE_LEN: usize = 8;

pub fn is_hidden(element: &ElementRef) -> bool {
    HIDDEN_TAGS.contains(&element.value().name())
}

/// Push every visible text node under `element`, in document order.
pub fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    if is_hidden(&element) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(&text.text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    WS_RE.replace_all(s, " ").trim().to_string()
}

/// Visible text of an already-parsed element, whitespace collapsed.
pub fn element_text(element: ElementRef) -> String {
    let mut pieces = Vec::new();
    collect_text(element, &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

/// Visible page text: no script/style/noscript, single spaces.
pub fn clean_text(html: &str) -> String {
    let document = Html::parse_document(html);
    element_text(document.root_element())
}

pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn extract_phones(text: &str) -> Vec<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| normalize_phone(m.as_str()))
        .filter(|p| p.chars().count() >= MIN_PHONE_LEN)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn normalize_phone(raw: &str) -> String {
    raw.char_indices()
        .filter(|&(i, c)| c.is_ascii_digit() || (c == '+' && i == 0))
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_drops_scripts_and_collapses() {
        let html = r#"<html><head><style>p { color: red }</style>
            <script>var x = "hidden";</script></head>
            <body><h1>Hello</h1>
            <p>  brave
               new</p><noscript>enable js</noscript><p>world</p></body></html>"#;
        assert_eq!(clean_text(html), "Hello brave new world");
    }

    #[test]
    fn clean_text_separates_adjacent_nodes() {
        assert_eq!(clean_text("<div><span>a</span><span>b</span></div>"), "a b");
    }

    #[test]
    fn emails_sorted_and_deduplicated() {
        let text = "Write a@b.com or a@b.com, wholesale: B@C.ORG";
        assert_eq!(extract_emails(text), ["B@C.ORG", "a@b.com"]);
    }

    #[test]
    fn emails_repeat_is_stable() {
        let once = extract_emails("hello@store.com");
        let twice = extract_emails("hello@store.com hello@store.com");
        assert_eq!(once, twice);
    }

    #[test]
    fn phones_are_normalized_and_filtered() {
        let text = "Call +1 (555) 010-9999 or 555.010.9999. Order #1234567 ships soon.";
        let phones = extract_phones(text);
        assert_eq!(phones, ["+15550109999", "5550109999"]);
    }

    #[test]
    fn short_numbers_are_not_phones() {
        assert!(extract_phones("Batch 1234567").is_empty());
    }
}
