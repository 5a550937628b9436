use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use super::text::{clean_text, collapse_whitespace, element_text, is_hidden};
use crate::utils::truncate_chars;

/// Question marker up to the answer marker; the answer itself ends at the next `Q)`.
static QA_HEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)Q\)?\s*[:)-]?\s*(.+?)\s*A\)\s*[:)-]?\s*").unwrap());
static NEXT_Q_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Q\)").unwrap());

pub const MAX_PAIRS: usize = 50;
const MAX_HEADING_PAIRS: usize = 30;
const DEDUP_PREFIX: usize = 120;

/// Question/answer pairs found in a help or FAQ page.
pub fn find_faq_pairs(html: &str) -> Vec<(String, String)> {
    let text = clean_text(html);
    let mut pairs = marker_pairs(&text);
    if pairs.is_empty() {
        pairs = heading_pairs(html);
    }
    dedup_pairs(pairs)
}

fn marker_pairs(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut pos = 0;

    while let Some(caps) = QA_HEAD_RE.captures_at(text, pos) {
        let head_end = caps.get(0).map_or(text.len(), |m| m.end());
        // The answer needs at least one character before the next marker can end it.
        let Some(first) = text[head_end..].chars().next() else {
            break;
        };
        let search_from = head_end + first.len_utf8();
        let answer_end = NEXT_Q_RE
            .find_at(text, search_from)
            .map_or(text.len(), |m| m.start());

        let question = caps[1].trim();
        let answer = text[head_end..answer_end].trim();
        if !question.is_empty() && !answer.is_empty() {
            pairs.push((question.to_string(), answer.to_string()));
        }
        pos = answer_end;
    }

    pairs
}

#[derive(Default)]
struct Segment {
    question: String,
    answer: Vec<String>,
}

fn heading_pairs(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let mut segments: Vec<Segment> = Vec::new();
    walk_segments(document.root_element(), &mut segments);

    segments
        .into_iter()
        .filter_map(|s| {
            let answer = collapse_whitespace(&s.answer.join(" "));
            (!s.question.is_empty() && !answer.is_empty()).then_some((s.question, answer))
        })
        .take(MAX_HEADING_PAIRS)
        .collect()
}

/// Every heading opens a segment; text that follows it lands in that segment's answer.
fn walk_segments(element: ElementRef, segments: &mut Vec<Segment>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if let Some(current) = segments.last_mut() {
                    current.answer.push(text.text.to_string());
                }
            }
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_hidden(&child_el) {
                    continue;
                }
                if is_heading(el.name()) {
                    segments.push(Segment {
                        question: element_text(child_el),
                        answer: Vec::new(),
                    });
                } else {
                    walk_segments(child_el, segments);
                }
            }
            _ => {}
        }
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn dedup_pairs(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|(q, a)| {
            seen.insert((
                truncate_chars(q, DEDUP_PREFIX).to_lowercase(),
                truncate_chars(a, DEDUP_PREFIX).to_lowercase(),
            ))
        })
        .take(MAX_PAIRS)
        .collect()
}
