use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::text::element_text;

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// An `<a href>` as written in the page, with its visible text.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// All anchors of a page in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SEL)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            Some(Anchor {
                href: href.to_string(),
                text: element_text(el),
            })
        })
        .collect()
}

/// Same-origin links of a page: URL → lowercased anchor text, first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct LinkMap {
    entries: Vec<(String, String)>,
    seen: HashSet<String>,
}

impl LinkMap {
    pub fn insert_if_absent(&mut self, url: String, text: String) {
        if self.seen.insert(url.clone()) {
            self.entries.push((url, text));
        }
    }

    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(u, t)| (u.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn discover_links(base: &str, html: &str) -> LinkMap {
    let mut links = LinkMap::default();
    let Ok(base_url) = Url::parse(base) else {
        return links;
    };

    for anchor in anchors(html) {
        let href = anchor.href.as_str();
        let lower = href.to_ascii_lowercase();
        if href.is_empty()
            || href.starts_with('#')
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
            || lower.starts_with("javascript:")
        {
            continue;
        }
        let Ok(resolved) = base_url.join(href) else {
            continue;
        };
        if !same_origin(&base_url, &resolved) {
            continue;
        }
        links.insert_if_absent(resolved.to_string(), anchor.text.to_lowercase());
    }

    links
}

/// Same host; the scheme may differ. A port written in the link must match the base.
fn same_origin(base: &Url, other: &Url) -> bool {
    base.host_str() == other.host_str()
        && other
            .port()
            .map_or(true, |port| Some(port) == base.port_or_known_default())
}

/// First link (in page order) whose URL or text contains any keyword.
pub fn find_by_keywords(links: &LinkMap, keywords: &[&str]) -> Option<String> {
    links
        .iter()
        .find(|(url, text)| {
            let url = url.to_lowercase();
            let text = text.to_lowercase();
            keywords.iter().any(|k| {
                let k = k.to_lowercase();
                url.contains(&k) || text.contains(&k)
            })
        })
        .map(|(url, _)| url.to_string())
}
