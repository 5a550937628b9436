use anyhow::{Context, Result};
use tracing::debug;

use crate::fetch::Fetch;
use crate::models::{Contact, Faq};
use crate::parser::faq::{find_faq_pairs, MAX_PAIRS};
use crate::parser::links::{find_by_keywords, LinkMap};
use crate::parser::text::{clean_text, extract_emails, extract_phones};
use crate::utils::truncate_chars;

pub const MAX_ABOUT_CHARS: usize = 5000;
pub const MAX_FAQS: usize = 50;
const MAX_FAQ_SOURCES: usize = 5;
const FAQ_KEYWORDS: &[&str] = &["faq", "faqs", "help"];
const FAQ_PATHS: &[&str] = &[
    "/pages/faq",
    "/pages/faqs",
    "/pages/support",
    "/apps/help-center",
    "/pages/help-center",
];

/// Cleaned text of the about page, bounded.
pub fn about_text(fetcher: &dyn Fetch, about_url: &str) -> Result<Option<String>> {
    let page = fetcher
        .get(about_url)
        .with_context(|| format!("about page {}", about_url))?;
    Ok(page
        .ok_body()
        .map(|body| truncate_chars(&clean_text(body), MAX_ABOUT_CHARS))
        .filter(|text| !text.is_empty()))
}

/// Result of reading several pages where any one of them may fail.
#[derive(Debug, Default)]
pub struct Harvest<T> {
    pub value: T,
    pub errors: Vec<String>,
}

/// Emails and phones from the home page plus the contact page, if any.
pub fn contact_info(
    fetcher: &dyn Fetch,
    home_html: &str,
    contact_page: Option<&str>,
) -> Harvest<Contact> {
    let mut texts = vec![clean_text(home_html)];
    let mut errors = Vec::new();

    if let Some(url) = contact_page {
        match fetcher.get(url) {
            Ok(page) => {
                if let Some(body) = page.ok_body() {
                    texts.push(clean_text(body));
                }
            }
            Err(e) => errors.push(format!("contact page: {:#}", e)),
        }
    }

    let all = texts.join(" ");
    Harvest {
        value: Contact {
            emails: extract_emails(&all),
            phones: extract_phones(&all),
            contact_page: contact_page.map(str::to_string),
        },
        errors,
    }
}

/// Candidate FAQ pages: a matching link first, then the usual paths.
pub fn faq_sources(base: &str, links: &LinkMap) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    let candidates = find_by_keywords(links, FAQ_KEYWORDS)
        .into_iter()
        .chain(FAQ_PATHS.iter().map(|p| format!("{}{}", base, p)));

    // The cap applies before de-duplication.
    for url in candidates.take(MAX_FAQ_SOURCES) {
        if !sources.contains(&url) {
            sources.push(url);
        }
    }
    sources
}

/// FAQs from each source page in turn, until enough are gathered.
/// `value.1` is the first source that answered with a page.
pub fn collect_faqs(fetcher: &dyn Fetch, sources: &[String]) -> Harvest<(Vec<Faq>, Option<String>)> {
    let mut faqs = Vec::new();
    let mut first_source = None;
    let mut errors = Vec::new();

    for url in sources {
        let page = match fetcher.get(url) {
            Ok(p) => p,
            Err(e) => {
                errors.push(format!("{}: {:#}", url, e));
                continue;
            }
        };
        let Some(body) = page.ok_body() else {
            continue;
        };
        first_source.get_or_insert_with(|| url.clone());

        let pairs = find_faq_pairs(body);
        debug!(url = url.as_str(), pairs = pairs.len(), "faq source");
        faqs.extend(pairs.into_iter().take(MAX_PAIRS).map(|(question, answer)| Faq {
            question,
            answer,
            url: Some(url.clone()),
        }));
        if faqs.len() >= MAX_FAQS {
            break;
        }
    }

    faqs.truncate(MAX_FAQS);
    Harvest {
        value: (faqs, first_source),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StubFetcher;
    use crate::parser::links::discover_links;

    const BASE: &str = "https://shop.example.com";

    #[test]
    fn about_text_is_truncated() {
        let long = format!("<p>{}</p>", "story ".repeat(2000));
        let stub = StubFetcher::new().page("https://shop.example.com/pages/about", 200, &long);
        let text = about_text(&stub, "https://shop.example.com/pages/about")
            .unwrap()
            .unwrap();
        assert_eq!(text.chars().count(), MAX_ABOUT_CHARS);
    }

    #[test]
    fn about_text_missing_page_is_none() {
        let stub = StubFetcher::new();
        assert!(about_text(&stub, "https://shop.example.com/pages/about").unwrap().is_none());
    }

    #[test]
    fn contact_merges_home_and_contact_page() {
        let home = std::fs::read_to_string("tests/fixtures/home.html").unwrap();
        let stub = StubFetcher::new().page(
            "https://shop.example.com/pages/contact",
            200,
            "<p>Wholesale: sales@example.com, +44 20 7946 0958</p>",
        );

        let harvest = contact_info(&stub, &home, Some("https://shop.example.com/pages/contact"));
        let contact = harvest.value;
        assert_eq!(contact.emails, ["hello@example.com", "sales@example.com"]);
        assert_eq!(contact.phones, ["+15550109999", "+442079460958"]);
        assert_eq!(
            contact.contact_page.as_deref(),
            Some("https://shop.example.com/pages/contact")
        );
        assert!(harvest.errors.is_empty());
    }

    #[test]
    fn contact_page_failure_keeps_home_results() {
        let stub = StubFetcher::new().fail("https://shop.example.com/pages/contact");
        let harvest = contact_info(
            &stub,
            "<p>hi@shop.com</p>",
            Some("https://shop.example.com/pages/contact"),
        );
        assert_eq!(harvest.value.emails, ["hi@shop.com"]);
        assert_eq!(harvest.errors.len(), 1);
    }

    #[test]
    fn faq_sources_prefer_links_and_dedupe() {
        let links = discover_links(BASE, r#"<a href="/pages/faq">FAQ</a>"#);
        let sources = faq_sources(BASE, &links);
        assert_eq!(
            sources,
            [
                "https://shop.example.com/pages/faq",
                "https://shop.example.com/pages/faqs",
                "https://shop.example.com/pages/support",
                "https://shop.example.com/apps/help-center",
            ]
        );
    }

    #[test]
    fn faqs_capped_across_sources() {
        let many: String = (0..40)
            .map(|i| format!("Q) Question {i}? A) Answer {i}. "))
            .collect();
        let sources = vec![
            "https://shop.example.com/pages/faq".to_string(),
            "https://shop.example.com/pages/faqs".to_string(),
            "https://shop.example.com/pages/support".to_string(),
        ];
        let stub = StubFetcher::new()
            .fail("https://shop.example.com/pages/faq")
            .page("https://shop.example.com/pages/faqs", 200, &format!("<p>{}</p>", many))
            .page("https://shop.example.com/pages/support", 200, &format!("<div>{}</div>", many));

        let harvest = collect_faqs(&stub, &sources);
        let (faqs, first) = harvest.value;
        assert_eq!(faqs.len(), MAX_FAQS);
        assert_eq!(first.as_deref(), Some("https://shop.example.com/pages/faqs"));
        assert_eq!(faqs[0].question, "Question 0?");
        assert_eq!(faqs[49].url.as_deref(), Some("https://shop.example.com/pages/support"));
        assert_eq!(harvest.errors.len(), 1);
    }
}
