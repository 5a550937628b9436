use tracing::debug;

use crate::fetch::{Fetch, Page};
use crate::parser::links::{find_by_keywords, LinkMap};
use crate::parser::text::clean_text;

/// One way of locating a page. Attempts are tried in order; the first hit wins.
#[derive(Debug, Clone, Copy)]
pub enum Attempt<'a> {
    /// A discovered link whose URL or text contains one of the keywords.
    Keywords(&'a [&'a str]),
    /// `base + path` answers HTTP 200.
    Exists(&'a str),
    /// `base + path` answers HTTP 200 and its text mentions one of `any_of`.
    Mentions { path: &'a str, any_of: &'a [&'a str] },
}

/// Ordered fallback lookup over a site's link map and conventional paths.
pub struct Resolver<'a> {
    fetcher: &'a dyn Fetch,
    base: &'a str,
    links: &'a LinkMap,
    errors: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(fetcher: &'a dyn Fetch, base: &'a str, links: &'a LinkMap) -> Self {
        Resolver {
            fetcher,
            base,
            links,
            errors: Vec::new(),
        }
    }

    pub fn resolve(&mut self, attempts: &[Attempt]) -> Option<String> {
        attempts.iter().find_map(|attempt| self.try_attempt(attempt))
    }

    /// Transport failures seen since the last call, for diagnostics.
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    fn try_attempt(&mut self, attempt: &Attempt) -> Option<String> {
        match *attempt {
            Attempt::Keywords(keywords) => find_by_keywords(self.links, keywords),
            Attempt::Exists(path) => {
                let url = self.url_for(path);
                let page = self.probe(&url)?;
                (page.status == 200).then_some(url)
            }
            Attempt::Mentions { path, any_of } => {
                let url = self.url_for(path);
                let page = self.probe(&url)?;
                let body = page.ok_body()?;
                let text = clean_text(body).to_lowercase();
                any_of.iter().any(|k| text.contains(k)).then_some(url)
            }
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn probe(&mut self, url: &str) -> Option<Page> {
        match self.fetcher.get(url) {
            Ok(page) => {
                debug!(url, status = page.status, "probe");
                Some(page)
            }
            Err(e) => {
                debug!(url, error = %e, "probe failed");
                self.errors.push(format!("{:#}", e));
                None
            }
        }
    }
}
