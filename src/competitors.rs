use std::collections::HashSet;
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::Fetch;
use crate::utils::{host_of, registrable_domain};

const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";
const DDG_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const QUERY_DELAY: Duration = Duration::from_millis(500);

const QUERY_TEMPLATES: &[&str] = &[
    "{brand} competitors",
    "sites like {brand}",
    "alternatives to {brand}",
    "{brand} similar brands",
];

/// Hosts that show up in results but are never a competing store.
const EXCLUDED_HOSTS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "linkedin.com",
    "pinterest.com",
    "wikipedia.org",
    "medium.com",
    "crunchbase.com",
    "reddit.com",
    "apps.shopify.com",
    "github.com",
    "docs.google.com",
    "duckduckgo.com",
];

static RESULT_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(https?://[^"]+)""#).unwrap());

/// Looks up sites similar to a brand through a web search.
pub struct CompetitorFinder<'a> {
    fetcher: &'a dyn Fetch,
    serpapi_key: Option<String>,
    delay: Duration,
}

impl<'a> CompetitorFinder<'a> {
    pub fn new(fetcher: &'a dyn Fetch, serpapi_key: Option<&str>) -> Self {
        CompetitorFinder {
            fetcher,
            serpapi_key: serpapi_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            delay: QUERY_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Up to `max_results` competitor base URLs (`https://<domain>`).
    pub fn find(&self, brand: &str, base_url: &str, max_results: usize) -> Vec<String> {
        let own = host_of(base_url).map(|h| registrable_domain(&h));
        let mut seen: HashSet<String> = HashSet::new();
        let mut found = Vec::new();

        for (i, template) in QUERY_TEMPLATES.iter().enumerate() {
            if found.len() >= max_results {
                break;
            }
            if i > 0 && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }

            let query = template.replace("{brand}", brand);
            let links = match self.search(&query) {
                Ok(links) => links,
                Err(e) => {
                    warn!(query = query.as_str(), error = %e, "competitor search failed");
                    continue;
                }
            };
            debug!(query = query.as_str(), results = links.len(), "search results");

            for link in links {
                let Some(host) = host_of(&link) else {
                    continue;
                };
                if is_excluded(&host) {
                    continue;
                }
                let domain = registrable_domain(&host);
                if own.as_deref() == Some(domain.as_str()) || !seen.insert(domain.clone()) {
                    continue;
                }
                found.push(format!("https://{}", domain));
                if found.len() >= max_results {
                    break;
                }
            }
        }

        info!(brand, competitors = found.len(), "competitor lookup done");
        found
    }

    /// SerpAPI when a key is set; DuckDuckGo when it fails or finds nothing.
    fn search(&self, query: &str) -> Result<Vec<String>> {
        if let Some(key) = &self.serpapi_key {
            match self.serpapi(query, key) {
                Ok(links) if !links.is_empty() => return Ok(links),
                Ok(_) => debug!(query, "SerpAPI returned no links"),
                Err(e) => warn!(query, error = %e, "SerpAPI search failed"),
            }
        }
        self.duckduckgo(query)
    }

    fn serpapi(&self, query: &str, key: &str) -> Result<Vec<String>> {
        let url = Url::parse_with_params(
            SERPAPI_ENDPOINT,
            &[("engine", "google"), ("q", query), ("api_key", key), ("num", "10")],
        )?;
        let body = self.fetch_results(url.as_str())?;
        let json: Value = serde_json::from_str(&body).context("SerpAPI response is not JSON")?;
        Ok(json["organic_results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|r| r["link"].as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn duckduckgo(&self, query: &str) -> Result<Vec<String>> {
        let url = Url::parse_with_params(DDG_ENDPOINT, &[("q", query)])?;
        let body = self.fetch_results(url.as_str())?;
        Ok(RESULT_HREF_RE
            .captures_iter(&body)
            .map(|c| c[1].to_string())
            .collect())
    }

    fn fetch_results(&self, url: &str) -> Result<String> {
        let page = self.fetcher.get(url)?;
        if !page.is_ok() {
            bail!("search returned HTTP {}", page.status);
        }
        Ok(page.body)
    }
}

fn is_excluded(host: &str) -> bool {
    EXCLUDED_HOSTS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
}
