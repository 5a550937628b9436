use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::debug;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// One fetched page: final status and body text.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_ok(&self) -> bool {
        self.status < 400
    }

    /// Body of a 200 response, `None` for anything else.
    pub fn ok_body(&self) -> Option<&str> {
        (self.status == 200 && !self.body.is_empty()).then_some(self.body.as_str())
    }
}

/// Blocking GET used by every step of an analysis.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<Page>;
}

/// `Fetch` over a dedicated reqwest client. Each analysis gets its own.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Page> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {} failed", url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("Failed to read body of {}", url))?;
        debug!(url, status, bytes = body.len(), "fetched");
        Ok(Page { status, body })
    }
}

#[cfg(test)]
pub use stub::StubFetcher;

#[cfg(test)]
mod stub {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use anyhow::{anyhow, Result};

    use super::{Fetch, Page};

    /// In-memory site: unknown URLs answer 404, `fail` URLs error out.
    #[derive(Default)]
    pub struct StubFetcher {
        pages: HashMap<String, Page>,
        failing: Vec<String>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, status: u16, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Page {
                    status,
                    body: body.to_string(),
                },
            );
            self
        }

        pub fn fail(mut self, url: &str) -> Self {
            self.failing.push(url.to_string());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.borrow().clone()
        }

        pub fn was_requested(&self, url: &str) -> bool {
            self.requested.borrow().iter().any(|u| u == url)
        }
    }

    impl Fetch for StubFetcher {
        fn get(&self, url: &str) -> Result<Page> {
            self.requested.borrow_mut().push(url.to_string());
            if self.failing.iter().any(|u| u == url) {
                return Err(anyhow!("connection reset: {}", url));
            }
            Ok(self.pages.get(url).cloned().unwrap_or(Page {
                status: 404,
                body: String::new(),
            }))
        }
    }
}
