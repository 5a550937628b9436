use anyhow::anyhow;
use rayon::prelude::*;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::analyzer::{AnalyzeError, Analyzer, FeedOptions};
use crate::competitors::CompetitorFinder;
use crate::config::Settings;
use crate::db;
use crate::fetch::{Fetch, HttpFetcher};
use crate::models::StoreContext;
use crate::utils::{host_of, registrable_domain};

/// Builds a fresh fetcher for each independent analysis.
pub type FetcherFactory = dyn Fn() -> anyhow::Result<Box<dyn Fetch>> + Sync;

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub website_url: String,
    pub include_competitors: bool,
    pub persist: bool,
}

/// The primary store's context with competitor contexts alongside.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub brand: StoreContext,
    pub competitor_contexts: Vec<StoreContext>,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct Service<'a> {
    settings: &'a Settings,
    new_fetcher: &'a FetcherFactory,
}

impl<'a> Service<'a> {
    pub fn new(settings: &'a Settings, new_fetcher: &'a FetcherFactory) -> Self {
        Service {
            settings,
            new_fetcher,
        }
    }

    pub fn handle(
        &self,
        request: &AnalyzeRequest,
        store: Option<&Connection>,
    ) -> Result<AnalyzeResponse, ServiceError> {
        let store = match (request.persist, store) {
            (true, Some(conn)) => Some(conn),
            (true, None) => return Err(anyhow!("persistence requested but no store is open").into()),
            (false, _) => None,
        };

        let mut brand = self.analyze_one(&request.website_url).map_err(|e| match e {
            e @ AnalyzeError::NotFound { .. } => ServiceError::NotFound(e.to_string()),
            other => ServiceError::Internal(other.into()),
        })?;
        if let Some(conn) = store {
            db::persist(conn, &brand)?;
        }

        let mut competitor_contexts = Vec::new();
        if request.include_competitors {
            brand.competitors = self.find_competitors(&brand)?;
            competitor_contexts = self.analyze_competitors(&brand.competitors);
            if let Some(conn) = store {
                for ctx in &competitor_contexts {
                    if let Err(e) = db::persist(conn, ctx) {
                        warn!(competitor = ctx.website_url.as_str(), error = %e, "competitor not saved");
                    }
                }
            }
        }

        Ok(AnalyzeResponse {
            brand,
            competitor_contexts,
        })
    }

    fn analyze_one(&self, url: &str) -> Result<StoreContext, AnalyzeError> {
        let fetcher = (self.new_fetcher)().map_err(|e| AnalyzeError::FetchFailure {
            url: url.to_string(),
            reason: format!("{:#}", e),
        })?;
        Analyzer::new(fetcher.as_ref(), FeedOptions::from(self.settings)).analyze(url)
    }

    fn find_competitors(&self, brand: &StoreContext) -> anyhow::Result<Vec<String>> {
        let name = brand
            .brand
            .clone()
            .or_else(|| host_of(&brand.website_url).map(|h| registrable_domain(&h)))
            .unwrap_or_default();
        let fetcher = (self.new_fetcher)()?;
        let finder = CompetitorFinder::new(fetcher.as_ref(), self.settings.serpapi_key.as_deref())
            .with_delay(self.settings.search_delay());
        Ok(finder.find(&name, &brand.website_url, self.settings.max_competitors))
    }

    /// Each competitor runs on its own rayon worker with its own fetcher.
    fn analyze_competitors(&self, urls: &[String]) -> Vec<StoreContext> {
        let results: Vec<_> = urls
            .par_iter()
            .map(|url| (url, self.analyze_one(url)))
            .collect();

        results
            .into_iter()
            .filter_map(|(url, result)| match result {
                Ok(ctx) => Some(ctx),
                Err(e) => {
                    warn!(competitor = url.as_str(), error = %e, "competitor dropped");
                    None
                }
            })
            .inspect(|ctx| info!(competitor = ctx.website_url.as_str(), "competitor analyzed"))
            .collect()
    }
}

/// Factory for real HTTP fetchers configured from `settings`.
pub fn http_fetchers(settings: &Settings) -> impl Fn() -> anyhow::Result<Box<dyn Fetch>> + Sync {
    let user_agent = settings.user_agent.clone();
    let timeout = settings.request_timeout();
    move || Ok(Box::new(HttpFetcher::new(&user_agent, timeout)?) as Box<dyn Fetch>)
}
