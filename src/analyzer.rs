use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{hero_products, map_product, paginate};
use crate::classify::content::{about_text, collect_faqs, contact_info, faq_sources};
use crate::classify::{extract_socials, resolve_important, resolve_policies, Resolver};
use crate::config::Settings;
use crate::fetch::Fetch;
use crate::models::StoreContext;
use crate::parser::links::discover_links;
use crate::utils::{brand_from_url, normalize_base};

const SHOPIFY_HINTS: &[&str] = &["cdn.shopify.com", "shopify.theme", "shopifyanalytics", "shopify-section"];

/// The two ways an analysis fails outright. Everything else lands in diagnostics.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Website not found (404): {url}")]
    NotFound { url: String },
    #[error("Failed to fetch website {url}: {reason}")]
    FetchFailure { url: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub page_size: usize,
    pub max_pages: usize,
    pub page_delay: Duration,
}

impl From<&Settings> for FeedOptions {
    fn from(settings: &Settings) -> Self {
        FeedOptions {
            page_size: settings.page_size,
            max_pages: settings.max_pages,
            page_delay: settings.page_delay(),
        }
    }
}

/// Runs one storefront analysis over a fetcher it does not share.
pub struct Analyzer<'a> {
    fetcher: &'a dyn Fetch,
    feed: FeedOptions,
}

impl<'a> Analyzer<'a> {
    pub fn new(fetcher: &'a dyn Fetch, feed: FeedOptions) -> Self {
        Analyzer { fetcher, feed }
    }

    pub fn analyze(&self, url: &str) -> Result<StoreContext, AnalyzeError> {
        let base = normalize_base(url).map_err(|e| AnalyzeError::FetchFailure {
            url: url.to_string(),
            reason: format!("{:#}", e),
        })?;
        let html = self.fetch_home(&base)?;

        let mut ctx = StoreContext::new(brand_from_url(&base), base.clone());
        ctx.raw_notes
            .note("shopify_like", looks_like_shopify(&html).to_string());

        let links = discover_links(&base, &html);
        info!(base = base.as_str(), links = links.len(), "home page parsed");
        if links.is_empty() {
            warn!(base = base.as_str(), "no same-site links on the home page");
        }

        // Catalog
        let walk = paginate(
            self.fetcher,
            &base,
            self.feed.page_size,
            self.feed.max_pages,
            self.feed.page_delay,
        );
        ctx.whole_catalog = walk.records.iter().map(|raw| map_product(raw, &base)).collect();
        ctx.raw_notes
            .note("product_count", ctx.whole_catalog.len().to_string());
        if let Some(reason) = walk.halted {
            warn!(base = base.as_str(), %reason, "product feed incomplete");
            ctx.raw_notes.note("products_error", reason);
        }

        match hero_products(&base, &html) {
            Ok(heroes) => ctx.hero_products = heroes,
            Err(e) => record(&mut ctx, "hero_error", vec![format!("{:#}", e)]),
        }

        let mut resolver = Resolver::new(self.fetcher, &base, &links);

        ctx.policy_links = resolve_policies(&mut resolver);
        record(&mut ctx, "policies_error", resolver.take_errors());

        ctx.socials = extract_socials(&html);

        ctx.important_links = resolve_important(&mut resolver);
        record(&mut ctx, "important_links_error", resolver.take_errors());

        if let Some(about_url) = ctx.important_links.about.clone() {
            match about_text(self.fetcher, &about_url) {
                Ok(text) => ctx.about_text = text,
                Err(e) => record(&mut ctx, "about_error", vec![format!("{:#}", e)]),
            }
        }

        let contact = contact_info(
            self.fetcher,
            &html,
            ctx.important_links.contact_us.as_deref(),
        );
        ctx.contact = contact.value;
        record(&mut ctx, "contact_error", contact.errors);

        let sources = faq_sources(&base, &links);
        let harvest = collect_faqs(self.fetcher, &sources);
        let (faqs, faq_page) = harvest.value;
        ctx.faqs = faqs;
        ctx.important_links.faq = faq_page;
        record(&mut ctx, "faqs_error", harvest.errors);

        ctx.analyzed_at = Utc::now();
        info!(
            base = base.as_str(),
            products = ctx.whole_catalog.len(),
            heroes = ctx.hero_products.len(),
            faqs = ctx.faqs.len(),
            "analysis complete"
        );
        Ok(ctx)
    }

    fn fetch_home(&self, base: &str) -> Result<String, AnalyzeError> {
        let page = self.fetcher.get(base).map_err(|e| AnalyzeError::FetchFailure {
            url: base.to_string(),
            reason: format!("{:#}", e),
        })?;

        if page.status == 404 {
            return Err(AnalyzeError::NotFound {
                url: base.to_string(),
            });
        }
        if !page.is_ok() {
            return Err(AnalyzeError::FetchFailure {
                url: base.to_string(),
                reason: format!("status {}", page.status),
            });
        }
        if page.body.trim().is_empty() {
            return Err(AnalyzeError::FetchFailure {
                url: base.to_string(),
                reason: format!("empty body (status {})", page.status),
            });
        }
        Ok(page.body)
    }
}

fn record(ctx: &mut StoreContext, step: &str, errors: Vec<String>) {
    if errors.is_empty() {
        return;
    }
    warn!(step, errors = errors.len(), "step failed");
    ctx.raw_notes.note(step, errors.join("; "));
}

/// Advisory only; never changes what the analysis does.
pub fn looks_like_shopify(html: &str) -> bool {
    let lower = html.to_lowercase();
    SHOPIFY_HINTS.iter().any(|h| lower.contains(h))
}
