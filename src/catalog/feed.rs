use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::fetch::Fetch;

/// Raw product records gathered from `/products.json`, in feed order.
#[derive(Debug, Default)]
pub struct FeedWalk {
    pub records: Vec<Value>,
    pub pages: usize,
    /// Why the walk ended early, when it was not a short or empty page.
    pub halted: Option<String>,
}

/// Walk `base/products.json` page by page until the feed runs dry.
pub fn paginate(
    fetcher: &dyn Fetch,
    base: &str,
    page_size: usize,
    max_pages: usize,
    delay: Duration,
) -> FeedWalk {
    let mut walk = FeedWalk::default();

    for page in 1..=max_pages {
        if page > 1 && !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let url = format!("{}/products.json?limit={}&page={}", base, page_size, page);
        walk.pages += 1;
        let response = match fetcher.get(&url) {
            Ok(r) => r,
            Err(e) => {
                walk.halted = Some(format!("page {}: {:#}", page, e));
                break;
            }
        };
        if response.status != 200 {
            walk.halted = Some(format!("page {} returned HTTP {}", page, response.status));
            break;
        }
        let data: Value = match serde_json::from_str(&response.body) {
            Ok(v) => v,
            Err(e) => {
                walk.halted = Some(format!("page {} is not JSON: {}", page, e));
                break;
            }
        };

        let batch = match data.get("products").and_then(Value::as_array) {
            Some(b) if !b.is_empty() => b.clone(),
            _ => break,
        };
        let batch_len = batch.len();
        debug!(page, batch_len, "feed page");
        walk.records.extend(batch);

        if batch_len < page_size {
            break;
        }
    }

    info!(base, records = walk.records.len(), pages = walk.pages, "product feed walked");
    walk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StubFetcher;

    fn batch(n: usize, offset: usize) -> String {
        let products: Vec<Value> = (0..n)
            .map(|i| serde_json::json!({ "id": offset + i, "handle": format!("p-{}", offset + i) }))
            .collect();
        serde_json::json!({ "products": products }).to_string()
    }

    fn page_url(page: usize) -> String {
        format!("https://a.com/products.json?limit=250&page={}", page)
    }

    #[test]
    fn short_page_ends_the_walk() {
        let stub = StubFetcher::new()
            .page(&page_url(1), 200, &batch(250, 0))
            .page(&page_url(2), 200, &batch(40, 250));

        let walk = paginate(&stub, "https://a.com", 250, 50, Duration::ZERO);

        assert_eq!(walk.records.len(), 290);
        assert_eq!(walk.pages, 2);
        assert!(walk.halted.is_none());
        assert!(!stub.was_requested(&page_url(3)));
        assert_eq!(walk.records[250]["handle"], "p-250");
    }

    #[test]
    fn page_cap_is_respected() {
        let small = |page: usize| format!("https://a.com/products.json?limit=2&page={}", page);
        let stub = StubFetcher::new()
            .page(&small(1), 200, &batch(2, 0))
            .page(&small(2), 200, &batch(2, 2))
            .page(&small(3), 200, &batch(2, 4));

        let walk = paginate(&stub, "https://a.com", 2, 2, Duration::ZERO);
        assert_eq!(walk.records.len(), 4);
        assert_eq!(stub.requested().len(), 2);
    }

    #[test]
    fn partial_results_survive_failures() {
        let stub = StubFetcher::new()
            .page(&page_url(1), 200, &batch(250, 0))
            .page(&page_url(2), 200, "<html>rate limited</html>");

        let walk = paginate(&stub, "https://a.com", 250, 50, Duration::ZERO);
        assert_eq!(walk.records.len(), 250);
        assert!(walk.halted.unwrap().contains("not JSON"));
    }

    #[test]
    fn missing_feed_reports_status() {
        let stub = StubFetcher::new();
        let walk = paginate(&stub, "https://a.com", 250, 50, Duration::ZERO);
        assert!(walk.records.is_empty());
        assert_eq!(walk.halted.as_deref(), Some("page 1 returned HTTP 404"));
    }

    #[test]
    fn transport_error_stops_quietly() {
        let stub = StubFetcher::new().fail(&page_url(1));
        let walk = paginate(&stub, "https://a.com", 250, 50, Duration::ZERO);
        assert!(walk.records.is_empty());
        assert!(walk.halted.unwrap().contains("connection reset"));
    }

    #[test]
    fn empty_batch_is_clean_end() {
        let stub = StubFetcher::new().page(&page_url(1), 200, r#"{"products": []}"#);
        let walk = paginate(&stub, "https://a.com", 250, 50, Duration::ZERO);
        assert!(walk.records.is_empty());
        assert!(walk.halted.is_none());
    }
}
