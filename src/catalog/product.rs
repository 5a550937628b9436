use std::collections::HashSet;

use serde_json::Value;
use url::Url;

use crate::models::Product;
use crate::parser::links::anchors;

pub const MAX_HERO_PRODUCTS: usize = 12;

/// Map one raw `/products.json` record onto a `Product`.
pub fn map_product(raw: &Value, base: &str) -> Product {
    let handle = raw
        .get("handle")
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| handle.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let image = raw
        .get("images")
        .and_then(Value::as_array)
        .and_then(|imgs| imgs.first())
        .and_then(|img| img.get("src"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let variants: &[Value] = raw
        .get("variants")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let prices: Vec<f64> = variants
        .iter()
        .filter_map(|v| v.get("price").and_then(parse_price))
        .collect();
    let price_min = prices.iter().copied().reduce(f64::min);
    let price_max = prices.iter().copied().reduce(f64::max);

    let available = (!variants.is_empty()).then(|| {
        variants
            .iter()
            .any(|v| v.get("available").and_then(Value::as_bool).unwrap_or(false))
    });

    Product {
        id: raw.get("id").and_then(external_id),
        url: handle.as_ref().map(|h| format!("{}/products/{}", base, h)),
        title,
        handle,
        image,
        price_min,
        price_max,
        available,
        tags: raw.get("tags").map(parse_tags).unwrap_or_default(),
    }
}

fn external_id(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Shopify sends prices as strings ("19.00"); some feeds use numbers.
fn parse_price(price: &Value) -> Option<f64> {
    match price {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_tags(tags: &Value) -> Vec<String> {
    let raw: Vec<&str> = match tags {
        Value::String(s) => s.split(',').collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Products linked straight from the home page, in page order.
pub fn hero_products(base: &str, html: &str) -> anyhow::Result<Vec<Product>> {
    let base_url = Url::parse(base)?;
    let mut seen = HashSet::new();
    let mut products = Vec::new();

    for anchor in anchors(html) {
        if !anchor.href.contains("/products/") {
            continue;
        }
        let Ok(resolved) = base_url.join(&anchor.href) else {
            continue;
        };
        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }
        let handle = url
            .trim_end_matches('/')
            .rsplit("/products/")
            .next()
            .unwrap_or_default()
            .to_string();
        let title = if anchor.text.is_empty() {
            handle.clone()
        } else {
            anchor.text
        };

        products.push(Product {
            id: None,
            title,
            handle: Some(handle),
            url: Some(url),
            image: None,
            price_min: None,
            price_max: None,
            available: None,
            tags: Vec::new(),
        });
        if products.len() >= MAX_HERO_PRODUCTS {
            break;
        }
    }

    Ok(products)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const BASE: &str = "https://shop.example.com";

    #[test]
    fn price_range_from_variants() {
        let raw = json!({
            "id": 7001,
            "title": "Wool Runner",
            "handle": "wool-runner",
            "variants": [
                { "price": 12.0, "available": false },
                { "price": "8.50", "available": true },
                { "price": 20.0, "available": false },
                { "price": null }
            ]
        });
        let p = map_product(&raw, BASE);
        assert_eq!(p.id.as_deref(), Some("7001"));
        assert_eq!(p.price_min, Some(8.5));
        assert_eq!(p.price_max, Some(20.0));
        assert_eq!(p.available, Some(true));
        assert_eq!(p.url.as_deref(), Some("https://shop.example.com/products/wool-runner"));
    }

    #[test]
    fn no_variants_means_unknown_price_and_availability() {
        for raw in [json!({ "title": "A", "variants": [] }), json!({ "title": "B" })] {
            let p = map_product(&raw, BASE);
            assert_eq!(p.price_min, None);
            assert_eq!(p.price_max, None);
            assert_eq!(p.available, None);
        }
    }

    #[test]
    fn variants_without_prices_keep_availability() {
        let raw = json!({ "title": "A", "variants": [{ "available": false }] });
        let p = map_product(&raw, BASE);
        assert_eq!(p.price_min, None);
        assert_eq!(p.available, Some(false));
    }

    #[test]
    fn title_falls_back_to_handle_then_unknown() {
        let p = map_product(&json!({ "title": "", "handle": "socks" }), BASE);
        assert_eq!(p.title, "socks");
        let p = map_product(&json!({}), BASE);
        assert_eq!(p.title, "Unknown");
        assert!(p.url.is_none());
    }

    #[test]
    fn tags_from_string_or_list() {
        let p = map_product(&json!({ "tags": "wool, men ,,sale" }), BASE);
        assert_eq!(p.tags, ["wool", "men", "sale"]);
        let p = map_product(&json!({ "tags": ["eco", 3, "", " new "] }), BASE);
        assert_eq!(p.tags, ["eco", "new"]);
    }

    #[test]
    fn first_image_is_primary() {
        let raw = json!({ "images": [{ "src": "https://cdn/a.jpg" }, { "src": "https://cdn/b.jpg" }] });
        assert_eq!(map_product(&raw, BASE).image.as_deref(), Some("https://cdn/a.jpg"));
    }

    #[test]
    fn hero_products_deduplicated_in_page_order() {
        let html = std::fs::read_to_string("tests/fixtures/home.html").unwrap();
        let heroes = hero_products(BASE, &html).unwrap();
        let handles: Vec<_> = heroes.iter().filter_map(|p| p.handle.as_deref()).collect();
        assert_eq!(handles, ["wool-runner", "tree-dasher", "sock-pack"]);
        assert_eq!(heroes[0].title, "Wool Runner");
        assert_eq!(heroes[1].title, "tree-dasher");
    }

    #[test]
    fn hero_products_are_bounded() {
        let html: String = (0..30)
            .map(|i| format!(r#"<a href="/products/item-{i}">Item {i}</a>"#))
            .collect();
        assert_eq!(hero_products(BASE, &html).unwrap().len(), MAX_HERO_PRODUCTS);
    }
}
