use anyhow::{anyhow, Result};
use url::Url;

/// Second-level suffixes under which the registrable name sits one label deeper.
const COMPOUND_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "co.nz", "co.jp",
    "co.in", "com.br", "com.mx", "co.za", "com.sg", "com.hk", "com.tr", "co.kr",
];

/// Reduce any storefront URL to `scheme://host[:port]`.
pub fn normalize_base(url: &str) -> Result<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    let parsed = Url::parse(&with_scheme)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("URL has no host: {}", url))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Lowercased host of `url` without a leading `www.`.
pub fn host_of(url: &str) -> Option<String> {
    let host = Url::parse(url).ok()?.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// `shop.example.co.uk` → `example.co.uk`, `www.allbirds.com` → `allbirds.com`.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return labels.join(".");
    }
    let tail = labels[labels.len() - 2..].join(".");
    let keep = if COMPOUND_SUFFIXES.contains(&tail.as_str()) { 3 } else { 2 };
    labels[labels.len() - keep..].join(".")
}

/// Display brand derived from the site's domain label, e.g. `Allbirds`.
pub fn brand_from_url(base: &str) -> Option<String> {
    let host = host_of(base)?;
    let domain = registrable_domain(&host);
    let label = domain.split('.').next().filter(|l| !l.is_empty())?;
    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
