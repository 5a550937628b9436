use crate::models::SocialHandles;
use crate::parser::links::anchors;
use crate::utils::host_of;

/// Registered domain → platform.
const PLATFORMS: &[(&str, &str)] = &[
    ("instagram.com", "instagram"),
    ("facebook.com", "facebook"),
    ("fb.com", "facebook"),
    ("tiktok.com", "tiktok"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("youtube.com", "youtube"),
    ("youtu.be", "youtube"),
    ("pinterest.com", "pinterest"),
    ("linkedin.com", "linkedin"),
    ("threads.net", "threads"),
];

/// Share-widget URLs point at the platform but not at the brand.
const SHARE_MARKERS: &[&str] = &["share", "intent/tweet"];

pub fn extract_socials(html: &str) -> SocialHandles {
    let mut socials = SocialHandles::default();

    for anchor in anchors(html) {
        let href = anchor.href;
        if !href.starts_with("http") {
            continue;
        }
        let Some(host) = host_of(&href) else {
            continue;
        };
        let labels: Vec<&str> = host.split('.').collect();
        let registered = labels[labels.len().saturating_sub(2)..].join(".");
        let Some(platform) = platform_for(&registered) else {
            continue;
        };
        if SHARE_MARKERS.iter().any(|m| href.contains(m)) {
            continue;
        }
        let Some(slot) = slot_for(&mut socials, platform) else {
            continue;
        };
        if slot.is_none() {
            *slot = Some(href);
        }
    }

    socials
}

fn platform_for(domain: &str) -> Option<&'static str> {
    PLATFORMS
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, p)| *p)
}

fn slot_for<'a>(socials: &'a mut SocialHandles, platform: &str) -> Option<&'a mut Option<String>> {
    match platform {
        "instagram" => Some(&mut socials.instagram),
        "facebook" => Some(&mut socials.facebook),
        "tiktok" => Some(&mut socials.tiktok),
        "twitter" => Some(&mut socials.twitter),
        "youtube" => Some(&mut socials.youtube),
        "pinterest" => Some(&mut socials.pinterest),
        "linkedin" => Some(&mut socials.linkedin),
        "threads" => Some(&mut socials.threads),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_page_socials() {
        let html = std::fs::read_to_string("tests/fixtures/home.html").unwrap();
        let s = extract_socials(&html);
        assert_eq!(s.instagram.as_deref(), Some("https://www.instagram.com/exampleshop/"));
        assert_eq!(s.facebook.as_deref(), Some("https://facebook.com/exampleshop"));
        assert_eq!(s.twitter.as_deref(), Some("https://x.com/exampleshop"));
        assert_eq!(s.youtube.as_deref(), Some("https://www.youtube.com/@exampleshop"));
        assert!(s.tiktok.is_none());
        assert!(s.linkedin.is_none());
    }

    #[test]
    fn subdomains_and_short_domains_map() {
        let html = r#"<a href="https://m.facebook.com/brand">fb</a>
                      <a href="https://youtu.be/abc">yt</a>
                      <a href="https://www.threads.net/@brand">threads</a>"#;
        let s = extract_socials(html);
        assert_eq!(s.facebook.as_deref(), Some("https://m.facebook.com/brand"));
        assert_eq!(s.youtube.as_deref(), Some("https://youtu.be/abc"));
        assert_eq!(s.threads.as_deref(), Some("https://www.threads.net/@brand"));
    }

    #[test]
    fn relative_and_unknown_links_ignored() {
        let html = r#"<a href="/instagram">ig</a><a href="https://vimeo.com/brand">v</a>"#;
        assert_eq!(extract_socials(html), SocialHandles::default());
    }
}
