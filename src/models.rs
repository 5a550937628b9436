use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<String>,
    pub title: String,
    pub handle: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub available: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyLinks {
    pub privacy_policy: Option<String>,
    pub returns_policy: Option<String>,
    pub refunds_policy: Option<String>,
    pub terms_of_service: Option<String>,
    pub shipping_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialHandles {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub tiktok: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub pinterest: Option<String>,
    pub linkedin: Option<String>,
    pub threads: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub contact_page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportantLinks {
    pub order_tracking: Option<String>,
    pub contact_us: Option<String>,
    pub blogs: Option<String>,
    pub about: Option<String>,
    pub faq: Option<String>,
}

/// Per-step notes in insertion order; one entry per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<(String, String)>,
}

impl Diagnostics {
    /// Record `note` under `key`, replacing an earlier note in place.
    pub fn note(&mut self, key: &str, note: impl Into<String>) {
        let note = note.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = note,
            None => self.entries.push((key.to_string(), note)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Diagnostics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Everything learned about one storefront in a single analysis.
#[derive(Debug, Clone, Serialize)]
pub struct StoreContext {
    pub brand: Option<String>,
    pub website_url: String,
    pub whole_catalog: Vec<Product>,
    pub hero_products: Vec<Product>,
    pub policy_links: PolicyLinks,
    pub faqs: Vec<Faq>,
    pub socials: SocialHandles,
    pub contact: Contact,
    pub about_text: Option<String>,
    pub important_links: ImportantLinks,
    pub raw_notes: Diagnostics,
    pub competitors: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl StoreContext {
    pub fn new(brand: Option<String>, website_url: String) -> Self {
        StoreContext {
            brand,
            website_url,
            whole_catalog: Vec::new(),
            hero_products: Vec::new(),
            policy_links: PolicyLinks::default(),
            faqs: Vec::new(),
            socials: SocialHandles::default(),
            contact: Contact::default(),
            about_text: None,
            important_links: ImportantLinks::default(),
            raw_notes: Diagnostics::default(),
            competitors: Vec::new(),
            analyzed_at: Utc::now(),
        }
    }
}
