use super::probe::{Attempt, Resolver};
use crate::models::PolicyLinks;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    Privacy,
    Refunds,
    Returns,
    Terms,
    Shipping,
}

struct PolicyRule {
    policy: Policy,
    paths: [&'static str; 2],
    content: &'static [&'static str],
    link_keywords: &'static [&'static str],
}

const RULES: &[PolicyRule] = &[
    PolicyRule {
        policy: Policy::Privacy,
        paths: ["/policies/privacy-policy", "/pages/privacy-policy"],
        content: &["privacy"],
        link_keywords: &["privacy"],
    },
    PolicyRule {
        policy: Policy::Refunds,
        paths: ["/policies/refund-policy", "/pages/refund-policy"],
        content: &["refund"],
        link_keywords: &["refund"],
    },
    PolicyRule {
        policy: Policy::Returns,
        paths: ["/policies/return-policy", "/pages/return-policy"],
        content: &["return"],
        link_keywords: &["return"],
    },
    PolicyRule {
        policy: Policy::Terms,
        paths: ["/policies/terms-of-service", "/pages/terms-of-service"],
        content: &["terms", "conditions"],
        link_keywords: &["terms"],
    },
    PolicyRule {
        policy: Policy::Shipping,
        paths: ["/policies/shipping-policy", "/pages/shipping-policy"],
        content: &["shipping"],
        link_keywords: &["shipping", "delivery"],
    },
];

/// Probe the conventional policy paths, then fall back to discovered links.
pub fn resolve_policies(resolver: &mut Resolver) -> PolicyLinks {
    let mut links = PolicyLinks::default();

    for rule in RULES {
        let attempts = [
            Attempt::Mentions { path: rule.paths[0], any_of: rule.content },
            Attempt::Mentions { path: rule.paths[1], any_of: rule.content },
            Attempt::Keywords(rule.link_keywords),
        ];
        let found = resolver.resolve(&attempts);
        let slot = match rule.policy {
            Policy::Privacy => &mut links.privacy_policy,
            Policy::Refunds => &mut links.refunds_policy,
            Policy::Returns => &mut links.returns_policy,
            Policy::Terms => &mut links.terms_of_service,
            Policy::Shipping => &mut links.shipping_policy,
        };
        *slot = found;
    }

    links
}
