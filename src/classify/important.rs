use super::probe::{Attempt, Resolver};
use crate::models::ImportantLinks;

const TRACKING: &[Attempt<'static>] = &[
    Attempt::Keywords(&["track", "order tracking"]),
    Attempt::Exists("/pages/track-order"),
    Attempt::Exists("/pages/order-tracking"),
    Attempt::Exists("/tools/track"),
    Attempt::Exists("/a/track"),
];

const BLOGS: &[Attempt<'static>] = &[
    Attempt::Keywords(&["blog"]),
    Attempt::Exists("/blogs"),
    Attempt::Exists("/blogs/news"),
];

const CONTACT: &[Attempt<'static>] = &[
    Attempt::Keywords(&["contact"]),
    Attempt::Exists("/pages/contact"),
    Attempt::Exists("/pages/contact-us"),
    Attempt::Exists("/contact"),
];

const ABOUT: &[Attempt<'static>] = &[
    Attempt::Keywords(&["about", "our story", "story"]),
    Attempt::Exists("/pages/about"),
    Attempt::Exists("/pages/about-us"),
    Attempt::Exists("/pages/our-story"),
    Attempt::Exists("/pages/story"),
];

/// Links first, then the conventional paths; any 200 is good enough.
pub fn resolve_important(resolver: &mut Resolver) -> ImportantLinks {
    ImportantLinks {
        order_tracking: resolver.resolve(TRACKING),
        blogs: resolver.resolve(BLOGS),
        contact_us: resolver.resolve(CONTACT),
        about: resolver.resolve(ABOUT),
        faq: None,
    }
}
