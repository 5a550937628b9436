//! Heuristics that locate policy, social and informational pages of a store.

pub mod content;
pub mod important;
pub mod policies;
pub mod probe;
pub mod socials;

pub use important::resolve_important;
pub use policies::resolve_policies;
pub use probe::Resolver;
pub use socials::extract_socials;
