//! HTML readers shared by the analysis steps.

pub mod faq;
pub mod links;
pub mod text;
