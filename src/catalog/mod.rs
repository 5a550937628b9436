pub mod feed;
pub mod product;

pub use feed::paginate;
pub use product::{hero_products, map_product};
