//! Persisted entities and their wire payloads.

mod category;
mod product;
mod user;

pub use category::*;
pub use product::*;
pub use user::*;
