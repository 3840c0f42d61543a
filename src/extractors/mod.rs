//! Request extractors: bearer identity, plus JSON bodies and query strings with API-shaped rejections.

mod identity;
mod json;
mod query;

pub use identity::{bearer_token, AuthUser, MaybeUser};
pub use json::AppJson;
pub use query::AppQuery;
