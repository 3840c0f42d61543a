//! Request-level operations over the repositories, and the parsing/validation they share.

mod accounts;
mod catalog;
pub mod pagination;
pub mod query;
pub mod validation;

pub use accounts::{password_problems, AccountService};
pub use catalog::CatalogService;
pub use pagination::{page_links, request_url, resolve_page, resolve_page_size, PageWindow};
pub use query::{ordering, search_terms, ProductFilter, ProductListParams, ProductQuery, SortField, SortKey};
pub use validation::missing_reference_message;
