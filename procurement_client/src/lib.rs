pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{ApiError, MarketplaceApi};
pub use interface_adapters::clients::{ApiClient, RequestOptions};
