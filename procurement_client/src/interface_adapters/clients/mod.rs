// reqwest clients for the marketplace backend.

pub mod api;

pub use api::{ApiClient, DEFAULT_TIMEOUT, RequestOptions};
