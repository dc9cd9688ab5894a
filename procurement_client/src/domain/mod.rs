// Domain layer: read-only projections, errors, ports, and client-side rules.

pub mod access;
pub mod entities;
pub mod errors;
pub mod payloads;
pub mod ports;
pub mod queries;
pub mod validation;

pub use errors::{AccessDenied, ApiError, ValidationError};
pub use ports::{ApiResult, Clock, MarketplaceApi, SystemClock};
