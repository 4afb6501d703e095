pub mod auth;
mod client_info;
pub mod rate_limit;

pub use auth::{AuthAdmin, OptionalAuthAdmin};
pub use rate_limit::{RateLimit, RateLimiter};
