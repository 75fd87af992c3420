// Gateway module - controls public API for the credential & token core
// Modules are private, only exported symbols are public

mod credentials;
mod rate_limit;
mod service;
mod token;

pub use credentials::{
    hash_password, validate_password, validate_username_format, verify_password,
    DEFAULT_BCRYPT_COST,
};
pub use rate_limit::{RateLimiter, RateLimiterPtr, SlidingWindowLimiter};
pub use service::AuthService;
pub use token::SessionClaims;
