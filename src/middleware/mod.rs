mod access;
mod error_handler;
mod extract;
pub mod route_class;

pub use access::{AccessDecision, RequestIdentity, access_middleware, decide, login_redirect};
pub use error_handler::log_errors;
pub use extract::{MaybeUser, RequireUser};
