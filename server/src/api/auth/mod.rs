//! Basic authentication

mod credentials;
mod middleware;

pub use credentials::CredentialService;
pub use middleware::{AuthError, AuthState, require_auth};
