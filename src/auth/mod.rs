pub mod client_auth;
pub mod credentials;
pub mod error;
