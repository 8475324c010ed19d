//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Login, token verification and password changes live here; route guards in
//! the server crate only call `AuthService::authenticate`.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::CurrentUser;
pub use service::{AuthConfig, AuthService};
