//! Authentication Module
//! Mission: Register users, issue JWT tokens, and gate protected routes

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use jwt::TokenService;
pub use middleware::{auth_middleware, AUTH_HEADER};
pub use models::AuthUser;
pub use user_store::{CredentialStore, SqliteUserBackend, UserBackend};
