//! DevHub Backend Library
//!
//! REST backend for a developer network: user registration and login with
//! JWT bearer tokens, developer profiles, and a GitHub repository proxy.
//! Exposes every module so the binary and integration tests share one router.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod profile;
pub mod validation;

pub use app::{build_router, AppState};
pub use config::Config;
