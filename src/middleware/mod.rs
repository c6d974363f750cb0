//! HTTP middleware shared by every route.
//!
//! This module provides:
//! - Request logging with latency tracking

pub mod logging;

pub use logging::request_logging;
