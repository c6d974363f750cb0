//! Profile Module
//! Mission: Developer profiles with experience, education and GitHub repos

pub mod api;
pub mod github;
pub mod models;
pub mod store;

pub use github::GithubClient;
pub use store::ProfileStore;
