pub mod api;
pub mod cache;
pub mod config;
pub mod mirror;
pub mod submission;
