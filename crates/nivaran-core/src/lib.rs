//! Core types and trait definitions for the Nivaran grievance portal.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assistant;
pub mod community;
pub mod complaint;
pub mod dashboard;
pub mod error;
pub mod profile;
pub mod questionnaire;
pub mod sector;
pub mod store;
pub mod submission;

pub use error::{Error, Result};
