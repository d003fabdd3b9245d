//! Core types and capability traits for Gigboard.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! identity provider and the document store are reached only through the
//! traits in [`store`]; concrete backends live in their own crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod application;
pub mod document;
pub mod error;
pub mod identity;
pub mod job;
pub mod profile;
pub mod store;

pub use error::{AuthError, Error, Result};
