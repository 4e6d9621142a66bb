//! Core types and trait definitions for the property registry.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backends and the JSON API both depend on it.

// Native `async fn` in traits; the store trait spells out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod iin;
pub mod record;
pub mod store;

pub use error::{StoreError, StoreErrorKind};
