//! Sticky Cart Core - Shared types library.
//!
//! This crate provides the types shared by the embedded admin app and its tests:
//! - `admin` - The embedded Shopify admin app (OAuth, webhooks, GraphQL proxy)
//! - `integration-tests` - Live-service tests against Redis and a running server
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no cache access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated shop domains, scope sets, session records and global IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
