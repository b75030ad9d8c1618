//! Sticky Cart admin library.
//!
//! The embedded Shopify admin app as a library, so the router can be
//! driven from tests.
//!
//! # Security
//!
//! Sessions hold offline Admin API access tokens for every installed shop.
//! Anything that can read the session cache can act as the app on those shops.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
pub mod storage;
