//! Core types for Sticky Cart.
//!
//! This module provides type-safe wrappers for the platform concepts the app handles.

pub mod id;
pub mod scope;
pub mod session;
pub mod shop;

pub use id::*;
pub use scope::AuthScopes;
pub use session::Session;
pub use shop::{ShopDomain, ShopDomainError};
