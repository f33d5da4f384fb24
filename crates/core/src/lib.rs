//! TechMart Core - Shared value types.
//!
//! This crate provides the value types used across all TechMart components:
//! - `ledger` - Catalog, cart, order and account stores
//! - `storefront` - JSON HTTP service in front of the ledger
//!
//! # Architecture
//!
//! The core crate contains only types - no state, no locking, no HTTP.
//! Every type validates itself on construction so the stores can trust
//! what they are handed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
