//! Shopkeeper Core - Shared data-transfer types.
//!
//! This crate provides the types used across all Shopkeeper components:
//! - `client` - Typed REST bindings for the storefront backend
//! - `admin` - Server-rendered administration pages
//! - `cli` - Command-line access to the same resources
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Every record
//! mirrors a backend schema and is trusted verbatim; invariants such as
//! `discount_percentage` in `[0, 100]` are enforced by the backend.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, timestamps, money, resource records, payloads
//!   and list envelopes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
