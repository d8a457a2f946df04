//! Shukku List Core - Shared types library.
//!
//! This crate provides the document types used across Shukku List components:
//! - `setup` - HTTP endpoint that provisions the demo dataset
//! - `cli` - Command-line tools for running the same pipeline by hand
//!
//! # Architecture
//!
//! The core crate contains only types and fixture data - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, timestamps, users, pairs, and items
//! - [`fixture`] - The hard-coded demo dataset

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod fixture;
pub mod types;

pub use fixture::{DemoCatalog, FixtureError};
pub use types::*;
