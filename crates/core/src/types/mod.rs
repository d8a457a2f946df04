//! Core types for Shukku List.
//!
//! This module provides type-safe wrappers for the documents the app stores.

pub mod email;
pub mod id;
pub mod pair;
pub mod timestamp;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use pair::{Commerce, Item, Pair, PairSettings};
pub use timestamp::Timestamp;
pub use user::User;
