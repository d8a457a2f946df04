//! Cloud Firestore backend.
//!
//! Talks to the Firestore REST v1 API (or the local emulator) using a
//! service account key. Implements [`crate::store::DocumentStore`].

mod auth;
mod client;
mod credentials;
mod value;

pub use auth::AccessToken;
pub use client::FirestoreClient;
pub use credentials::{CredentialError, DEFAULT_TOKEN_URI, ServiceAccount};
