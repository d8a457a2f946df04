//! User documents.

use serde::{Deserialize, Serialize};

use super::{Email, Timestamp, UserId};

/// A user record stored in the `users` collection, keyed by [`User::uid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: UserId,
    pub email: Email,
    pub name: String,
    /// Push notification tokens registered for this user.
    pub tokens: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Single emoji shown next to the user's name.
    pub avatar: String,
}

impl User {
    /// Collection that user documents live in.
    pub const COLLECTION: &'static str = "users";
}
