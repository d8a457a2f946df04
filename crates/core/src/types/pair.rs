//! Shared lists ("pairs") and their items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ItemId, PairId, Timestamp, UserId};

/// A shopping list jointly owned by exactly two users.
///
/// Stored in the `pairs` collection keyed by [`Pair::pair_id`]; the items and
/// settings are embedded in the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pair {
    pub pair_id: PairId,
    pub users: [UserId; 2],
    /// Six-digit code a partner enters to join the list.
    pub invite_code: String,
    pub list_name: String,
    pub items: Vec<Item>,
    pub settings: PairSettings,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Pair {
    /// Collection that pair documents live in.
    pub const COLLECTION: &'static str = "pairs";

    /// Whether `user` is one of the two owners of this list.
    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.users.contains(user)
    }
}

/// Per-list preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairSettings {
    pub notifications: bool,
    pub auto_sort: bool,
}

/// One entry on a shared list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub qty: u32,
    pub done: bool,
    pub added_by: UserId,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub commerce: Option<Commerce>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Product details for items saved from a web shop.
///
/// The three fields travel together; an item has all of them or none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commerce {
    pub link: String,
    pub image: String,
    /// Display price, including the currency symbol (e.g. `$49.99`).
    pub price: String,
}
