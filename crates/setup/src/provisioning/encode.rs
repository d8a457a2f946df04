//! Mapping of the demo entities onto stored documents.
//!
//! Field names are the camelCase names the Shukku List app reads.

use shukku_core::{Item, Pair, Timestamp, User, UserId};

use crate::store::{Document, FieldValue};

/// Document stored at `users/{uid}`.
#[must_use]
pub fn user_document(user: &User) -> Document {
    Document::new()
        .with("uid", user.uid.as_str())
        .with("email", user.email.as_str())
        .with("name", user.name.as_str())
        .with("tokens", user.tokens.clone())
        .with("createdAt", timestamp(user.created_at))
        .with("updatedAt", timestamp(user.updated_at))
        .with("avatar", user.avatar.as_str())
}

/// Document stored at `pairs/{pairId}`, items and settings inline.
#[must_use]
pub fn pair_document(pair: &Pair) -> Document {
    let settings = Document::new()
        .with("notifications", pair.settings.notifications)
        .with("autoSort", pair.settings.auto_sort);

    Document::new()
        .with("pairId", pair.pair_id.as_str())
        .with(
            "users",
            pair.users.iter().map(UserId::as_str).collect::<Vec<_>>(),
        )
        .with("inviteCode", pair.invite_code.as_str())
        .with("listName", pair.list_name.as_str())
        .with(
            "items",
            pair.items.iter().map(item_document).collect::<Vec<_>>(),
        )
        .with("settings", settings)
        .with("createdAt", timestamp(pair.created_at))
        .with("updatedAt", timestamp(pair.updated_at))
}

/// One element of the pair's `items` array.
///
/// Item timestamps are epoch milliseconds, not Firestore timestamps.
#[must_use]
pub fn item_document(item: &Item) -> Document {
    let commerce = item.commerce.as_ref();

    Document::new()
        .with("id", item.id.as_str())
        .with("name", item.name.as_str())
        .with("qty", item.qty)
        .with("done", item.done)
        .with("addedBy", item.added_by.as_str())
        .with("category", item.category.as_str())
        .with_opt("note", item.note.as_deref())
        .with_opt("link", commerce.map(|c| c.link.as_str()))
        .with_opt("image", commerce.map(|c| c.image.as_str()))
        .with_opt("price", commerce.map(|c| c.price.as_str()))
        .with("createdAt", item.created_at.timestamp_millis())
        .with("updatedAt", item.updated_at.timestamp_millis())
}

fn timestamp(value: Timestamp) -> FieldValue {
    match value {
        Timestamp::ServerTime => FieldValue::ServerTimestamp,
        Timestamp::At(at) => FieldValue::Timestamp(at),
    }
}
