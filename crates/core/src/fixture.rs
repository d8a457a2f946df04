//! The demo dataset: Giash, Rina, and their shared home list.
//!
//! Everything here is pure data. Identifiers are fixed so that provisioning
//! can delete and recreate exactly these documents on every run. User and
//! pair timestamps are left for the database to assign; item timestamps are
//! staggered relative to the `now` passed to [`DemoCatalog::build`] so the
//! list looks like it has some history.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::types::{
    Commerce, Email, EmailError, Item, ItemId, Pair, PairId, PairSettings, Timestamp, User,
    UserId,
};

/// Invite code printed in the setup report and stored on the pair.
pub const INVITE_CODE: &str = "729463";

/// Display name of the demo couple.
pub const COUPLE_NAME: &str = "Giash & Rina";

/// Identifier of the demo pair document.
pub const PAIR_ID: &str = "giash_rina_home";

/// Errors raised when the catalog violates its own invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixtureError {
    #[error("invalid fixture email: {0}")]
    Email(#[from] EmailError),
    #[error("duplicate user id: {0}")]
    DuplicateUser(UserId),
    #[error("pair must reference two distinct users")]
    SameUserTwice,
    #[error("pair member {0} is not a provisioned user")]
    UnknownMember(UserId),
    #[error("duplicate item id: {0}")]
    DuplicateItem(ItemId),
    #[error("item {item} was added by {added_by}, who is not a member of the pair")]
    ForeignItem { item: ItemId, added_by: UserId },
    #[error("item {0} must have a positive quantity")]
    ZeroQuantity(ItemId),
    #[error("item {0} was updated before it was created")]
    UpdatedBeforeCreated(ItemId),
}

struct UserSpec {
    uid: &'static str,
    email: &'static str,
    name: &'static str,
    token: &'static str,
    avatar: &'static str,
}

struct ItemSpec {
    id: &'static str,
    name: &'static str,
    qty: u32,
    done: bool,
    added_by: &'static str,
    category: &'static str,
    note: Option<&'static str>,
    commerce: Option<(&'static str, &'static str, &'static str)>,
    created_mins_ago: i64,
    updated_mins_ago: i64,
}

const USERS: [UserSpec; 2] = [
    UserSpec {
        uid: "giash_uid",
        email: "giash@shukku.com",
        name: "Giash",
        token: "fcm_demo_giash",
        avatar: "👨‍💻",
    },
    UserSpec {
        uid: "rina_uid",
        email: "rina@shukku.com",
        name: "Rina",
        token: "fcm_demo_rina",
        avatar: "👩‍💼",
    },
];

const ITEMS: [ItemSpec; 6] = [
    ItemSpec {
        id: "1",
        name: "Organic Milk",
        qty: 2,
        done: false,
        added_by: "giash_uid",
        category: "dairy",
        note: Some("Get the organic one"),
        commerce: None,
        created_mins_ago: 24 * 60,
        updated_mins_ago: 24 * 60,
    },
    ItemSpec {
        id: "2",
        name: "Whole Wheat Bread",
        qty: 1,
        done: true,
        added_by: "rina_uid",
        category: "bakery",
        note: None,
        commerce: None,
        created_mins_ago: 12 * 60,
        updated_mins_ago: 60,
    },
    ItemSpec {
        id: "3",
        name: "Fresh Eggs (Dozen)",
        qty: 1,
        done: false,
        added_by: "giash_uid",
        category: "dairy",
        note: None,
        commerce: None,
        created_mins_ago: 2 * 60,
        updated_mins_ago: 2 * 60,
    },
    ItemSpec {
        id: "4",
        name: "Bananas",
        qty: 6,
        done: false,
        added_by: "rina_uid",
        category: "fruits",
        note: Some("For morning smoothies"),
        commerce: None,
        created_mins_ago: 60,
        updated_mins_ago: 60,
    },
    ItemSpec {
        id: "5",
        name: "Coffee Beans",
        qty: 1,
        done: false,
        added_by: "giash_uid",
        category: "beverages",
        note: Some("Dark roast preferred"),
        commerce: None,
        created_mins_ago: 30,
        updated_mins_ago: 30,
    },
    ItemSpec {
        id: "6",
        name: "Amazon Echo Dot",
        qty: 1,
        done: false,
        added_by: "rina_uid",
        category: "electronics",
        note: None,
        commerce: Some((
            "https://www.amazon.com/dp/B08N5WRWNW",
            "https://images-na.ssl-images-amazon.com/images/I/71OZY035QKL._AC_SL1500_.jpg",
            "$49.99",
        )),
        created_mins_ago: 15,
        updated_mins_ago: 15,
    },
];

/// The complete demo dataset: two users and the list they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCatalog {
    users: Vec<User>,
    pair: Pair,
}

impl DemoCatalog {
    /// Build the catalog with item history relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the hard-coded data breaks an invariant
    /// (see [`DemoCatalog::validate`]).
    pub fn build(now: DateTime<Utc>) -> Result<Self, FixtureError> {
        let users = USERS
            .iter()
            .map(|spec| -> Result<User, FixtureError> {
                Ok(User {
                    uid: UserId::new(spec.uid),
                    email: Email::parse(spec.email)?,
                    name: spec.name.to_string(),
                    tokens: vec![spec.token.to_string()],
                    created_at: Timestamp::ServerTime,
                    updated_at: Timestamp::ServerTime,
                    avatar: spec.avatar.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let items = ITEMS
            .iter()
            .map(|spec| Item {
                id: ItemId::new(spec.id),
                name: spec.name.to_string(),
                qty: spec.qty,
                done: spec.done,
                added_by: UserId::new(spec.added_by),
                category: spec.category.to_string(),
                note: spec.note.map(str::to_string),
                commerce: spec.commerce.map(|(link, image, price)| Commerce {
                    link: link.to_string(),
                    image: image.to_string(),
                    price: price.to_string(),
                }),
                created_at: now - TimeDelta::minutes(spec.created_mins_ago),
                updated_at: now - TimeDelta::minutes(spec.updated_mins_ago),
            })
            .collect();

        let pair = Pair {
            pair_id: PairId::new(PAIR_ID),
            users: [UserId::new(USERS[0].uid), UserId::new(USERS[1].uid)],
            invite_code: INVITE_CODE.to_string(),
            list_name: "Giash & Rina Home".to_string(),
            items,
            settings: PairSettings {
                notifications: true,
                auto_sort: true,
            },
            created_at: Timestamp::ServerTime,
            updated_at: Timestamp::ServerTime,
        };

        let catalog = Self { users, pair };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Users in the order they are written.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// The shared list.
    #[must_use]
    pub const fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Identifiers of every user document the catalog owns.
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.users.iter().map(|user| &user.uid)
    }

    /// Identifiers of every pair document the catalog owns.
    pub fn pair_ids(&self) -> impl Iterator<Item = &PairId> {
        std::iter::once(&self.pair.pair_id)
    }

    /// Number of items on the demo list.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.pair.items.len()
    }

    /// Check referential integrity and item invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), FixtureError> {
        let mut uids = HashSet::new();
        for user in &self.users {
            if !uids.insert(&user.uid) {
                return Err(FixtureError::DuplicateUser(user.uid.clone()));
            }
        }

        let [first, second] = &self.pair.users;
        if first == second {
            return Err(FixtureError::SameUserTwice);
        }
        if let Some(missing) = self.pair.users.iter().find(|uid| !uids.contains(uid)) {
            return Err(FixtureError::UnknownMember(missing.clone()));
        }

        let mut item_ids = HashSet::new();
        for item in &self.pair.items {
            if !item_ids.insert(&item.id) {
                return Err(FixtureError::DuplicateItem(item.id.clone()));
            }
            if !self.pair.is_member(&item.added_by) {
                return Err(FixtureError::ForeignItem {
                    item: item.id.clone(),
                    added_by: item.added_by.clone(),
                });
            }
            if item.qty == 0 {
                return Err(FixtureError::ZeroQuantity(item.id.clone()));
            }
            if item.updated_at < item.created_at {
                return Err(FixtureError::UpdatedBeforeCreated(item.id.clone()));
            }
        }

        Ok(())
    }
}
