//! Write-time timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamp that is either assigned by the database at write time or
/// supplied by the client.
///
/// Server-assigned values are authoritative: they are always at or after any
/// client clock reading taken before the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Timestamp {
    /// Placeholder resolved by the database when the document is committed.
    #[default]
    ServerTime,
    /// A fixed instant chosen by the writer.
    At(DateTime<Utc>),
}

impl Timestamp {
    /// Returns the client-supplied instant, if any.
    #[must_use]
    pub const fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::ServerTime => None,
            Self::At(at) => Some(*at),
        }
    }

    /// Whether the database assigns this value.
    #[must_use]
    pub const fn is_server_time(&self) -> bool {
        matches!(self, Self::ServerTime)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}
