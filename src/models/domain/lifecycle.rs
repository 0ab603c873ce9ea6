use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Soft-delete state shared by questions and users.
///
/// Flattened into the stored document as `status: "ACTIVE" | "DELETED"`, with
/// `deleted_at` present only for deleted records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted {
        #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
        deleted_at: DateTime<Utc>,
    },
}

impl Lifecycle {
    pub const ACTIVE_STATUS: &'static str = "ACTIVE";
    pub const DELETED_STATUS: &'static str = "DELETED";

    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::Deleted { deleted_at } => Some(*deleted_at),
        }
    }
}
