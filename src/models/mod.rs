//! Data models matching the admin and public API contracts.

mod blob;
mod blog;
mod destination;
mod homepage;
mod package;
mod review;
mod taxonomy;
mod theme_page;

pub use blob::*;
pub use blog::*;
pub use destination::*;
pub use homepage::*;
pub use package::*;
pub use review::*;
pub use taxonomy::*;
pub use theme_page::*;

use serde::{Deserialize, Serialize};

/// Publication status values shared by all composite families.
pub mod status {
    pub const PUBLISHED: &str = "published";
    pub const DRAFT: &str = "draft";
}

/// Moderation status values for reviews and comments.
pub mod moderation {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";

    pub fn is_valid(s: &str) -> bool {
        matches!(s, PENDING | APPROVED | REJECTED)
    }
}

/// Outcome of a composite create/update.
///
/// Draft downgrade is reported through `status` + `advisories`, never as an
/// error. `updated: false` means the reconciler found nothing to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
    pub status: String,
    #[serde(default)]
    pub advisories: Vec<String>,
}

impl WriteOutcome {
    pub fn created(id: i64, status: &str, advisories: Vec<String>) -> Self {
        Self {
            id: Some(id),
            updated: None,
            status: status.to_string(),
            advisories,
        }
    }

    pub fn updated(id: i64, changed: bool, status: &str, advisories: Vec<String>) -> Self {
        Self {
            id: Some(id),
            updated: Some(changed),
            status: status.to_string(),
            advisories,
        }
    }
}
