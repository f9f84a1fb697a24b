use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user as returned by login, profile, and follow-graph endpoints.
///
/// Only `username` is guaranteed; the remaining profile fields are filled in
/// when the endpoint provides them. Unknown fields are kept in `extra` so a
/// persisted session round-trips exactly what the server sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// The user's unique handle.
    pub username: String,

    /// Display name chosen by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Contact email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Free-form biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,

    /// Registration time as sent by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,

    /// Number of users following this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,

    /// Number of users this user follows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,

    /// Fields the client does not model explicitly.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSummary {
    /// Creates a summary carrying only a username.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Returns a copy of this profile with the editable fields replaced.
    ///
    /// Empty strings clear the corresponding field.
    #[must_use]
    pub fn with_update(&self, update: &ProfileUpdate) -> Self {
        let normalize = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Self {
            full_name: normalize(&update.full_name),
            email: normalize(&update.email),
            biography: normalize(&update.biography),
            ..self.clone()
        }
    }
}

/// Editable profile fields submitted through `PUT /users/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name; empty clears it.
    pub full_name: String,
    /// New email address; empty clears it.
    pub email: String,
    /// New biography; empty clears it.
    pub biography: String,
}

impl ProfileUpdate {
    /// Seeds an update form from the current profile values.
    pub fn from_profile(profile: &UserSummary) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            biography: profile.biography.clone().unwrap_or_default(),
        }
    }
}

/// One row of a user search, flagged with the caller's follow state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchEntry {
    /// The matching user's handle.
    pub username: String,

    /// Registration time as sent by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,

    /// Whether the current user follows this user.
    #[serde(default)]
    pub is_following: bool,
}
