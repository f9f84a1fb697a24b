use serde::{Deserialize, Serialize};

/// A comment attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Server-assigned identifier.
    pub id: i64,

    /// Comment text.
    pub content: String,

    /// Creation time as sent by the server.
    #[serde(default)]
    pub created_at: String,

    /// Handle of the commenter.
    #[serde(default)]
    pub username: String,
}
