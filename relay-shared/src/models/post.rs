use serde::{Deserialize, Serialize};

/// A post as it appears on a timeline or profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Server-assigned identifier.
    pub id: i64,

    /// Post body.
    pub content: String,

    /// Handle of the author.
    #[serde(default)]
    pub author_username: String,

    /// Creation time as sent by the server.
    #[serde(default)]
    pub created_at: String,

    /// Number of likes.
    #[serde(default)]
    pub like_count: u64,

    /// Whether the current user has liked this post.
    #[serde(default)]
    pub is_liked_by_current_user: bool,
}

impl Post {
    /// Applies a like or unlike locally without going back to the server.
    ///
    /// The count never drops below zero.
    pub fn apply_like(&mut self, liked: bool) {
        if liked == self.is_liked_by_current_user {
            return;
        }
        self.is_liked_by_current_user = liked;
        self.like_count = if liked {
            self.like_count.saturating_add(1)
        } else {
            self.like_count.saturating_sub(1)
        };
    }

    /// Human-readable like count, e.g. `1 like` or `3 likes`.
    pub fn like_label(&self) -> String {
        if self.like_count == 1 {
            "1 like".to_string()
        } else {
            format!("{} likes", self.like_count)
        }
    }
}

/// Body for `POST /posts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPost {
    /// Post text.
    pub content: String,
}
