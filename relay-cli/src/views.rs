//! Plain-text rendering of Relay data for the terminal.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use client::{ApiError, Connections};
use shared::models::{Comment, Post, UserSearchEntry, UserSummary, format_relative};

pub const TIMELINE_EMPTY: &str = "Your timeline is empty. Follow some users to see their posts!";
pub const OWN_POSTS_EMPTY: &str = "You haven't posted anything yet.";
pub const POSTS_EMPTY: &str = "No posts yet";
pub const COMMENTS_EMPTY: &str = "No comments yet.";
pub const POST_GONE: &str = "This post no longer exists.";

pub fn post(post: &Post, now: DateTime<Utc>) -> String {
    let mut out = format!("#{} @{}", post.id, post.author_username);
    if !post.created_at.is_empty() {
        let _ = write!(out, " · {}", format_relative(&post.created_at, now));
    }
    let _ = write!(out, "\n  {}\n  {}", post.content, post.like_label());
    if post.is_liked_by_current_user {
        out.push_str(" (liked)");
    }
    out
}

pub fn posts(posts: &[Post], now: DateTime<Utc>, empty: &str) -> String {
    if posts.is_empty() {
        return empty.to_string();
    }
    posts
        .iter()
        .map(|item| post(item, now))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn comments(comments: &[Comment], now: DateTime<Utc>) -> String {
    if comments.is_empty() {
        return COMMENTS_EMPTY.to_string();
    }
    comments
        .iter()
        .map(|comment| {
            let author = if comment.username.is_empty() {
                "unknown"
            } else {
                &comment.username
            };
            let mut line = format!("#{} @{author}", comment.id);
            if !comment.created_at.is_empty() {
                let _ = write!(line, " · {}", format_relative(&comment.created_at, now));
            }
            let _ = write!(line, "\n  {}", comment.content);
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A missing post gets its own message; other failures keep theirs.
pub fn comment_error(err: &ApiError) -> String {
    if err.is_not_found() {
        POST_GONE.to_string()
    } else {
        err.message().to_string()
    }
}

pub fn profile(user: &UserSummary, now: DateTime<Utc>) -> String {
    let mut out = format!("@{}\n", user.username);
    let _ = writeln!(
        out,
        "Full name: {}",
        user.full_name.as_deref().unwrap_or("Full name not set")
    );
    let _ = writeln!(
        out,
        "Email:     {}",
        user.email.as_deref().unwrap_or("Email not set")
    );
    let _ = writeln!(
        out,
        "Biography: {}",
        user.biography.as_deref().unwrap_or("No biography")
    );
    if let Some(registered) = &user.registered_at {
        let _ = writeln!(out, "Joined:    {}", format_relative(registered, now));
    }
    let _ = write!(
        out,
        "{} followers · {} following",
        user.follower_count.unwrap_or(0),
        user.following_count.unwrap_or(0)
    );
    out
}

pub fn users(users: &[UserSummary], empty: &str) -> String {
    if users.is_empty() {
        return empty.to_string();
    }
    users
        .iter()
        .map(|user| match &user.full_name {
            Some(name) => format!("@{} ({name})", user.username),
            None => format!("@{}", user.username),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn search_results(query: &str, entries: &[UserSearchEntry]) -> String {
    if entries.is_empty() {
        return format!("No users found matching \"{query}\"");
    }
    entries
        .iter()
        .map(|entry| {
            if entry.is_following {
                format!("@{} (following)", entry.username)
            } else {
                format!("@{}", entry.username)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn connections(connections: &Connections) -> String {
    format!(
        "Followers ({}):\n{}\n\nFollowing ({}):\n{}",
        connections.followers.len(),
        users(&connections.followers, "No followers found"),
        connections.following.len(),
        users(&connections.following, "No following found"),
    )
}
