//! # Models
//!
//! Wire models exchanged with the Relay API. Field names follow the API's
//! camelCase JSON; optional profile fields default to `None` when absent.

pub mod comment;
pub mod post;
pub mod timestamp;
pub mod user;

pub use comment::Comment;
pub use post::{NewPost, Post};
pub use timestamp::{format_relative, parse_timestamp};
pub use user::{ProfileUpdate, UserSearchEntry, UserSummary};
