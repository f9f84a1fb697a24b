//! Client-side form rules applied before a request leaves the client.

use thiserror::Error;

use crate::models::ProfileUpdate;

/// Maximum characters in a post.
pub const POST_MAX_CHARS: usize = 500;
/// Maximum characters in a comment.
pub const COMMENT_MAX_CHARS: usize = 500;
/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_CHARS: usize = 4;
/// Maximum characters in a full name or email.
pub const PROFILE_FIELD_MAX_CHARS: usize = 100;
/// Maximum characters in a biography.
pub const BIOGRAPHY_MAX_CHARS: usize = 500;
/// Maximum words in a biography.
pub const BIOGRAPHY_MAX_WORDS: usize = 100;

/// A form value the client refuses to submit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Biography must be at most {max} words")]
    TooManyWords { max: usize },

    #[error("Password must be at least {} characters long", PASSWORD_MIN_CHARS)]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Trims post text and checks it against the post rules.
///
/// # Errors
/// Returns [`ValidationError`] when the text is blank or too long.
pub fn post_content(raw: &str) -> Result<String, ValidationError> {
    bounded_text("Post", raw, POST_MAX_CHARS)
}

/// Trims comment text and checks it against the comment rules.
///
/// # Errors
/// Returns [`ValidationError`] when the text is blank or too long.
pub fn comment_content(raw: &str) -> Result<String, ValidationError> {
    bounded_text("Comment", raw, COMMENT_MAX_CHARS)
}

/// Checks the credentials entered on the sign-in form.
///
/// # Errors
/// Returns [`ValidationError::Empty`] when either value is blank.
pub fn credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::Empty { field: "Username" });
    }
    if password.is_empty() {
        return Err(ValidationError::Empty { field: "Password" });
    }
    Ok(())
}

/// Checks the registration form.
///
/// # Errors
/// Returns [`ValidationError`] when the passwords differ or are too short.
pub fn registration(
    username: &str,
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    credentials(username, password)?;
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Checks an edited profile.
///
/// # Errors
/// Returns [`ValidationError`] for the first field over its limit.
pub fn profile_update(update: &ProfileUpdate) -> Result<(), ValidationError> {
    max_chars("Full name", &update.full_name, PROFILE_FIELD_MAX_CHARS)?;
    max_chars("Email", &update.email, PROFILE_FIELD_MAX_CHARS)?;
    max_chars("Biography", &update.biography, BIOGRAPHY_MAX_CHARS)?;
    if word_count(&update.biography) > BIOGRAPHY_MAX_WORDS {
        return Err(ValidationError::TooManyWords {
            max: BIOGRAPHY_MAX_WORDS,
        });
    }
    Ok(())
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn bounded_text(field: &'static str, raw: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    max_chars(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

fn max_chars(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
