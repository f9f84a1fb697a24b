pub mod auth;
pub mod comments;
pub mod completion;
pub mod config;
pub mod posts;
pub mod profile;
pub mod social;

use anyhow::{Result, bail};
use client::AppContext;
use serde_json::Value;
use shared::models::UserSummary;

/// Where command results go: formatted text or raw JSON on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Prints `data` as JSON in `--json` mode, else the rendered text.
    pub fn emit<T: serde::Serialize>(&self, data: &T, render: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            let value: Value = serde_json::to_value(data)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", render());
        }
        Ok(())
    }
}

/// The signed-in user, or an error pointing at `relay login`.
pub fn require_session(context: &AppContext) -> Result<UserSummary> {
    match context.session().current_user() {
        Some(user) => Ok(user),
        None => bail!("not signed in; run `relay login` first"),
    }
}
