use anyhow::{Result, bail};
use client::AppContext;

use super::{Output, require_session};
use crate::views;

pub async fn search(context: &AppContext, query: &str, out: &Output) -> Result<()> {
    require_session(context)?;
    if query.trim().is_empty() {
        bail!("search query must not be empty");
    }
    let entries = context.api().search_users(query).await?;
    out.emit(&entries, || views::search_results(query.trim(), &entries))
}

pub async fn follow(context: &AppContext, username: &str, follow: bool) -> Result<()> {
    let me = require_session(context)?;
    if me.username == username {
        bail!(self_follow_message(follow));
    }
    let following = context.api().toggle_follow(username, !follow).await?;
    if following {
        println!("Now following @{username}.");
    } else {
        println!("No longer following @{username}.");
    }
    Ok(())
}

pub async fn followers(context: &AppContext, username: &str, out: &Output) -> Result<()> {
    require_session(context)?;
    let users = context.api().followers(username).await?;
    out.emit(&users, || views::users(&users, "No followers found"))
}

pub async fn following(context: &AppContext, username: &str, out: &Output) -> Result<()> {
    require_session(context)?;
    let users = context.api().following(username).await?;
    out.emit(&users, || views::users(&users, "No following found"))
}

pub async fn connections(context: &AppContext, username: &str, out: &Output) -> Result<()> {
    require_session(context)?;
    let connections = context.api().connections(username).await?;
    let payload = serde_json::json!({
        "followers": &connections.followers,
        "following": &connections.following,
    });
    out.emit(&payload, || views::connections(&connections))
}

fn self_follow_message(follow: bool) -> &'static str {
    if follow {
        "you cannot follow yourself"
    } else {
        "you cannot unfollow yourself"
    }
}
