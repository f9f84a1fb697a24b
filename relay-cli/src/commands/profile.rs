use anyhow::Result;
use chrono::Utc;
use clap::Args;
use client::AppContext;
use shared::models::ProfileUpdate;

use super::{Output, require_session};
use crate::views;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// New full name; pass an empty string to clear it
    #[arg(long)]
    pub full_name: Option<String>,

    /// New email address; pass an empty string to clear it
    #[arg(long)]
    pub email: Option<String>,

    /// New biography; pass an empty string to clear it
    #[arg(long)]
    pub bio: Option<String>,
}

pub async fn show(context: &AppContext, username: Option<&str>, out: &Output) -> Result<()> {
    let me = require_session(context)?;
    let target = username.filter(|name| *name != me.username);

    let Some(username) = target else {
        let profile = context.api().me().await?;
        return out.emit(&profile, || views::profile(&profile, Utc::now()));
    };

    let profile = context.api().user(username).await?;
    let following = context.api().is_following(username).await?;
    out.emit(&profile, || {
        let relation = if following {
            "You follow this user."
        } else {
            "You do not follow this user."
        };
        format!("{}\n{relation}", views::profile(&profile, Utc::now()))
    })
}

pub async fn edit(context: &AppContext, args: EditArgs, out: &Output) -> Result<()> {
    require_session(context)?;
    let current = context.api().me().await?;

    let mut update = ProfileUpdate::from_profile(&current);
    if let Some(full_name) = args.full_name {
        update.full_name = full_name;
    }
    if let Some(email) = args.email {
        update.email = email;
    }
    if let Some(bio) = args.bio {
        update.biography = bio;
    }

    let profile = context.api().update_me(&update).await?;
    out.emit(&profile, || {
        format!("Profile updated.\n\n{}", views::profile(&profile, Utc::now()))
    })
}
