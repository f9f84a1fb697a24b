use anyhow::Result;
use chrono::Utc;
use client::AppContext;

use super::{Output, require_session};
use crate::{input, views};

pub async fn timeline(context: &AppContext, out: &Output) -> Result<()> {
    require_session(context)?;
    let posts = context.api().timeline().await?;
    out.emit(&posts, || {
        views::posts(&posts, Utc::now(), views::TIMELINE_EMPTY)
    })
}

pub async fn user_posts(context: &AppContext, username: &str, out: &Output) -> Result<()> {
    let me = require_session(context)?;
    let posts = context.api().user_posts(username).await?;
    let empty = if me.username == username {
        views::OWN_POSTS_EMPTY
    } else {
        views::POSTS_EMPTY
    };
    out.emit(&posts, || views::posts(&posts, Utc::now(), empty))
}

pub async fn publish(context: &AppContext, text: Option<String>, out: &Output) -> Result<()> {
    require_session(context)?;
    let content = input::from_arg(text).read_text()?;
    let post = context.api().publish_post(&content).await?;
    out.emit(&post, || {
        format!("Published post #{}\n\n{}", post.id, views::post(&post, Utc::now()))
    })
}

pub async fn delete(context: &AppContext, id: i64) -> Result<()> {
    require_session(context)?;
    context.api().delete_post(id).await?;
    println!("Deleted post #{id}.");
    Ok(())
}

pub async fn like(context: &AppContext, id: i64, liked: bool) -> Result<()> {
    require_session(context)?;
    if liked {
        context.api().like_post(id).await?;
        println!("Liked post #{id}.");
    } else {
        context.api().unlike_post(id).await?;
        println!("Removed like from post #{id}.");
    }
    Ok(())
}
