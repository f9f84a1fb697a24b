use anyhow::{Result, anyhow};
use chrono::Utc;
use client::AppContext;

use super::{Output, require_session};
use crate::{input, views};

pub async fn list(context: &AppContext, post_id: i64, out: &Output) -> Result<()> {
    require_session(context)?;
    let comments = context
        .api()
        .comments(post_id)
        .await
        .map_err(|err| anyhow!(views::comment_error(&err)))?;
    out.emit(&comments, || views::comments(&comments, Utc::now()))
}

pub async fn add(
    context: &AppContext,
    post_id: i64,
    text: Option<String>,
    out: &Output,
) -> Result<()> {
    require_session(context)?;
    let text = input::from_arg(text).read_text()?;
    let comment = context
        .api()
        .add_comment(post_id, &text)
        .await
        .map_err(|err| anyhow!(views::comment_error(&err)))?;
    out.emit(&comment, || {
        format!("Added comment #{} to post #{post_id}", comment.id)
    })
}

pub async fn delete(context: &AppContext, id: i64) -> Result<()> {
    require_session(context)?;
    context.api().delete_comment(id).await?;
    println!("Deleted comment #{id}.");
    Ok(())
}
