use std::io::{self, BufRead};

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::Args;
use client::{ApiError, AppContext};
use rpassword::prompt_password;
use shared::validation;

use super::{Output, require_session};
use crate::{input::read_line, views};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username; prompted for when omitted
    #[arg(long, short)]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Username; prompted for when omitted
    #[arg(long, short)]
    pub username: Option<String>,

    /// Read the password and its confirmation from stdin, one per line
    #[arg(long)]
    pub password_stdin: bool,
}

pub async fn login(context: &AppContext, args: LoginArgs, out: &Output) -> Result<()> {
    let (username, password) = {
        let mut stdin = io::stdin().lock();
        let username = username_or_prompt(args.username, &mut stdin)?;
        let password = read_password(args.password_stdin, &mut stdin, "Password: ")?;
        (username, password)
    };
    validation::credentials(&username, &password)?;

    let user = context
        .session()
        .sign_in(&username, &password)
        .await
        .map_err(|err| auth_failure(context, &err))?;

    out.emit(&user, || format!("Signed in as @{}", user.username))
}

pub async fn register(context: &AppContext, args: RegisterArgs, out: &Output) -> Result<()> {
    let (username, password, confirmation) = {
        let mut stdin = io::stdin().lock();
        let username = username_or_prompt(args.username, &mut stdin)?;
        let password = read_password(args.password_stdin, &mut stdin, "Password: ")?;
        let confirmation =
            read_password(args.password_stdin, &mut stdin, "Confirm password: ")?;
        (username, password, confirmation)
    };
    validation::registration(&username, &password, &confirmation)?;

    let user = context
        .session()
        .sign_up(&username, &password)
        .await
        .map_err(|err| auth_failure(context, &err))?;

    out.emit(&user, || {
        format!("Account created. Signed in as @{}", user.username)
    })
}

pub async fn logout(context: &AppContext) -> Result<()> {
    let was_signed_in = context.session().is_authenticated();
    context.session().sign_out().await;
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn whoami(context: &AppContext, refresh: bool, out: &Output) -> Result<()> {
    let mut user = require_session(context)?;
    if refresh {
        user = context.api().me().await?;
    }
    out.emit(&user, || views::profile(&user, Utc::now()))
}

/// Prefers the message the session recorded for the failed attempt.
fn auth_failure(context: &AppContext, err: &ApiError) -> anyhow::Error {
    let message = context
        .session()
        .auth_error()
        .unwrap_or_else(|| err.message().to_string());
    anyhow!(message)
}

fn username_or_prompt(username: Option<String>, stdin: &mut impl BufRead) -> Result<String> {
    if let Some(username) = username {
        return Ok(username.trim().to_string());
    }
    eprint!("Username: ");
    let username = read_line(stdin)?;
    if username.is_empty() {
        bail!("username must not be empty");
    }
    Ok(username)
}

fn read_password(from_stdin: bool, stdin: &mut impl BufRead, prompt: &str) -> Result<String> {
    if from_stdin {
        let mut line = String::new();
        stdin
            .read_line(&mut line)
            .context("failed to read password from stdin")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }
    prompt_password(prompt).context("failed to read password")
}
