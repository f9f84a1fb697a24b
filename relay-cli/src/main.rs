#![cfg_attr(not(test), forbid(unsafe_code))]

//! Command-line client for the Relay social network.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::AppContext;
use dotenv::dotenv;
use shared::config::Config;
use tracing::debug;

mod commands;
mod input;
mod logging;
mod views;

/// Relay CLI
#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Command-line client for the Relay social network", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a configuration file (YAML, JSON or TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// API base URL, absolute or relative to the server origin (e.g. `/api`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the Relay CLI
#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session for later commands
    Login(commands::auth::LoginArgs),

    /// Create an account and sign in with it
    Register(commands::auth::RegisterArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Whoami {
        /// Ask the server instead of reading the stored session
        #[arg(long)]
        refresh: bool,
    },

    /// Show posts from the users you follow
    Timeline,

    /// Show the posts of one user
    Posts {
        /// Whose posts to list
        username: String,
    },

    /// Publish a post (reads stdin when no text is given)
    Post {
        /// Post text
        text: Option<String>,
    },

    /// Delete one of your posts
    DeletePost {
        /// Post id
        id: i64,
    },

    /// Like a post
    Like {
        /// Post id
        id: i64,
    },

    /// Remove your like from a post
    Unlike {
        /// Post id
        id: i64,
    },

    /// Show the comments on a post
    Comments {
        /// Post id
        post_id: i64,
    },

    /// Comment on a post (reads stdin when no text is given)
    Comment {
        /// Post id
        post_id: i64,

        /// Comment text
        text: Option<String>,
    },

    /// Delete one of your comments
    DeleteComment {
        /// Comment id
        id: i64,
    },

    /// Search for users by name
    Search {
        /// Text to look for in usernames
        query: String,
    },

    /// Show a profile (yours when no username is given)
    Profile {
        /// Whose profile to show
        username: Option<String>,
    },

    /// Edit your profile; omitted fields keep their current value
    EditProfile(commands::profile::EditArgs),

    /// Follow a user
    Follow {
        /// Who to follow
        username: String,
    },

    /// Stop following a user
    Unfollow {
        /// Who to unfollow
        username: String,
    },

    /// List the users following someone
    Followers {
        /// Whose followers to list
        username: String,
    },

    /// List the users someone follows
    Following {
        /// Whose follows to list
        username: String,
    },

    /// Show followers and following side by side
    Connections {
        /// Whose connections to list
        username: String,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(long, short)]
        shell: clap_complete::Shell,
    },

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml, json or toml). Defaults to yaml.
        #[arg(long, short, default_value = "yaml")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(*shell);
            return Ok(());
        }
        Commands::Config { format } => return commands::config::generate_config(format),
        _ => {}
    }

    let config = Config::load_config(cli.config, cli.api_url)
        .context("failed to load configuration")?;
    logging::initialize_tracing(&config);
    debug!(
        api_url = %config.api_url,
        session_dir = %config.session_dir.display(),
        "configuration loaded"
    );

    let context =
        AppContext::from_config(&config).context("failed to set up the Relay client")?;
    let out = commands::Output::new(cli.json);

    match cli.command {
        Commands::Login(args) => commands::auth::login(&context, args, &out).await,
        Commands::Register(args) => commands::auth::register(&context, args, &out).await,
        Commands::Logout => commands::auth::logout(&context).await,
        Commands::Whoami { refresh } => commands::auth::whoami(&context, refresh, &out).await,
        Commands::Timeline => commands::posts::timeline(&context, &out).await,
        Commands::Posts { username } => commands::posts::user_posts(&context, &username, &out).await,
        Commands::Post { text } => commands::posts::publish(&context, text, &out).await,
        Commands::DeletePost { id } => commands::posts::delete(&context, id).await,
        Commands::Like { id } => commands::posts::like(&context, id, true).await,
        Commands::Unlike { id } => commands::posts::like(&context, id, false).await,
        Commands::Comments { post_id } => commands::comments::list(&context, post_id, &out).await,
        Commands::Comment { post_id, text } => {
            commands::comments::add(&context, post_id, text, &out).await
        }
        Commands::DeleteComment { id } => commands::comments::delete(&context, id).await,
        Commands::Search { query } => commands::social::search(&context, &query, &out).await,
        Commands::Profile { username } => {
            commands::profile::show(&context, username.as_deref(), &out).await
        }
        Commands::EditProfile(args) => commands::profile::edit(&context, args, &out).await,
        Commands::Follow { username } => commands::social::follow(&context, &username, true).await,
        Commands::Unfollow { username } => {
            commands::social::follow(&context, &username, false).await
        }
        Commands::Followers { username } => {
            commands::social::followers(&context, &username, &out).await
        }
        Commands::Following { username } => {
            commands::social::following(&context, &username, &out).await
        }
        Commands::Connections { username } => {
            commands::social::connections(&context, &username, &out).await
        }
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}
