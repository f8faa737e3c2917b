//! CLI administration tool for linkcore.
//!
//! Manages API tokens and links directly against PostgreSQL, without going through
//! the HTTP API. Link commands act with administrative privilege: ownership is not
//! checked, but every other rule (alias format, uniqueness, retirement) applies.
//!
//! # Usage
//!
//! ```bash
//! # Tokens
//! cargo run --bin admin -- token create --name "Production API"
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke "Production API"
//!
//! # Links
//! cargo run --bin admin -- link create https://example.com --alias promo
//! cargo run --bin admin -- link resolve promo
//! cargo run --bin admin -- link rename 42 spring-promo
//! cargo run --bin admin -- link delete 42
//!
//! # Database
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! Same as the server. `DATABASE_URL` (or `DB_*`) and `TOKEN_SIGNING_SECRET` are
//! required; `REDIS_URL` lets rename and delete invalidate cached redirects.

use linkcore::application::services::auth_service::generate_token;
use linkcore::config::Config;
use linkcore::domain::repositories::TokenRepository;
use linkcore::infrastructure::persistence::{PgLinkRepository, PgTokenRepository};
use linkcore::server::{build_cache, build_generator, connect_database};
use linkcore::state::{AppState, StateParts};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing linkcore.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a short link
    Create {
        /// Destination URL
        url: String,

        /// Custom short code
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// Show the destination of a short code
    Resolve { code: String },

    /// Move a link to a new short code
    Rename { id: i64, code: String },

    /// Delete a link and retire its code
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if config.database_url.is_none() {
        config.database_url =
            Some(Config::load_database_url().context("The admin CLI requires PostgreSQL")?);
    }
    config.validate()?;

    let pool = connect_database(&config).await?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool, &config).await?,
        Commands::Link { action } => handle_link_action(action, pool, &config).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Builds the same service graph the server uses, over PostgreSQL.
async fn build_state(pool: PgPool, config: &Config) -> AppState {
    let pool = Arc::new(pool);

    AppState::new(StateParts {
        link_repository: Arc::new(PgLinkRepository::new(pool.clone())),
        token_repository: Arc::new(PgTokenRepository::new(pool)),
        cache: build_cache(config).await,
        generator: build_generator(config),
        max_attempts: config.allocation_max_attempts,
        signing_secret: config.token_signing_secret.clone(),
        public_base_url: config.public_base_url.clone(),
    })
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool, config: &Config) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create { name, token, yes } => {
            let state = build_state(pool.clone(), config).await;
            create_token(&state, name, token, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { name_or_id } => {
            revoke_token(repo, name_or_id).await?;
        }
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// # Security
///
/// - Only the HMAC-SHA256 hash is stored, keyed by `TOKEN_SIGNING_SECRET`
/// - Raw token is displayed once and cannot be retrieved later
async fn create_token(
    state: &AppState,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "Using provided token value".yellow());
            t
        }
        None => {
            println!("{}", "Generated new token".green());
            generate_token()
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let created = state
        .auth_service
        .issue_token(&token_name, &token_value)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!(
        "{} (id {})",
        "Token created successfully!".green().bold(),
        created.id
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" {}/api/links",
        token_value.bright_yellow(),
        state.public_base_url
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
///
/// # Output Format
///
/// ```text
///   ID  Name                           Created              Status
///   1   Production API                 2024-01-15 10:30     ACTIVE
///   2   Mobile App                     2024-01-16 14:20     REVOKED
/// ```
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<30} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(70).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<3} {:<30} {:<20} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is looked up as an ID, anything else as an exact name.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Dispatches link commands through the application services.
async fn handle_link_action(action: LinkAction, pool: PgPool, config: &Config) -> Result<()> {
    let state = build_state(pool, config).await;

    match action {
        LinkAction::Create { url, alias } => {
            let link = state
                .allocation_service
                .create(&url, alias.as_deref(), None)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

            println!("{}", "Link created".green().bold());
            println!("  ID:   {}", link.id.to_string().bright_black());
            println!(
                "  URL:  {}/{}",
                state.public_base_url,
                link.short_code.bright_yellow()
            );
            println!("  To:   {}", link.original_url.cyan());
        }
        LinkAction::Resolve { code } => {
            let url = state
                .resolution_service
                .resolve(&code)
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

            println!("{} -> {}", code.bright_yellow(), url.cyan());
        }
        LinkAction::Rename { id, code } => {
            let link = state
                .lifecycle_service
                .rename(id, &code, None)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to rename link {}: {}", id, e))?;

            println!(
                "{} link {} is now {}",
                "Renamed".green().bold(),
                link.id,
                link.short_code.bright_yellow()
            );
        }
        LinkAction::Delete { id, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Delete link {}? Its code can never be reused",
                        id
                    ))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "Cancelled".red());
                    return Ok(());
                }
            }

            state
                .lifecycle_service
                .delete(id, None)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete link {}: {}", id, e))?;

            println!("{} link {}", "Deleted".green().bold(), id);
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let links: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE deleted_at IS NULL")
                    .fetch_one(pool)
                    .await
                    .unwrap_or(0);

            println!("{}", "Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Live links: {}", links.to_string().bright_green());
        }
        DbAction::Migrate => {
            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Failed to run migrations")?;

            println!("{}", "Migrations applied".green().bold());
        }
    }

    Ok(())
}
