//! Shopkeeper CLI - the storefront API from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and keep the token for later commands
//! export SHOPKEEPER_API_URL=http://localhost:8000
//! export SHOPKEEPER_TOKEN=$(sk login -e admin@example.com | jq -r .access_token)
//!
//! # Browse and edit resources
//! sk products list --search phone --page 2
//! sk categories create --name phones
//! sk carts create --item 3:2 --item 7:1
//! sk comments list 3
//!
//! # Semantic search
//! sk search text "a sturdy phone for hiking"
//! sk search voice ./query.wav
//! sk search live            # one query per line on stdin
//! ```
//!
//! Every command prints JSON on stdout; logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use clap::{Parser, Subcommand};
use url::Url;

use shopkeeper_client::{ApiClient, Session};
use shopkeeper_core::ProductId;

mod commands;

use commands::{
    CliError, account::MeAction, carts::CartAction, categories::CategoryAction,
    comments::CommentAction, products::ProductAction, search::SearchAction, users::UserAction,
};

#[derive(Parser)]
#[command(name = "sk")]
#[command(author, version, about = "Shopkeeper storefront API from the command line")]
struct Cli {
    /// Storefront API base URL
    #[arg(long, env = "SHOPKEEPER_API_URL", global = true)]
    api_url: Option<Url>,

    /// Bearer token returned by `sk login`
    #[arg(long, env = "SHOPKEEPER_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SHOPKEEPER_HTTP_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange credentials for a bearer token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "SHOPKEEPER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage carts
    Carts {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage a product's comments
    Comments {
        #[command(subcommand)]
        action: CommentAction,
    },
    /// The signed-in account
    Me {
        #[command(subcommand)]
        action: MeAction,
    },
    /// Semantic product search
    Search {
        #[command(subcommand)]
        action: SearchAction,
    },
    /// Comment sentiment and summary for a product
    Analysis {
        /// Product ID
        product_id: ProductId,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before parsing so `env = ...` arguments see it
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let api_url = cli.api_url.ok_or(CliError::MissingApiUrl)?;
    let mut api = ApiClient::new(&api_url, Duration::from_secs(cli.timeout))?;
    if let Some(token) = cli.token {
        api = api.with_session(Session::bearer(token));
    }

    match cli.command {
        Commands::Login { email, password } => {
            let token = api.login(&email, &password).await?;
            commands::print_json(&token)?;
        }
        Commands::Categories { action } => commands::categories::run(&api, action).await?,
        Commands::Products { action } => commands::products::run(&api, action).await?,
        Commands::Users { action } => commands::users::run(&api, action).await?,
        Commands::Carts { action } => commands::carts::run(&api, action).await?,
        Commands::Comments { action } => commands::comments::run(&api, action).await?,
        Commands::Me { action } => commands::account::run(&api, action).await?,
        Commands::Search { action } => commands::search::run(&api, action).await?,
        Commands::Analysis { product_id } => {
            let analysis = api.ai_analysis(product_id).await?;
            if analysis.is_none() {
                tracing::info!(%product_id, "Product has no comments yet");
            }
            commands::print_json(&analysis)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
