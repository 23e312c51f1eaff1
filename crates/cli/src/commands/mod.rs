//! Subcommand implementations, one module per resource.

use clap::Args;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use shopkeeper_client::ApiError;
use shopkeeper_core::ListParams;

pub mod account;
pub mod carts;
pub mod categories;
pub mod comments;
pub mod products;
pub mod search;
pub mod users;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// No API URL was given.
    #[error("Missing API URL: pass --api-url or set SHOPKEEPER_API_URL")]
    MissingApiUrl,

    /// The storefront API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input or output JSON was malformed.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// `--search/--page/--limit` shared by the list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive substring filter
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Page size (1-100)
    #[arg(short, long, default_value_t = ListParams::DEFAULT_LIMIT)]
    pub limit: u32,
}

impl ListArgs {
    /// Backend list parameters.
    #[must_use]
    pub fn params(&self) -> ListParams {
        ListParams::new(self.page, self.limit).with_search(self.search.trim())
    }
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the outcome of a delete.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn print_deleted(kind: &str, id: impl std::fmt::Display, deleted: bool) -> Result<(), CliError> {
    print_json(&serde_json::json!({
        "kind": kind,
        "id": id.to_string(),
        "deleted": deleted,
    }))
}

/// Ask for confirmation on stderr unless `yes` was passed.
///
/// Only an answer starting with `y` confirms; end of input declines.
///
/// # Errors
///
/// Returns an error if stdin or stderr fails.
pub async fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }

    let mut stderr = tokio::io::stderr();
    stderr
        .write_all(format!("{prompt} [y/N] ").as_bytes())
        .await?;
    stderr.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    answer.trim().to_ascii_lowercase().starts_with('y')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Yes "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }
}
