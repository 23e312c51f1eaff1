//! `sk me ...`

use clap::Subcommand;

use shopkeeper_client::ApiClient;
use shopkeeper_core::AccountUpdate;

use super::{CliError, confirm, print_deleted, print_json};

#[derive(Debug, Subcommand)]
pub enum MeAction {
    /// Show the signed-in account
    Show,
    /// Edit the signed-in account
    Update {
        #[arg(long)]
        username: String,
        #[arg(long)]
        fullname: String,
        /// New password (required by the API)
        #[arg(long, env = "SHOPKEEPER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete the signed-in account
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run an account command.
///
/// # Errors
///
/// Returns an error if the API call or output fails.
pub async fn run(api: &ApiClient, action: MeAction) -> Result<(), CliError> {
    match action {
        MeAction::Show => print_json(&api.me().await?),
        MeAction::Update {
            username,
            fullname,
            password,
        } => {
            let update = AccountUpdate {
                username,
                fullname,
                password,
            };
            print_json(&api.update_me(&update).await?)
        }
        MeAction::Delete { yes } => {
            let deleted = confirm("Delete your account? This cannot be undone.", yes).await?;
            if deleted {
                api.delete_me().await?;
            }
            print_deleted("account", "me", deleted)
        }
    }
}
