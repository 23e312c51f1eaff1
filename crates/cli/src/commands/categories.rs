//! `sk categories ...`

use clap::Subcommand;

use shopkeeper_client::ApiClient;
use shopkeeper_core::{CategoryId, CategoryInput};

use super::{CliError, ListArgs, confirm, print_deleted, print_json};

#[derive(Debug, Subcommand)]
pub enum CategoryAction {
    /// List categories
    List(ListArgs),
    /// Show one category
    Get { id: CategoryId },
    /// Create a category
    Create {
        #[arg(short, long)]
        name: String,
    },
    /// Rename a category
    Update {
        id: CategoryId,
        #[arg(short, long)]
        name: String,
    },
    /// Delete a category
    Delete {
        id: CategoryId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run a category command.
///
/// # Errors
///
/// Returns an error if the API call or output fails.
pub async fn run(api: &ApiClient, action: CategoryAction) -> Result<(), CliError> {
    match action {
        CategoryAction::List(args) => print_json(&api.list_categories(&args.params()).await?),
        CategoryAction::Get { id } => print_json(&api.get_category(id).await?),
        CategoryAction::Create { name } => {
            let input = CategoryInput {
                name: name.trim().to_string(),
            };
            print_json(&api.create_category(&input).await?)
        }
        CategoryAction::Update { id, name } => {
            let input = CategoryInput {
                name: name.trim().to_string(),
            };
            print_json(&api.update_category(id, &input).await?)
        }
        CategoryAction::Delete { id, yes } => {
            let deleted = confirm(&format!("Delete category {id}?"), yes).await?;
            if deleted {
                api.delete_category(id).await?;
            }
            print_deleted("category", id, deleted)
        }
    }
}
