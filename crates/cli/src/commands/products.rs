//! `sk products ...`
//!
//! Create and update read a product body as JSON, from a file or `-` for
//! stdin:
//!
//! ```json
//! {"title": "Phone X", "price": 499.99, "discount_percentage": 10,
//!  "rating": 4.5, "stock": 12, "brand": "Acme",
//!  "thumbnail": "https://img.example/x.png", "category_id": 1}
//! ```

use std::path::{Path, PathBuf};

use clap::Subcommand;
use tokio::io::AsyncReadExt;

use shopkeeper_client::ApiClient;
use shopkeeper_core::{ProductId, ProductInput};

use super::{CliError, ListArgs, confirm, print_deleted, print_json};

#[derive(Debug, Subcommand)]
pub enum ProductAction {
    /// List products
    List(ListArgs),
    /// Show one product
    Get { id: ProductId },
    /// Create a product from a JSON body
    Create {
        /// JSON file, or `-` for stdin
        #[arg(short, long)]
        from: PathBuf,
    },
    /// Replace a product from a JSON body
    Update {
        id: ProductId,
        /// JSON file, or `-` for stdin
        #[arg(short, long)]
        from: PathBuf,
    },
    /// Delete a product and its comments
    Delete {
        id: ProductId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

async fn read_input(from: &Path) -> Result<ProductInput, CliError> {
    let text = if from.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        text
    } else {
        tokio::fs::read_to_string(from).await?
    };
    Ok(serde_json::from_str(&text)?)
}

/// Run a product command.
///
/// # Errors
///
/// Returns an error if the input, the API call, or output fails.
pub async fn run(api: &ApiClient, action: ProductAction) -> Result<(), CliError> {
    match action {
        ProductAction::List(args) => print_json(&api.list_products(&args.params()).await?),
        ProductAction::Get { id } => print_json(&api.get_product(id).await?),
        ProductAction::Create { from } => {
            let input = read_input(&from).await?;
            print_json(&api.create_product(&input).await?)
        }
        ProductAction::Update { id, from } => {
            let input = read_input(&from).await?;
            print_json(&api.update_product(id, &input).await?)
        }
        ProductAction::Delete { id, yes } => {
            let deleted = confirm(&format!("Delete product {id} and its comments?"), yes).await?;
            if deleted {
                api.delete_product(id).await?;
            }
            print_deleted("product", id, deleted)
        }
    }
}
