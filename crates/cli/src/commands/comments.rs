//! `sk comments ...`

use clap::{Args, Subcommand};

use shopkeeper_client::ApiClient;
use shopkeeper_core::{CommentId, CommentInput, ListParams, ProductId};

use super::{CliError, confirm, print_deleted, print_json};

#[derive(Debug, Subcommand)]
pub enum CommentAction {
    /// List a product's comments
    List {
        product_id: ProductId,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Page size (1-100)
        #[arg(short, long, default_value_t = ListParams::DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Show one comment
    Get {
        product_id: ProductId,
        id: CommentId,
    },
    /// Post a comment
    Create {
        product_id: ProductId,
        #[command(flatten)]
        comment: CommentArgs,
    },
    /// Edit a comment
    Update {
        product_id: ProductId,
        id: CommentId,
        #[command(flatten)]
        comment: CommentArgs,
    },
    /// Delete a comment
    Delete {
        product_id: ProductId,
        id: CommentId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct CommentArgs {
    /// Comment text
    #[arg(short, long)]
    content: String,

    /// Rating, 0 to 5
    #[arg(short, long)]
    rating: f64,
}

impl From<CommentArgs> for CommentInput {
    fn from(args: CommentArgs) -> Self {
        Self {
            content: args.content,
            rating: args.rating,
        }
    }
}

/// Run a comment command.
///
/// # Errors
///
/// Returns an error if the API call or output fails.
pub async fn run(api: &ApiClient, action: CommentAction) -> Result<(), CliError> {
    match action {
        CommentAction::List {
            product_id,
            page,
            limit,
        } => print_json(&api.list_comments(product_id, page, limit).await?),
        CommentAction::Get { product_id, id } => {
            print_json(&api.get_comment(product_id, id).await?)
        }
        CommentAction::Create {
            product_id,
            comment,
        } => print_json(&api.create_comment(product_id, &comment.into()).await?),
        CommentAction::Update {
            product_id,
            id,
            comment,
        } => print_json(&api.update_comment(product_id, id, &comment.into()).await?),
        CommentAction::Delete {
            product_id,
            id,
            yes,
        } => {
            let deleted = confirm(&format!("Delete comment {id} on product {product_id}?"), yes).await?;
            if deleted {
                api.delete_comment(product_id, id).await?;
            }
            print_deleted("comment", id, deleted)
        }
    }
}
