//! `sk carts ...`

use clap::Subcommand;

use shopkeeper_client::ApiClient;
use shopkeeper_core::{CartId, CartInput, ListParams, ProductId};

use super::{CliError, confirm, print_deleted, print_json};

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// List carts
    List {
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Page size (1-100)
        #[arg(short, long, default_value_t = ListParams::DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Show one cart
    Get { id: CartId },
    /// Create a cart for the signed-in user
    Create {
        /// Line as `product_id:quantity` (repeatable)
        #[arg(short, long = "item", value_parser = parse_item, required = true)]
        items: Vec<(ProductId, i64)>,
    },
    /// Replace a cart's lines
    Update {
        id: CartId,
        /// Line as `product_id:quantity` (repeatable)
        #[arg(short, long = "item", value_parser = parse_item, required = true)]
        items: Vec<(ProductId, i64)>,
    },
    /// Delete a cart
    Delete {
        id: CartId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Parse a `product_id:quantity` cart line.
fn parse_item(value: &str) -> Result<(ProductId, i64), String> {
    let (product, quantity) = value
        .split_once(':')
        .ok_or_else(|| format!("expected product_id:quantity, got {value:?}"))?;
    let product: ProductId = product
        .parse()
        .map_err(|_| format!("invalid product id {product:?}"))?;
    let quantity: i64 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity {quantity:?}"))?;
    if quantity < 1 {
        return Err("quantity must be at least 1".to_string());
    }
    Ok((product, quantity))
}

/// Run a cart command.
///
/// # Errors
///
/// Returns an error if the API call or output fails.
pub async fn run(api: &ApiClient, action: CartAction) -> Result<(), CliError> {
    match action {
        CartAction::List { page, limit } => print_json(&api.list_carts(page, limit).await?),
        CartAction::Get { id } => print_json(&api.get_cart(id).await?),
        CartAction::Create { items } => {
            print_json(&api.create_cart(&CartInput::from_pairs(items)).await?)
        }
        CartAction::Update { id, items } => {
            print_json(&api.update_cart(id, &CartInput::from_pairs(items)).await?)
        }
        CartAction::Delete { id, yes } => {
            let deleted = confirm(&format!("Delete cart {id}?"), yes).await?;
            if deleted {
                api.delete_cart(id).await?;
            }
            print_deleted("cart", id, deleted)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("3:2").unwrap(), (ProductId::new(3), 2));
        assert_eq!(parse_item(" 7 : 1").unwrap(), (ProductId::new(7), 1));
    }

    #[test]
    fn test_parse_item_rejects_malformed() {
        assert!(parse_item("3").is_err());
        assert!(parse_item("x:2").is_err());
        assert!(parse_item("3:0").is_err());
    }
}
