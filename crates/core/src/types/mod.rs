//! Core types for Shopkeeper.
//!
//! Records mirror the backend's response schemas; `*Input` types mirror its
//! request schemas.

pub mod account;
pub mod analysis;
pub mod cart;
pub mod catalog;
pub mod comment;
pub mod id;
pub mod listing;
pub mod money;
pub mod status;
pub mod timestamp;

pub use account::{AccessToken, Account, AccountUpdate, User, UserInput};
pub use analysis::AiAnalysis;
pub use cart::{Cart, CartInput, CartItem, CartItemInput};
pub use catalog::{Category, CategoryInput, Product, ProductInput};
pub use comment::{Comment, CommentInput};
pub use id::*;
pub use listing::{ListParams, ListResponse, Pager, UserListParams};
pub use money::{discounted_price, format_money};
pub use status::*;
pub use timestamp::{Timestamp, TimestampError};
