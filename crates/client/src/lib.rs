//! Typed client for the storefront REST API.
//!
//! [`ApiClient`] wraps one `reqwest` connection pool and a base URL. Resource
//! operations are methods grouped by resource:
//!
//! - **Categories / products / users / carts / comments**: list, get, create,
//!   update, delete
//! - **Account**: the signed-in user's own record (`/me/`)
//! - **Auth**: password login returning a bearer token
//! - **Search**: semantic text and voice search, plus [`LiveSearch`] for
//!   debounced search-as-you-type
//!
//! Every operation issues exactly one HTTP request. Errors are returned as
//! they happened; nothing is retried.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod account;
mod auth;
mod carts;
mod categories;
mod client;
mod comments;
mod error;
pub mod live;
mod products;
pub mod search;
pub mod supersede;
mod users;

pub use client::{ApiClient, DEFAULT_TIMEOUT, Session};
pub use error::ApiError;
pub use live::{LiveSearch, ResultsFor, SearchPhase, SearchView};
pub use search::{DEFAULT_SEARCH_LIMIT, VoiceClip};
pub use supersede::{Outcome, SupersedeRegistry};
