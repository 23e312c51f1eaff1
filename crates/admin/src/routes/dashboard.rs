//! Index page linking every admin page.

use askama::Template;
use axum::response::Html;
use tracing::instrument;

use crate::{filters, middleware::RequireLogin};

use super::{NavView, render};

/// A link on the index page.
#[derive(Debug, Clone)]
pub struct PageLink {
    pub href: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

const PAGES: &[PageLink] = &[
    PageLink {
        href: "/products",
        title: "Products",
        description: "Search, create, edit and delete products",
    },
    PageLink {
        href: "/categories",
        title: "Categories",
        description: "Manage product categories",
    },
    PageLink {
        href: "/users",
        title: "Users",
        description: "Customer and admin accounts",
    },
    PageLink {
        href: "/carts",
        title: "Carts",
        description: "Shopping carts and their lines",
    },
    PageLink {
        href: "/text_search",
        title: "Text search",
        description: "Find products by describing them",
    },
    PageLink {
        href: "/voice_search",
        title: "Voice search",
        description: "Find products by speaking",
    },
    PageLink {
        href: "/me",
        title: "My account",
        description: "Your profile",
    },
];

/// Index page template.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub nav: NavView,
    pub pages: &'static [PageLink],
}

/// Index page handler.
#[instrument(skip_all)]
pub async fn index(RequireLogin { user, .. }: RequireLogin) -> Html<String> {
    render(&IndexTemplate {
        nav: NavView::new(&user, "/"),
        pages: PAGES,
    })
}
