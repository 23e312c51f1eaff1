//! Integration test harness for Shopkeeper.
//!
//! [`FakeBackend`] is an in-memory storefront API served by axum on an
//! ephemeral port. It speaks the same paths, status codes and JSON shapes as
//! the real backend, logs every request it receives, and can be told to slow
//! down list calls or reject tokens.
//!
//! Voice search "transcribes" a clip by reading its bytes as UTF-8, so a test
//! uploads the words it wants searched.
//!
//! [`AdminServer`] runs the admin router against a backend so pages can be
//! driven with a cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopkeeper-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;
use url::Url;

use shopkeeper_client::{ApiClient, Session};
use shopkeeper_core::{
    Account, Cart, CartId, CartInput, CartItem, CartItemId, Category, CategoryId, CategoryInput,
    Comment, CommentId, CommentInput, ListResponse, Product, ProductId, ProductInput, Role,
    SentimentLabel, Timestamp, User, UserId, UserInput,
};

/// Email accepted by the fake `/login/`.
pub const EMAIL: &str = "admin@example.com";
/// Password accepted by the fake `/login/`.
pub const PASSWORD: &str = "correct horse";
/// Token issued by the fake `/login/`.
pub const TOKEN: &str = "test-token";

/// Timeout used by every test client.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// A voice clip as received by the fake `/products/voice_search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub transcript: String,
    pub limit: u32,
}

/// A request as seen by the fake backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
}

impl RecordedRequest {
    /// Whether this is `method` on exactly `path`.
    #[must_use]
    pub fn is(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

struct Store {
    next_id: i32,
    categories: BTreeMap<i32, Category>,
    products: BTreeMap<i32, Product>,
    comments: BTreeMap<i32, Comment>,
    /// Comments written by someone other than the signed-in account.
    foreign_comments: BTreeSet<i32>,
    users: BTreeMap<i32, User>,
    carts: BTreeMap<i32, Cart>,
    account: Option<Account>,
    requests: Vec<RecordedRequest>,
    voice_uploads: Vec<VoiceUpload>,
    list_delay: Duration,
    tokens_revoked: bool,
}

impl Store {
    fn new() -> Self {
        let account = Account {
            id: UserId::new(1),
            username: "admin".to_string(),
            email: EMAIL.to_string(),
            fullname: "Store Admin".to_string(),
            role: Role::Admin,
            is_active: true,
            created_at: now(),
            carts: Vec::new(),
        };
        let mut users = BTreeMap::new();
        users.insert(1, account_as_user(&account));
        Self {
            next_id: 100,
            categories: BTreeMap::new(),
            products: BTreeMap::new(),
            comments: BTreeMap::new(),
            foreign_comments: BTreeSet::new(),
            users,
            carts: BTreeMap::new(),
            account: Some(account),
            requests: Vec::new(),
            voice_uploads: Vec::new(),
            list_delay: Duration::ZERO,
            tokens_revoked: false,
        }
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn product_from_input(&self, id: ProductId, input: ProductInput) -> Result<Product, Response> {
        if !(0.0..=100.0).contains(&input.discount_percentage) {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"detail": [{
                    "loc": ["body", "discount_percentage"],
                    "msg": "Value error, discount_percentage must be between 0 and 100",
                    "type": "value_error",
                }]})),
            )
                .into_response());
        }
        let category = self
            .categories
            .get(&input.category_id.as_i32())
            .cloned()
            .ok_or_else(|| not_found("Category"))?;
        Ok(Product {
            id,
            description: Some(
                input
                    .description
                    .unwrap_or_else(|| format!("A fine {} by {}.", input.title, input.brand)),
            ),
            title: input.title,
            price: input.price,
            discount_percentage: input.discount_percentage,
            rating: input.rating,
            stock: input.stock,
            brand: input.brand,
            thumbnail: input.thumbnail,
            images: input.images,
            is_published: input.is_published,
            created_at: now(),
            category,
        })
    }

    fn cart_from_input(&mut self, id: CartId, input: &CartInput) -> Result<Cart, Response> {
        let mut items = Vec::new();
        for line in &input.cart_items {
            let product = self
                .products
                .get(&line.product_id.as_i32())
                .ok_or_else(|| not_found("Product"))?;
            let subtotal = product.sale_price() * Decimal::from(line.quantity);
            items.push(CartItem {
                id: CartItemId::new(0),
                product_id: line.product_id,
                quantity: line.quantity,
                subtotal,
            });
        }
        for item in &mut items {
            item.id = CartItemId::new(self.next_id());
        }
        Ok(Cart {
            id,
            user_id: UserId::new(1),
            created_at: now(),
            total_amount: items.iter().map(|item| item.subtotal).sum(),
            items,
        })
    }
}

fn now() -> Timestamp {
    Timestamp::parse("2025-01-01T00:00:00").expect("valid timestamp")
}

fn account_as_user(account: &Account) -> User {
    User {
        id: account.id,
        username: account.username.clone(),
        email: Some(account.email.clone()),
        fullname: account.fullname.clone(),
        role: Some(account.role),
        is_active: account.is_active,
        created_at: account.created_at,
        carts: account.carts.clone(),
    }
}

type Shared = Arc<Mutex<Store>>;

fn lock(store: &Shared) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": format!("{what} not found") })),
    )
        .into_response()
}

fn matches_search(text: &str, search: Option<&str>) -> bool {
    search.is_none_or(|search| text.to_lowercase().contains(&search.to_lowercase()))
}

/// One page of `items`, 1-based.
fn paginate<T>(items: impl Iterator<Item = T>, query: &ListQuery) -> Vec<T> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let skip = usize::try_from((page - 1) * limit).unwrap_or(usize::MAX);
    items
        .skip(skip)
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    search: Option<String>,
    role: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl ListQuery {
    fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Middleware
// =============================================================================

async fn record_and_authorize(State(store): State<Shared>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let revoked = {
        let mut store = lock(&store);
        store.requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: path.clone(),
            query: request.uri().query().map(str::to_string),
        });
        store.tokens_revoked
    };

    if path != "/login/" {
        let expected = format!("Bearer {TOKEN}");
        let presented = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if revoked || presented != Some(expected.as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Could not validate credentials" })),
            )
                .into_response();
        }
    }

    next.run(request).await
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(Form(form): Form<LoginForm>) -> Response {
    if form.username == EMAIL && form.password == PASSWORD {
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
    } else {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "Invalid Credentials!" })),
        )
            .into_response()
    }
}

async fn me(State(store): State<Shared>) -> Response {
    lock(&store)
        .account
        .clone()
        .map_or_else(|| not_found("User"), |account| Json(account).into_response())
}

#[derive(Deserialize)]
struct AccountUpdateBody {
    username: String,
    fullname: String,
}

async fn update_me(State(store): State<Shared>, Json(body): Json<AccountUpdateBody>) -> Response {
    let mut store = lock(&store);
    let Some(account) = store.account.as_mut() else {
        return not_found("User");
    };
    account.username = body.username;
    account.fullname = body.fullname;
    Json(account.clone()).into_response()
}

async fn delete_me(State(store): State<Shared>) -> StatusCode {
    let mut store = lock(&store);
    store.account = None;
    store.users.remove(&1);
    StatusCode::NO_CONTENT
}

async fn list_categories(
    State(store): State<Shared>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse<Category>> {
    let store = lock(&store);
    let matching = store
        .categories
        .values()
        .filter(|c| matches_search(&c.name, query.search()))
        .cloned();
    Json(ListResponse::from_items(paginate(matching, &query)))
}

async fn create_category(
    State(store): State<Shared>,
    Json(input): Json<CategoryInput>,
) -> (StatusCode, Json<Category>) {
    let mut store = lock(&store);
    let id = store.next_id();
    let category = Category {
        id: CategoryId::new(id),
        name: input.name,
    };
    store.categories.insert(id, category.clone());
    (StatusCode::CREATED, Json(category))
}

async fn get_category(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    lock(&store).categories.get(&id).map_or_else(
        || not_found("Category"),
        |c| (StatusCode::PARTIAL_CONTENT, Json(c.clone())).into_response(),
    )
}

async fn update_category(
    State(store): State<Shared>,
    Path(id): Path<i32>,
    Json(input): Json<CategoryInput>,
) -> Response {
    let mut store = lock(&store);
    let Some(category) = store.categories.get_mut(&id) else {
        return not_found("Category");
    };
    category.name = input.name;
    Json(category.clone()).into_response()
}

async fn delete_category(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    if lock(&store).categories.remove(&id).is_some() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("Category")
    }
}

async fn list_products(State(store): State<Shared>, Query(query): Query<ListQuery>) -> Response {
    let delay = lock(&store).list_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let store = lock(&store);
    let matching = store
        .products
        .values()
        .filter(|p| matches_search(&p.title, query.search()))
        .cloned();
    Json(ListResponse::from_items(paginate(matching, &query))).into_response()
}

async fn create_product(State(store): State<Shared>, Json(input): Json<ProductInput>) -> Response {
    let mut store = lock(&store);
    let id = store.next_id();
    match store.product_from_input(ProductId::new(id), input) {
        Ok(product) => {
            store.products.insert(id, product.clone());
            (StatusCode::CREATED, Json(product)).into_response()
        }
        Err(response) => response,
    }
}

async fn get_product(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    lock(&store).products.get(&id).map_or_else(
        || not_found("Product"),
        |p| (StatusCode::PARTIAL_CONTENT, Json(p.clone())).into_response(),
    )
}

async fn update_product(
    State(store): State<Shared>,
    Path(id): Path<i32>,
    Json(input): Json<ProductInput>,
) -> Response {
    let mut store = lock(&store);
    if !store.products.contains_key(&id) {
        return not_found("Product");
    }
    match store.product_from_input(ProductId::new(id), input) {
        Ok(product) => {
            store.products.insert(id, product.clone());
            Json(product).into_response()
        }
        Err(response) => response,
    }
}

async fn delete_product(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    let mut store = lock(&store);
    if store.products.remove(&id).is_none() {
        return not_found("Product");
    }
    store.comments.retain(|_, c| c.product_id.as_i32() != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn ai_analysis(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    let store = lock(&store);
    let Some(product) = store.products.get(&id).cloned() else {
        return not_found("Product");
    };
    let comments: Vec<&Comment> = store
        .comments
        .values()
        .filter(|c| c.product_id.as_i32() == id)
        .collect();
    if comments.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut polarity = 0.0;
    for comment in &comments {
        *counts
            .entry(comment.sentiment_label.as_str().to_uppercase())
            .or_default() += 1;
        polarity += f64::from(comment.sentiment_label.polarity());
    }
    let total = comments.len();
    Json(json!({
        "product": product,
        "sentiment_score_avg": polarity / f64::from(u32::try_from(total).unwrap_or(u32::MAX)),
        "sentiment_label_counts": counts,
        "comments_summary": format!("{total} customers commented on {}.", product.title),
    }))
    .into_response()
}

#[derive(Deserialize)]
struct TextSearchBody {
    search: String,
    limit: u32,
}

async fn text_search(State(store): State<Shared>, Json(body): Json<TextSearchBody>) -> Response {
    let store = lock(&store);
    Json(rank_products(&store, &body.search, body.limit)).into_response()
}

#[derive(Deserialize)]
struct VoiceSearchQuery {
    #[serde(default = "default_voice_limit")]
    limit: u32,
}

const fn default_voice_limit() -> u32 {
    10
}

async fn voice_search(
    State(store): State<Shared>,
    Query(query): Query<VoiceSearchQuery>,
    mut multipart: Multipart,
) -> Response {
    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return unprocessable(&e.to_string()),
        };
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return unprocessable(&e.to_string()),
        };
        upload = Some(VoiceUpload {
            file_name,
            content_type,
            transcript: String::from_utf8_lossy(&bytes).trim().to_string(),
            limit: query.limit,
        });
    }

    let Some(upload) = upload else {
        return unprocessable("Field required: file");
    };
    if upload.transcript.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Could not transcribe audio"})),
        )
            .into_response();
    }

    let mut store = lock(&store);
    let ranked = rank_products(&store, &upload.transcript, upload.limit);
    store.voice_uploads.push(upload);
    Json(ranked).into_response()
}

fn unprocessable(detail: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": detail})),
    )
        .into_response()
}

/// Products ordered by how many words of `text` their title contains.
fn rank_products(store: &Store, text: &str, limit: u32) -> ListResponse<Product> {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    let mut ranked: Vec<(usize, Product)> = store
        .products
        .values()
        .map(|p| {
            let title = p.title.to_lowercase();
            let hits = words.iter().filter(|w| title.contains(w.as_str())).count();
            (hits, p.clone())
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    let products = ranked
        .into_iter()
        .map(|(_, p)| p)
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();
    ListResponse::from_items(products)
}

/// The backend answers 401 when the signed-in user did not write the comment.
fn not_author(action: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": format!("You are not authorized to {action} this comment!")})),
    )
        .into_response()
}

fn sentiment_for(rating: f64) -> (SentimentLabel, f64) {
    let label = if rating >= 4.0 {
        SentimentLabel::Positive
    } else if rating <= 2.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };
    (label, rating / 5.0)
}

async fn list_comments(
    State(store): State<Shared>,
    Path(product_id): Path<i32>,
    Query(query): Query<ListQuery>,
) -> Response {
    let store = lock(&store);
    if !store.products.contains_key(&product_id) {
        return not_found("Product");
    }
    let matching = store
        .comments
        .values()
        .filter(|c| c.product_id.as_i32() == product_id)
        .cloned();
    Json(ListResponse::from_items(paginate(matching, &query))).into_response()
}

async fn create_comment(
    State(store): State<Shared>,
    Path(product_id): Path<i32>,
    Json(input): Json<CommentInput>,
) -> Response {
    let mut store = lock(&store);
    if !store.products.contains_key(&product_id) {
        return not_found("Product");
    }
    let id = store.next_id();
    let (sentiment_label, sentiment_score) = sentiment_for(input.rating);
    let comment = Comment {
        id: CommentId::new(id),
        product_id: ProductId::new(product_id),
        content: input.content,
        rating: input.rating,
        created_at: now(),
        sentiment_score,
        sentiment_label,
    };
    store.comments.insert(id, comment.clone());
    (StatusCode::CREATED, Json(comment)).into_response()
}

async fn get_comment(
    State(store): State<Shared>,
    Path((product_id, id)): Path<(i32, i32)>,
) -> Response {
    lock(&store)
        .comments
        .get(&id)
        .filter(|c| c.product_id.as_i32() == product_id)
        .map_or_else(
            || not_found("Comment"),
            |c| (StatusCode::PARTIAL_CONTENT, Json(c.clone())).into_response(),
        )
}

async fn update_comment(
    State(store): State<Shared>,
    Path((product_id, id)): Path<(i32, i32)>,
    Json(input): Json<CommentInput>,
) -> Response {
    let mut store = lock(&store);
    if store.foreign_comments.contains(&id) {
        return not_author("edit");
    }
    let Some(comment) = store
        .comments
        .get_mut(&id)
        .filter(|c| c.product_id.as_i32() == product_id)
    else {
        return not_found("Comment");
    };
    let (sentiment_label, sentiment_score) = sentiment_for(input.rating);
    comment.content = input.content;
    comment.rating = input.rating;
    comment.sentiment_label = sentiment_label;
    comment.sentiment_score = sentiment_score;
    Json(comment.clone()).into_response()
}

async fn delete_comment(
    State(store): State<Shared>,
    Path((product_id, id)): Path<(i32, i32)>,
) -> Response {
    let mut store = lock(&store);
    let owned = store
        .comments
        .get(&id)
        .is_some_and(|c| c.product_id.as_i32() == product_id);
    if owned && store.foreign_comments.contains(&id) {
        not_author("delete")
    } else if owned {
        store.comments.remove(&id);
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("Comment")
    }
}

async fn list_users(State(store): State<Shared>, Query(query): Query<ListQuery>) -> Response {
    let store = lock(&store);
    let role: Role = query
        .role
        .as_deref()
        .and_then(|r| r.parse().ok())
        .unwrap_or_default();
    let matching = store
        .users
        .values()
        .filter(|u| u.role.unwrap_or_default() == role)
        .filter(|u| matches_search(&u.username, query.search()))
        .map(|u| User {
            email: None,
            role: None,
            ..u.clone()
        });
    Json(ListResponse::from_items(paginate(matching, &query))).into_response()
}

async fn create_user(State(store): State<Shared>, Json(input): Json<UserInput>) -> Response {
    let mut store = lock(&store);
    let id = store.next_id();
    let user = User {
        id: UserId::new(id),
        username: input.username,
        email: Some(input.email),
        fullname: input.fullname,
        role: Some(Role::User),
        is_active: true,
        created_at: now(),
        carts: Vec::new(),
    };
    store.users.insert(id, user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn get_user(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    lock(&store).users.get(&id).map_or_else(
        || not_found("User"),
        |u| (StatusCode::PARTIAL_CONTENT, Json(u.clone())).into_response(),
    )
}

async fn update_user(
    State(store): State<Shared>,
    Path(id): Path<i32>,
    Json(input): Json<UserInput>,
) -> Response {
    let mut store = lock(&store);
    let Some(user) = store.users.get_mut(&id) else {
        return not_found("User");
    };
    user.username = input.username;
    user.fullname = input.fullname;
    user.email = Some(input.email);
    Json(user.clone()).into_response()
}

async fn delete_user(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    if lock(&store).users.remove(&id).is_some() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("User")
    }
}

async fn list_carts(State(store): State<Shared>, Query(query): Query<ListQuery>) -> Response {
    let store = lock(&store);
    Json(ListResponse::from_items(paginate(
        store.carts.values().cloned(),
        &query,
    )))
    .into_response()
}

async fn create_cart(State(store): State<Shared>, Json(input): Json<CartInput>) -> Response {
    let mut store = lock(&store);
    let id = store.next_id();
    match store.cart_from_input(CartId::new(id), &input) {
        Ok(cart) => {
            store.carts.insert(id, cart.clone());
            (StatusCode::CREATED, Json(cart)).into_response()
        }
        Err(response) => response,
    }
}

async fn get_cart(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    lock(&store).carts.get(&id).map_or_else(
        || not_found("Cart"),
        |c| (StatusCode::PARTIAL_CONTENT, Json(c.clone())).into_response(),
    )
}

async fn update_cart(
    State(store): State<Shared>,
    Path(id): Path<i32>,
    Json(input): Json<CartInput>,
) -> Response {
    let mut store = lock(&store);
    if !store.carts.contains_key(&id) {
        return not_found("Cart");
    }
    match store.cart_from_input(CartId::new(id), &input) {
        Ok(cart) => {
            store.carts.insert(id, cart.clone());
            Json(cart).into_response()
        }
        Err(response) => response,
    }
}

async fn delete_cart(State(store): State<Shared>, Path(id): Path<i32>) -> Response {
    if lock(&store).carts.remove(&id).is_some() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found("Cart")
    }
}

fn backend_router(store: Shared) -> Router {
    Router::new()
        .route("/login/", post(login))
        .route("/me/", get(me).put(update_me).delete(delete_me))
        .route("/categories/", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/products/", get(list_products).post(create_product))
        .route("/products/text_search", post(text_search))
        .route("/products/voice_search", post(voice_search))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/ai_analysis", get(ai_analysis))
        .route(
            "/products/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/products/{product_id}/comments/{id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route("/users/", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/carts/", get(list_carts).post(create_cart))
        .route(
            "/carts/{id}",
            get(get_cart).put(update_cart).delete(delete_cart),
        )
        .layer(middleware::from_fn_with_state(
            store.clone(),
            record_and_authorize,
        ))
        .with_state(store)
}

async fn serve(router: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    let task = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    (addr, task)
}

// =============================================================================
// FakeBackend
// =============================================================================

/// In-memory storefront API on an ephemeral port. Stops when dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    store: Shared,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Start an empty backend with one admin account ([`EMAIL`]).
    pub async fn start() -> Self {
        let store = Arc::new(Mutex::new(Store::new()));
        let (addr, task) = serve(backend_router(store.clone())).await;
        Self { addr, store, task }
    }

    /// Base URL of the API.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("valid backend URL")
    }

    /// Client without a token.
    #[must_use]
    pub fn anonymous_client(&self) -> ApiClient {
        ApiClient::new(&self.url(), CLIENT_TIMEOUT).expect("client")
    }

    /// Client carrying [`TOKEN`].
    #[must_use]
    pub fn client(&self) -> ApiClient {
        self.anonymous_client().with_session(Session::bearer(TOKEN))
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.store).requests.clone()
    }

    /// Number of `method` requests on exactly `path`.
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        lock(&self.store)
            .requests
            .iter()
            .filter(|r| r.is(method, path))
            .count()
    }

    /// Forget the request log.
    pub fn clear_requests(&self) {
        lock(&self.store).requests.clear();
    }

    /// Delay every product list response by `delay`.
    pub fn set_list_delay(&self, delay: Duration) {
        lock(&self.store).list_delay = delay;
    }

    /// Every clip the fake voice search has accepted.
    #[must_use]
    pub fn voice_uploads(&self) -> Vec<VoiceUpload> {
        lock(&self.store).voice_uploads.clone()
    }

    /// Reject [`TOKEN`] from now on, as if it expired.
    pub fn revoke_tokens(&self) {
        lock(&self.store).tokens_revoked = true;
    }

    /// Insert a category directly.
    #[must_use]
    pub fn seed_category(&self, name: &str) -> CategoryId {
        let mut store = lock(&self.store);
        let id = store.next_id();
        store.categories.insert(
            id,
            Category {
                id: CategoryId::new(id),
                name: name.to_string(),
            },
        );
        CategoryId::new(id)
    }

    /// Insert a product directly.
    #[must_use]
    pub fn seed_product(&self, title: &str, category_id: CategoryId) -> ProductId {
        let mut store = lock(&self.store);
        let id = ProductId::new(store.next_id());
        let product = store
            .product_from_input(id, product_input(title, category_id))
            .map_err(|_| "unknown category")
            .expect("seed product");
        store.products.insert(id.as_i32(), product);
        id
    }

    /// Insert a comment written by another user; the signed-in account may
    /// read it but not edit or delete it.
    #[must_use]
    pub fn seed_foreign_comment(&self, product_id: ProductId, content: &str) -> CommentId {
        let mut store = lock(&self.store);
        let id = store.next_id();
        let (sentiment_label, sentiment_score) = sentiment_for(4.0);
        store.comments.insert(
            id,
            Comment {
                id: CommentId::new(id),
                product_id,
                content: content.to_string(),
                rating: 4.0,
                created_at: now(),
                sentiment_score,
                sentiment_label,
            },
        );
        store.foreign_comments.insert(id);
        CommentId::new(id)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A valid product body.
#[must_use]
pub fn product_input(title: &str, category_id: CategoryId) -> ProductInput {
    ProductInput {
        title: title.to_string(),
        description: None,
        price: Decimal::new(20_000, 2),
        discount_percentage: 10.0,
        rating: 4.0,
        stock: 5,
        brand: "Acme".to_string(),
        thumbnail: "https://img.example/thumb.png".to_string(),
        images: Vec::new(),
        is_published: true,
        category_id,
    }
}

// =============================================================================
// AdminServer
// =============================================================================

/// The admin panel served against a backend. Stops when dropped.
pub struct AdminServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl AdminServer {
    /// Serve the admin router against `backend`.
    pub async fn start(backend: &FakeBackend) -> Self {
        let api_url = backend.url().to_string();
        let config = shopkeeper_admin::config::AdminConfig::from_lookup(|key| match key {
            "SHOPKEEPER_API_URL" => Some(api_url.clone()),
            "SHOPKEEPER_SEARCH_DEBOUNCE_MS" => Some("50".to_string()),
            _ => None,
        })
        .expect("admin config");
        let state = shopkeeper_admin::state::AppState::new(config).expect("admin state");
        let (addr, task) = serve(shopkeeper_admin::app(state)).await;
        Self { addr, task }
    }

    /// Absolute URL of an admin page.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Browser-like client: keeps cookies, does not follow redirects.
    #[must_use]
    pub fn browser() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(CLIENT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client")
    }

    /// A browser already signed in as [`EMAIL`].
    pub async fn signed_in_browser(&self) -> reqwest::Client {
        let browser = Self::browser();
        let response = browser
            .post(self.url("/login"))
            .form(&[("email", EMAIL), ("password", PASSWORD)])
            .send()
            .await
            .expect("login request");
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
        browser
    }
}

impl Drop for AdminServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
