//! Client operations against the in-memory backend.
//!
//! Run with: `cargo test -p shopkeeper-integration-tests --test client_resources`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rust_decimal::Decimal;
use shopkeeper_client::{ApiError, VoiceClip};
use shopkeeper_core::{
    CartInput, CategoryInput, CommentInput, ListParams, Role, UserInput, UserListParams,
};
use shopkeeper_integration_tests::{EMAIL, FakeBackend, PASSWORD, TOKEN, product_input};

#[tokio::test]
async fn test_login_returns_token() {
    let backend = FakeBackend::start().await;
    let token = backend
        .anonymous_client()
        .login(EMAIL, PASSWORD)
        .await
        .unwrap();
    assert_eq!(token.access_token, TOKEN);
    assert_eq!(token.token_type, "bearer");
}

#[tokio::test]
async fn test_login_with_bad_password_reports_backend_detail() {
    let backend = FakeBackend::start().await;
    let err = backend
        .anonymous_client()
        .login(EMAIL, "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.user_message("Failed to log in"), "Invalid Credentials!");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let backend = FakeBackend::start().await;
    let err = backend.anonymous_client().me().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn test_category_round_trip() {
    let backend = FakeBackend::start().await;
    let api = backend.client();

    let created = api
        .create_category(&CategoryInput {
            name: "Phones".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(created.name, "Phones");

    let fetched = api.get_category(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = api
        .update_category(
            created.id,
            &CategoryInput {
                name: "Smartphones".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Smartphones");

    api.delete_category(created.id).await.unwrap();
    let err = api.get_category(created.id).await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
}

#[tokio::test]
async fn test_delete_missing_category_is_not_found() {
    let backend = FakeBackend::start().await;
    let err = backend
        .client()
        .delete_category(shopkeeper_core::CategoryId::new(9999))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_identical_list_calls_return_identical_pages() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    for title in ["Headphones", "Speaker", "Phone stand", "Earphones"] {
        let _ = backend.seed_product(title, category);
    }
    let api = backend.client();
    let params = ListParams::new(1, 10).with_search("phone");

    let first = api.list_products(&params).await.unwrap();
    let second = api.list_products(&params).await.unwrap();
    assert_eq!(first, second);
    let titles: Vec<&str> = first.data.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Headphones", "Phone stand", "Earphones"]);
}

#[tokio::test]
async fn test_consecutive_pages_are_disjoint() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Misc");
    for n in 0..5 {
        let _ = backend.seed_product(&format!("Item {n}"), category);
    }
    let api = backend.client();

    let page1 = api.list_products(&ListParams::new(1, 2)).await.unwrap();
    let page2 = api.list_products(&ListParams::new(2, 2)).await.unwrap();
    let page3 = api.list_products(&ListParams::new(3, 2)).await.unwrap();
    assert_eq!(page1.data.len(), 2);
    assert_eq!(page2.data.len(), 2);
    assert_eq!(page3.data.len(), 1);
    for product in &page2.data {
        assert!(!page1.data.iter().any(|p| p.id == product.id));
    }

    let requests = backend.requests();
    let query = requests.last().unwrap().query.as_deref().unwrap();
    assert!(query.contains("page=3"), "query was {query}");
    assert!(query.contains("limit=2"), "query was {query}");
}

#[tokio::test]
async fn test_product_round_trip_fills_description() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Kitchen");
    let api = backend.client();

    let created = api
        .create_product(&product_input("Kettle", category))
        .await
        .unwrap();
    assert_eq!(created.category.id, category);
    assert!(created.description.is_some());
    assert_eq!(created.sale_price(), Decimal::new(180, 0));

    let mut input = product_input("Kettle XL", category);
    input.stock = 0;
    let updated = api.update_product(created.id, &input).await.unwrap();
    assert_eq!(updated.title, "Kettle XL");
    assert_eq!(updated.stock, 0);

    api.delete_product(created.id).await.unwrap();
    assert!(api.get_product(created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_ai_analysis_without_comments_is_none() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Books");
    let product = backend.seed_product("Novel", category);

    let analysis = backend.client().ai_analysis(product).await.unwrap();
    assert!(analysis.is_none());
}

#[tokio::test]
async fn test_comments_feed_ai_analysis() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Books");
    let product = backend.seed_product("Novel", category);
    let api = backend.client();

    for (content, rating) in [("Loved it", 5.0), ("Great read", 4.0), ("Dull", 1.0)] {
        let _ = api
            .create_comment(
                product,
                &CommentInput {
                    content: content.to_string(),
                    rating,
                },
            )
            .await
            .unwrap();
    }

    let comments = api.list_comments(product, 1, 10).await.unwrap();
    assert_eq!(comments.data.len(), 3);
    assert!(comments.data.iter().all(|c| c.product_id == product));

    let analysis = api.ai_analysis(product).await.unwrap().unwrap();
    assert_eq!(analysis.product.id, product);
    assert_eq!(analysis.comment_count(), 3);
    assert!((analysis.sentiment_score_avg - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_comment_edit_and_delete() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Toys");
    let product = backend.seed_product("Kite", category);
    let api = backend.client();

    let comment = api
        .create_comment(
            product,
            &CommentInput {
                content: "Flies ok".to_string(),
                rating: 3.0,
            },
        )
        .await
        .unwrap();

    let edited = api
        .update_comment(
            product,
            comment.id,
            &CommentInput {
                content: "Flies great".to_string(),
                rating: 5.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.content, "Flies great");

    api.delete_comment(product, comment.id).await.unwrap();
    assert!(
        api.get_comment(product, comment.id)
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_text_search_respects_limit() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    for title in ["Red speaker", "Blue speaker", "Green lamp"] {
        let _ = backend.seed_product(title, category);
    }

    let results = backend
        .client()
        .text_search("speaker", 2)
        .await
        .unwrap();
    assert_eq!(results.data.len(), 2);
    assert!(results.data.iter().all(|p| p.title.ends_with("speaker")));
    assert_eq!(backend.count("POST", "/products/text_search"), 1);
}

#[tokio::test]
async fn test_voice_search_uploads_clip_as_file_part() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    for title in ["Red speaker", "Blue speaker", "Green lamp"] {
        let _ = backend.seed_product(title, category);
    }

    let clip = VoiceClip::new(b"speaker".to_vec(), "query.ogg", "audio/ogg");
    let results = backend.client().voice_search(clip, 1).await.unwrap();
    assert_eq!(results.data.len(), 1);
    assert!(results.data.first().unwrap().title.ends_with("speaker"));

    let request = backend
        .requests()
        .into_iter()
        .find(|r| r.is("POST", "/products/voice_search"))
        .unwrap();
    assert_eq!(request.query.as_deref(), Some("limit=1"));

    let uploads = backend.voice_uploads();
    assert_eq!(uploads.len(), 1);
    let upload = uploads.first().unwrap();
    assert_eq!(upload.file_name.as_deref(), Some("query.ogg"));
    assert_eq!(upload.content_type.as_deref(), Some("audio/ogg"));
    assert_eq!(upload.transcript, "speaker");
    assert_eq!(upload.limit, 1);
}

#[tokio::test]
async fn test_voice_search_failure_reports_backend_detail() {
    let backend = FakeBackend::start().await;
    let clip = VoiceClip::new(b"   ".to_vec(), "silence.wav", "audio/wav");
    let err = backend.client().voice_search(clip, 5).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.user_message("Failed to search by voice"),
        "Could not transcribe audio"
    );
    assert!(backend.voice_uploads().is_empty());
}

#[tokio::test]
async fn test_deleting_someone_elses_comment_is_refused_with_detail() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    let product = backend.seed_product("Speaker", category);
    let comment = backend.seed_foreign_comment(product, "Not mine");
    let api = backend.client();

    let err = api.delete_comment(product, comment).await.unwrap_err();
    assert!(
        matches!(&err, ApiError::Unauthorized(Some(detail)) if detail == "You are not authorized to delete this comment!")
    );
    // Still signed in: other calls keep working.
    assert_eq!(api.get_comment(product, comment).await.unwrap().content, "Not mine");
}

#[tokio::test]
async fn test_users_and_carts() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Garden");
    let rake = backend.seed_product("Rake", category);
    let api = backend.client();

    let user = api
        .create_user(&UserInput {
            fullname: "Ann Lee".to_string(),
            username: "ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    let listed = api
        .list_users(&UserListParams {
            list: ListParams::new(1, 10).with_search("ann"),
            role: Role::User,
        })
        .await
        .unwrap();
    assert_eq!(listed.data.len(), 1);
    assert_eq!(listed.data.first().map(|u| u.id), Some(user.id));

    let cart = api
        .create_cart(&CartInput::from_pairs([(rake, 2)]))
        .await
        .unwrap();
    assert_eq!(cart.unit_count(), 2);
    assert_eq!(cart.total_amount, Decimal::new(360, 0));

    api.delete_cart(cart.id).await.unwrap();
    api.delete_user(user.id).await.unwrap();
    assert!(api.get_cart(cart.id).await.unwrap_err().is_not_found());
}
