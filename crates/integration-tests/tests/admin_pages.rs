//! Admin pages driven by a browser-like client against the in-memory backend.
//!
//! Run with: `cargo test -p shopkeeper-integration-tests --test admin_pages`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};

use shopkeeper_integration_tests::{AdminServer, EMAIL, FakeBackend};

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_login_flow_reaches_dashboard() {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser.get(admin.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Shopkeeper Admin"));
    assert!(body.contains(EMAIL));
}

#[tokio::test]
async fn test_bad_password_shows_backend_message() {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let browser = AdminServer::browser();

    let response = browser
        .post(admin.url("/login"))
        .form(&[("email", EMAIL), ("password", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Invalid Credentials!"));

    let response = browser.get(admin.url("/products")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_declined_delete_issues_no_delete_request() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Keep me");
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let confirm = browser
        .get(admin.url(&format!("/categories/{category}/delete")))
        .send()
        .await
        .unwrap();
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(confirm.text().await.unwrap().contains("Keep me"));

    backend.clear_requests();
    let response = browser
        .post(admin.url(&format!("/categories/{category}/delete")))
        .form(&[("confirm", "no")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/categories");
    assert!(backend.requests().iter().all(|r| r.method != "DELETE"));

    let listing = browser
        .get(admin.url("/categories"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(listing.contains("Keep me"));
}

#[tokio::test]
async fn test_confirmed_delete_removes_record() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Old stock");
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser
        .post(admin.url(&format!("/categories/{category}/delete")))
        .form(&[("confirm", "yes")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        backend.count("DELETE", &format!("/categories/{category}")),
        1
    );

    let listing = browser
        .get(admin.url("/categories"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!listing.contains("Old stock"));
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser.get(admin.url("/me")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains(EMAIL));

    backend.revoke_tokens();
    let response = browser.get(admin.url("/me")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // The session no longer carries a token.
    let response = browser.get(admin.url("/categories")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_live_fragment_lists_matching_products() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Phones");
    let _ = backend.seed_product("Phone case", category);
    let _ = backend.seed_product("Desk lamp", category);
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser
        .get(admin.url("/products/live?search=phone"))
        .header("HX-Request", "true")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Phone case"));
    assert!(!body.contains("Desk lamp"));
    assert!(!body.contains("<html"), "live search must return a fragment");
}

#[tokio::test]
async fn test_product_form_rejects_bad_price_without_backend_call() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Tools");
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;
    backend.clear_requests();

    let category = category.to_string();
    let response = browser
        .post(admin.url("/products"))
        .form(&[
            ("title", "Hammer"),
            ("description", ""),
            ("price", "cheap"),
            ("discount_percentage", "0"),
            ("rating", "4"),
            ("stock", "3"),
            ("brand", "Acme"),
            ("thumbnail", "https://img.example/h.png"),
            ("images", ""),
            ("category_id", category.as_str()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Price is not a valid number"));
    assert_eq!(backend.count("POST", "/products/"), 0);
}

#[tokio::test]
async fn test_refused_comment_delete_shows_detail_and_keeps_session() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    let product = backend.seed_product("Speaker", category);
    let comment = backend.seed_foreign_comment(product, "Not mine");
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser
        .post(admin.url(&format!("/comments/{product}/{comment}/delete")))
        .form(&[("confirm", "yes")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(LOCATION).is_none());
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("You are not authorized to delete this comment!")
    );
    assert_eq!(
        backend.count("DELETE", &format!("/products/{product}/comments/{comment}")),
        1
    );

    let response = browser.get(admin.url("/products")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = browser
        .get(admin.url(&format!("/comments/{product}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Not mine"));
}

#[tokio::test]
async fn test_refused_comment_edit_rerenders_form_with_detail() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    let product = backend.seed_product("Speaker", category);
    let comment = backend.seed_foreign_comment(product, "Not mine");
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser
        .post(admin.url(&format!("/comments/{product}/{comment}")))
        .form(&[("content", "Mine now"), ("rating", "5")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("You are not authorized to edit this comment!"));
    assert!(body.contains("Mine now"));

    let response = browser.get(admin.url("/me")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_voice_search_page_renders_upload_form() {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser.get(admin.url("/voice_search")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Voice search"));
    assert!(body.contains(r#"enctype="multipart/form-data""#));
    assert!(body.contains(r#"name="file""#));
}

fn voice_form(words: &'static [u8]) -> Form {
    let part = Part::bytes(words)
        .file_name("recording.webm")
        .mime_str("audio/webm")
        .unwrap();
    Form::new().part("file", part).text("limit", "1")
}

#[tokio::test]
async fn test_voice_upload_renders_full_page_with_results() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    let _ = backend.seed_product("Red speaker", category);
    let _ = backend.seed_product("Desk lamp", category);
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser
        .post(admin.url("/voice_search"))
        .multipart(voice_form(b"speaker"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("<html"));
    assert!(body.contains("Red speaker"));
    assert!(!body.contains("Desk lamp"));

    let uploads = backend.voice_uploads();
    assert_eq!(uploads.len(), 1);
    let upload = uploads.first().unwrap();
    assert_eq!(upload.file_name.as_deref(), Some("recording.webm"));
    assert_eq!(upload.limit, 1);
}

#[tokio::test]
async fn test_recorded_voice_upload_returns_results_fragment() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Audio");
    let _ = backend.seed_product("Red speaker", category);
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;

    let response = browser
        .post(admin.url("/voice_search"))
        .header("HX-Request", "true")
        .multipart(voice_form(b"speaker"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Red speaker"));
    assert!(!body.contains("<html"), "recorder uploads must get a fragment");
}

#[tokio::test]
async fn test_voice_upload_without_audio_asks_for_a_clip() {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;
    backend.clear_requests();

    let response = browser
        .post(admin.url("/voice_search"))
        .multipart(voice_form(b""))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Choose or record an audio clip first")
    );
    assert_eq!(backend.count("POST", "/products/voice_search"), 0);
}

#[tokio::test]
async fn test_product_form_shows_backend_range_error() {
    let backend = FakeBackend::start().await;
    let category = backend.seed_category("Tools");
    let admin = AdminServer::start(&backend).await;
    let browser = admin.signed_in_browser().await;
    backend.clear_requests();

    let category = category.to_string();
    let response = browser
        .post(admin.url("/products"))
        .form(&[
            ("title", "Hammer"),
            ("description", ""),
            ("price", "12.50"),
            ("discount_percentage", "150"),
            ("rating", "4"),
            ("stock", "3"),
            ("brand", "Acme"),
            ("thumbnail", "https://img.example/h.png"),
            ("images", ""),
            ("category_id", category.as_str()),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("discount_percentage must be between 0 and 100")
    );
    assert_eq!(backend.count("POST", "/products/"), 1);
}
