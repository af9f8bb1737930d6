mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

#[tokio::test]
async fn test_redirect_to_target() {
    let ctx = common::words_context().await;
    common::create_test_link(&ctx, "abc", "https://example.com/page?x=1").await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    let response = server.get("/abc").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/page?x=1");
}

#[tokio::test]
async fn test_redirect_counts_clicks() {
    let ctx = common::words_context().await;
    common::create_test_link(&ctx, "abc", "https://example.com").await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    for expected in 1..=3 {
        server
            .get("/abc")
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);

        let stats = server.get("/stats/abc").await.json::<serde_json::Value>();
        assert_eq!(stats["clicks"], expected);
    }
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let ctx = common::words_context().await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    let response = server.get("/nope").await;

    response.assert_status_not_found();
    response.assert_text("Short URL not found");
}

#[tokio::test]
async fn test_redirect_is_case_sensitive() {
    let ctx = common::words_context().await;
    common::create_test_link(&ctx, "abc", "https://example.com").await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    server.get("/ABC").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_encodes_non_ascii_target() {
    let ctx = common::words_context().await;
    common::create_test_link(&ctx, "cafe", "https://example.com/café").await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    let response = server.get("/cafe").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/caf%C3%A9");
}

#[tokio::test]
async fn test_shorten_then_redirect_flow() {
    let ctx = common::sequence_context().await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    let created = server
        .post("/shorten")
        .json(&json!({ "url": "https://rust-lang.org" }))
        .await
        .json::<serde_json::Value>();
    let code = created["code"].as_str().unwrap();

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://rust-lang.org");
}

#[tokio::test]
async fn test_clicks_survive_restart() {
    let ctx = common::words_context().await;
    common::create_test_link(&ctx, "abc", "https://example.com").await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    server.get("/abc").await;
    server.get("/abc").await;

    let reopened = common::open_store(&ctx.dir).await;
    let stats = snaplink::domain::repositories::MappingStore::get_stats(&*reopened, "abc")
        .await
        .unwrap();
    assert_eq!(stats.clicks, 2);
}

#[tokio::test]
async fn test_configured_word_separator_codes_resolve() {
    let config = snaplink::config::Config {
        word_separator: "_".to_string(),
        ..Default::default()
    };
    config.validate().unwrap();

    let ctx = common::create_test_context(config.code_policy()).await;
    let server = TestServer::new(common::test_router(ctx.state.clone())).unwrap();

    let created = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com/words" }))
        .await
        .json::<serde_json::Value>();
    let code = created["code"].as_str().unwrap();
    assert!(code.contains('_'));

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/words");
}
