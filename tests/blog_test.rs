mod common;

use axum::http::StatusCode;
use common::{API_KEY, TestApp, body_json, envelope_ok, request};
use serde_json::json;
use simple_blog::store::PostStatus;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_body() -> serde_json::Value {
    json!({
        "title": "Hello world",
        "content": "A first post with enough content."
    })
}

#[tokio::test]
async fn create_post_survives_workflow_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog/publish/v1"))
        .and(header("X-API-Key", API_KEY))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": { "code": "PUBLISH_FAILED", "message": "queue down" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(Some(&server.uri()));
    let (user, cookie) = app.login_as("author@example.com");

    let response = app
        .send(request("POST", "/api/blogs", Some(&cookie), Some(post_body())))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["post"]["status"], "draft");
    assert_eq!(
        body["resp_data"]["warnings"],
        json!(["Publish workflow failed: queue down"])
    );

    let posts = app.store.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].author_id, user.id);
    assert_eq!(posts[0].status, PostStatus::Draft);
    assert_eq!(app.cache.invalidated(), vec!["/"]);
}

#[tokio::test]
async fn create_post_without_workflow_config_warns() {
    let app = TestApp::new(None);
    let (_user, cookie) = app.login_as("author@example.com");

    let response = app
        .send(request("POST", "/api/blogs", Some(&cookie), Some(post_body())))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let warning = body["resp_data"]["warnings"][0].as_str().unwrap();
    assert!(warning.starts_with("Publish workflow failed"));
    assert_eq!(app.store.posts().len(), 1);
}

#[tokio::test]
async fn create_post_with_cover_image_runs_both_workflows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog/publish/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_ok(json!({
            "blog_id": "00000000-0000-0000-0000-000000000000",
            "published_at": "2024-01-01T00:00:00Z",
            "notifications": { "email_sent": 3, "email_failed": 0 },
            "seo": { "score": 80.0, "meta_generated": true },
            "images_processed": 1
        }))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/media/process/v1"))
        .and(body_partial_json(json!({ "image_url": "https://cdn.test/cover.png" })))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(Some(&server.uri()));
    let (_user, cookie) = app.login_as("author@example.com");

    let mut input = post_body();
    input["cover_image_url"] = json!("https://cdn.test/cover.png");
    let response = app
        .send(request("POST", "/api/blogs", Some(&cookie), Some(input)))
        .await;

    let body = body_json(response).await;
    assert_eq!(body["resp_data"]["publish"]["notifications"]["email_sent"], 3);
    assert!(body["resp_data"]["media"].is_null());
    assert_eq!(
        body["resp_data"]["warnings"],
        json!(["Media workflow failed: An error occurred"])
    );
    assert_eq!(
        app.store.posts()[0].cover_image_url.as_deref(),
        Some("https://cdn.test/cover.png")
    );
}

#[tokio::test]
async fn invalid_form_is_rejected_before_any_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = TestApp::new(Some(&server.uri()));
    let (_user, cookie) = app.login_as("author@example.com");

    let response = app
        .send(request(
            "POST",
            "/api/blogs",
            Some(&cookie),
            Some(json!({ "title": "Hi", "content": "short" })),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1000);
    assert_eq!(
        body["resp_data"]["title"],
        "Title must be at least 3 characters"
    );
    assert_eq!(
        body["resp_data"]["content"],
        "Content must be at least 10 characters"
    );
    assert!(app.store.posts().is_empty());
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() {
    let app = TestApp::new(None);
    let (author, _) = app.login_as("author@example.com");
    let (_intruder, cookie) = app.login_as("intruder@example.com");
    let post = app.store.seed_post(author.id, "Original title", 0);

    let update = app
        .send(request(
            "PUT",
            &format!("/api/blogs/{}", post.id),
            Some(&cookie),
            Some(json!({ "title": "Hijacked", "content": "Replaced content body" })),
        ))
        .await;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(update).await["msg"],
        "Post not found or you are not the author"
    );

    let delete = app
        .send(request(
            "DELETE",
            &format!("/api/blogs/{}", post.id),
            Some(&cookie),
            None,
        ))
        .await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    let stored = app.store.post(post.id).expect("post still exists");
    assert_eq!(stored.title, "Original title");
    assert_eq!(stored.updated_at, post.updated_at);
    assert!(app.cache.invalidated().is_empty());
}

#[tokio::test]
async fn owner_update_invalidates_detail_and_list() {
    let app = TestApp::new(None);
    let (author, cookie) = app.login_as("author@example.com");
    let post = app.store.seed_post(author.id, "Original title", 0);

    let response = app
        .send(request(
            "PUT",
            &format!("/api/blogs/{}", post.id),
            Some(&cookie),
            Some(json!({ "title": "Edited title", "content": "Edited content body" })),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.store.post(post.id).unwrap().title, "Edited title");
    assert_eq!(
        app.cache.invalidated(),
        vec![format!("/blog/{}", post.id), "/".to_string()]
    );
}

#[tokio::test]
async fn owner_delete_removes_post() {
    let app = TestApp::new(None);
    let (author, cookie) = app.login_as("author@example.com");
    let post = app.store.seed_post(author.id, "Doomed", 0);

    let response = app
        .send(request(
            "DELETE",
            &format!("/api/blogs/{}", post.id),
            Some(&cookie),
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.store.post(post.id).is_none());
    assert!(app.cache.invalidated().contains(&"/".to_string()));
}

#[tokio::test]
async fn list_paginates_nine_per_page_with_author_names() {
    let app = TestApp::new(None);
    let author = uuid::Uuid::new_v4();
    app.store.seed_profile(author, "Min", "Kim");
    for i in 0..10 {
        app.store.seed_post(author, &format!("Post {}", i), i);
    }

    let first = body_json(app.send(request("GET", "/api/blogs", None, None)).await).await;
    let first = &first["resp_data"];
    assert_eq!(first["posts"].as_array().unwrap().len(), 9);
    assert_eq!(first["total"], 10);
    assert_eq!(first["page"], 1);
    assert_eq!(first["total_pages"], 2);
    // 最新的在前
    assert_eq!(first["posts"][0]["title"], "Post 0");
    assert_eq!(first["posts"][0]["author_name"], "Min Kim");

    let second =
        body_json(app.send(request("GET", "/api/blogs?page=2", None, None)).await).await;
    let posts = second["resp_data"]["posts"].as_array().unwrap().clone();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Post 9");

    let clamped =
        body_json(app.send(request("GET", "/api/blogs?page=0", None, None)).await).await;
    assert_eq!(clamped["resp_data"]["page"], 1);
}

#[tokio::test]
async fn huge_page_number_is_clamped_not_overflowed() {
    let app = TestApp::new(None);
    app.store.seed_post(uuid::Uuid::new_v4(), "Only post", 0);

    let response = app
        .send(request("GET", "/api/blogs?page=9223372036854775807", None, None))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["resp_data"]["page"], simple_blog::actions::blog::MAX_PAGE);
    assert_eq!(body["resp_data"]["total"], 1);
    assert!(body["resp_data"]["posts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_search_is_case_insensitive() {
    let app = TestApp::new(None);
    let author = uuid::Uuid::new_v4();
    app.store.seed_post(author, "Rust Ownership", 0);
    app.store.seed_post(author, "Gardening", 1);

    let body =
        body_json(app.send(request("GET", "/api/blogs?search=rUsT", None, None)).await).await;

    let posts = body["resp_data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Rust Ownership");
    assert_eq!(posts[0]["author_name"], "Unknown");
}

#[tokio::test]
async fn list_is_served_from_cache_until_invalidated() {
    let app = TestApp::new(None);
    let (author, cookie) = app.login_as("author@example.com");
    app.store.seed_post(author.id, "Cached post", 0);

    let first = body_json(app.send(request("GET", "/api/blogs", None, None)).await).await;
    assert_eq!(first["resp_data"]["total"], 1);
    assert!(app.cache.has("/"));

    // 绕过业务层直接写入，缓存命中时看不到
    app.store.seed_post(author.id, "Sneaky post", 0);
    let cached = body_json(app.send(request("GET", "/api/blogs", None, None)).await).await;
    assert_eq!(cached["resp_data"]["total"], 1);

    app.send(request("POST", "/api/blogs", Some(&cookie), Some(post_body())))
        .await;
    let fresh = body_json(app.send(request("GET", "/api/blogs", None, None)).await).await;
    assert_eq!(fresh["resp_data"]["total"], 3);
}

#[tokio::test]
async fn detail_includes_comments_and_tracks_views() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/activity/v1"))
        .and(body_partial_json(json!({ "action": "view", "target_type": "blog" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": { "code": "ANALYTICS_DOWN", "message": "try later" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(Some(&server.uri()));
    let (author, _) = app.login_as("author@example.com");
    let (reader, cookie) = app.login_as("reader@example.com");
    app.store.seed_profile(reader.id, "Ji", "Park");
    let post = app.store.seed_post(author.id, "Readable post", 0);
    app.store.seed_comment(post.id, reader.id, "Nice read");

    let anonymous = app
        .send(request("GET", &format!("/api/blogs/{}", post.id), None, None))
        .await;
    assert_eq!(anonymous.status(), StatusCode::OK);

    let response = app
        .send(request(
            "GET",
            &format!("/api/blogs/{}", post.id),
            Some(&cookie),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["resp_data"]["post"]["title"], "Readable post");
    assert_eq!(body["resp_data"]["comments"][0]["content"], "Nice read");
    assert_eq!(body["resp_data"]["comments"][0]["author_name"], "Ji Park");
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let app = TestApp::new(None);

    let response = app
        .send(request(
            "GET",
            &format!("/api/blogs/{}", uuid::Uuid::new_v4()),
            None,
            None,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1004);
    assert_eq!(body["msg"], "Post not found");
}

#[tokio::test]
async fn analyze_returns_workflow_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/blog/analyze/v1"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": "MODEL_BUSY", "message": "retry later" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::new(Some(&server.uri()));
    let (_user, cookie) = app.login_as("author@example.com");

    let response = app
        .send(request(
            "POST",
            "/api/blogs/analyze",
            Some(&cookie),
            Some(post_body()),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["resp_data"],
        json!({
            "success": false,
            "error": { "code": "MODEL_BUSY", "message": "retry later" }
        })
    );
}
