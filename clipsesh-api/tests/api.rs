use axum::body::Body;
use axum::body::Bytes;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use clipsesh_app::application::{CreatePost, PostSource};
use clipsesh_app::infrastructure::db::memory_db;
use clipsesh_app::{AppContext, Settings};
use serde_json::{json, Value};
use std::collections::HashMap;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    ctx: AppContext,
    _dir: tempfile::TempDir,
}

async fn test_app(extra: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut vars: HashMap<String, String> = HashMap::from([
        ("DATABASE_URL".into(), "sqlite::memory:".into()),
        ("SECRET_KEY".into(), "test-secret".into()),
        ("ADMIN_PASSWORD".into(), "admin-pw".into()),
        (
            "UPLOAD_DIR".into(),
            dir.path().join("uploads").display().to_string(),
        ),
        (
            "DOWNLOAD_DIR".into(),
            dir.path().join("download").display().to_string(),
        ),
        (
            "PROFILE_PICTURE_DIR".into(),
            dir.path().join("profilePictures").display().to_string(),
        ),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    let settings = Settings::from_lookup(|key| vars.get(key).cloned()).unwrap();

    let db = memory_db().await.unwrap();
    let ctx = AppContext::new(db, settings);
    ctx.accounts.ensure_admin("admin-pw").await.unwrap();

    TestApp {
        router: clipsesh_api::router(ctx.clone()),
        ctx,
        _dir: dir,
    }
}

impl TestApp {
    async fn send_raw(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, bytes) = self.send_raw(request).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn admin_token(&self) -> String {
        self.ctx.accounts.login("admin", "admin-pw").await.unwrap()
    }

    async fn user_token(&self, name: &str) -> String {
        self.ctx.accounts.register(name, "pw").await.unwrap()
    }

    async fn seed_post(&self) -> uuid::Uuid {
        self.ctx
            .posts
            .create(CreatePost {
                streamer: "spoekle".into(),
                submitter: "tester".into(),
                title: "huge clutch".into(),
                link: None,
                source: Some(PostSource::Link("https://clips.example.com/clutch".into())),
            })
            .await
            .unwrap()
            .id
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn vote_request(post: uuid::Uuid, direction: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/posts/{post}/vote/{direction}"))
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(uri: &str, token: &str, field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let boundary = "clipsesh-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app(&[]).await;
    let (status, body) = app
        .send(json_request("PUT", "/api/admin/config", None, json!({ "denyThreshold": 2 })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(json_request(
            "PUT",
            "/api/admin/config",
            Some("not.a.jwt"),
            json!({ "denyThreshold": 2 }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    let app = test_app(&[]).await;
    let token = app.user_token("viewer").await;
    let (status, body) = app
        .send(json_request(
            "PUT",
            "/api/admin/config",
            Some(&token),
            json!({ "denyThreshold": 2 }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn admin_updates_config() {
    let app = test_app(&[]).await;

    let (status, body) = app.send(get("/api/admin/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "denyThreshold": 5, "latestVideoLink": "" }));

    let token = app.admin_token().await;
    let (status, _) = app
        .send(json_request(
            "PUT",
            "/api/admin/config",
            Some(&token),
            json!({ "denyThreshold": 3, "latestVideoLink": "https://youtu.be/abc" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.send(get("/api/admin/config")).await;
    assert_eq!(body["denyThreshold"], 3);
    assert_eq!(body["latestVideoLink"], "https://youtu.be/abc");

    let (status, _) = app
        .send(json_request(
            "PUT",
            "/api/admin/config",
            Some(&token),
            json!({ "denyThreshold": -1 }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vote_toggle_from_one_address() {
    let app = test_app(&[]).await;
    let id = app.seed_post().await;

    let (status, body) = app.send(vote_request(id, "upvote", "1.2.3.4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64()), (Some(1), Some(0)));

    let (_, body) = app.send(vote_request(id, "downvote", "1.2.3.4")).await;
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64()), (Some(0), Some(1)));

    let (_, body) = app.send(vote_request(id, "downvote", "1.2.3.4")).await;
    assert_eq!((body["upvotes"].as_i64(), body["downvotes"].as_i64()), (Some(0), Some(0)));

    let (status, body) = app.send(vote_request(id, "sideways", "1.2.3.4")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app.send(vote_request(missing, "upvote", "1.2.3.4")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_author_or_admin_removes_comments() {
    let app = test_app(&[]).await;
    let id = app.seed_post().await;
    let alice = app.user_token("alice").await;
    let bob = app.user_token("bob").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            &format!("/api/posts/{id}/comment"),
            Some(&alice),
            json!({ "comment": "what a play" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let comment_id = body["comments"][0]["id"].as_i64().unwrap();

    let uri = format!("/api/posts/{id}/comment/{comment_id}");
    let (status, _) = app
        .send(json_request("DELETE", &uri, Some(&bob), json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.send(get(&format!("/api/posts/{id}"))).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(json_request("DELETE", &uri, Some(&alice), json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_is_rate_limited() {
    let app = test_app(&[("SEARCH_RATE_LIMIT", "2")]).await;
    app.seed_post().await;

    let search = || {
        Request::builder()
            .uri("/api/posts/search?q=clutch")
            .header("x-forwarded-for", "9.9.9.9")
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = app.send(search()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPosts"], 1);
    assert_eq!(body["currentPage"], 1);

    let (status, _) = app.send(search()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(search()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_and_me() {
    let app = test_app(&[]).await;
    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/users/register",
            None,
            json!({ "username": "carol", "password": "pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/users/login",
            None,
            json!({ "username": "carol", "password": "pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carol");
    assert!(body.get("passwordHash").is_none());

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/users/login",
            None,
            json!({ "username": "carol", "password": "wrong" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let app = test_app(&[]).await;
    let (status, body) = app.send(get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_query_and_form_are_json_errors() {
    let app = test_app(&[]).await;

    for uri in [
        "/api/posts/search?q=clutch&page=abc",
        "/api/posts/search?q=clutch&limit=-1",
    ] {
        let (status, headers, bytes) = app.send_raw(get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(is_json(&headers));
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    let admin = app.admin_token().await;
    let (status, headers, bytes) = app
        .send_raw(json_request("POST", "/api/posts", Some(&admin), json!({ "title": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(is_json(&headers));
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn profile_picture_upload_is_served() {
    let app = test_app(&[]).await;
    let token = app.user_token("alice").await;

    let (status, body) = app
        .send(multipart_request(
            "/api/users/uploadProfilePicture",
            &token,
            "profilePicture",
            "me.png",
            b"not really a png",
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let url = body["profilePictureUrl"].as_str().unwrap().to_string();
    let path = url.strip_prefix("http://localhost:5000").unwrap();
    assert!(path.starts_with("/profilePictures/"));

    let (status, me) = app
        .send(
            Request::builder()
                .uri("/api/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["profilePicture"], url.as_str());

    let (status, _, bytes) = app.send_raw(get(path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..], b"not really a png");

    let (status, body) = app
        .send(multipart_request(
            "/api/users/uploadProfilePicture",
            &token,
            "avatar",
            "me.png",
            b"png",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
