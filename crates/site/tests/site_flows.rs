//! End-to-end tests driving the full router against a temporary SQLite
//! database, covering registration, login, the admin gate, item
//! management, and comments.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

use larkspur_site::app;
use larkspur_site::config::SiteConfig;
use larkspur_site::db;
use larkspur_site::state::AppState;

// =============================================================================
// Harness
// =============================================================================

/// A full application instance backed by a temporary SQLite file.
struct TestSite {
    app: Router,
    pool: SqlitePool,
    db_path: PathBuf,
    static_dir: PathBuf,
}

impl TestSite {
    async fn create(name: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let db_path = std::env::temp_dir().join(format!("larkspur-{name}-{nanos}.db"));
        let static_dir = std::env::temp_dir().join(format!("larkspur-{name}-{nanos}-static"));

        let config = SiteConfig {
            database_url: SecretString::from(format!("sqlite://{}", db_path.display())),
            host: "127.0.0.1".parse().expect("parse host"),
            port: 0,
            base_url: "http://localhost:3000".to_owned(),
            session_secret: SecretString::from("kT9#vR2mQ8@jW5zL1xN4bC7!dF0gH3pY"),
            static_dir: static_dir.clone(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let pool = db::create_pool(&config.database_url)
            .await
            .expect("create sqlite pool");
        db::run_migrations(&pool).await.expect("run migrations");

        let app = app::app(AppState::new(config, pool.clone()))
            .await
            .expect("build app");

        Self {
            app,
            pool,
            db_path,
            static_dir,
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).expect("build request");

        self.app.clone().oneshot(request).await.expect("send request")
    }

    async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(Body::from(body.to_owned()))
            .expect("build request");

        self.app.clone().oneshot(request).await.expect("send request")
    }

    async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
        cookie: Option<&str>,
    ) -> Response<Body> {
        const BOUNDARY: &str = "larkspur-test-boundary";

        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder().method("POST").uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::from(body)).expect("build request");

        self.app.clone().oneshot(request).await.expect("send request")
    }

    /// Register an account and return the session cookie.
    async fn register(&self, email: &str, password: &str, name: &str) -> String {
        let response = self
            .post_form(
                "/register",
                &format!("email={email}&password={password}&name={name}"),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        session_cookie(&response).expect("registration should set a session cookie")
    }

    /// Create an item as the given session and return its ID.
    async fn create_item(&self, cookie: &str, name: &str, price: &str) -> i64 {
        let response = self
            .post_multipart(
                "/add_item",
                &[
                    ("name", name),
                    ("price", price),
                    ("body", "<p>Hand made, small batch.</p>"),
                ],
                Some(("image", "photo.png", b"png bytes".as_slice())),
                Some(cookie),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/all_procucts");

        sqlx::query_scalar::<_, i64>("SELECT id FROM items WHERE name = ?1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .expect("item should exist")
    }
}

impl Drop for TestSite {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
        let _ = std::fs::remove_file(self.db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(self.db_path.with_extension("db-shm"));
        let _ = std::fs::remove_dir_all(&self.static_dir);
    }
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), 1_000_000)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn registering_with_existing_email_redirects_to_login() {
    let site = TestSite::create("dup-email").await;

    site.register("amy@example.com", "rosemary-kiln", "Amy").await;

    let response = site
        .post_form(
            "/register",
            "email=amy@example.com&password=other-password&name=Imposter",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?notice=account_exists");

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&site.pool)
        .await
        .expect("count users");
    assert_eq!(users, 1, "duplicate registration must not create a row");
}

#[tokio::test]
async fn fresh_registration_can_log_in() {
    let site = TestSite::create("fresh-login").await;

    site.register("beth@example.com", "juniper-wheel", "Beth").await;

    let response = site
        .post_form("/login", "email=beth@example.com&password=juniper-wheel", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = session_cookie(&response).expect("login should set a session cookie");

    let home = site.get("/", Some(&cookie)).await;
    assert_eq!(home.status(), StatusCode::OK);
    let html = body_string(home).await;
    assert!(html.contains("Beth"), "nav should greet the logged-in user");
    assert!(html.contains("Log out"));
}

#[tokio::test]
async fn failed_logins_do_not_establish_a_session() {
    let site = TestSite::create("failed-login").await;

    site.register("cleo@example.com", "madder-root", "Cleo").await;

    let unknown = site
        .post_form("/login", "email=nobody@example.com&password=whatever", None)
        .await;
    assert_eq!(unknown.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&unknown), "/login?notice=unknown_email");
    assert!(session_cookie(&unknown).is_none());

    let wrong = site
        .post_form("/login", "email=cleo@example.com&password=wrong", None)
        .await;
    assert_eq!(wrong.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&wrong), "/login?notice=bad_password");
    assert!(session_cookie(&wrong).is_none());
}

#[tokio::test]
async fn admin_routes_are_forbidden_to_non_admins() {
    let site = TestSite::create("admin-gate").await;

    // First registrant becomes the admin, second does not.
    let admin = site.register("dora@example.com", "first-in-line", "Dora").await;
    let visitor = site.register("evan@example.com", "second-place", "Evan").await;

    let page = site.get("/add_item", Some(&admin)).await;
    assert_eq!(page.status(), StatusCode::OK);

    let denied_page = site.get("/add_item", Some(&visitor)).await;
    assert_eq!(denied_page.status(), StatusCode::FORBIDDEN);

    let anonymous = site.get("/add_item", None).await;
    assert_eq!(anonymous.status(), StatusCode::FORBIDDEN);

    let denied_delete = site.get("/delete/1", Some(&visitor)).await;
    assert_eq!(denied_delete.status(), StatusCode::FORBIDDEN);

    let denied_create = site
        .post_multipart(
            "/add_item",
            &[("name", "Sneaky"), ("price", "1"), ("body", "nope")],
            Some(("image", "x.png", b"bytes".as_slice())),
            Some(&visitor),
        )
        .await;
    assert_eq!(denied_create.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn editing_without_new_image_preserves_path() {
    let site = TestSite::create("edit-image").await;

    let admin = site.register("fern@example.com", "glaze-bucket", "Fern").await;
    let item_id = site.create_item(&admin, "Stoneware Mug", "24").await;

    let before: Option<String> =
        sqlx::query_scalar("SELECT image_path FROM items WHERE id = ?1")
            .bind(item_id)
            .fetch_one(&site.pool)
            .await
            .expect("fetch image path");
    assert_eq!(before.as_deref(), Some("assets/uploads/photo.png"));

    // Edit with no file part at all: everything else changes, the image stays.
    let response = site
        .post_multipart(
            &format!("/edit-item/{item_id}"),
            &[
                ("name", "Stoneware Mug, Large"),
                ("price", "28.50"),
                ("body", "<p>Now larger.</p>"),
            ],
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/item/{item_id}"));

    let (name, price_cents, after): (String, i64, Option<String>) = sqlx::query_as(
        "SELECT name, price_cents, image_path FROM items WHERE id = ?1",
    )
    .bind(item_id)
    .fetch_one(&site.pool)
    .await
    .expect("fetch item");
    assert_eq!(name, "Stoneware Mug, Large");
    assert_eq!(price_cents, 2850);
    assert_eq!(after.as_deref(), Some("assets/uploads/photo.png"));
}

#[tokio::test]
async fn unauthenticated_comment_is_rejected() {
    let site = TestSite::create("guest-comment").await;

    let admin = site.register("gwen@example.com", "slip-trailed", "Gwen").await;
    let item_id = site.create_item(&admin, "Linen Apron", "42").await;

    let response = site
        .post_form(&format!("/item/{item_id}"), "body=Drive-by+comment", None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?notice=login_required");

    let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(&site.pool)
        .await
        .expect("count comments");
    assert_eq!(comments, 0, "guest comment must not be stored");
}

#[tokio::test]
async fn full_shop_flow() {
    let site = TestSite::create("full-flow").await;

    // Admin signs up and lists an item.
    let admin = site.register("hana@example.com", "wheel-thrown", "Hana").await;
    let item_id = site.create_item(&admin, "Widget", "10").await;

    // Anonymous visitor sees the listing and the detail page.
    let listing = site.get("/all_procucts", None).await;
    assert_eq!(listing.status(), StatusCode::OK);
    assert!(body_string(listing).await.contains("Widget"));

    let detail = site.get(&format!("/item/{item_id}"), None).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let html = body_string(detail).await;
    assert!(html.contains("Widget"));
    assert!(html.contains("$10.00"));

    // A second user registers and comments.
    let buyer = site.register("iris@example.com", "warm-oatmeal", "Iris").await;
    let comment = site
        .post_form(
            &format!("/item/{item_id}"),
            "body=Does+it+come+in+green%3F",
            Some(&buyer),
        )
        .await;
    assert_eq!(comment.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&comment), format!("/item/{item_id}"));

    let detail = site.get(&format!("/item/{item_id}"), Some(&buyer)).await;
    let html = body_string(detail).await;
    assert!(html.contains("Does it come in green?"));
    assert!(html.contains("Iris"));
    assert!(html.contains("gravatar.com/avatar/"));

    // Deleting the item also removes its comments, then the page 404s.
    let delete = site.get(&format!("/delete/{item_id}"), Some(&admin)).await;
    assert_eq!(delete.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&delete), "/all_procucts");

    let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(&site.pool)
        .await
        .expect("count comments");
    assert_eq!(comments, 0, "comments cascade with their item");

    let gone = site.get(&format!("/item/{item_id}"), None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
