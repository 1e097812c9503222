use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    auth, budgets, categories, config::AppConfig, dashboard, goals, import,
    objects::UPLOADS_ROUTE, reminders, state::AppState, transactions, users,
};

pub fn build_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(dashboard::router())
                .merge(transactions::router())
                .merge(import::router())
                .merge(categories::router())
                .merge(budgets::router())
                .merge(goals::router())
                .merge(reminders::router())
                .merge(users::router())
                .route("/health", get(|| async { "ok" })),
        )
        .nest_service(UPLOADS_ROUTE, uploads)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        let req = match body {
            Some(v) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        send(app, req).await
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, cookie, value)
    }

    /// Registers `name` and returns its `name=value` session cookie.
    async fn register(app: &Router, name: &str) -> String {
        let (status, cookie, body) = call(
            app,
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "username": name,
                "password": "correct-horse",
                "email": format!("{name}@example.com"),
                "firstName": name,
                "lastName": "Tester",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["username"], name);
        cookie.expect("session cookie")
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn data_routes_need_a_session() {
        let app = build_app(AppState::fake());
        for (method, uri) in [
            (Method::GET, "/api/user"),
            (Method::GET, "/api/transactions"),
            (Method::GET, "/api/transactions/recent"),
            (Method::POST, "/api/transactions/import"),
            (Method::GET, "/api/categories"),
            (Method::GET, "/api/budgets"),
            (Method::GET, "/api/budgets/overview"),
            (Method::GET, "/api/goals"),
            (Method::GET, "/api/reminders"),
            (Method::GET, "/api/reminders/upcoming"),
            (Method::POST, "/api/reminders/notify"),
            (Method::GET, "/api/dashboard/balance"),
            (Method::GET, "/api/dashboard/spending-trends"),
            (Method::GET, "/api/dashboard/category-spending"),
            (Method::GET, "/api/csv-settings"),
            (Method::GET, "/api/user/settings"),
            (Method::POST, "/api/user/change-password"),
            (Method::GET, "/api/user/profile-picture"),
        ] {
            let (status, _, body) = call(&app, method.clone(), uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"], "Not authenticated");
        }
        let (status, _, _) =
            call(&app, Method::GET, "/api/user", Some("budgetwise.sid=garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_query_path_and_multipart_are_json_errors() {
        let app = build_app(AppState::fake());
        let cookie = register(&app, "alice").await;

        for uri in [
            "/api/transactions/recent?limit=abc",
            "/api/transactions/not-a-uuid",
            "/api/goals/not-a-uuid",
            "/api/reminders/upcoming?days=soon",
        ] {
            let (status, _, body) = call(&app, Method::GET, uri, Some(&cookie), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}: {body}");
        }

        let (status, _, body) = call(
            &app,
            Method::POST,
            "/api/transactions/import",
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");
    }

    #[tokio::test]
    async fn login_logout_cycle() {
        let app = build_app(AppState::fake());
        register(&app, "alice").await;

        let (status, _, _) = call(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, cookie, _) = call(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "username": "alice", "password": "correct-horse" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cookie = cookie.unwrap();

        let (status, _, me) = call(&app, Method::GET, "/api/user", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "alice@example.com");

        let (status, _, _) = call(&app, Method::POST, "/api/logout", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = call(&app, Method::GET, "/api/user", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let app = build_app(AppState::fake());
        register(&app, "alice").await;
        let (status, _, body) = call(
            &app,
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "username": "ALICE",
                "password": "correct-horse",
                "email": "other@example.com",
                "firstName": "A",
                "lastName": "B",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username already exists");
    }

    #[tokio::test]
    async fn transaction_reads_back_identically() {
        let app = build_app(AppState::fake());
        let cookie = register(&app, "alice").await;

        let (status, _, created) = call(
            &app,
            Method::POST,
            "/api/transactions",
            Some(&cookie),
            Some(json!({
                "amount": "42.50",
                "description": "Groceries",
                "date": "2024-03-05",
                "isIncome": false,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");

        let id = created["id"].as_str().unwrap();
        let (status, _, fetched) = call(
            &app,
            Method::GET,
            &format!("/api/transactions/{id}"),
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
        assert_eq!(fetched["amount"], "42.50");
        assert_eq!(fetched["date"], "2024-03-05");

        let (_, _, list) = call(&app, Method::GET, "/api/transactions", Some(&cookie), None).await;
        assert_eq!(list["transactions"].as_array().unwrap().len(), 1);
        assert!(!list["categories"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_users_rows_are_not_found() {
        let app = build_app(AppState::fake());
        let alice = register(&app, "alice").await;
        let bob = register(&app, "bob").await;

        let (_, _, goal) = call(
            &app,
            Method::POST,
            "/api/goals",
            Some(&alice),
            Some(json!({ "name": "Car", "targetAmount": "1000", "currentAmount": "250" })),
        )
        .await;
        assert_eq!(goal["percentage"], 25);
        let uri = format!("/api/goals/{}", goal["id"].as_str().unwrap());

        let (status, _, _) = call(&app, Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = call(&app, Method::DELETE, &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn csv_import_creates_every_row() {
        let app = build_app(AppState::fake());
        let cookie = register(&app, "alice").await;

        let csv = "date,description,amount\n\
                   2024-03-01,PAYROLL ACME,2500.00\n\
                   2024-03-02,Whole Foods,-82.10\n\
                   2024-03-03,Shell gas,-40.00\n";
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"csvFormat\"\r\n\r\ngeneric\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"t.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
            b = boundary,
        );
        let req = Request::post("/api/transactions/import")
            .header(header::COOKIE, &cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, _, res) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK, "{res}");
        assert_eq!(res["imported"], 3);
        assert_eq!(res["format"], "generic");

        let (_, _, list) = call(&app, Method::GET, "/api/transactions", Some(&cookie), None).await;
        let txs = list["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 3);
        assert!(txs.iter().any(|t| t["isIncome"] == true && t["amount"] == "2500.00"));

        let (_, _, settings) =
            call(&app, Method::GET, "/api/csv-settings", Some(&cookie), None).await;
        assert_eq!(settings["bankName"], "generic");
    }

    #[tokio::test]
    async fn rejected_import_keeps_csv_settings() {
        let app = build_app(AppState::fake());
        let cookie = register(&app, "alice").await;

        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"csvFormat\"\r\n\r\nchase\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"t.csv\"\r\n\
             Content-Type: text/csv\r\n\r\ndate,memo\n2024-03-01,x\n\r\n--{b}--\r\n",
            b = boundary,
        );
        let req = Request::post("/api/transactions/import")
            .header(header::COOKIE, &cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, _, res) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{res}");

        let (_, _, settings) =
            call(&app, Method::GET, "/api/csv-settings", Some(&cookie), None).await;
        assert!(settings["bankName"].is_null(), "{settings}");
    }

    #[tokio::test]
    async fn notify_sends_pending_reminders_once() {
        let app = build_app(AppState::fake());
        let cookie = register(&app, "alice").await;
        let due = crate::calendar::today() + time::Duration::days(1);

        let (status, _, _) = call(
            &app,
            Method::POST,
            "/api/reminders",
            Some(&cookie),
            Some(json!({ "title": "Rent", "amount": "1200", "dueDate": due.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, _, upcoming) =
            call(&app, Method::GET, "/api/reminders/upcoming", Some(&cookie), None).await;
        assert_eq!(upcoming["reminders"].as_array().unwrap().len(), 1);

        let (_, _, first) =
            call(&app, Method::POST, "/api/reminders/notify", Some(&cookie), None).await;
        assert_eq!(first["notified"], 1);
        let (_, _, second) =
            call(&app, Method::POST, "/api/reminders/notify", Some(&cookie), None).await;
        assert_eq!(second["notified"], 0);
    }

    #[tokio::test]
    async fn settings_are_created_on_first_read() {
        let app = build_app(AppState::fake());
        let cookie = register(&app, "alice").await;
        let (status, _, body) =
            call(&app, Method::GET, "/api/user/settings", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "light");

        let (_, _, body) = call(
            &app,
            Method::PATCH,
            "/api/user/settings",
            Some(&cookie),
            Some(json!({ "theme": "dark" })),
        )
        .await;
        assert_eq!(body["theme"], "dark");
        assert_eq!(body["language"], "en");
    }

    #[tokio::test]
    async fn change_password_checks_current() {
        let app = build_app(AppState::fake());
        let cookie = register(&app, "alice").await;
        let (status, _, body) = call(
            &app,
            Method::POST,
            "/api/user/change-password",
            Some(&cookie),
            Some(json!({ "currentPassword": "nope", "newPassword": "another-secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Current password is incorrect");

        let (status, _, _) = call(
            &app,
            Method::POST,
            "/api/user/change-password",
            Some(&cookie),
            Some(json!({ "currentPassword": "correct-horse", "newPassword": "another-secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = call(
            &app,
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "username": "alice", "password": "another-secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
