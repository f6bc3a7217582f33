use std::net::SocketAddr;

use axum::{extract::State, middleware, routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::middleware::require_security;
use crate::config::AppConfig;
use crate::state::AppState;
use crate::{users, util};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(users::router())
        .merge(util::util_routes())
        .route("/openapi.json", get(serve_spec))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_security,
        ))
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

/// GET /openapi.json — the document the dispatcher was configured from.
async fn serve_spec(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.spec.document().clone())
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
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use base64ct::{Base64, Encoding};
    use http_body_util::BodyExt;
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::apispec::ApiSpec;
    use crate::seed;

    async fn test_app() -> Router {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        seed::rebuild(&pool).await.unwrap();

        // The shipped document, so tests exercise the real wiring.
        let document = serde_json::from_str(include_str!("../openapi.json")).unwrap();
        let spec = ApiSpec::parse(document).unwrap();

        let config = AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            spec_path: "openapi.json".into(),
        };
        build_app(AppState::from_parts(pool, Arc::new(config), Arc::new(spec)))
    }

    async fn get(app: &Router, uri: &str, auth: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let res = app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = res.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, body)
    }

    #[tokio::test]
    async fn declared_and_undeclared_routes_return_identical_bodies() {
        let app = test_app().await;
        let (declared_status, declared) = get(&app, "/", None).await;
        let (undeclared_status, undeclared) = get(&app, "/notinapiyaml", None).await;

        assert_eq!(declared_status, StatusCode::OK);
        assert_eq!(undeclared_status, StatusCode::OK);
        assert_eq!(declared, undeclared);

        let users: serde_json::Value = serde_json::from_slice(&declared).unwrap();
        assert_eq!(users[0]["username"], "myemail@email.com");
        assert_eq!(users[1]["username"], "youremail@email.com");
    }

    #[tokio::test]
    async fn basic_route_rejects_missing_credentials() {
        let app = test_app().await;
        let res = app
            .clone()
            .oneshot(Request::builder().uri("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Basic");
    }

    #[tokio::test]
    async fn basic_route_accepts_seeded_credentials() {
        let app = test_app().await;
        let encoded = Base64::encode_string(b"myemail@email.com:superSecretPass");
        let (status, body) = get(&app, "/users", Some(&format!("Basic {encoded}"))).await;
        assert_eq!(status, StatusCode::OK);
        let users: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(users.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn basic_route_rejects_wrong_password() {
        let app = test_app().await;
        let encoded = Base64::encode_string(b"myemail@email.com:wrong");
        let (status, _) = get(&app, "/users", Some(&format!("Basic {encoded}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_route_accepts_read_token() {
        let app = test_app().await;
        let (status, body) =
            get(&app, "/users/myemail@email.com", Some("Bearer read-token")).await;
        assert_eq!(status, StatusCode::OK);
        let user: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(user["first_name"], "Chamoy");
    }

    #[tokio::test]
    async fn bearer_route_rejects_unknown_token() {
        let app = test_app().await;
        let (status, _) = get(&app, "/users/myemail@email.com", Some("Bearer nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_route_returns_404_for_unknown_user() {
        let app = test_app().await;
        let (status, _) = get(&app, "/users/nobody@email.com", Some("Bearer write-token")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn echo_round_trips_plain_text() {
        let app = test_app().await;
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from("hello, echo"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello, echo");
    }

    #[tokio::test]
    async fn echo_fails_on_invalid_utf8() {
        let app = test_app().await;
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from(vec![0xff, 0xfe, 0xfd]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = test_app().await;
        let (status, body) = get(&app, "/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(document["components"]["securitySchemes"].is_object());
    }
}
