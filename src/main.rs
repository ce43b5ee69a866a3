use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        // Logout only needs the cookie, not a live session.
        .route("/api/auth/logout", post(handlers::auth::logout));

    let protected_routes = Router::new()
        .route("/api/auth/user", get(handlers::auth::current_user))
        // Diary
        .route("/api/diary", get(handlers::diary::list_entries))
        .route("/api/diary", post(handlers::diary::create_entry))
        .route("/api/diary/:id", get(handlers::diary::get_entry))
        .route("/api/diary/:id", patch(handlers::diary::update_entry))
        .route("/api/diary/:id", delete(handlers::diary::delete_entry))
        // Goals
        .route("/api/goals", get(handlers::goals::list_goals))
        .route("/api/goals", post(handlers::goals::create_goal))
        .route("/api/goals/:id", patch(handlers::goals::update_goal))
        .route("/api/goals/:id", delete(handlers::goals::delete_goal))
        // Todos
        .route("/api/todos", get(handlers::todos::list_todos))
        .route("/api/todos", post(handlers::todos::create_todo))
        .route("/api/todos/:id", patch(handlers::todos::update_todo))
        .route("/api/todos/:id", delete(handlers::todos::delete_todo))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .frontend_url
                .parse::<axum::http::HeaderValue>()
                .unwrap(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkwell_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config.database_url).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    if let Some(user_id) = config.single_tenant_user {
        auth::session::ensure_single_tenant_user(&db, user_id)
            .await
            .expect("Failed to provision single-tenant user");
        tracing::info!(%user_id, "Single-tenant mode enabled");
    }

    let state = AppState {
        db,
        config: config.clone(),
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    // Lazy pool: no connection is made until a handler touches the database.
    fn test_state() -> AppState {
        let config = Config {
            database_url: "postgres://localhost/inkwell_test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            session_ttl_secs: 604_800,
            cookie_secure: false,
            single_tenant_user: None,
        };
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        AppState {
            db,
            config: Arc::new(config),
        }
    }

    #[tokio::test]
    async fn health_check_reports_ok() {
        let app = build_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "inkwell-api");
    }

    #[tokio::test]
    async fn protected_routes_require_a_session() {
        for uri in ["/api/goals", "/api/todos", "/api/diary", "/api/auth/user"] {
            let app = build_router(test_state());
            let response = app
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["message"], "Unauthorized");
        }
    }
}
