//! HTTP server setup and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::api;
use crate::config::AppConfig;
use crate::database::create_task_store;
use crate::gateway::{self, auth::AuthSettings};
use crate::logging::OpTimer;
use crate::runtime::TaskManager;
use crate::{log_banner, log_init_step, log_init_warning, log_success, AppState};

/// Crate version (from Cargo.toml).
const VERSION: &str = env!("CARGO_PKG_VERSION");

const INIT_STEPS: u8 = 4;

/// Create the application with all routes and middleware.
pub async fn create_app(config: AppConfig) -> anyhow::Result<Router> {
    let overall_timer = OpTimer::new("server", "create_app");

    log_banner!(
        format!("🗓️  Todo API v{VERSION}"),
        format!(
            "Store: {} | Auth: {}",
            config.database.driver,
            if config.auth.is_enabled() { "password" } else { "open" }
        )
    );

    // [1/4] Task store
    let step_timer = OpTimer::new("server", "task_store");
    let store = create_task_store(&config.database).await;
    step_timer.finish_with_result(store.as_ref());
    let store = store?;
    log_init_step!(1, INIT_STEPS, "Task Store", format!("🗄️  {store:?}"));

    // [2/4] Task manager
    let tasks = TaskManager::new(store, config.tasks.page_size);
    log_init_step!(
        2,
        INIT_STEPS,
        "Task Manager",
        format!("📋 page size {}", config.tasks.page_size)
    );

    // [3/4] Authentication
    let (auth, generated_secret) = AuthSettings::from_config(&config.auth);
    if auth.is_enabled() {
        log_init_step!(3, INIT_STEPS, "Auth", "🔒 Password sign-in required for task routes");
        if generated_secret {
            log_init_warning!(
                "No TODO_JWT_SECRET configured; sessions will not survive a restart"
            );
        }
    } else {
        log_init_step!(3, INIT_STEPS, "Auth", "🔓 Disabled (no TODO_PASSWORD)");
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        tasks,
        auth,
    };

    // [4/4] Router
    let step_timer = OpTimer::new("server", "router");
    let mut router = Router::new()
        .merge(api::create_router())
        .merge(gateway::create_router(&state));

    let web_dir = &config.server.web_dir;
    if web_dir.is_dir() {
        router = router.fallback_service(ServeDir::new(web_dir));
        log_init_step!(4, INIT_STEPS, "Router", format!("🌐 API + static files from {}", web_dir.display()));
    } else {
        log_init_warning!(
            "Web directory {} not found; serving the API only",
            web_dir.display()
        );
        log_init_step!(4, INIT_STEPS, "Router", "🌐 API only");
    }

    let app = router
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    step_timer.finish();

    overall_timer.finish();
    log_success!("Todo API server created successfully");

    Ok(app)
}
