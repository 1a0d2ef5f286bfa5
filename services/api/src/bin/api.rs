//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpNotifier, JsonQuestionBank},
    config::Config,
    error::ApiError,
    web::{
        contact_handler, list_slots_handler, rest::ApiDoc, state::AppState,
        upload_resume_handler, ws_handler,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use recruit_core::{assessment::Assessment, ports::QuestionBank, submission::Submitter};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let notifier = Arc::new(HttpNotifier::new(
        http_client,
        config.notify_endpoint.clone(),
    ));
    let question_bank = Arc::new(JsonQuestionBank::new(config.questions_path.clone()));

    // Fail fast on a bank that cannot back a quiz.
    let questions = question_bank.load_questions().await?;
    let question_count = questions.len();
    Assessment::new(questions, config.assessment)?;
    info!("Question bank ready with {} questions.", question_count);

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        persistence: db_adapter.clone(),
        submitter: Submitter::new(db_adapter, notifier),
        question_bank,
        config: config.clone(),
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/resumes", post(upload_resume_handler))
        .route("/contact", post(contact_handler))
        .route("/slots", get(list_slots_handler))
        // Multipart framing needs a little room on top of the file itself.
        .layer(DefaultBodyLimit::max(config.max_resume_bytes + 64 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
