//! HTTP server exposing the generation pipeline
//!
//! Three endpoints: POST /assist runs the full generation pipeline, POST
//! /chat answers a single message, and GET /download/{name} streams a
//! previously produced archive. Errors come back as JSON bodies shaped
//! `{"detail": "..."}` so browser clients can show the cause directly.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};

use crate::assist::{assist_data, AssistOutput, AssistParams};
use crate::chat::chat_data;
use crate::gateway::{Gateway, GroqConfig};
use crate::prelude::{eprintln, *};

#[derive(Debug, Parser)]
#[command(name = "serve")]
#[command(about = "Run the HTTP server")]
pub struct App {
    #[clap(flatten)]
    pub options: ServeOptions,
}

#[derive(Debug, Parser, Serialize, Deserialize, Clone)]
pub struct ServeOptions {
    /// Host address to bind to
    #[clap(long, env = "CODEFORGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[clap(short, long, env = "CODEFORGE_PORT", default_value = "8000")]
    pub port: u16,

    /// Groq API key (overrides the GROQ_API_KEY environment variable)
    #[clap(long)]
    pub api_key: Option<String>,

    /// Groq API base URL (overrides the GROQ_BASE_URL environment variable)
    #[clap(long)]
    pub base_url: Option<String>,

    /// Model for generation and review (overrides the CODEFORGE_MODEL environment variable)
    #[clap(long)]
    pub model: Option<String>,

    /// Directory that holds generated project workspaces
    #[clap(long, env = "CODEFORGE_WORKSPACE_DIR", default_value = "workspaces")]
    pub workspace_dir: PathBuf,

    /// Number of most recent workspaces to keep when pruning
    #[clap(long, env = "CODEFORGE_KEEP", default_value = "20")]
    pub keep: usize,
}

/// Shared state handed to every request handler
#[derive(Debug, Clone)]
pub struct ServerState {
    pub gateway: Gateway,
    pub workspace_dir: PathBuf,
    pub keep: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistRequest {
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Error response carrying an HTTP status and a detail string
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }

    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"detail": self.detail}))).into_response()
    }
}

/// Build the router with CORS enabled for browser clients
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/assist", post(assist_handler))
        .route("/chat", post(chat_handler))
        .route("/download/{name}", get(download_handler))
        .layer(cors)
        .with_state(state)
}

async fn assist_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<AssistRequest>,
) -> Result<Json<AssistOutput>, ApiError> {
    let params = AssistParams {
        instruction: request.instruction,
        workspace_dir: state.workspace_dir.clone(),
        keep: state.keep,
    };

    let output = assist_data(&state.gateway, params, None)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(output))
}

async fn chat_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reply = chat_data(&state.gateway, &request.message)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(ChatResponse { reply }))
}

/// Archive names are flat: one path segment, no traversal, always `.zip`
fn is_safe_archive_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && name.ends_with(".zip")
}

async fn download_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    if !is_safe_archive_name(&name) {
        return Err(ApiError::not_found("File not found"));
    }

    let path = state.workspace_dir.join(&name);
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;
    if !metadata.is_file() {
        return Err(ApiError::not_found("File not found"));
    }

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        ),
    ];

    Ok((headers, body).into_response())
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let options = app.options;

    if global.verbose {
        eprintln!("Running serve with options: {:?}", options);
    }

    let config = GroqConfig::from_env().with_overrides(
        options.base_url.clone(),
        options.api_key.clone(),
        options.model.clone(),
    );
    let gateway = Gateway::new(&config)?;

    let state = Arc::new(ServerState {
        gateway,
        workspace_dir: options.workspace_dir.clone(),
        keep: options.keep,
    });
    let router = build_router(state);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    eprintln!("Listening on {}", addr);
    if global.verbose {
        eprintln!("  POST /assist");
        eprintln!("  POST /chat");
        eprintln!("  GET  /download/{{name}}");
    }

    axum::serve(listener, router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}
