//! HTTP server implementation with range request support

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use backend::{BackendError, Client};
use futures::TryStreamExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::balancer::select_connection;
use crate::link::parse_stream_path;
use crate::range::{parse_range, RangeError};
use crate::state::ServerState;
use crate::streamer::ByteStreamer;
use crate::utils;

/// File server API for managing the HTTP server
pub struct FileServerApi<C> {
    state: ServerState<C>,
}

impl<C> Clone for FileServerApi<C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<C: Client> FileServerApi<C> {
    pub fn new(state: ServerState<C>) -> Self {
        Self { state }
    }

    /// Get the server state
    pub fn state(&self) -> &ServerState<C> {
        &self.state
    }

    /// Create the axum router with all routes configured
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(root_route::<C>))
            .route("/*path", get(stream_handler::<C>))
            .with_state(self.state.clone())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the file server and run until `shutdown` is cancelled
    ///
    /// # Arguments
    /// * `host` - Host to bind to (e.g., "0.0.0.0")
    /// * `port` - Port to bind to (e.g., 8080)
    /// * `shutdown` - Token that stops the server gracefully
    pub async fn serve(self, host: &str, port: u16, shutdown: CancellationToken) -> crate::Result<()> {
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("File server listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("File server stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    server_status: &'static str,
    uptime: String,
    telegram_bot: String,
    connected_bots: usize,
    loads: BTreeMap<String, usize>,
    version: &'static str,
}

/// Status endpoint
async fn root_route<C: Client>(State(state): State<ServerState<C>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        server_status: "running",
        uptime: utils::format_uptime(state.uptime_secs()),
        telegram_bot: format!("@{}", state.bot_username()),
        connected_bots: state.pool().len(),
        loads: state.ranked_loads().into_iter().collect(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Stream handler: resolves the message id from the path and serves it
async fn stream_handler<C: Client>(
    State(state): State<ServerState<C>>,
    Path(path): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let stream_path = parse_stream_path(&path)
        .ok_or_else(|| AppError::NotFound(format!("No file id in path {:?}", path)))?;

    if let Some(hash) = &stream_path.hash {
        tracing::debug!("Short link {} for message {}", hash, stream_path.message_id);
    }

    media_streamer(&state, stream_path.message_id, &method, &headers).await
}

/// Serve one file, whole or by range, from the least loaded bot
async fn media_streamer<C: Client>(
    state: &ServerState<C>,
    message_id: i32,
    method: &Method,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let range_header = headers
        .get(header::RANGE)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AppError::BadRequest("Malformed range: not ASCII".to_string()))
        })
        .transpose()?;

    let settings = state.settings();
    let connection = select_connection(state.pool().connections(), settings.probe_timeout)
        .await
        .ok_or_else(|| AppError::Internal("No backend connections available".to_string()))?;

    let streamer = state.adapters().get_or_insert_with(connection.index(), || {
        tracing::debug!("Creating new ByteStreamer for bot {}", connection.index() + 1);
        ByteStreamer::new(Arc::clone(&connection), settings.fetch_timeout)
    });

    let file = streamer
        .get_file_properties(message_id)
        .await
        .map_err(|e| match e {
            BackendError::NotFound { .. } => AppError::NotFound(e.to_string()),
            other => AppError::Internal(format!(
                "Failed to resolve message {}: {}",
                message_id, other
            )),
        })?;
    let file_size = file.size;

    let mime_type = utils::content_type(&file);
    let disposition = format!(
        "{}; filename=\"{}\"",
        utils::disposition(&mime_type),
        utils::file_name(&file)
    );
    let disposition = HeaderValue::from_bytes(disposition.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid file name header: {}", e)))?;

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, &mime_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::ACCEPT_RANGES, "bytes");

    // nothing to stream and no interval to describe
    if file_size == 0 && range_header.is_none() {
        return builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, 0)
            .body(Body::empty())
            .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)));
    }

    let range = parse_range(range_header, file_size)?;

    if file_size == 0 || range.end > file_size - 1 || range.end < range.start {
        return Err(AppError::RangeNotSatisfiable(file_size));
    }

    let req_length = range.len();
    let builder = if range_header.is_none() && range.is_full(file_size) {
        builder.status(StatusCode::OK)
    } else {
        builder.status(StatusCode::PARTIAL_CONTENT).header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, file_size),
        )
    };

    let body = if *method == Method::HEAD {
        Body::empty()
    } else {
        let stream = streamer
            .yield_file(file, range, settings.chunk_size)
            .inspect_err(move |e| {
                tracing::warn!("Stream of message {} aborted: {}", message_id, e);
            });
        Body::from_stream(stream)
    };

    builder
        .header(header::CONTENT_LENGTH, req_length)
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}

/// Application error types
#[derive(Debug)]
enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    RangeNotSatisfiable(u64),
}

impl From<RangeError> for AppError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::Malformed(_) => AppError::BadRequest(err.to_string()),
            RangeError::Unsatisfiable { file_size } => AppError::RangeNotSatisfiable(file_size),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::RangeNotSatisfiable(size) => {
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{}", size))],
                )
                    .into_response();
            }
        };

        (status, message).into_response()
    }
}
