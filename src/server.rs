use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::{
    catalog::Catalog, error::ResolveError, node::Node, path_guard::normalize_request_path,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub max_path_length: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_root))
        .route("/*path", get(get_path))
        .with_state(state)
}

async fn get_root(State(state): State<AppState>) -> Response {
    dispatch(state, String::new()).await
}

async fn get_path(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    dispatch(state, path).await
}

async fn dispatch(state: AppState, raw_path: String) -> Response {
    if raw_path.len() > state.max_path_length {
        return error_response(StatusCode::URI_TOO_LONG, "path too long");
    }

    let request_path = normalize_request_path(&raw_path);
    debug!("GET /{request_path}");
    let catalog = state.catalog.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        let node = catalog.resolve(&request_path)?;
        let body = node
            .content()
            .map_err(|_| ResolveError::not_found(request_path.as_str()))?;
        Ok::<_, ResolveError>((node, body))
    })
    .await;

    match rendered {
        Ok(Ok((node, body))) => success(&node, body),
        Ok(Err(err)) => {
            debug!("{err}");
            error_response(StatusCode::NOT_FOUND, "not found")
        }
        Err(err) => {
            error!("resolution task failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

fn success(node: &Node, body: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(node.content_type())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    if let Some(encoding) = node.content_encoding()
        && let Ok(v) = HeaderValue::from_str(encoding)
    {
        response.headers_mut().insert(header::CONTENT_ENCODING, v);
    }
    response
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}
