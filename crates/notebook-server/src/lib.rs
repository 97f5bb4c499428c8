//! Notebook HTTP API - CRUD over notes and tags.

mod config;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use notebook_core::{CreateNote, CreateTag, Database, Error, NotebookService, UpdateNote};
use notebook_sqlite::SqliteDatabase;
use serde::{Deserialize, Deserializer, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{ServerConfig, DEFAULT_LOG_FILTER};

type AppState<D> = Arc<NotebookService<D>>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteRequest {
    id: Option<String>,
    title: Option<String>,
    markdown: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pinned: bool,
    tag_ids: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateNoteRequest {
    title: Option<String>,
    markdown: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pinned: bool,
    tag_ids: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct CreateTagRequest {
    id: Option<String>,
    label: Option<String>,
}

#[derive(Deserialize)]
struct UpdateTagRequest {
    label: Option<String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Booleans arrive as JSON booleans, 0/1 numbers, or strings (only the empty string is false).
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        Some(Flag::Float(f)) => f != 0.0,
        Some(Flag::Str(s)) => !s.is_empty(),
        None => false,
    })
}

fn json_error(msg: impl Into<String>, status: StatusCode) -> Response {
    (status, Json(ErrorResponse { error: msg.into() })).into_response()
}

fn error_response(err: Error) -> Response {
    let status = match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("{}", err);
    } else {
        tracing::debug!("rejected request: {}", err);
    }
    json_error(err.to_string(), status)
}

fn success<T>(result: Result<T, Error>) -> Response {
    match result {
        Ok(_) => Json(SuccessResponse { success: true }).into_response(),
        Err(e) => error_response(e),
    }
}

fn invalid_json(rejection: JsonRejection) -> Response {
    json_error(
        format!("Invalid JSON: {}", rejection.body_text()),
        StatusCode::BAD_REQUEST,
    )
}

// Notes

async fn list_notes<D: Database + 'static>(State(service): State<AppState<D>>) -> Response {
    match service.list_notes().await {
        Ok(notes) => Json(notes).into_response(),
        Err(e) => error_response(e),
    }
}

async fn create_note<D: Database + 'static>(
    State(service): State<AppState<D>>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(b)) => b,
        Err(rejection) => return invalid_json(rejection),
    };

    let note = CreateNote {
        id: body.id.unwrap_or_default(),
        title: body.title.unwrap_or_default(),
        markdown: body.markdown.unwrap_or_default(),
        pinned: body.pinned,
        tag_ids: body.tag_ids.unwrap_or_default(),
    };
    success(service.create_note(note).await)
}

async fn update_note<D: Database + 'static>(
    State(service): State<AppState<D>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(b)) => b,
        Err(rejection) => return invalid_json(rejection),
    };

    let update = UpdateNote {
        title: body.title.unwrap_or_default(),
        markdown: body.markdown.unwrap_or_default(),
        pinned: body.pinned,
        tag_ids: body.tag_ids.unwrap_or_default(),
    };
    success(service.update_note(&id, update).await)
}

async fn delete_note<D: Database + 'static>(
    State(service): State<AppState<D>>,
    Path(id): Path<String>,
) -> Response {
    success(service.delete_note(&id).await)
}

// Tags

async fn list_tags<D: Database + 'static>(State(service): State<AppState<D>>) -> Response {
    match service.list_tags().await {
        Ok(tags) => Json(tags).into_response(),
        Err(e) => error_response(e),
    }
}

async fn create_tag<D: Database + 'static>(
    State(service): State<AppState<D>>,
    payload: Result<Json<CreateTagRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(b)) => b,
        Err(rejection) => return invalid_json(rejection),
    };

    let tag = CreateTag {
        id: body.id.unwrap_or_default(),
        label: body.label.unwrap_or_default(),
    };
    success(service.create_tag(tag).await)
}

async fn update_tag<D: Database + 'static>(
    State(service): State<AppState<D>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTagRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(b)) => b,
        Err(rejection) => return invalid_json(rejection),
    };

    let label = body.label.unwrap_or_default();
    success(service.update_tag(&id, &label).await)
}

async fn delete_tag<D: Database + 'static>(
    State(service): State<AppState<D>>,
    Path(id): Path<String>,
) -> Response {
    success(service.delete_tag(&id).await)
}

/// Create the API router over any database implementation.
pub fn create_router<D: Database + 'static>(service: NotebookService<D>) -> Router {
    Router::new()
        .route("/", get(|| async { "Notebook API" }))
        .route("/notes", get(list_notes::<D>).post(create_note::<D>))
        .route("/notes/:id", put(update_note::<D>).delete(delete_note::<D>))
        .route("/tags", get(list_tags::<D>).post(create_tag::<D>))
        .route("/tags/:id", put(update_tag::<D>).delete(delete_tag::<D>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(service))
}

/// Open the store, bind, and serve until Ctrl-C.
pub async fn start_server(config: &ServerConfig) -> Result<(), Error> {
    let db = SqliteDatabase::open(&config.db)?;
    tracing::info!("Connected to SQLite database at {}", config.db.display());

    let router = create_router(NotebookService::new(db));
    let addr = config
        .addr()
        .map_err(|e| Error::Internal(format!("invalid listen address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Network(e.to_string()))?;
    tracing::info!("Backend running at http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    Ok(())
}
