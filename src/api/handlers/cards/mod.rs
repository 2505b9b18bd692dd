//! CRUD handlers for `/cards`.
//!
//! Bodies are read as raw bytes and decoded with `serde_json`, so requests
//! without a `Content-Type` header are accepted. Outcomes map to status codes
//! through [`CardError`]:
//!
//! - malformed body: `400`, empty body (logged)
//! - field violations: `400`, validator message as `text/plain`
//! - unknown or unparsable id: `404`
//! - storage failure: `500`, empty body (logged)

use crate::cards::{Card, CardRequest, Storage, StorageError, ValidationErrors, validate};
use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};
use utoipa::IntoParams;


pub const METHOD_NOT_SUPPORTED: &str = "Метод не підтримується!";

#[derive(Debug, Error)]
pub enum CardError {
    #[error("invalid request body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("invalid card id: {0}")]
    InvalidId(String),
    #[error("credit card not found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for CardError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            err @ StorageError::Database(_) => Self::Storage(err),
        }
    }
}

impl IntoResponse for CardError {
    /// Only validation messages reach the client; everything else is a bare status code.
    fn into_response(self) -> Response {
        match self {
            Self::Decode(err) => {
                warn!("Failed to decode card: {err}");
                StatusCode::BAD_REQUEST.into_response()
            }
            Self::Validation(errors) => {
                (StatusCode::BAD_REQUEST, errors.to_string()).into_response()
            }
            Self::InvalidId(id) => {
                debug!("Invalid card id: {id}");
                StatusCode::NOT_FOUND.into_response()
            }
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Storage(err) => {
                error!("Storage error: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring of the holder name
    #[serde(default)]
    holder: String,
}

fn decode(body: &[u8]) -> Result<CardRequest, CardError> {
    let card: CardRequest = serde_json::from_slice(body)?;
    validate(&card)?;
    Ok(card)
}

fn parse_id(id: &str) -> Result<i32, CardError> {
    id.parse::<i32>()
        .map_err(|_| CardError::InvalidId(id.to_string()))
}

#[utoipa::path(
    get,
    path = "/cards",
    params(
        ListQuery,
        ("X-Country-Code" = String, Header, description = "Allowed country code"),
    ),
    responses(
        (status = 200, description = "Cards in insertion order", body = [Card], content_type = "application/json"),
        (status = 403, description = "Country not allowed"),
        (status = 500, description = "Storage error"),
    ),
    tag = "cards"
)]
#[instrument(skip(storage))]
pub async fn list_cards(
    storage: Extension<Storage>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Card>>, CardError> {
    let cards = storage.list(&query.holder).await?;

    debug!(count = cards.len(), "listed cards");

    Ok(Json(cards))
}

#[utoipa::path(
    post,
    path = "/cards",
    params(
        ("X-Country-Code" = String, Header, description = "Allowed country code"),
    ),
    request_body = CardRequest,
    responses(
        (status = 201, description = "Card stored"),
        (status = 400, description = "Malformed body or validation errors", body = String, content_type = "text/plain"),
        (status = 403, description = "Country not allowed"),
        (status = 500, description = "Storage error"),
    ),
    tag = "cards"
)]
#[instrument(skip(storage, body))]
pub async fn create_card(
    storage: Extension<Storage>,
    body: Bytes,
) -> Result<StatusCode, CardError> {
    let card = decode(&body)?;
    let card = storage.save(card).await?;

    debug!(id = card.id, "card created");

    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    put,
    path = "/cards/{id}",
    params(
        ("id" = i32, Path, description = "Card identifier"),
        ("X-Country-Code" = String, Header, description = "Allowed country code"),
    ),
    request_body = CardRequest,
    responses(
        (status = 200, description = "Card updated"),
        (status = 400, description = "Malformed body or validation errors", body = String, content_type = "text/plain"),
        (status = 403, description = "Country not allowed"),
        (status = 404, description = "Unknown card id"),
        (status = 500, description = "Storage error"),
    ),
    tag = "cards"
)]
#[instrument(skip(storage, body))]
pub async fn update_card(
    storage: Extension<Storage>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, CardError> {
    let id = parse_id(&id)?;
    // the path id wins over any id in the body
    let card = decode(&body)?.into_card(id);

    storage.update(card).await?;

    debug!(id, "card updated");

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/cards/{id}",
    params(
        ("id" = i32, Path, description = "Card identifier"),
        ("X-Country-Code" = String, Header, description = "Allowed country code"),
    ),
    responses(
        (status = 204, description = "Card removed, or it did not exist"),
        (status = 403, description = "Country not allowed"),
        (status = 404, description = "Card id is not an integer"),
        (status = 500, description = "Storage error"),
    ),
    tag = "cards"
)]
#[instrument(skip(storage))]
pub async fn delete_card(
    storage: Extension<Storage>,
    Path(id): Path<String>,
) -> Result<StatusCode, CardError> {
    let id = parse_id(&id)?;

    storage.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for a known cards path hit with an unsupported method.
pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_SUPPORTED)
}
