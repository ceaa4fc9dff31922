//! Subscriber management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use hookd_shared::{validator, Validator};
use hookd_store::{ListEndpointsParams, Subscriber};

use crate::api::{uuid_param, AppState};
use crate::endpoints::EndpointResponse;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct SubscriberResponse {
    pub id: Uuid,
    pub name: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(record: Subscriber) -> Self {
        Self {
            id: record.id,
            name: record.name,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSubscriberRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    metadata: Value,

    #[serde(skip)]
    validator: Validator,
}

/// `POST /api/v1/subscribers`
pub async fn create(
    State(state): State<AppState>,
    Json(mut input): Json<CreateSubscriberRequest>,
) -> Result<(StatusCode, Json<SubscriberResponse>), ApiError> {
    input.name = input.name.trim().to_string();

    input
        .validator
        .check(validator::not_blank(&input.name), "name", "Must be provided");
    input.validator.check(
        validator::max_length(&input.name, 255),
        "name",
        "Must have at most 255 characters",
    );
    if !input.validator.is_valid() {
        return Err(ApiError::Validation(input.validator.into_field_errors()));
    }

    let mut subscriber = Subscriber::new(input.name);
    subscriber.metadata = input.metadata;

    let db = state.db.lock().await;
    db.store().save_subscriber(&mut subscriber)?;

    Ok((StatusCode::CREATED, Json(subscriber.into())))
}

/// `GET /api/v1/subscribers/:id`
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubscriberResponse>, ApiError> {
    let id = uuid_param(&id)?;

    let db = state.db.lock().await;
    let subscriber = db.store().get_subscriber(id)?;

    Ok(Json(subscriber.into()))
}

/// `DELETE /api/v1/subscribers/:id`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = uuid_param(&id)?;

    let db = state.db.lock().await;
    let store = db.store();
    let subscriber = store.get_subscriber(id)?;
    store.delete_subscriber(subscriber.id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/subscribers/:id/endpoints`
pub async fn endpoint_list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EndpointResponse>>, ApiError> {
    let id = uuid_param(&id)?;

    let db = state.db.lock().await;
    let store = db.store();
    let subscriber = store.get_subscriber(id)?;
    let endpoints = store.list_endpoints(ListEndpointsParams {
        subscriber_id: subscriber.id,
        ..Default::default()
    })?;

    Ok(Json(endpoints.into_iter().map(EndpointResponse::from).collect()))
}
