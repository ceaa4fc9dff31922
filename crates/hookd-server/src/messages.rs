//! Message recording handlers.
//!
//! Messages are immutable once recorded: the API offers create, detail
//! and delete, never update.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use hookd_shared::{validator, Validator};
use hookd_store::{Message, StoreError};

use crate::api::{uuid_param, AppState};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
    pub tags: Vec<String>,
    pub subscriber_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(record: Message) -> Self {
        Self {
            id: record.id,
            event_type: record.event_type,
            data: record.data,
            tags: record.tags,
            subscriber_id: record.subscriber_id,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    subscriber_id: Uuid,

    #[serde(skip)]
    validator: Validator,
}

/// `POST /api/v1/messages`
pub async fn create(
    State(state): State<AppState>,
    Json(mut input): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    input.validator.check(
        validator::not_blank(&input.event_type),
        "type",
        "Must be provided",
    );
    input.validator.check(
        validator::max_length(&input.event_type, 255),
        "type",
        "Must have at most 255 characters",
    );
    input.validator.check(
        !input.subscriber_id.is_nil(),
        "subscriber_id",
        "Must not be an empty uuid",
    );
    if !input.validator.is_valid() {
        return Err(ApiError::Validation(input.validator.into_field_errors()));
    }

    let db = state.db.lock().await;
    let store = db.store();

    let subscriber = match store.get_subscriber(input.subscriber_id) {
        Ok(subscriber) => subscriber,
        Err(StoreError::NotFound) => {
            input
                .validator
                .set_field_error("subscriber_id", "Invalid subscriber_id value");
            return Err(ApiError::Validation(input.validator.into_field_errors()));
        }
        Err(err) => return Err(err.into()),
    };

    let mut message = Message::new(input.event_type, input.data, subscriber.id);
    message.tags = input.tags;
    store.save_message(&mut message)?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// `GET /api/v1/messages/:id`
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = uuid_param(&id)?;

    let db = state.db.lock().await;
    let message = db.store().get_message(id)?;

    Ok(Json(message.into()))
}

/// `DELETE /api/v1/messages/:id`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = uuid_param(&id)?;

    let db = state.db.lock().await;
    let store = db.store();
    let message = store.get_message(id)?;
    store.delete_message(message.id)?;

    Ok(StatusCode::NO_CONTENT)
}
