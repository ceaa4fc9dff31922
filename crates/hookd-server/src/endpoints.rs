//! Endpoint management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hookd_shared::{new_secret, validator, Validator};
use hookd_store::{Endpoint, StoreError};

use crate::api::{uuid_param, AppState};
use crate::error::ApiError;

/// The delivery secret is never included in API responses.
#[derive(Debug, Serialize)]
pub struct EndpointResponse {
    pub id: Uuid,
    pub label: String,
    pub url: String,
    pub disabled: bool,
    pub filter_types: Vec<String>,
    pub subscriber_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Endpoint> for EndpointResponse {
    fn from(record: Endpoint) -> Self {
        Self {
            id: record.id,
            label: record.label,
            url: record.url,
            disabled: record.disabled,
            filter_types: record.filter_types,
            subscriber_id: record.subscriber_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateEndpointRequest {
    #[serde(default)]
    label: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    filter_types: Vec<String>,
    #[serde(default)]
    subscriber_id: Uuid,

    #[serde(skip)]
    validator: Validator,
}

/// `POST /api/v1/endpoints`
pub async fn create(
    State(state): State<AppState>,
    Json(mut input): Json<CreateEndpointRequest>,
) -> Result<(StatusCode, Json<EndpointResponse>), ApiError> {
    input
        .validator
        .check(validator::not_blank(&input.label), "label", "Must be provided");
    input.validator.check(
        validator::max_length(&input.label, 255),
        "label",
        "Must have at most 255 characters",
    );
    input
        .validator
        .check(validator::not_blank(&input.url), "url", "Must be provided");
    input.validator.check(
        validator::http_url(&input.url),
        "url",
        "Must be a valid http or https url",
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

    // Resolve the owner up front so an unknown subscriber surfaces as a
    // field error instead of an engine failure on insert.
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

    let mut endpoint = Endpoint::new(input.label, input.url, new_secret(), subscriber.id);
    endpoint.filter_types = input.filter_types;
    store.save_endpoint(&mut endpoint)?;

    Ok((StatusCode::CREATED, Json(endpoint.into())))
}

/// `GET /api/v1/endpoints/:id`
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EndpointResponse>, ApiError> {
    let id = uuid_param(&id)?;

    let db = state.db.lock().await;
    let endpoint = db.store().get_endpoint(id)?;

    Ok(Json(endpoint.into()))
}

/// `DELETE /api/v1/endpoints/:id`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = uuid_param(&id)?;

    let db = state.db.lock().await;
    let store = db.store();
    let endpoint = store.get_endpoint(id)?;
    store.delete_endpoint(endpoint.id)?;

    Ok(StatusCode::NO_CONTENT)
}
