//! Actor API endpoints
//!
//! Handles HTTP requests for the actors catalog.

use crate::catalog::{Actor, CatalogOutcome, CatalogService};
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Request body for creating or updating an actor
///
/// Fields are optional so that a missing field surfaces as a 400 validation
/// failure rather than a body-deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SaveActorRequest {
    /// Actor first name
    pub name: Option<String>,
    /// Actor surname
    pub surname: Option<String>,
}

/// Response for a successful actor creation
#[derive(Debug, Serialize)]
pub struct ActorCreatedResponse {
    /// Human-readable message
    pub message: String,
    /// Id of the newly created actor
    pub id: i64,
}

/// Extract and validate the required actor fields
fn require_actor_fields(request: &SaveActorRequest) -> Result<(&str, &str), AppError> {
    match (request.name.as_deref(), request.surname.as_deref()) {
        (Some(name), Some(surname)) if !name.is_empty() && !surname.is_empty() => {
            Ok((name, surname))
        }
        _ => Err(AppError::Validation(
            "All fields: name and surname are required!".to_string(),
        )),
    }
}

/// GET /actors - List all actors
pub async fn list_actors(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Json<Vec<Actor>>, AppError> {
    let actors = catalog.list_actors().await?;
    Ok(Json(actors))
}

/// GET /actors/:id - Get a single actor
pub async fn get_actor(
    State(catalog): State<Arc<CatalogService>>,
    Path(actor_id): Path<i64>,
) -> Result<Json<Actor>, AppError> {
    let actor = catalog
        .get_actor(actor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Actor not found!".to_string()))?;

    Ok(Json(actor))
}

/// POST /actors - Add a new actor
pub async fn create_actor(
    State(catalog): State<Arc<CatalogService>>,
    Json(request): Json<SaveActorRequest>,
) -> Result<Json<ActorCreatedResponse>, AppError> {
    let (name, surname) = require_actor_fields(&request)?;

    match catalog.create_actor(name, surname).await? {
        CatalogOutcome::Ok(id) => Ok(Json(ActorCreatedResponse {
            message: "Actor has been added successfully!".to_string(),
            id,
        })),
        CatalogOutcome::Duplicate => Err(AppError::Conflict("Actor already exists!".to_string())),
        CatalogOutcome::NotFound => Err(AppError::NotFound("Actor not found!".to_string())),
        CatalogOutcome::InvalidActors => Err(AppError::UnknownActors),
    }
}

/// PUT /actors/:id - Edit an existing actor
pub async fn update_actor(
    State(catalog): State<Arc<CatalogService>>,
    Path(actor_id): Path<i64>,
    Json(request): Json<SaveActorRequest>,
) -> Result<Json<Value>, AppError> {
    let (name, surname) = require_actor_fields(&request)?;

    match catalog.update_actor(actor_id, name, surname).await? {
        CatalogOutcome::Ok(()) => Ok(Json(json!({
            "message": format!("Actor {} updated successfully!", actor_id)
        }))),
        CatalogOutcome::Duplicate => Err(AppError::Conflict(
            "Actor already exists! Update not allowed!".to_string(),
        )),
        CatalogOutcome::NotFound => Err(AppError::NotFound("Actor not found!".to_string())),
        CatalogOutcome::InvalidActors => Err(AppError::UnknownActors),
    }
}

/// DELETE /actors/:id - Delete an actor and its movie assignments
pub async fn delete_actor(
    State(catalog): State<Arc<CatalogService>>,
    Path(actor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    match catalog.delete_actor(actor_id).await? {
        CatalogOutcome::Ok(()) => Ok(Json(json!({
            "message": format!("Actor with id {} deleted successfully!", actor_id)
        }))),
        CatalogOutcome::Duplicate => Err(AppError::Conflict("Actor already exists!".to_string())),
        CatalogOutcome::NotFound => Err(AppError::NotFound("Actor not found!".to_string())),
        CatalogOutcome::InvalidActors => Err(AppError::UnknownActors),
    }
}

/// DELETE /actors/batch - Delete multiple actors by id
///
/// A partial match (fewer deleted than requested) is success, not an error.
pub async fn delete_actors_batch(
    State(catalog): State<Arc<CatalogService>>,
    Json(actor_ids): Json<Vec<i64>>,
) -> Result<Json<Value>, AppError> {
    if actor_ids.is_empty() {
        return Err(AppError::Validation(
            "No actor(s) to remove! Please select at least one actor.".to_string(),
        ));
    }

    let deleted_count = catalog.delete_actors(&actor_ids).await?;

    if (deleted_count as usize) < actor_ids.len() {
        return Ok(Json(json!({
            "message": format!(
                "Operation partially successful. Deleted {} out of {} requested actors.",
                deleted_count,
                actor_ids.len()
            ),
            "requested_ids": actor_ids,
            "deleted_count": deleted_count,
        })));
    }

    Ok(Json(json!({
        "message": "All selected actors with their associations deleted successfully!",
        "deleted_ids": actor_ids,
        "deleted_count": deleted_count,
    })))
}
