//! Movie API endpoints
//!
//! Handles HTTP requests for the movie catalog, including the actor
//! assignments carried on movie create/update.

use crate::catalog::{CatalogOutcome, CatalogService, Movie, MovieCast, MovieUpdate, NewMovie};
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Request body for creating or updating a movie
///
/// Fields are optional so that a missing field surfaces as a 400 validation
/// failure rather than a body-deserialization rejection. On update, a missing
/// (or null) `actor_ids` leaves existing assignments untouched; any list,
/// including an empty one, replaces them.
#[derive(Debug, Deserialize)]
pub struct SaveMovieRequest {
    /// Movie title
    pub title: Option<String>,
    /// Movie director
    pub director: Option<String>,
    /// Release year
    pub year: Option<i64>,
    /// Optional free-form description
    pub description: Option<String>,
    /// Actors to assign to the movie
    pub actor_ids: Option<Vec<i64>>,
}

/// Extract and validate the required movie fields
fn require_movie_fields(request: &SaveMovieRequest) -> Result<(&str, &str, i64), AppError> {
    match (
        request.title.as_deref(),
        request.director.as_deref(),
        request.year,
    ) {
        (Some(title), Some(director), Some(year)) if !title.is_empty() && !director.is_empty() => {
            Ok((title, director, year))
        }
        _ => Err(AppError::Validation(
            "Fields title/director/year are required!".to_string(),
        )),
    }
}

/// Count of distinct ids in an assignment list
fn unique_actor_count(actor_ids: &[i64]) -> usize {
    actor_ids.iter().collect::<BTreeSet<_>>().len()
}

/// GET /movies - List all movies
pub async fn list_movies(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let movies = catalog.list_movies().await?;
    Ok(Json(movies))
}

/// GET /movies/:id - Get a single movie
pub async fn get_movie(
    State(catalog): State<Arc<CatalogService>>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Movie>, AppError> {
    let movie = catalog
        .get_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Movie not found!".to_string()))?;

    Ok(Json(movie))
}

/// POST /movies - Add a new movie with its actor assignments
pub async fn create_movie(
    State(catalog): State<Arc<CatalogService>>,
    Json(request): Json<SaveMovieRequest>,
) -> Result<Json<Value>, AppError> {
    let (title, director, year) = require_movie_fields(&request)?;
    let actor_ids = request.actor_ids.clone().unwrap_or_default();

    let movie = NewMovie {
        title: title.to_string(),
        director: director.to_string(),
        year,
        description: request.description.clone(),
        actor_ids,
    };

    match catalog.create_movie(&movie).await? {
        CatalogOutcome::Ok(id) => Ok(Json(json!({
            "message": "Movie added successfully!",
            "id": id,
            "added_actor_count": unique_actor_count(&movie.actor_ids),
        }))),
        CatalogOutcome::Duplicate => Err(AppError::Conflict("Movie already exists!".to_string())),
        CatalogOutcome::NotFound => Err(AppError::NotFound("Movie not found!".to_string())),
        CatalogOutcome::InvalidActors => Err(AppError::UnknownActors),
    }
}

/// PUT /movies/:id - Update movie details and refresh actor assignments
pub async fn update_movie(
    State(catalog): State<Arc<CatalogService>>,
    Path(movie_id): Path<i64>,
    Json(request): Json<SaveMovieRequest>,
) -> Result<Json<Value>, AppError> {
    let (title, director, year) = require_movie_fields(&request)?;

    let update = MovieUpdate {
        title: title.to_string(),
        director: director.to_string(),
        year,
        description: request.description.clone(),
        actor_ids: request.actor_ids.clone(),
    };

    match catalog.update_movie(movie_id, &update).await? {
        CatalogOutcome::Ok(()) => Ok(Json(json!({
            "message": format!("Movie {} and actors updated successfully!", movie_id),
            "id": movie_id,
            "updated_actors_count":
                unique_actor_count(update.actor_ids.as_deref().unwrap_or_default()),
        }))),
        CatalogOutcome::Duplicate => Err(AppError::Conflict(
            "Movie already exists! Update not allowed!".to_string(),
        )),
        CatalogOutcome::NotFound => Err(AppError::NotFound("Movie not found!".to_string())),
        CatalogOutcome::InvalidActors => Err(AppError::UnknownActors),
    }
}

/// DELETE /movies/:id - Delete a movie and its actor assignments
pub async fn delete_movie(
    State(catalog): State<Arc<CatalogService>>,
    Path(movie_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    match catalog.delete_movie(movie_id).await? {
        CatalogOutcome::Ok(()) => Ok(Json(json!({
            "message": format!("Movie with id {} deleted successfully!", movie_id)
        }))),
        CatalogOutcome::Duplicate => Err(AppError::Conflict("Movie already exists!".to_string())),
        CatalogOutcome::NotFound => Err(AppError::NotFound("Movie not found!".to_string())),
        CatalogOutcome::InvalidActors => Err(AppError::UnknownActors),
    }
}

/// DELETE /movies/batch - Delete multiple movies by id
///
/// A partial match (fewer deleted than requested) is success, not an error.
pub async fn delete_movies_batch(
    State(catalog): State<Arc<CatalogService>>,
    Json(movie_ids): Json<Vec<i64>>,
) -> Result<Json<Value>, AppError> {
    if movie_ids.is_empty() {
        return Err(AppError::Validation(
            "No movie(s) to remove! Please select at least one movie.".to_string(),
        ));
    }

    let deleted_count = catalog.delete_movies(&movie_ids).await?;

    if (deleted_count as usize) < movie_ids.len() {
        return Ok(Json(json!({
            "message": format!(
                "Operation partially successful. Deleted {} out of {} requested movies.",
                deleted_count,
                movie_ids.len()
            ),
            "requested_ids": movie_ids,
            "deleted_count": deleted_count,
        })));
    }

    Ok(Json(json!({
        "message": "All selected movies with their associations deleted successfully!",
        "deleted_ids": movie_ids,
        "deleted_count": deleted_count,
    })))
}

/// GET /movies/:id/actors - Retrieve a movie together with its cast
pub async fn get_movie_cast(
    State(catalog): State<Arc<CatalogService>>,
    Path(movie_id): Path<i64>,
) -> Result<Json<MovieCast>, AppError> {
    match catalog.movie_cast(movie_id).await? {
        CatalogOutcome::Ok(cast) => Ok(Json(cast)),
        CatalogOutcome::Duplicate => Err(AppError::Conflict("Movie already exists!".to_string())),
        CatalogOutcome::NotFound => Err(AppError::NotFound("Movie not found!".to_string())),
        CatalogOutcome::InvalidActors => Err(AppError::UnknownActors),
    }
}
