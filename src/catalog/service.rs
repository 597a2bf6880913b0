//! Catalog service
//!
//! Actor/movie CRUD and association maintenance on top of [`CatalogDb`].
//! Duplicate detection and referential-integrity policy are encoded in the
//! returned [`CatalogOutcome`] value instead of being propagated as raw
//! database errors; anything else is rolled back and reported as
//! [`AppError::Internal`].

use crate::catalog::db::CatalogDb;
use crate::catalog::models::{Actor, Movie, MovieCast};
use crate::error::AppError;
use std::collections::BTreeSet;
use tracing::debug;

/// Outcome of a catalog operation
///
/// Policy rejections are values, not errors: callers must match on the
/// variant and map it deterministically to a transport-level response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOutcome<T> {
    /// Operation succeeded with a payload
    Ok(T),
    /// The referenced row does not exist
    NotFound,
    /// Another row already holds the same natural key
    Duplicate,
    /// An assignment referenced one or more unknown actor ids
    InvalidActors,
}

/// Fields for a new movie
#[derive(Debug, Clone)]
pub struct NewMovie {
    /// Movie title
    pub title: String,
    /// Movie director
    pub director: String,
    /// Release year
    pub year: i64,
    /// Optional free-form description
    pub description: Option<String>,
    /// Actors to assign; de-duplicated before insert
    pub actor_ids: Vec<i64>,
}

/// Fields for a movie update
#[derive(Debug, Clone)]
pub struct MovieUpdate {
    /// New title
    pub title: String,
    /// New director
    pub director: String,
    /// New release year
    pub year: i64,
    /// New description
    pub description: Option<String>,
    /// `None` leaves existing assignments untouched; `Some` replaces them
    /// with the de-duplicated list (an empty list clears them)
    pub actor_ids: Option<Vec<i64>>,
}

/// Catalog operations over the store
///
/// Each operation runs as a single transaction: either everything it does is
/// committed or nothing is. Dropping an in-flight `sqlx` transaction rolls it
/// back, so every early return releases the connection with no partial writes.
pub struct CatalogService {
    db: CatalogDb,
}

/// True when the error is an integrity-constraint violation on a foreign key
fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| matches!(db_err.kind(), sqlx::error::ErrorKind::ForeignKeyViolation))
        .unwrap_or(false)
}

impl CatalogService {
    /// Create a catalog service over an initialized store
    pub fn new(db: CatalogDb) -> Self {
        Self { db }
    }

    /// Get the underlying store (for advanced operations and tests)
    pub fn store(&self) -> &CatalogDb {
        &self.db
    }

    // ------- Actors --------

    /// Get all actors, in natural storage order
    pub async fn list_actors(&self) -> Result<Vec<Actor>, AppError> {
        let actors = sqlx::query_as::<_, Actor>("SELECT id, name, surname FROM actor")
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch actors: {}", e)))?;

        Ok(actors)
    }

    /// Get an actor by id
    pub async fn get_actor(&self, actor_id: i64) -> Result<Option<Actor>, AppError> {
        let actor = sqlx::query_as::<_, Actor>("SELECT id, name, surname FROM actor WHERE id = ?")
            .bind(actor_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch actor: {}", e)))?;

        Ok(actor)
    }

    /// Create a new actor, rejecting duplicate `(name, surname)` pairs
    pub async fn create_actor(
        &self,
        name: &str,
        surname: &str,
    ) -> Result<CatalogOutcome<i64>, AppError> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let existing = sqlx::query("SELECT id FROM actor WHERE name = ? AND surname = ?")
            .bind(name)
            .bind(surname)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to check for duplicate actor: {}", e))
            })?;
        if existing.is_some() {
            return Ok(CatalogOutcome::Duplicate);
        }

        let result = sqlx::query("INSERT INTO actor (name, surname) VALUES (?, ?)")
            .bind(name)
            .bind(surname)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to insert actor: {}", e)))?;
        let new_id = result.last_insert_rowid();

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(actor_id = new_id, "Created actor");
        Ok(CatalogOutcome::Ok(new_id))
    }

    /// Update an actor in place
    ///
    /// Rejects the update when a *different* actor already holds the new
    /// `(name, surname)` pair; updating an actor to its own current values
    /// succeeds.
    pub async fn update_actor(
        &self,
        actor_id: i64,
        name: &str,
        surname: &str,
    ) -> Result<CatalogOutcome<()>, AppError> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let found = sqlx::query("SELECT id FROM actor WHERE id = ?")
            .bind(actor_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch actor: {}", e)))?;
        if found.is_none() {
            return Ok(CatalogOutcome::NotFound);
        }

        let existing = sqlx::query("SELECT id FROM actor WHERE name = ? AND surname = ? AND id != ?")
            .bind(name)
            .bind(surname)
            .bind(actor_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to check for duplicate actor: {}", e))
            })?;
        if existing.is_some() {
            return Ok(CatalogOutcome::Duplicate);
        }

        sqlx::query("UPDATE actor SET name = ?, surname = ? WHERE id = ?")
            .bind(name)
            .bind(surname)
            .bind(actor_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to update actor: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(actor_id = actor_id, "Updated actor");
        Ok(CatalogOutcome::Ok(()))
    }

    /// Delete an actor and its movie assignments atomically
    pub async fn delete_actor(&self, actor_id: i64) -> Result<CatalogOutcome<()>, AppError> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let found = sqlx::query("SELECT id FROM actor WHERE id = ?")
            .bind(actor_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch actor: {}", e)))?;
        if found.is_none() {
            return Ok(CatalogOutcome::NotFound);
        }

        // Assignments must go before the owning row; foreign keys are enforced
        sqlx::query("DELETE FROM movie_actor_through WHERE actor_id = ?")
            .bind(actor_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to delete actor assignments: {}", e))
            })?;

        sqlx::query("DELETE FROM actor WHERE id = ?")
            .bind(actor_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to delete actor: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(actor_id = actor_id, "Deleted actor");
        Ok(CatalogOutcome::Ok(()))
    }

    /// Delete several actors and all their assignments in one transaction
    ///
    /// Returns the number of actor rows actually deleted. Ids that do not
    /// exist are skipped, so the count may be smaller than the input; that is
    /// not an error.
    pub async fn delete_actors(&self, actor_ids: &[i64]) -> Result<u64, AppError> {
        if actor_ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; actor_ids.len()].join(", ");

        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let sql = format!("DELETE FROM movie_actor_through WHERE actor_id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for actor_id in actor_ids {
            query = query.bind(*actor_id);
        }
        query.execute(&mut *tx).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to delete actor assignments: {}", e))
        })?;

        let sql = format!("DELETE FROM actor WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for actor_id in actor_ids {
            query = query.bind(*actor_id);
        }
        let result = query
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to delete actors: {}", e)))?;
        let deleted = result.rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(deleted = deleted, "Batch-deleted actors");
        Ok(deleted)
    }

    // ------- Movies --------

    /// Get all movies, in natural storage order
    pub async fn list_movies(&self) -> Result<Vec<Movie>, AppError> {
        let movies =
            sqlx::query_as::<_, Movie>("SELECT id, title, director, year, description FROM movie")
                .fetch_all(self.db.pool())
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to fetch movies: {}", e))
                })?;

        Ok(movies)
    }

    /// Get a movie by id
    pub async fn get_movie(&self, movie_id: i64) -> Result<Option<Movie>, AppError> {
        let movie = sqlx::query_as::<_, Movie>(
            "SELECT id, title, director, year, description FROM movie WHERE id = ?",
        )
        .bind(movie_id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch movie: {}", e)))?;

        Ok(movie)
    }

    /// Create a new movie together with its actor assignments
    ///
    /// Rejects duplicate `(title, year)` pairs. The actor list is
    /// de-duplicated; if any id does not exist the whole transaction rolls
    /// back, movie row included, and `InvalidActors` is returned.
    pub async fn create_movie(&self, movie: &NewMovie) -> Result<CatalogOutcome<i64>, AppError> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let existing = sqlx::query("SELECT id FROM movie WHERE title = ? AND year = ?")
            .bind(&movie.title)
            .bind(movie.year)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to check for duplicate movie: {}", e))
            })?;
        if existing.is_some() {
            return Ok(CatalogOutcome::Duplicate);
        }

        let result =
            sqlx::query("INSERT INTO movie (title, director, year, description) VALUES (?, ?, ?, ?)")
                .bind(&movie.title)
                .bind(&movie.director)
                .bind(movie.year)
                .bind(&movie.description)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to insert movie: {}", e))
                })?;
        let new_id = result.last_insert_rowid();

        let unique_actor_ids: BTreeSet<i64> = movie.actor_ids.iter().copied().collect();
        for actor_id in &unique_actor_ids {
            let inserted =
                sqlx::query("INSERT INTO movie_actor_through (movie_id, actor_id) VALUES (?, ?)")
                    .bind(new_id)
                    .bind(*actor_id)
                    .execute(&mut *tx)
                    .await;
            match inserted {
                Ok(_) => {}
                Err(e) if is_foreign_key_violation(&e) => {
                    // Dropping the transaction rolls back the movie insert too
                    return Ok(CatalogOutcome::InvalidActors);
                }
                Err(e) => {
                    return Err(AppError::Internal(anyhow::anyhow!(
                        "Failed to insert assignment: {}",
                        e
                    )))
                }
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(
            movie_id = new_id,
            actor_count = unique_actor_ids.len(),
            "Created movie"
        );
        Ok(CatalogOutcome::Ok(new_id))
    }

    /// Update a movie's scalar fields and optionally replace its assignments
    ///
    /// Assignment semantics follow [`MovieUpdate::actor_ids`]: `None` is left
    /// untouched, `Some` replaces the full set. A foreign-key violation on
    /// the replacement rolls back the scalar-field changes as well.
    pub async fn update_movie(
        &self,
        movie_id: i64,
        update: &MovieUpdate,
    ) -> Result<CatalogOutcome<()>, AppError> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let found = sqlx::query("SELECT id FROM movie WHERE id = ?")
            .bind(movie_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch movie: {}", e)))?;
        if found.is_none() {
            return Ok(CatalogOutcome::NotFound);
        }

        let existing = sqlx::query("SELECT id FROM movie WHERE title = ? AND year = ? AND id != ?")
            .bind(&update.title)
            .bind(update.year)
            .bind(movie_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to check for duplicate movie: {}", e))
            })?;
        if existing.is_some() {
            return Ok(CatalogOutcome::Duplicate);
        }

        sqlx::query("UPDATE movie SET title = ?, director = ?, year = ?, description = ? WHERE id = ?")
            .bind(&update.title)
            .bind(&update.director)
            .bind(update.year)
            .bind(&update.description)
            .bind(movie_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to update movie: {}", e)))?;

        if let Some(actor_ids) = &update.actor_ids {
            sqlx::query("DELETE FROM movie_actor_through WHERE movie_id = ?")
                .bind(movie_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to delete assignments: {}", e))
                })?;

            let unique_actor_ids: BTreeSet<i64> = actor_ids.iter().copied().collect();
            for actor_id in &unique_actor_ids {
                let inserted = sqlx::query(
                    "INSERT INTO movie_actor_through (movie_id, actor_id) VALUES (?, ?)",
                )
                .bind(movie_id)
                .bind(*actor_id)
                .execute(&mut *tx)
                .await;
                match inserted {
                    Ok(_) => {}
                    Err(e) if is_foreign_key_violation(&e) => {
                        return Ok(CatalogOutcome::InvalidActors);
                    }
                    Err(e) => {
                        return Err(AppError::Internal(anyhow::anyhow!(
                            "Failed to insert assignment: {}",
                            e
                        )))
                    }
                }
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(movie_id = movie_id, "Updated movie");
        Ok(CatalogOutcome::Ok(()))
    }

    /// Delete a movie and its actor assignments atomically
    pub async fn delete_movie(&self, movie_id: i64) -> Result<CatalogOutcome<()>, AppError> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let found = sqlx::query("SELECT id FROM movie WHERE id = ?")
            .bind(movie_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch movie: {}", e)))?;
        if found.is_none() {
            return Ok(CatalogOutcome::NotFound);
        }

        sqlx::query("DELETE FROM movie_actor_through WHERE movie_id = ?")
            .bind(movie_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to delete movie assignments: {}", e))
            })?;

        sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(movie_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to delete movie: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(movie_id = movie_id, "Deleted movie");
        Ok(CatalogOutcome::Ok(()))
    }

    /// Delete several movies and all their assignments in one transaction
    ///
    /// Same contract as [`CatalogService::delete_actors`], scoped to movies.
    pub async fn delete_movies(&self, movie_ids: &[i64]) -> Result<u64, AppError> {
        if movie_ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; movie_ids.len()].join(", ");

        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let sql = format!("DELETE FROM movie_actor_through WHERE movie_id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for movie_id in movie_ids {
            query = query.bind(*movie_id);
        }
        query.execute(&mut *tx).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to delete movie assignments: {}", e))
        })?;

        let sql = format!("DELETE FROM movie WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for movie_id in movie_ids {
            query = query.bind(*movie_id);
        }
        let result = query
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to delete movies: {}", e)))?;
        let deleted = result.rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        debug!(deleted = deleted, "Batch-deleted movies");
        Ok(deleted)
    }

    /// Get a movie together with all actors assigned to it
    pub async fn movie_cast(&self, movie_id: i64) -> Result<CatalogOutcome<MovieCast>, AppError> {
        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let movie = sqlx::query_as::<_, Movie>(
            "SELECT id, title, director, year, description FROM movie WHERE id = ?",
        )
        .bind(movie_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch movie: {}", e)))?;
        let movie = match movie {
            Some(movie) => movie,
            None => return Ok(CatalogOutcome::NotFound),
        };

        let actors = sqlx::query_as::<_, Actor>(
            "SELECT a.id, a.name, a.surname FROM actor a \
             JOIN movie_actor_through mat ON a.id = mat.actor_id \
             WHERE mat.movie_id = ?",
        )
        .bind(movie_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch movie cast: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        Ok(CatalogOutcome::Ok(MovieCast { movie, actors }))
    }
}
