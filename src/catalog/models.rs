//! Catalog data models
//!
//! Defines the row types for actors, movies and the movie/actor association.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An actor in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Actor {
    /// Surrogate key, assigned by the store on insert
    pub id: i64,
    /// Actor first name
    pub name: String,
    /// Actor surname
    pub surname: String,
}

/// A movie in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    /// Surrogate key, assigned by the store on insert
    pub id: i64,
    /// Movie title
    pub title: String,
    /// Movie director
    pub director: String,
    /// Release year
    pub year: i64,
    /// Optional free-form description
    pub description: Option<String>,
}

/// A movie together with the actors assigned to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieCast {
    /// The movie itself
    pub movie: Movie,
    /// Actors joined through the assignment table, in no specified order
    pub actors: Vec<Actor>,
}
