//! Catalog module
//!
//! Actor and movie storage plus the CRUD/association policy layer on top of
//! a SQLite database.

pub mod db;
pub mod models;
pub mod service;

pub use db::CatalogDb;
pub use models::{Actor, Movie, MovieCast};
pub use service::{CatalogOutcome, CatalogService, MovieUpdate, NewMovie};
