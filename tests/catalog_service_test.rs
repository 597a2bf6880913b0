//! Integration tests for the catalog service
//!
//! These tests exercise the policy layer directly against a fresh SQLite
//! database per test and verify the association-table invariants:
//! 1. Duplicate natural keys are rejected as outcomes, not errors
//! 2. Deletes cascade to assignment rows inside the same transaction
//! 3. Assignment lists are de-duplicated and replaced atomically
//! 4. A failed assignment insert rolls back the whole operation

use movie_catalog_backend::catalog::{
    CatalogDb, CatalogOutcome, CatalogService, MovieUpdate, NewMovie,
};
use tempfile::TempDir;

/// Helper to create a catalog service over a temporary database
async fn create_test_catalog() -> (CatalogService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = CatalogDb::new(db_path.to_str().unwrap())
        .await
        .expect("Failed to create test database");
    (CatalogService::new(db), temp_dir)
}

async fn add_actor(catalog: &CatalogService, name: &str, surname: &str) -> i64 {
    match catalog.create_actor(name, surname).await.unwrap() {
        CatalogOutcome::Ok(id) => id,
        other => panic!("Failed to create actor: {:?}", other),
    }
}

async fn add_movie(catalog: &CatalogService, title: &str, year: i64, actor_ids: Vec<i64>) -> i64 {
    let movie = NewMovie {
        title: title.to_string(),
        director: "Jonathan Demme".to_string(),
        year,
        description: Some("Test movie".to_string()),
        actor_ids,
    };
    match catalog.create_movie(&movie).await.unwrap() {
        CatalogOutcome::Ok(id) => id,
        other => panic!("Failed to create movie: {:?}", other),
    }
}

fn movie_update(title: &str, year: i64, actor_ids: Option<Vec<i64>>) -> MovieUpdate {
    MovieUpdate {
        title: title.to_string(),
        director: "Jonathan Demme".to_string(),
        year,
        description: None,
        actor_ids,
    }
}

/// Count assignment rows matching a column value, straight from the store
async fn assignment_count(catalog: &CatalogService, column: &str, id: i64) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM movie_actor_through WHERE {} = ?", column);
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .fetch_one(catalog.store().pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_duplicate_actor_rejected() {
    let (catalog, _temp_dir) = create_test_catalog().await;

    let first = catalog.create_actor("Jodie", "Foster").await.unwrap();
    assert!(matches!(first, CatalogOutcome::Ok(_)));

    // Identical (name, surname) pair is a duplicate
    let second = catalog.create_actor("Jodie", "Foster").await.unwrap();
    assert_eq!(second, CatalogOutcome::Duplicate);

    // A different surname is a different actor
    let third = catalog.create_actor("Jodie", "Comer").await.unwrap();
    assert!(matches!(third, CatalogOutcome::Ok(_)));
}

#[tokio::test]
async fn test_update_actor_duplicate_and_self_update() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    add_actor(&catalog, "Jodie", "Foster").await;
    let comer = add_actor(&catalog, "Jodie", "Comer").await;

    // Taking a pair held by a different actor is rejected
    let outcome = catalog.update_actor(comer, "Jodie", "Foster").await.unwrap();
    assert_eq!(outcome, CatalogOutcome::Duplicate);

    // Updating an actor to its own current values succeeds
    let outcome = catalog.update_actor(comer, "Jodie", "Comer").await.unwrap();
    assert_eq!(outcome, CatalogOutcome::Ok(()));

    let outcome = catalog.update_actor(9999, "Jodie", "Whittaker").await.unwrap();
    assert_eq!(outcome, CatalogOutcome::NotFound);
}

#[tokio::test]
async fn test_delete_actor_cascades_assignments() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;
    let anthony = add_actor(&catalog, "Anthony", "Hopkins").await;
    let movie_id = add_movie(&catalog, "The Silence of the Lambs", 1991, vec![jodie, anthony]).await;

    let outcome = catalog.delete_actor(jodie).await.unwrap();
    assert_eq!(outcome, CatalogOutcome::Ok(()));

    // The movie's cast no longer includes the deleted actor
    let cast = match catalog.movie_cast(movie_id).await.unwrap() {
        CatalogOutcome::Ok(cast) => cast,
        other => panic!("Expected cast, got {:?}", other),
    };
    assert_eq!(cast.actors.len(), 1);
    assert_eq!(cast.actors[0].id, anthony);

    // No orphaned assignment rows remain
    assert_eq!(assignment_count(&catalog, "actor_id", jodie).await, 0);
}

#[tokio::test]
async fn test_create_movie_deduplicates_assignments() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;
    let anthony = add_actor(&catalog, "Anthony", "Hopkins").await;

    let movie_id = add_movie(
        &catalog,
        "The Silence of the Lambs",
        1991,
        vec![jodie, jodie, anthony],
    )
    .await;

    // Exactly two rows despite the repeated id
    assert_eq!(assignment_count(&catalog, "movie_id", movie_id).await, 2);
}

#[tokio::test]
async fn test_create_movie_unknown_actor_rolls_back() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;

    let movie = NewMovie {
        title: "The Silence of the Lambs".to_string(),
        director: "Jonathan Demme".to_string(),
        year: 1991,
        description: None,
        actor_ids: vec![jodie, 9999],
    };
    let outcome = catalog.create_movie(&movie).await.unwrap();
    assert_eq!(outcome, CatalogOutcome::InvalidActors);

    // No partial insert: neither the movie nor any assignment survived
    assert!(catalog.list_movies().await.unwrap().is_empty());
    assert_eq!(assignment_count(&catalog, "actor_id", jodie).await, 0);
}

#[tokio::test]
async fn test_duplicate_movie_rejected() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    add_movie(&catalog, "The Silence of the Lambs", 1991, vec![]).await;

    let movie = NewMovie {
        title: "The Silence of the Lambs".to_string(),
        director: "Someone Else".to_string(),
        year: 1991,
        description: None,
        actor_ids: vec![],
    };
    let outcome = catalog.create_movie(&movie).await.unwrap();
    assert_eq!(outcome, CatalogOutcome::Duplicate);

    // Same title in another year is fine
    add_movie(&catalog, "The Silence of the Lambs", 2007, vec![]).await;
}

#[tokio::test]
async fn test_update_movie_actor_list_semantics() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;
    let anthony = add_actor(&catalog, "Anthony", "Hopkins").await;
    let movie_id = add_movie(&catalog, "The Silence of the Lambs", 1991, vec![jodie, anthony]).await;

    // Omitted actor_ids leaves assignments unchanged
    let outcome = catalog
        .update_movie(movie_id, &movie_update("The Silence of the Lambs", 1991, None))
        .await
        .unwrap();
    assert_eq!(outcome, CatalogOutcome::Ok(()));
    assert_eq!(assignment_count(&catalog, "movie_id", movie_id).await, 2);

    // A non-empty list replaces the full set
    let outcome = catalog
        .update_movie(
            movie_id,
            &movie_update("The Silence of the Lambs", 1991, Some(vec![jodie])),
        )
        .await
        .unwrap();
    assert_eq!(outcome, CatalogOutcome::Ok(()));
    assert_eq!(assignment_count(&catalog, "movie_id", movie_id).await, 1);

    // An empty list removes all assignments
    let outcome = catalog
        .update_movie(
            movie_id,
            &movie_update("The Silence of the Lambs", 1991, Some(vec![])),
        )
        .await
        .unwrap();
    assert_eq!(outcome, CatalogOutcome::Ok(()));
    assert_eq!(assignment_count(&catalog, "movie_id", movie_id).await, 0);
}

#[tokio::test]
async fn test_update_movie_unknown_actor_rolls_back_scalar_fields() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;
    let movie_id = add_movie(&catalog, "The Silence of the Lambs", 1991, vec![jodie]).await;

    let outcome = catalog
        .update_movie(movie_id, &movie_update("Hannibal", 2001, Some(vec![9999])))
        .await
        .unwrap();
    assert_eq!(outcome, CatalogOutcome::InvalidActors);

    // The scalar-field update rolled back together with the assignments
    let movie = catalog.get_movie(movie_id).await.unwrap().unwrap();
    assert_eq!(movie.title, "The Silence of the Lambs");
    assert_eq!(movie.year, 1991);
    assert_eq!(assignment_count(&catalog, "movie_id", movie_id).await, 1);
}

#[tokio::test]
async fn test_delete_movie_cascades_assignments() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;
    let movie_id = add_movie(&catalog, "The Silence of the Lambs", 1991, vec![jodie]).await;

    let outcome = catalog.delete_movie(movie_id).await.unwrap();
    assert_eq!(outcome, CatalogOutcome::Ok(()));

    assert!(catalog.get_movie(movie_id).await.unwrap().is_none());
    assert_eq!(assignment_count(&catalog, "movie_id", movie_id).await, 0);

    // The actor itself is untouched
    assert!(catalog.get_actor(jodie).await.unwrap().is_some());
}

#[tokio::test]
async fn test_batch_delete_actors_reports_actual_count() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;
    let anthony = add_actor(&catalog, "Anthony", "Hopkins").await;
    let movie_id = add_movie(&catalog, "The Silence of the Lambs", 1991, vec![jodie, anthony]).await;

    // One of the requested ids does not exist; that is not an error
    let deleted = catalog.delete_actors(&[jodie, anthony, 9999]).await.unwrap();
    assert_eq!(deleted, 2);

    assert!(catalog.get_actor(jodie).await.unwrap().is_none());
    assert!(catalog.get_actor(anthony).await.unwrap().is_none());
    assert!(catalog.get_actor(9999).await.unwrap().is_none());
    assert_eq!(assignment_count(&catalog, "movie_id", movie_id).await, 0);
}

#[tokio::test]
async fn test_batch_delete_movies_reports_actual_count() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let first = add_movie(&catalog, "The Silence of the Lambs", 1991, vec![]).await;
    let second = add_movie(&catalog, "Hannibal", 2001, vec![]).await;

    let deleted = catalog.delete_movies(&[first, second, 9999]).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(catalog.list_movies().await.unwrap().is_empty());

    // An empty batch deletes nothing
    let deleted = catalog.delete_movies(&[]).await.unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_movie_cast_returns_movie_and_actors() {
    let (catalog, _temp_dir) = create_test_catalog().await;
    let jodie = add_actor(&catalog, "Jodie", "Foster").await;
    let movie_id = add_movie(&catalog, "The Silence of the Lambs", 1991, vec![jodie]).await;

    let cast = match catalog.movie_cast(movie_id).await.unwrap() {
        CatalogOutcome::Ok(cast) => cast,
        other => panic!("Expected cast, got {:?}", other),
    };
    assert_eq!(cast.movie.id, movie_id);
    assert_eq!(cast.movie.title, "The Silence of the Lambs");
    assert_eq!(cast.actors.len(), 1);
    assert_eq!(cast.actors[0].name, "Jodie");

    let outcome = catalog.movie_cast(9999).await.unwrap();
    assert_eq!(outcome, CatalogOutcome::NotFound);
}
