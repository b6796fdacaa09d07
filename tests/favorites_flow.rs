use lupe_discover::models::Movie;
use lupe_discover::store::DB_FILE_NAME;
use lupe_discover::{FavoritesManager, FavoritesRepository, SqliteFavoritesStore};
use std::sync::Arc;
use tempfile::tempdir;

fn movie(id: i64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        poster_path: Some("/x.jpg".to_string()),
        vote_average: 8.7,
        release_date: "1999-03-31".to_string(),
        overview: "A hacker learns the truth.".to_string(),
        genre_ids: vec![28, 878],
    }
}

#[tokio::test]
async fn test_favorite_then_unfavorite_reaches_the_store() {
    let dir = tempdir().unwrap();
    let store = Arc::new(SqliteFavoritesStore::new(dir.path().join(DB_FILE_NAME)));
    let manager = Arc::new(FavoritesManager::new(store.clone()));
    manager.activate().unwrap().await.unwrap();

    manager.add_favorite(movie(42, "X")).await;
    assert!(manager.is_favorite(42));
    assert_eq!(store.get_all().await.unwrap(), vec![movie(42, "X")]);

    manager.remove_favorite(42).await;
    assert!(!manager.is_favorite(42));
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_favorites_are_restored_on_next_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(DB_FILE_NAME);

    {
        let store = Arc::new(SqliteFavoritesStore::new(&path));
        let manager = FavoritesManager::new(store);
        manager.load().await;
        manager.add_favorite(movie(1, "First")).await;
        manager.add_favorite(movie(2, "Second")).await;
        manager.remove_favorite(1).await;
    }

    let store = Arc::new(SqliteFavoritesStore::new(&path));
    let manager = FavoritesManager::new(store);
    assert!(manager.is_loading());
    manager.load().await;

    assert!(!manager.is_loading());
    assert_eq!(manager.favorites(), vec![movie(2, "Second")]);
    assert!(!manager.is_favorite(1));
}

#[tokio::test]
async fn test_unavailable_store_yields_empty_favorites() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let store = Arc::new(SqliteFavoritesStore::new(file.path().join(DB_FILE_NAME)));
    let manager = FavoritesManager::new(store);

    manager.load().await;
    assert!(!manager.is_loading());
    assert!(manager.favorites().is_empty());

    manager.add_favorite(movie(42, "X")).await;
    assert!(!manager.is_favorite(42));
}

#[tokio::test]
async fn test_concurrent_changes_to_different_ids_all_land() {
    let dir = tempdir().unwrap();
    let store = Arc::new(SqliteFavoritesStore::new(dir.path().join(DB_FILE_NAME)));
    store.add(&movie(3, "Third")).await.unwrap();

    let manager = FavoritesManager::new(store.clone());
    manager.load().await;
    assert!(manager.is_favorite(3));

    tokio::join!(
        manager.add_favorite(movie(1, "First")),
        manager.add_favorite(movie(2, "Second")),
        manager.remove_favorite(3)
    );

    let mut mirrored: Vec<i64> = manager.favorites().iter().map(|m| m.id).collect();
    mirrored.sort_unstable();
    assert_eq!(mirrored, vec![1, 2]);

    let mut stored: Vec<i64> = store.get_all().await.unwrap().iter().map(|m| m.id).collect();
    stored.sort_unstable();
    assert_eq!(stored, vec![1, 2]);
}
