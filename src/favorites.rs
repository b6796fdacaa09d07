use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::Movie;
use crate::store::FavoritesRepository;

#[derive(Debug, Clone, PartialEq)]
pub struct FavoritesState {
    pub favorites: Vec<Movie>,
    pub is_loading: bool,
}

impl Default for FavoritesState {
    fn default() -> Self {
        Self {
            favorites: Vec::new(),
            is_loading: true,
        }
    }
}

/// In-memory mirror of the favorites store that UI code reads from and
/// subscribes to. The mirror only changes after the store confirms a write;
/// store failures are logged and leave the mirror as it was.
pub struct FavoritesManager {
    store: Arc<dyn FavoritesRepository>,
    state: watch::Sender<FavoritesState>,
    activated: AtomicBool,
}

impl FavoritesManager {
    pub fn new(store: Arc<dyn FavoritesRepository>) -> Self {
        let (state, _) = watch::channel(FavoritesState::default());
        Self {
            store,
            state,
            activated: AtomicBool::new(false),
        }
    }

    /// Starts the initial load in the background. Only the first call spawns
    /// a load; later calls return `None`.
    pub fn activate(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return None;
        }
        let manager = Arc::clone(self);
        Some(tokio::spawn(async move { manager.load().await }))
    }

    /// Replaces the mirror with the store contents. A failed load leaves the
    /// list empty; `is_loading` is cleared either way.
    pub async fn load(&self) {
        match self.store.get_all().await {
            Ok(stored) => {
                info!("Loaded {} favorites", stored.len());
                self.state.send_modify(|state| {
                    state.favorites = stored;
                    state.is_loading = false;
                });
            }
            Err(e) => {
                error!("Failed to load favorites: {}", e);
                self.state.send_modify(|state| state.is_loading = false);
            }
        }
    }

    pub async fn add_favorite(&self, movie: Movie) {
        if let Err(e) = self.store.add(&movie).await {
            error!("Failed to add favorite {}: {}", movie.id, e);
            return;
        }

        self.state.send_modify(|state| {
            match state.favorites.iter_mut().find(|m| m.id == movie.id) {
                Some(existing) => *existing = movie,
                None => state.favorites.push(movie),
            }
        });
    }

    pub async fn remove_favorite(&self, movie_id: i64) {
        if let Err(e) = self.store.remove(movie_id).await {
            error!("Failed to remove favorite {}: {}", movie_id, e);
            return;
        }

        self.state
            .send_modify(|state| state.favorites.retain(|m| m.id != movie_id));
    }

    pub fn is_favorite(&self, movie_id: i64) -> bool {
        self.state.borrow().favorites.iter().any(|m| m.id == movie_id)
    }

    pub fn favorites(&self) -> Vec<Movie> {
        self.state.borrow().favorites.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn snapshot(&self) -> FavoritesState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every mirror update.
    pub fn subscribe(&self) -> watch::Receiver<FavoritesState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct MockStore {
        records: Mutex<Vec<Movie>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl MockStore {
        fn with_records(records: Vec<Movie>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Default::default()
            }
        }

        fn failing_writes() -> Self {
            Self {
                fail_writes: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl FavoritesRepository for MockStore {
        async fn add(&self, movie: &Movie) -> Result<()> {
            if self.fail_writes {
                return Err(AppError::StorageWriteError("transaction aborted".to_string()));
            }
            let mut records = self.records.lock();
            records.retain(|m| m.id != movie.id);
            records.push(movie.clone());
            Ok(())
        }

        async fn remove(&self, movie_id: i64) -> Result<()> {
            if self.fail_writes {
                return Err(AppError::StorageWriteError("transaction aborted".to_string()));
            }
            self.records.lock().retain(|m| m.id != movie_id);
            Ok(())
        }

        async fn get_all(&self) -> Result<Vec<Movie>> {
            if self.fail_reads {
                return Err(AppError::StorageReadError("transaction aborted".to_string()));
            }
            Ok(self.records.lock().clone())
        }

        async fn is_favorite(&self, movie_id: i64) -> Result<bool> {
            Ok(self.records.lock().iter().any(|m| m.id == movie_id))
        }
    }

    fn movie(id: i64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/test{}.jpg", id)),
            vote_average: 8.5,
            release_date: "2023-01-01".to_string(),
            overview: "Test overview".to_string(),
            genre_ids: vec![1, 2],
        }
    }

    #[tokio::test]
    async fn test_starts_loading_then_loads_stored_favorites() {
        let store = Arc::new(MockStore::with_records(vec![movie(1, "One"), movie(2, "Two")]));
        let manager = FavoritesManager::new(store);

        assert!(manager.is_loading());
        assert!(manager.favorites().is_empty());

        manager.load().await;

        assert!(!manager.is_loading());
        assert_eq!(manager.favorites(), vec![movie(1, "One"), movie(2, "Two")]);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_list_empty() {
        let store = Arc::new(MockStore {
            records: Mutex::new(vec![movie(1, "One")]),
            fail_reads: true,
            fail_writes: false,
        });
        let manager = FavoritesManager::new(store);

        manager.load().await;

        assert!(!manager.is_loading());
        assert!(manager.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_activate_loads_once() {
        let store = Arc::new(MockStore::with_records(vec![movie(1, "One")]));
        let manager = Arc::new(FavoritesManager::new(store));
        let mut rx = manager.subscribe();

        let handle = manager.activate().expect("first activation spawns a load");
        assert!(manager.activate().is_none());
        handle.await.unwrap();

        let state = rx.wait_for(|s| !s.is_loading).await.unwrap().clone();
        assert_eq!(state.favorites, vec![movie(1, "One")]);
    }

    #[tokio::test]
    async fn test_add_and_remove_favorite() {
        let store = Arc::new(MockStore::default());
        let manager = FavoritesManager::new(store.clone());
        manager.load().await;

        manager.add_favorite(movie(42, "X")).await;
        assert!(manager.is_favorite(42));
        assert!(store.is_favorite(42).await.unwrap());

        manager.remove_favorite(42).await;
        assert!(!manager.is_favorite(42));
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_add_does_not_touch_mirror() {
        let store = Arc::new(MockStore::failing_writes());
        let manager = FavoritesManager::new(store);
        manager.load().await;

        manager.add_favorite(movie(7, "Seven")).await;

        assert!(!manager.is_favorite(7));
        assert!(manager.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_entry() {
        let store = Arc::new(MockStore {
            records: Mutex::new(vec![movie(3, "Three")]),
            fail_reads: false,
            fail_writes: true,
        });
        let manager = FavoritesManager::new(store);
        manager.load().await;

        manager.remove_favorite(3).await;

        assert!(manager.is_favorite(3));
    }

    #[tokio::test]
    async fn test_repeated_add_does_not_duplicate() {
        let store = Arc::new(MockStore::default());
        let manager = FavoritesManager::new(store);
        manager.load().await;

        manager.add_favorite(movie(1, "One")).await;
        manager.add_favorite(movie(2, "Two")).await;
        manager.add_favorite(movie(1, "One (again)")).await;

        let favorites = manager.favorites();
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].title, "One (again)");
        assert_eq!(favorites[1].id, 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let store = Arc::new(MockStore::default());
        let manager = FavoritesManager::new(store);
        let mut rx = manager.subscribe();
        manager.load().await;
        rx.borrow_and_update();

        manager.add_favorite(movie(5, "Five")).await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().favorites, vec![movie(5, "Five")]);
    }
}
