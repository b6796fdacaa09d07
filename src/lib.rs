pub mod browse;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod favorites;
pub mod fetch;
pub mod models;
pub mod store;

pub use cache::{ResponseCache, CACHE_DURATION};
pub use catalog::CatalogClient;
pub use config::Config;
pub use error::{AppError, Result};
pub use favorites::{FavoritesManager, FavoritesState};
pub use fetch::CachedFetcher;
pub use store::{FavoritesRepository, SqliteFavoritesStore};
