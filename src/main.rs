use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, warn};

use lupe_discover::browse::MovieBrowser;
use lupe_discover::catalog::{CatalogClient, DEFAULT_PAGE};
use lupe_discover::config::Config;
use lupe_discover::display;
use lupe_discover::favorites::FavoritesManager;
use lupe_discover::models::Movie;
use lupe_discover::store::SqliteFavoritesStore;

#[derive(Parser)]
#[command(name = "lupe-discover")]
#[command(about = "Browse popular movies, search the catalog and keep a list of favorites")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List popular movies
    Popular {
        #[arg(short, long, default_value_t = DEFAULT_PAGE)]
        page: u32,
    },
    /// Search movies by title
    Search {
        query: String,
        #[arg(short, long, default_value_t = DEFAULT_PAGE)]
        page: u32,
    },
    /// List movies of a genre
    Genre {
        genre_id: i64,
        #[arg(short, long, default_value_t = DEFAULT_PAGE)]
        page: u32,
    },
    /// List all genres
    Genres,
    /// Show cast, trailers and metadata for a movie
    Details { movie_id: i64 },
    /// Load several pages of a listing
    Browse {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(short, long)]
        genre: Option<i64>,
        #[arg(long, default_value_t = 3)]
        pages: u32,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Show stored favorites
    List,
    /// Add a movie to favorites
    Add { movie_id: i64 },
    /// Remove a movie from favorites
    Remove { movie_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let args = Args::parse();

    info!("🎬 Starting Lupe Discover");
    info!("📡 Catalog endpoint: {}", config.api_base_url);
    if config.api_key.is_empty() {
        warn!("TMDB_API_KEY is not set, catalog requests will likely be rejected");
    }

    let catalog = CatalogClient::from_config(&config)?;

    let store = Arc::new(SqliteFavoritesStore::new(&config.database_path));
    let favorites = Arc::new(FavoritesManager::new(store));
    if let Some(load) = favorites.activate() {
        load.await?;
    }

    match args.command {
        Command::Popular { page } => {
            let data = catalog.get_popular_movies(page).await?;
            print_page("Popular Movies", &data.results, &favorites);
        }
        Command::Search { query, page } => {
            let data = catalog.search_movies(&query, page).await?;
            print_page(&format!("Search Results for \"{}\"", query), &data.results, &favorites);
        }
        Command::Genre { genre_id, page } => {
            let data = catalog.get_movies_by_genre(genre_id, page).await?;
            print_page("Movies by Genre", &data.results, &favorites);
        }
        Command::Genres => {
            let genres = catalog.get_genres().await?;
            print!("{}", display::format_genres(&genres));
        }
        Command::Details { movie_id } => match catalog.get_movie_details(movie_id).await {
            Ok(details) => {
                print!(
                    "{}",
                    display::format_details(&details, favorites.is_favorite(movie_id))
                );
            }
            Err(e) => {
                error!("Failed to fetch movie details: {}", e);
                eprintln!("Failed to load movie details. Please try again later.");
            }
        },
        Command::Browse {
            query,
            genre,
            pages,
        } => {
            let mut browser = MovieBrowser::new(catalog);
            if let Some(query) = query {
                browser.on_search(&query);
            } else {
                browser.on_select_genre(genre);
            }

            for _ in 0..pages {
                if !browser.has_more() {
                    break;
                }
                browser.load_next_page().await?;
            }
            print_page(&browser.heading(), browser.movies(), &favorites);
        }
        Command::Favorites { action } => match action {
            FavoritesAction::List => {
                print_page("Your Favorites", &favorites.favorites(), &favorites);
            }
            FavoritesAction::Add { movie_id } => {
                let details = catalog.get_movie_details(movie_id).await?;
                let movie: Movie = details.into();
                let title = movie.title.clone();
                favorites.add_favorite(movie).await;
                report(favorites.is_favorite(movie_id), &format!("Added \"{}\" to favorites", title));
            }
            FavoritesAction::Remove { movie_id } => {
                favorites.remove_favorite(movie_id).await;
                report(
                    !favorites.is_favorite(movie_id),
                    &format!("Removed {} from favorites", movie_id),
                );
            }
        },
    }

    Ok(())
}

fn print_page(heading: &str, movies: &[Movie], favorites: &FavoritesManager) {
    print!(
        "{}",
        display::format_movie_list(heading, movies, |id| favorites.is_favorite(id))
    );
}

fn report(succeeded: bool, message: &str) {
    if succeeded {
        println!("✅ {}", message);
    } else {
        eprintln!("❌ Could not update favorites, see log for details");
    }
}
