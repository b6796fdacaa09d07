use tracing::{debug, warn};

use crate::catalog::{CatalogClient, DEFAULT_PAGE};
use crate::error::Result;
use crate::models::{Movie, MoviePage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Popular,
    Search(String),
    Genre(i64),
}

/// Paged movie listing driven by search and genre selection. Pages are
/// appended as [`load_next_page`](Self::load_next_page) is called, the way an
/// infinite-scroll list asks for more.
pub struct MovieBrowser {
    catalog: CatalogClient,
    listing: Listing,
    movies: Vec<Movie>,
    next_page: u32,
    has_more: bool,
}

impl MovieBrowser {
    pub fn new(catalog: CatalogClient) -> Self {
        Self {
            catalog,
            listing: Listing::Popular,
            movies: Vec::new(),
            next_page: DEFAULT_PAGE,
            has_more: true,
        }
    }

    /// Switches to search results for `query` and drops any genre filter.
    /// A blank query goes back to popular movies.
    pub fn on_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.reset(Listing::Popular);
        } else {
            self.reset(Listing::Search(query.to_string()));
        }
    }

    /// Switches to discovery by genre (or popular for `None`) and drops any search.
    pub fn on_select_genre(&mut self, genre_id: Option<i64>) {
        match genre_id {
            Some(id) => self.reset(Listing::Genre(id)),
            None => self.reset(Listing::Popular),
        }
    }

    /// Fetches the next page of the active listing and appends it. Returns
    /// the number of movies added. A failed fetch leaves the listing as it
    /// was so the same page can be requested again.
    pub async fn load_next_page(&mut self) -> Result<usize> {
        if !self.has_more {
            return Ok(0);
        }

        let page = self.next_page;
        let result = match &self.listing {
            Listing::Popular => self.catalog.get_popular_movies(page).await,
            Listing::Search(query) => self.catalog.search_movies(query, page).await,
            Listing::Genre(id) => self.catalog.get_movies_by_genre(*id, page).await,
        };

        let page_data: MoviePage = match result {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to fetch page {} of {:?}: {}", page, self.listing, e);
                return Err(e);
            }
        };

        if page_data.results.is_empty() {
            debug!("No more results for {:?}", self.listing);
            self.has_more = false;
            return Ok(0);
        }

        let added = page_data.results.len();
        if page_data.is_last_page() {
            self.has_more = false;
        }
        self.movies.extend(page_data.results);
        self.next_page = page + 1;

        Ok(added)
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn heading(&self) -> String {
        match &self.listing {
            Listing::Popular => "Popular Movies".to_string(),
            Listing::Search(query) => format!("Search Results for \"{}\"", query),
            Listing::Genre(_) => "Movies by Genre".to_string(),
        }
    }

    fn reset(&mut self, listing: Listing) {
        self.listing = listing;
        self.movies.clear();
        self.next_page = DEFAULT_PAGE;
        self.has_more = true;
    }
}
