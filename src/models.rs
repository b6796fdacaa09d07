use serde::{Deserialize, Deserializer, Serialize};

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const YOUTUBE_EMBED_URL: &str = "https://www.youtube.com/embed";

/// Catalog fields that may arrive as `null` are read as their default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub runtime: u32,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tagline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub revenue: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub videos: VideoList,
    #[serde(default, deserialize_with = "null_as_default")]
    pub credits: Credits,
}

/// One page of a list endpoint (popular, search, discover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub results: Vec<Movie>,
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenreList {
    pub genres: Vec<Genre>,
}

fn image_url(size: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}{}", IMAGE_BASE_URL, size, p))
}

// Utility functions
impl Movie {
    pub fn poster_url(&self) -> Option<String> {
        image_url("w500", self.poster_path.as_deref())
    }

    pub fn format_rating(&self) -> String {
        format!("{:.1}", self.vote_average)
    }

    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .get(..4)
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

impl MovieDetails {
    pub fn backdrop_url(&self) -> Option<String> {
        image_url("original", self.backdrop_path.as_deref())
    }

    /// YouTube trailers and teasers, in catalog order.
    pub fn trailers(&self) -> Vec<&Video> {
        self.videos
            .results
            .iter()
            .filter(|v| v.site == "YouTube" && (v.kind == "Trailer" || v.kind == "Teaser"))
            .collect()
    }

    pub fn format_runtime(&self) -> Option<String> {
        if self.runtime == 0 {
            return None;
        }
        Some(format!("{}h {}m", self.runtime / 60, self.runtime % 60))
    }

    pub fn top_cast(&self, count: usize) -> &[CastMember] {
        let end = count.min(self.credits.cast.len());
        &self.credits.cast[..end]
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

impl From<MovieDetails> for Movie {
    fn from(details: MovieDetails) -> Self {
        let mut movie = details.movie;
        if movie.genre_ids.is_empty() {
            movie.genre_ids = details.genres.iter().map(|g| g.id).collect();
        }
        movie
    }
}

impl Video {
    pub fn embed_url(&self) -> String {
        format!("{}/{}", YOUTUBE_EMBED_URL, self.key)
    }
}

impl CastMember {
    pub fn profile_url(&self) -> Option<String> {
        image_url("w185", self.profile_path.as_deref())
    }
}

impl MoviePage {
    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}
