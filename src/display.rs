use crate::models::{Genre, Movie, MovieDetails};

const TOP_CAST: usize = 10;

pub fn format_movie_line(movie: &Movie, favorite: bool) -> String {
    let marker = if favorite { "★" } else { " " };
    let year = movie.release_year().unwrap_or("----");
    format!(
        "{} [{:>7}] {} ({}) ⭐ {}",
        marker,
        movie.id,
        movie.title,
        year,
        movie.format_rating()
    )
}

pub fn format_movie_list<F>(heading: &str, movies: &[Movie], is_favorite: F) -> String
where
    F: Fn(i64) -> bool,
{
    let mut out = format!("🎬 {}\n", heading);

    if movies.is_empty() {
        out.push_str("No movies found.\n");
        return out;
    }

    for movie in movies {
        out.push_str(&format_movie_line(movie, is_favorite(movie.id)));
        out.push('\n');
    }
    out
}

pub fn format_genres(genres: &[Genre]) -> String {
    let mut out = String::from("🎭 Genres\n");
    for genre in genres {
        out.push_str(&format!("{:>6}  {}\n", genre.id, genre.name));
    }
    out
}

pub fn format_details(details: &MovieDetails, favorite: bool) -> String {
    let movie = &details.movie;
    let mut out = format!("🎬 {}", movie.title);
    if let Some(year) = movie.release_year() {
        out.push_str(&format!(" ({})", year));
    }
    if favorite {
        out.push_str("  ★ favorite");
    }
    out.push('\n');

    if !details.tagline.is_empty() {
        out.push_str(&format!("\"{}\"\n", details.tagline));
    }

    let mut facts = vec![format!("⭐ {}", movie.format_rating())];
    if let Some(runtime) = details.format_runtime() {
        facts.push(format!("🕐 {}", runtime));
    }
    if !movie.release_date.is_empty() {
        facts.push(format!("📅 {}", movie.release_date));
    }
    out.push_str(&facts.join(" | "));
    out.push('\n');

    if !details.genres.is_empty() {
        out.push_str(&format!("🎭 {}\n", details.genre_names().join(", ")));
    }

    if !movie.overview.is_empty() {
        out.push('\n');
        out.push_str(&movie.overview);
        out.push('\n');
    }

    let cast = details.top_cast(TOP_CAST);
    if !cast.is_empty() {
        out.push_str("\n👥 Cast\n");
        for member in cast {
            if member.character.is_empty() {
                out.push_str(&format!("  {}\n", member.name));
            } else {
                out.push_str(&format!("  {} as {}\n", member.name, member.character));
            }
        }
    }

    let trailers = details.trailers();
    if trailers.is_empty() {
        out.push_str("\nNo trailers available\n");
    } else {
        out.push_str("\n▶ Trailers\n");
        for trailer in trailers {
            out.push_str(&format!("  {} - {}\n", trailer.name, trailer.embed_url()));
        }
    }

    out
}
