use serde::{Deserialize, Serialize};

use super::MovieRec;

/// Placeholder artwork used when the service sends no poster
pub const FALLBACK_POSTER: &str = "data:image/svg+xml;charset=utf-8,\
%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%22600%22%20height%3D%22900%22%3E\
%3Crect%20width%3D%22100%25%22%20height%3D%22100%25%22%20fill%3D%22%23111827%22%2F%3E\
%3Ctext%20x%3D%2250%25%22%20y%3D%2250%25%22%20fill%3D%22%239CA3AF%22%20font-size%3D%2228%22%20\
text-anchor%3D%22middle%22%20font-family%3D%22Arial%22%3ENo%20poster%3C%2Ftext%3E%3C%2Fsvg%3E";

/// A recommended movie as displayed in the card stack
///
/// Built once from a [`MovieRec`] and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Unique within a session
    pub movie_id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    /// Minutes
    pub runtime: Option<u32>,
    pub poster: String,
    pub backdrop: Option<String>,
    pub director: Option<String>,
    pub cast: Vec<String>,
    pub tags: Vec<String>,
    pub mood_tags: Vec<String>,

    /// Human-readable explanation from the ranker
    pub reason: Option<String>,
    pub score: Option<f64>,
}

/// Splits a service genre string into individual genres
///
/// `|` takes precedence over `,`; a string with neither is a single genre.
/// Blank segments are dropped.
pub fn split_genres(genres: Option<&str>) -> Vec<String> {
    let Some(raw) = genres.map(str::trim).filter(|g| !g.is_empty()) else {
        return Vec::new();
    };

    let separator = if raw.contains('|') {
        '|'
    } else if raw.contains(',') {
        ','
    } else {
        return vec![raw.to_string()];
    };

    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<MovieRec> for Candidate {
    fn from(rec: MovieRec) -> Self {
        let genres = split_genres(rec.genres.as_deref());
        let title = non_blank(rec.title).unwrap_or_else(|| format!("Movie {}", rec.movie_id));
        let poster = non_blank(rec.poster).unwrap_or_else(|| FALLBACK_POSTER.to_string());

        Candidate {
            movie_id: rec.movie_id,
            title,
            year: rec.year,
            genres,
            rating: rec.rating,
            description: rec.description,
            runtime: rec.duration,
            poster,
            backdrop: rec.backdrop,
            director: rec.director,
            cast: rec.cast.unwrap_or_default(),
            tags: rec.tags.unwrap_or_default(),
            mood_tags: rec.mood.unwrap_or_default(),
            reason: rec.reason,
            score: rec.score,
        }
    }
}

impl Candidate {
    /// Display line used by text front ends, e.g. `Heat (1995) · Action, Crime`
    pub fn headline(&self) -> String {
        let mut line = self.title.clone();
        if let Some(year) = self.year {
            line.push_str(&format!(" ({})", year));
        }
        if !self.genres.is_empty() {
            line.push_str(" · ");
            line.push_str(&self.genres.join(", "));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(movie_id: i64) -> MovieRec {
        MovieRec {
            movie_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_genres_pipe() {
        assert_eq!(split_genres(Some("Action|Comedy")), vec!["Action", "Comedy"]);
    }

    #[test]
    fn test_split_genres_single() {
        assert_eq!(split_genres(Some("Drama")), vec!["Drama"]);
    }

    #[test]
    fn test_split_genres_empty_and_missing() {
        assert!(split_genres(Some("")).is_empty());
        assert!(split_genres(Some("   ")).is_empty());
        assert!(split_genres(None).is_empty());
    }

    #[test]
    fn test_split_genres_comma_with_blanks() {
        assert_eq!(
            split_genres(Some(" Sci-Fi , ,Thriller ")),
            vec!["Sci-Fi", "Thriller"]
        );
    }

    #[test]
    fn test_split_genres_pipe_wins_over_comma() {
        assert_eq!(
            split_genres(Some("Children's, Family|Animation")),
            vec!["Children's, Family", "Animation"]
        );
    }

    #[test]
    fn test_candidate_from_full_rec() {
        let candidate = Candidate::from(MovieRec {
            movie_id: 1,
            title: Some("Toy Story".to_string()),
            genres: Some("Adventure|Animation".to_string()),
            score: Some(0.93),
            reason: Some("Popular with similar users".to_string()),
            year: Some(1995),
            duration: Some(81),
            poster: Some("https://img.example/toy-story.jpg".to_string()),
            cast: Some(vec!["Tom Hanks".to_string()]),
            mood: Some(vec!["warm".to_string()]),
            ..rec(1)
        });

        assert_eq!(candidate.title, "Toy Story");
        assert_eq!(candidate.genres, vec!["Adventure", "Animation"]);
        assert_eq!(candidate.runtime, Some(81));
        assert_eq!(candidate.poster, "https://img.example/toy-story.jpg");
        assert_eq!(candidate.cast, vec!["Tom Hanks"]);
        assert_eq!(candidate.mood_tags, vec!["warm"]);
        assert_eq!(candidate.score, Some(0.93));
    }

    #[test]
    fn test_candidate_fallbacks() {
        let candidate = Candidate::from(MovieRec {
            title: Some("  ".to_string()),
            poster: Some(String::new()),
            ..rec(77)
        });

        assert_eq!(candidate.title, "Movie 77");
        assert_eq!(candidate.poster, FALLBACK_POSTER);
        assert!(candidate.genres.is_empty());
        assert!(candidate.tags.is_empty());
        assert_eq!(candidate.director, None);
        assert_eq!(candidate.score, None);
    }

    #[test]
    fn test_headline() {
        let candidate = Candidate::from(MovieRec {
            title: Some("Heat".to_string()),
            year: Some(1995),
            genres: Some("Action|Crime".to_string()),
            ..rec(6)
        });
        assert_eq!(candidate.headline(), "Heat (1995) · Action, Crime");
    }
}
