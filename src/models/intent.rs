use serde::{Deserialize, Serialize};

use super::{Constraints, RecommendMode};
use crate::error::{AppError, AppResult};

/// Label sent as `moodInput` when the active intent is a filter set
pub const FILTERED_RESULTS_LABEL: &str = "Filtered results";

/// Where a genre sits in the filter selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenreSelection {
    None,
    Included,
    Excluded,
}

/// Structured exploration filters
///
/// A genre is never both included and excluded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterState {
    pub selected_genres: Vec<String>,
    pub excluded_genres: Vec<String>,
    /// Minimum average rating; `0` means no floor
    pub min_rating: f64,
    /// Minimum number of ratings; `0` means no floor
    pub min_popularity: f64,
    pub personalized: bool,
}

impl FilterState {
    /// Current selection state of `genre`
    pub fn genre_state(&self, genre: &str) -> GenreSelection {
        if self.selected_genres.iter().any(|g| g == genre) {
            GenreSelection::Included
        } else if self.excluded_genres.iter().any(|g| g == genre) {
            GenreSelection::Excluded
        } else {
            GenreSelection::None
        }
    }

    /// Advances `genre` one step: none → included → excluded → none
    pub fn cycle_genre(&mut self, genre: &str) -> GenreSelection {
        match self.genre_state(genre) {
            GenreSelection::Included => {
                self.selected_genres.retain(|g| g != genre);
                self.excluded_genres.push(genre.to_string());
                GenreSelection::Excluded
            }
            GenreSelection::Excluded => {
                self.excluded_genres.retain(|g| g != genre);
                GenreSelection::None
            }
            GenreSelection::None => {
                self.excluded_genres.retain(|g| g != genre);
                self.selected_genres.push(genre.to_string());
                GenreSelection::Included
            }
        }
    }

    /// Ranking mode requested for these filters
    pub fn mode(&self) -> RecommendMode {
        if self.personalized {
            RecommendMode::Cf
        } else {
            RecommendMode::Baseline
        }
    }

    /// Constraint set with every neutral field left out
    pub fn to_constraints(&self) -> Option<Constraints> {
        let non_empty = |genres: &Vec<String>| (!genres.is_empty()).then(|| genres.clone());

        Constraints {
            genres_in: non_empty(&self.selected_genres),
            genres_out: non_empty(&self.excluded_genres),
            min_avg_rating: (self.min_rating > 0.0).then_some(self.min_rating),
            min_n_ratings: (self.min_popularity > 0.0).then(|| self.min_popularity.floor() as u64),
            exclude_movie_ids: None,
        }
        .non_empty()
    }
}

/// What the user asked for on the latest submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueryIntent {
    Mood { text: String, is_voice: bool },
    Filters(FilterState),
}

impl QueryIntent {
    /// Mood intent from raw user text; blank text is rejected
    pub fn mood(text: &str, is_voice: bool) -> AppResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput(
                "Mood text cannot be empty".to_string(),
            ));
        }
        Ok(QueryIntent::Mood {
            text: text.to_string(),
            is_voice,
        })
    }

    pub fn label(&self) -> &str {
        match self {
            QueryIntent::Mood { text, .. } => text,
            QueryIntent::Filters(_) => FILTERED_RESULTS_LABEL,
        }
    }

    pub fn is_voice(&self) -> bool {
        matches!(self, QueryIntent::Mood { is_voice: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_genre_full_loop() {
        let mut filters = FilterState::default();

        assert_eq!(filters.cycle_genre("Horror"), GenreSelection::Included);
        assert_eq!(filters.selected_genres, vec!["Horror"]);

        assert_eq!(filters.cycle_genre("Horror"), GenreSelection::Excluded);
        assert!(filters.selected_genres.is_empty());
        assert_eq!(filters.excluded_genres, vec!["Horror"]);

        assert_eq!(filters.cycle_genre("Horror"), GenreSelection::None);
        assert!(filters.excluded_genres.is_empty());
        assert_eq!(filters.genre_state("Horror"), GenreSelection::None);
    }

    #[test]
    fn test_cycle_genre_keeps_lists_disjoint() {
        let mut filters = FilterState::default();
        for genre in ["Drama", "Comedy", "Drama", "Comedy", "Comedy", "Drama"] {
            filters.cycle_genre(genre);
            for g in &filters.selected_genres {
                assert!(!filters.excluded_genres.contains(g));
            }
        }
    }

    #[test]
    fn test_neutral_filters_have_no_constraints() {
        let filters = FilterState::default();
        assert_eq!(filters.to_constraints(), None);
        assert_eq!(filters.mode(), RecommendMode::Baseline);
    }

    #[test]
    fn test_restrictive_filters() {
        let filters = FilterState {
            selected_genres: vec!["Drama".to_string()],
            excluded_genres: vec!["Horror".to_string()],
            min_rating: 3.5,
            min_popularity: 49.9,
            personalized: true,
        };

        let constraints = filters.to_constraints().unwrap();
        assert_eq!(constraints.genres_in, Some(vec!["Drama".to_string()]));
        assert_eq!(constraints.genres_out, Some(vec!["Horror".to_string()]));
        assert_eq!(constraints.min_avg_rating, Some(3.5));
        assert_eq!(constraints.min_n_ratings, Some(49));
        assert_eq!(constraints.exclude_movie_ids, None);
        assert_eq!(filters.mode(), RecommendMode::Cf);
    }

    #[test]
    fn test_mood_intent_trims_and_rejects_blank() {
        let intent = QueryIntent::mood("  rainy sunday  ", true).unwrap();
        assert_eq!(intent.label(), "rainy sunday");
        assert!(intent.is_voice());

        assert!(matches!(
            QueryIntent::mood(" \n ", false),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_filters_label() {
        let intent = QueryIntent::Filters(FilterState::default());
        assert_eq!(intent.label(), FILTERED_RESULTS_LABEL);
        assert!(!intent.is_voice());
    }
}
