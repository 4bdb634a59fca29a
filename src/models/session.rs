use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Candidate, QueryIntent};

/// Screen currently presented to the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    #[default]
    Home,
    MoodInput,
    ExploreFilters,
    Results,
}

/// Read-only view of a browsing session
///
/// `liked` is always a subset of `swiped`, and `candidates` never holds two
/// entries with the same `movie_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub screen: Screen,
    pub intent: Option<QueryIntent>,
    pub candidates: Vec<Candidate>,
    pub swiped: BTreeSet<i64>,
    pub liked: BTreeSet<i64>,
    /// Client-side saved toggles; never reconciled with the service
    pub saved: BTreeSet<i64>,
    /// Movie open in the detail modal
    pub selected: Option<i64>,
    pub loading: bool,
    pub error: Option<String>,
    pub available_genres: Vec<String>,
    /// When the latest batch of candidates landed
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn candidate(&self, movie_id: i64) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.movie_id == movie_id)
    }

    /// Displayed candidates the user has not acted on yet, in display order
    pub fn unseen(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates
            .iter()
            .filter(|c| !self.swiped.contains(&c.movie_id))
    }

    pub fn remaining(&self) -> usize {
        self.unseen().count()
    }

    /// Genres of liked displayed candidates, deduplicated in first-seen order
    pub fn liked_genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = Vec::new();
        for candidate in self
            .candidates
            .iter()
            .filter(|c| self.liked.contains(&c.movie_id))
        {
            for genre in &candidate.genres {
                if !genres.contains(genre) {
                    genres.push(genre.clone());
                }
            }
        }
        genres
    }

    /// Appends candidates whose id is not displayed yet; returns how many were added
    pub fn append_unique(&mut self, incoming: Vec<Candidate>) -> usize {
        let before = self.candidates.len();
        for candidate in incoming {
            if self.candidate(candidate.movie_id).is_none() {
                self.candidates.push(candidate);
            }
        }
        self.candidates.len() - before
    }

    /// Replaces the displayed list, dropping repeated ids within the new batch
    pub fn replace_candidates(&mut self, incoming: Vec<Candidate>) -> usize {
        self.candidates.clear();
        self.append_unique(incoming)
    }

    pub fn clear_feedback(&mut self) {
        self.swiped.clear();
        self.liked.clear();
        self.saved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRec;

    fn candidate(movie_id: i64, genres: &str) -> Candidate {
        Candidate::from(MovieRec {
            movie_id,
            genres: Some(genres.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_screen_serialization() {
        assert_eq!(
            serde_json::to_string(&Screen::ExploreFilters).unwrap(),
            "\"explore-filters\""
        );
        assert_eq!(serde_json::to_string(&Screen::Results).unwrap(), "\"results\"");
    }

    #[test]
    fn test_append_unique_drops_known_ids() {
        let mut state = SessionState::default();
        state.append_unique(vec![candidate(1, "Drama"), candidate(2, "Comedy")]);

        let added = state.append_unique(vec![
            candidate(2, "Comedy"),
            candidate(3, "Horror"),
            candidate(3, "Horror"),
        ]);

        assert_eq!(added, 1);
        let ids: Vec<i64> = state.candidates.iter().map(|c| c.movie_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_replace_candidates() {
        let mut state = SessionState::default();
        state.append_unique(vec![candidate(1, "Drama")]);
        let added = state.replace_candidates(vec![candidate(9, "War"), candidate(9, "War")]);
        assert_eq!(added, 1);
        assert_eq!(state.candidates[0].movie_id, 9);
    }

    #[test]
    fn test_liked_genres_union_in_order() {
        let mut state = SessionState::default();
        state.append_unique(vec![
            candidate(1, "Thriller"),
            candidate(2, "Comedy"),
            candidate(3, "Thriller|Drama"),
        ]);
        state.swiped.extend([1, 2, 3]);
        state.liked.extend([1, 3]);

        assert_eq!(state.liked_genres(), vec!["Thriller", "Drama"]);
    }

    #[test]
    fn test_remaining_counts_unswiped_displayed() {
        let mut state = SessionState::default();
        state.append_unique(vec![candidate(1, "A"), candidate(2, "B"), candidate(3, "C")]);
        // 99 comes from an earlier list and is not displayed
        state.swiped.extend([2, 99]);

        assert_eq!(state.remaining(), 2);
        let unseen: Vec<i64> = state.unseen().map(|c| c.movie_id).collect();
        assert_eq!(unseen, vec![1, 3]);
    }
}
