use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod candidate;
pub mod intent;
pub mod session;

pub use candidate::{split_genres, Candidate, FALLBACK_POSTER};
pub use intent::{FilterState, GenreSelection, QueryIntent};
pub use session::{Screen, SessionState};

/// Ranking strategy requested from the recommendation service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendMode {
    /// Non-personalized, popularity-based ranking
    Baseline,
    /// Collaborative filtering
    Cf,
    /// Service picks the strategy
    Auto,
}

impl Display for RecommendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendMode::Baseline => write!(f, "baseline"),
            RecommendMode::Cf => write!(f, "cf"),
            RecommendMode::Auto => write!(f, "auto"),
        }
    }
}

// ============================================================================
// Recommend call
// ============================================================================

/// Restrictions applied by the service on top of its ranking
///
/// Every key is optional; an unset key means "no constraint" and is left out
/// of the JSON body entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres_in: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres_out: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_avg_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_n_ratings: Option<u64>,
    #[serde(
        rename = "exclude_movieIds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exclude_movie_ids: Option<Vec<i64>>,
}

impl Constraints {
    /// True when no restrictive key is set
    pub fn is_empty(&self) -> bool {
        self.genres_in.is_none()
            && self.genres_out.is_none()
            && self.min_avg_rating.is_none()
            && self.min_n_ratings.is_none()
            && self.exclude_movie_ids.is_none()
    }

    /// `None` for an empty constraint set, so the request carries no object
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Body of `POST /recommend`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendRequest {
    /// Always serialized, as `null` when anonymous
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub k: u32,
    pub mode: RecommendMode,
    pub candidate_pool: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

/// A single ranked item as returned by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MovieRec {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    /// Pipe- or comma-delimited genre list
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Runtime in minutes
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub backdrop: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub mood: Option<Vec<String>>,
}

/// Response of `POST /recommend`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecommendResponse {
    /// Parsed intent echoed back by the service; not interpreted client-side
    #[serde(default)]
    pub intent: serde_json::Value,
    #[serde(default)]
    pub recommendations: Vec<MovieRec>,
}

/// Response of `GET /genres`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenresResponse {
    #[serde(default)]
    pub genres: Vec<String>,
}

// ============================================================================
// Feedback call
// ============================================================================

/// User reaction forwarded to the service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Like,
    Dislike,
    Save,
    Skip,
    Helpful,
    NotHelpful,
}

impl Display for FeedbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FeedbackAction::Like => "like",
            FeedbackAction::Dislike => "dislike",
            FeedbackAction::Save => "save",
            FeedbackAction::Skip => "skip",
            FeedbackAction::Helpful => "helpful",
            FeedbackAction::NotHelpful => "not_helpful",
        };
        write!(f, "{}", s)
    }
}

/// Where in the interface a feedback event originated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    Swipe,
    Detail,
}

/// Free-form context attached to a feedback event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackContext {
    pub screen: Screen,
    #[serde(default)]
    pub mood_input: Option<String>,
    #[serde(default)]
    pub is_voice: bool,
    pub source: FeedbackSource,
    /// Index of this swipe within the session's swipe sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// Body of `POST /feedback`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRequest {
    pub user_id: Option<i64>,
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub action: FeedbackAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<FeedbackContext>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recommend_request_omits_unset_fields() {
        let request = RecommendRequest {
            user_id: None,
            query: None,
            k: 48,
            mode: RecommendMode::Baseline,
            candidate_pool: 5000,
            constraints: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "user_id": null,
                "k": 48,
                "mode": "baseline",
                "candidate_pool": 5000
            })
        );
    }

    #[test]
    fn test_constraints_wire_names() {
        let constraints = Constraints {
            genres_in: Some(vec!["Drama".to_string()]),
            min_n_ratings: Some(50),
            exclude_movie_ids: Some(vec![1, 2]),
            ..Default::default()
        };

        let value = serde_json::to_value(&constraints).unwrap();
        assert_eq!(
            value,
            json!({
                "genres_in": ["Drama"],
                "min_n_ratings": 50,
                "exclude_movieIds": [1, 2]
            })
        );
    }

    #[test]
    fn test_empty_constraints_collapse_to_none() {
        assert!(Constraints::default().is_empty());
        assert_eq!(Constraints::default().non_empty(), None);
    }

    #[test]
    fn test_movie_rec_minimal_deserialization() {
        let json = r#"{ "movieId": 318, "title": "The Shawshank Redemption", "genres": "Crime|Drama", "score": 4.41 }"#;

        let rec: MovieRec = serde_json::from_str(json).unwrap();
        assert_eq!(rec.movie_id, 318);
        assert_eq!(rec.genres.as_deref(), Some("Crime|Drama"));
        assert_eq!(rec.score, Some(4.41));
        assert_eq!(rec.poster, None);
        assert_eq!(rec.cast, None);
    }

    #[test]
    fn test_recommend_response_tolerates_missing_recommendations() {
        let response: RecommendResponse = serde_json::from_str(r#"{ "intent": {} }"#).unwrap();
        assert!(response.recommendations.is_empty());
    }

    #[test]
    fn test_feedback_action_serialization() {
        assert_eq!(
            serde_json::to_string(&FeedbackAction::NotHelpful).unwrap(),
            "\"not_helpful\""
        );
        assert_eq!(FeedbackAction::NotHelpful.to_string(), "not_helpful");
    }

    #[test]
    fn test_feedback_request_shape() {
        let request = FeedbackRequest {
            user_id: None,
            movie_id: 603,
            action: FeedbackAction::Like,
            context: Some(FeedbackContext {
                screen: Screen::Results,
                mood_input: Some("something tense".to_string()),
                is_voice: true,
                source: FeedbackSource::Swipe,
                position: Some(4),
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "user_id": null,
                "movieId": 603,
                "action": "like",
                "context": {
                    "screen": "results",
                    "moodInput": "something tense",
                    "isVoice": true,
                    "source": "swipe",
                    "position": 4
                }
            })
        );
    }
}
