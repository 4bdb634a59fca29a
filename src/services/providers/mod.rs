/// Recommendation service abstraction
///
/// The session controller only talks to the ranking backend through this trait,
/// so the HTTP implementation can be swapped for a stub in tests or for another
/// transport later.
use crate::{
    error::AppResult,
    models::{FeedbackRequest, RecommendRequest, RecommendResponse},
};

pub mod http;

pub use http::HttpRecommendationProvider;

/// Trait for recommendation backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Rank candidates for a query and its constraints
    async fn recommend(&self, request: &RecommendRequest) -> AppResult<RecommendResponse>;

    /// Full catalog of genre names, for the filter screen
    async fn list_genres(&self) -> AppResult<Vec<String>>;

    /// Record a feedback event
    ///
    /// The response body is not interpreted; only the status matters.
    async fn send_feedback(&self, request: &FeedbackRequest) -> AppResult<()>;

    /// Liveness probe
    async fn health(&self) -> AppResult<()>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
