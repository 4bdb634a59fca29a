/// HTTP client for the recommendation service
///
/// Endpoints:
/// 1. `POST /recommend` → ranked candidates for a query and constraints
/// 2. `GET /genres` → genre catalog
/// 3. `POST /feedback` → records a user reaction
/// 4. `GET /health` → liveness
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{FeedbackRequest, GenresResponse, RecommendRequest, RecommendResponse},
    services::providers::RecommendationProvider,
};
use reqwest::{Client as HttpClient, Response};
use std::time::Duration;
use tracing::instrument;

#[derive(Clone)]
pub struct HttpRecommendationProvider {
    http_client: HttpClient,
    api_url: String,
}

impl HttpRecommendationProvider {
    /// Creates a provider for `api_url` with a per-request timeout
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        let api_url = api_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            api_url,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.recommender_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Turns a non-2xx response into `"<call> failed: <status>"`
    async fn check_status(call: &str, response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            call = call,
            status = %status,
            body = %body,
            "Recommendation service request failed"
        );
        Err(AppError::ExternalApi(format!("{} failed: {}", call, status)))
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for HttpRecommendationProvider {
    #[instrument(
        skip(self, request),
        fields(mode = %request.mode, k = request.k, pool = request.candidate_pool)
    )]
    async fn recommend(&self, request: &RecommendRequest) -> AppResult<RecommendResponse> {
        let response = self
            .http_client
            .post(self.url("/recommend"))
            .json(request)
            .send()
            .await?;
        let response = Self::check_status("recommend", response).await?;

        let response_text = response.text().await?;
        let parsed: RecommendResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize recommend response"
            );
            AppError::ExternalApi(format!("recommend failed: malformed response ({})", e))
        })?;

        tracing::info!(
            results = parsed.recommendations.len(),
            provider = self.name(),
            "Recommendations fetched"
        );

        Ok(parsed)
    }

    #[instrument(skip(self))]
    async fn list_genres(&self) -> AppResult<Vec<String>> {
        let response = self.http_client.get(self.url("/genres")).send().await?;
        let response = Self::check_status("genres", response).await?;

        let parsed: GenresResponse = response.json().await?;
        tracing::debug!(genres = parsed.genres.len(), "Genre catalog fetched");

        Ok(parsed.genres)
    }

    #[instrument(skip(self, request), fields(movie_id = request.movie_id, action = %request.action))]
    async fn send_feedback(&self, request: &FeedbackRequest) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.url("/feedback"))
            .json(request)
            .send()
            .await?;
        Self::check_status("feedback", response).await?;

        tracing::debug!("Feedback delivered");
        Ok(())
    }

    async fn health(&self) -> AppResult<()> {
        let response = self.http_client.get(self.url("/health")).send().await?;
        Self::check_status("health", response).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
