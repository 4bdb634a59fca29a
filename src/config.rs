use serde::Deserialize;

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation service
    #[serde(default = "default_recommender_url")]
    pub recommender_url: String,

    /// Per-request timeout for the HTTP client, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User identifier forwarded on recommend and feedback calls
    #[serde(default)]
    pub user_id: Option<i64>,

    /// Clear swiped/liked/saved sets on every fresh mood or filter submission
    #[serde(default)]
    pub reset_swipes_on_query: bool,
}

fn default_recommender_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recommender_url: default_recommender_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_id: None,
            reset_swipes_on_query: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Build from an explicit iterator of variables, as `from_env` would read them
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
