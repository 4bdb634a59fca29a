pub mod providers;
pub mod session;

pub use providers::{HttpRecommendationProvider, RecommendationProvider};
pub use session::{DetailFeedback, FetchOutcome, SessionController, SessionOptions, SwipeAction};
