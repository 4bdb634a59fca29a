use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::Utc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        Candidate, Constraints, FeedbackAction, FeedbackContext, FeedbackRequest, FeedbackSource,
        FilterState, QueryIntent, RecommendMode, RecommendRequest, Screen, SessionState,
    },
    services::providers::RecommendationProvider,
};

/// Results requested per mood query and per refinement
pub const MOOD_RESULT_COUNT: u32 = 12;
pub const MOOD_CANDIDATE_POOL: u32 = 2000;
/// Results requested per filter exploration
pub const FILTER_RESULT_COUNT: u32 = 48;
pub const FILTER_CANDIDATE_POOL: u32 = 5000;
/// A swipe leaving this many unseen cards or fewer triggers a refinement
pub const REFINE_THRESHOLD: usize = 3;

/// Per-session knobs
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub user_id: Option<i64>,
    /// Clear swiped/liked/saved sets on every mood or filter submission
    pub reset_swipes_on_query: bool,
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            user_id: config.user_id,
            reset_swipes_on_query: config.reset_swipes_on_query,
        }
    }
}

/// Swipe gesture on a result card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAction {
    Like,
    Dislike,
    Skip,
}

impl From<SwipeAction> for FeedbackAction {
    fn from(action: SwipeAction) -> Self {
        match action {
            SwipeAction::Like => FeedbackAction::Like,
            SwipeAction::Dislike => FeedbackAction::Dislike,
            SwipeAction::Skip => FeedbackAction::Skip,
        }
    }
}

/// Helpful / not-helpful vote from the detail modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFeedback {
    Helpful,
    NotHelpful,
}

impl From<DetailFeedback> for FeedbackAction {
    fn from(feedback: DetailFeedback) -> Self {
        match feedback {
            DetailFeedback::Helpful => FeedbackAction::Helpful,
            DetailFeedback::NotHelpful => FeedbackAction::NotHelpful,
        }
    }
}

impl FromStr for DetailFeedback {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "helpful" => Ok(DetailFeedback::Helpful),
            "not-helpful" | "not_helpful" => Ok(DetailFeedback::NotHelpful),
            other => Err(AppError::InvalidInput(format!(
                "Unknown detail feedback: {}",
                other
            ))),
        }
    }
}

/// What happened to a recommend call issued by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Response applied; `count` candidates were added to the displayed list
    Applied { count: usize },
    /// Call failed; the message is now in the session state
    Failed { message: String },
    /// A newer submission was issued while this call was in flight
    Superseded,
    /// Refinement refused because a fetch was already in flight
    Skipped,
}

/// Releases the loading flag when a request span ends
///
/// Only the request owning the latest generation may clear the flag, so a
/// stale response cannot hide the spinner of a newer one.
struct LoadingGuard<'a> {
    controller: &'a SessionController,
    generation: u64,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(controller: &'a SessionController, generation: u64) -> Self {
        Self {
            controller,
            generation,
            armed: true,
        }
    }

    /// Applies `update` and clears the loading flag in one notification
    fn finish(mut self, update: impl FnOnce(&mut SessionState)) {
        self.armed = false;
        self.controller.state.send_modify(|state| {
            update(state);
            state.loading = false;
        });
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.controller.is_current(self.generation) {
            self.controller
                .state
                .send_modify(|state| state.loading = false);
        }
    }
}

/// Recommendation session controller
///
/// Owns the session state and mediates between user intent and the
/// recommendation service. Cheap to clone; clones share the same session.
/// The state lock is never held across a network call, so several
/// operations may be in flight at once.
#[derive(Clone)]
pub struct SessionController {
    provider: Arc<dyn RecommendationProvider>,
    state: Arc<watch::Sender<SessionState>>,
    generation: Arc<AtomicU64>,
    options: SessionOptions,
    session_id: Uuid,
}

impl SessionController {
    pub fn new(provider: Arc<dyn RecommendationProvider>, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let session_id = Uuid::new_v4();

        tracing::info!(
            session_id = %session_id,
            provider = provider.name(),
            "Recommendation session started"
        );

        Self {
            provider,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            options,
            session_id,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn open_mood_input(&self) {
        self.state.send_modify(|s| s.screen = Screen::MoodInput);
    }

    pub fn open_explore_filters(&self) {
        self.state.send_modify(|s| s.screen = Screen::ExploreFilters);
    }

    /// Returns home, closing the detail modal and dismissing any error
    pub fn back(&self) {
        self.state.send_modify(|s| {
            s.screen = Screen::Home;
            s.selected = None;
            s.error = None;
        });
    }

    /// Opens the detail modal for a displayed candidate
    pub fn select_candidate(&self, movie_id: i64) -> AppResult<()> {
        let mut found = false;
        self.state.send_if_modified(|s| {
            found = s.candidate(movie_id).is_some();
            if found {
                s.selected = Some(movie_id);
            }
            found
        });

        if found {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!(
                "Movie {} is not in the current results",
                movie_id
            )))
        }
    }

    pub fn close_detail(&self) {
        self.state.send_modify(|s| s.selected = None);
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Submits a free-text mood query
    ///
    /// Blank text is rejected before any state change. Network failures are
    /// not returned as errors: they land in the state and the outcome.
    pub async fn submit_mood_query(&self, text: &str, is_voice: bool) -> AppResult<FetchOutcome> {
        let intent = QueryIntent::mood(text, is_voice)?;
        let request = RecommendRequest {
            user_id: self.options.user_id,
            query: Some(intent.label().to_string()),
            k: MOOD_RESULT_COUNT,
            mode: RecommendMode::Auto,
            candidate_pool: MOOD_CANDIDATE_POOL,
            constraints: None,
        };

        Ok(self.run_query(intent, request).await)
    }

    /// Submits a structured filter exploration
    pub async fn submit_filters(&self, filters: FilterState) -> FetchOutcome {
        let request = RecommendRequest {
            user_id: self.options.user_id,
            query: None,
            k: FILTER_RESULT_COUNT,
            mode: filters.mode(),
            candidate_pool: FILTER_CANDIDATE_POOL,
            constraints: filters.to_constraints(),
        };

        self.run_query(QueryIntent::Filters(filters), request).await
    }

    async fn run_query(&self, intent: QueryIntent, request: RecommendRequest) -> FetchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let reset = self.options.reset_swipes_on_query;

        self.state.send_modify(|s| {
            s.error = None;
            s.loading = true;
            s.selected = None;
            s.intent = Some(intent);
            if reset {
                s.clear_feedback();
            }
        });

        let guard = LoadingGuard::new(self, generation);
        let result = self.provider.recommend(&request).await;

        if !self.is_current(generation) {
            tracing::debug!(
                session_id = %self.session_id,
                generation,
                "Discarding response of superseded query"
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let candidates: Vec<Candidate> = response
                    .recommendations
                    .into_iter()
                    .map(Candidate::from)
                    .collect();

                let mut count = 0;
                guard.finish(|s| {
                    count = s.replace_candidates(candidates);
                    s.screen = Screen::Results;
                    s.fetched_at = Some(Utc::now());
                });

                tracing::info!(
                    session_id = %self.session_id,
                    mode = %request.mode,
                    candidates = count,
                    "Query results applied"
                );

                FetchOutcome::Applied { count }
            }
            Err(e) => {
                let message = e.user_message();
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %e,
                    "Query failed"
                );

                guard.finish(|s| {
                    s.error = Some(message.clone());
                    s.candidates.clear();
                    s.screen = Screen::Results;
                });

                FetchOutcome::Failed { message }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Refinement
    // ------------------------------------------------------------------------

    /// Fetches more candidates without resetting the session
    ///
    /// Refuses to start while any fetch is in flight. Swiped ids are excluded
    /// and the genres of liked candidates become an inclusion constraint.
    pub async fn refine(&self) -> FetchOutcome {
        let generation = self.generation.load(Ordering::SeqCst);
        let user_id = self.options.user_id;

        let mut request = None;
        self.state.send_if_modified(|s| {
            if s.loading {
                return false;
            }
            s.loading = true;
            s.error = None;
            request = Some(Self::refine_request(s, user_id));
            true
        });

        let Some(request) = request else {
            tracing::debug!(
                session_id = %self.session_id,
                "Refinement skipped, fetch already in flight"
            );
            return FetchOutcome::Skipped;
        };

        let guard = LoadingGuard::new(self, generation);
        let result = self.provider.recommend(&request).await;

        if !self.is_current(generation) {
            tracing::debug!(
                session_id = %self.session_id,
                "Discarding refinement overtaken by a new query"
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let candidates: Vec<Candidate> = response
                    .recommendations
                    .into_iter()
                    .map(Candidate::from)
                    .collect();
                let received = candidates.len();

                let mut count = 0;
                guard.finish(|s| {
                    count = s.append_unique(candidates);
                    s.fetched_at = Some(Utc::now());
                });

                tracing::info!(
                    session_id = %self.session_id,
                    received,
                    appended = count,
                    "Refinement merged"
                );

                FetchOutcome::Applied { count }
            }
            Err(e) => {
                let message = e.user_message();
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %e,
                    "Refinement failed, keeping current results"
                );

                guard.finish(|s| s.error = Some(message.clone()));

                FetchOutcome::Failed { message }
            }
        }
    }

    fn refine_request(state: &SessionState, user_id: Option<i64>) -> RecommendRequest {
        let liked_genres = state.liked_genres();
        let excluded: Vec<i64> = state.swiped.iter().copied().collect();

        let constraints = Constraints {
            genres_in: (!liked_genres.is_empty()).then_some(liked_genres),
            exclude_movie_ids: (!excluded.is_empty()).then_some(excluded),
            ..Default::default()
        };

        RecommendRequest {
            user_id,
            query: None,
            k: MOOD_RESULT_COUNT,
            mode: RecommendMode::Auto,
            candidate_pool: MOOD_CANDIDATE_POOL,
            constraints: constraints.non_empty(),
        }
    }

    // ------------------------------------------------------------------------
    // Feedback
    // ------------------------------------------------------------------------

    /// Records a swipe and, when asked to, refills the stack if it runs low
    ///
    /// Returns the refinement outcome when one was triggered.
    pub async fn record_swipe(
        &self,
        movie_id: i64,
        action: SwipeAction,
        should_refine: bool,
    ) -> Option<FetchOutcome> {
        let mut context = None;
        self.state.send_modify(|s| {
            let position = s.swiped.len();
            s.swiped.insert(movie_id);
            if action == SwipeAction::Like {
                s.liked.insert(movie_id);
            }
            context = Some(Self::feedback_context(
                s,
                FeedbackSource::Swipe,
                Some(position),
            ));
        });

        self.dispatch_feedback(movie_id, action.into(), context).await;

        if !should_refine {
            return None;
        }

        let needs_more = {
            let state = self.state.borrow();
            state.screen == Screen::Results && state.remaining() <= REFINE_THRESHOLD
        };

        if needs_more {
            Some(self.refine().await)
        } else {
            None
        }
    }

    /// Forwards a detail-view vote; swipe progress is untouched
    pub async fn record_detail_feedback(&self, movie_id: i64, feedback: DetailFeedback) {
        let context = {
            let state = self.state.borrow();
            Self::feedback_context(&state, FeedbackSource::Detail, None)
        };
        self.dispatch_feedback(movie_id, feedback.into(), Some(context))
            .await;
    }

    /// Flips the client-side saved mark and forwards a `save` event
    ///
    /// The toggle is predicted locally and never reconciled with the service.
    /// Returns whether the movie is saved afterwards.
    pub async fn toggle_save(&self, movie_id: i64, source: FeedbackSource) -> bool {
        let mut saved = false;
        let mut context = None;
        self.state.send_modify(|s| {
            saved = if s.saved.remove(&movie_id) {
                false
            } else {
                s.saved.insert(movie_id)
            };
            context = Some(Self::feedback_context(s, source, None));
        });

        self.dispatch_feedback(movie_id, FeedbackAction::Save, context)
            .await;
        saved
    }

    fn feedback_context(
        state: &SessionState,
        source: FeedbackSource,
        position: Option<usize>,
    ) -> FeedbackContext {
        FeedbackContext {
            screen: state.screen,
            mood_input: state.intent.as_ref().map(|i| i.label().to_string()),
            is_voice: state.intent.as_ref().is_some_and(QueryIntent::is_voice),
            source,
            position,
        }
    }

    /// Best-effort delivery; failures are logged and dropped
    async fn dispatch_feedback(
        &self,
        movie_id: i64,
        action: FeedbackAction,
        context: Option<FeedbackContext>,
    ) {
        let request = FeedbackRequest {
            user_id: self.options.user_id,
            movie_id,
            action,
            context,
        };

        if let Err(e) = self.provider.send_feedback(&request).await {
            tracing::warn!(
                session_id = %self.session_id,
                movie_id,
                action = %action,
                error = %e,
                "Feedback delivery failed"
            );
        }
    }

    // ------------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------------

    /// Loads the genre catalog for the filter screen and caches it in the state
    pub async fn load_genres(&self) -> AppResult<Vec<String>> {
        let genres = self.provider.list_genres().await?;
        if genres.is_empty() {
            return Err(AppError::ExternalApi(
                "No genres available. Check backend connection.".to_string(),
            ));
        }

        let cached = genres.clone();
        self.state.send_modify(|s| s.available_genres = cached);
        Ok(genres)
    }
}
