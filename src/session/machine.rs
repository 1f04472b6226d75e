use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{SessionStatus, UserAccount},
    services::{
        providers::{
            HttpRecommenderBackend, MovieMetadataProvider, RecommenderBackend, TmdbProvider,
        },
        FeedbackSubmitter, MetadataEnricher, RecommendationAggregator,
    },
    session::SessionState,
};

/// Owns the user's progress through the session and all dependent view state
///
/// All mutation goes through this machine; hosts observe snapshots via
/// [`SessionStateMachine::subscribe`]. State only advances on an explicit
/// backend success signal, so a failed transition leaves everything as it
/// was.
///
/// Recommendation sets are published atomically: a set is fetched and fully
/// enriched off to the side and only then swapped in, so observers never
/// see a partially enriched set. Concurrent fetches for the same slot are
/// resolved most-recent-wins via per-slot epoch counters; a response whose
/// epoch is no longer current is dropped, not merged.
pub struct SessionStateMachine {
    state: Arc<RwLock<SessionState>>,
    updates: watch::Sender<SessionState>,
    backend: Arc<dyn RecommenderBackend>,
    aggregator: RecommendationAggregator,
    feedback: FeedbackSubmitter,
    enricher: MetadataEnricher,
    search_epoch: AtomicU64,
    hybrid_epoch: AtomicU64,
}

impl SessionStateMachine {
    pub fn new(
        backend: Arc<dyn RecommenderBackend>,
        metadata: Arc<dyn MovieMetadataProvider>,
        config: &Config,
    ) -> Self {
        let enricher = MetadataEnricher::new(metadata, config);
        let aggregator = RecommendationAggregator::new(Arc::clone(&backend), enricher.clone());
        let feedback = FeedbackSubmitter::new(Arc::clone(&backend));
        let (updates, _) = watch::channel(SessionState::default());

        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            updates,
            backend,
            aggregator,
            feedback,
            enricher,
            search_epoch: AtomicU64::new(0),
            hybrid_epoch: AtomicU64::new(0),
        }
    }

    /// Builds a machine wired to the real HTTP collaborators
    pub fn from_config(config: &Config) -> Self {
        let backend = Arc::new(HttpRecommenderBackend::new(config.backend_url.clone()));
        let metadata = Arc::new(TmdbProvider::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
        ));
        Self::new(backend, metadata, config)
    }

    /// Returns a receiver for state snapshots. The channel always holds the
    /// latest state, so a late subscriber sees the current snapshot first.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// The current state, cloned
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    async fn mutate(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.write().await;
        f(&mut state);
        self.updates.send_replace(state.clone());
    }

    /// Publishes a mutation only if the slot's epoch is still current
    ///
    /// The epoch is compared under the state write lock, so a response that
    /// passes the check cannot be overtaken by a newer fetch publishing in
    /// between the check and the swap. Returns whether the mutation was
    /// applied.
    async fn publish_if_current(
        &self,
        epoch_counter: &AtomicU64,
        epoch: u64,
        f: impl FnOnce(&mut SessionState),
    ) -> bool {
        let mut state = self.state.write().await;
        if epoch_counter.load(Ordering::SeqCst) != epoch {
            return false;
        }
        f(&mut state);
        self.updates.send_replace(state.clone());
        true
    }

    async fn require_status(&self, expected: SessionStatus, operation: &str) -> AppResult<()> {
        let state = self.state.read().await;
        if state.session.status != expected {
            return Err(AppError::InvalidInput(format!(
                "{} is not available in the current session state",
                operation
            )));
        }
        Ok(())
    }

    async fn current_user(&self) -> AppResult<UserAccount> {
        self.state
            .read()
            .await
            .session
            .user
            .clone()
            .ok_or_else(|| AppError::InvalidInput("No authenticated user".to_string()))
    }

    /// Registers a new account. On success the session enters onboarding;
    /// an accepted signup never lands directly on the dashboard.
    pub async fn submit_signup(&self, email: &str, password: &str) -> AppResult<()> {
        self.require_status(SessionStatus::Unauthenticated, "Signup")
            .await?;

        let response = self.backend.signup(email, password).await.map_err(|e| {
            tracing::info!(email = %email, error = %e, "Signup rejected");
            AppError::Auth("Signup failed; the email may already be taken".to_string())
        })?;

        self.mutate(|s| {
            s.session.user = Some(UserAccount {
                id: response.user_id,
                email: email.to_string(),
            });
            s.session.status = SessionStatus::Onboarding;
        })
        .await;

        tracing::info!(user_id = response.user_id, "Signup accepted, entering onboarding");
        Ok(())
    }

    /// Authenticates an existing account. A stored genre selection routes
    /// straight to the dashboard and kicks off the first hybrid fetch;
    /// otherwise the session enters onboarding.
    pub async fn submit_login(&self, email: &str, password: &str) -> AppResult<()> {
        self.require_status(SessionStatus::Unauthenticated, "Login")
            .await?;

        let response = self.backend.login(email, password).await.map_err(|e| {
            tracing::info!(email = %email, error = %e, "Login rejected");
            AppError::Auth("Invalid credentials".to_string())
        })?;

        let has_genres = response.has_genres();
        let user_id = response.user_id;

        self.mutate(|s| {
            s.session.user = Some(UserAccount {
                id: user_id,
                email: email.to_string(),
            });
            s.session.status = if has_genres {
                SessionStatus::Active
            } else {
                SessionStatus::Onboarding
            };
        })
        .await;

        if has_genres {
            // Best-effort: a failed first fetch must not undo the login
            if let Err(e) = self.refresh_hybrid().await {
                tracing::warn!(user_id = user_id, error = %e, "Initial hybrid fetch failed");
            }
        }

        Ok(())
    }

    /// Adds or removes a genre from the onboarding selection
    pub async fn toggle_genre(&self, genre: &str) -> AppResult<()> {
        self.require_status(SessionStatus::Onboarding, "Genre editing")
            .await?;
        self.mutate(|s| s.genre_selection.toggle(genre)).await;
        Ok(())
    }

    /// Persists the genre selection and moves to the dashboard
    ///
    /// The selection is discarded once accepted. A backend failure leaves
    /// the session in onboarding with the selection intact.
    pub async fn submit_genres(&self) -> AppResult<()> {
        let (user_id, genres) = {
            let state = self.state.read().await;
            if state.session.status != SessionStatus::Onboarding {
                return Err(AppError::InvalidInput(
                    "Genre submission is only available during onboarding".to_string(),
                ));
            }
            let user = state
                .session
                .user
                .clone()
                .ok_or_else(|| AppError::InvalidInput("No authenticated user".to_string()))?;
            if state.genre_selection.is_empty() {
                return Err(AppError::InvalidInput(
                    "Select at least one genre".to_string(),
                ));
            }
            (user.id, state.genre_selection.as_csv())
        };

        self.backend.update_genres(user_id, &genres).await?;

        self.mutate(|s| {
            s.session.status = SessionStatus::Active;
            s.genre_selection.clear();
        })
        .await;

        if let Err(e) = self.refresh_hybrid().await {
            tracing::warn!(user_id = user_id, error = %e, "Post-onboarding hybrid fetch failed");
        }

        Ok(())
    }

    /// Fetches personalized recommendations and swaps them in
    ///
    /// On failure the previous hybrid set is retained; on supersession the
    /// response is dropped.
    pub async fn refresh_hybrid(&self) -> AppResult<()> {
        let user = self.current_user().await?;
        let epoch = self.hybrid_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let set = self.aggregator.fetch_hybrid_recommendations(user.id).await?;

        let published = self
            .publish_if_current(&self.hybrid_epoch, epoch, |s| s.hybrid = Some(set))
            .await;
        if !published {
            tracing::debug!(user_id = user.id, "Discarding stale hybrid response");
        }
        Ok(())
    }

    /// Runs a title search and swaps in the result set
    ///
    /// A miss surfaces as `NoMatch` and leaves the previous results
    /// untouched. If a newer search starts before this one resolves, this
    /// response is dropped.
    pub async fn search(&self, query: &str) -> AppResult<()> {
        self.require_status(SessionStatus::Active, "Search").await?;

        let epoch = self.search_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.mutate(|s| s.search_in_flight = true).await;

        let result = self.aggregator.fetch_search_recommendations(query).await;

        match result {
            Ok(set) => {
                let published = self
                    .publish_if_current(&self.search_epoch, epoch, |s| {
                        s.search_results = Some(set);
                        s.search_in_flight = false;
                    })
                    .await;
                if !published {
                    tracing::debug!(query = %query, "Discarding stale search response");
                }
                Ok(())
            }
            Err(e) => {
                let current = self
                    .publish_if_current(&self.search_epoch, epoch, |s| s.search_in_flight = false)
                    .await;
                if !current {
                    // A newer search owns the in-flight flag and the result slot
                    tracing::debug!(query = %query, "Discarding stale search failure");
                    return Ok(());
                }
                Err(e)
            }
        }
    }

    /// Opens a movie's detail view
    ///
    /// View history is logged in the background and can neither block nor
    /// fail the open. A metadata failure surfaces as `DetailUnavailable`
    /// and leaves the previous detail state unchanged.
    pub async fn open_movie(&self, movie_id: u64) -> AppResult<()> {
        if let Some(user) = self.state.read().await.session.user.clone() {
            self.feedback.log_view(user.id, movie_id);
        }

        let detail = self.enricher.fetch_detail(movie_id).await?;

        self.mutate(|s| {
            s.detail = Some(detail);
            s.user_rating = None;
        })
        .await;
        Ok(())
    }

    /// Closes the detail view, discarding its data
    pub async fn close_detail(&self) {
        self.mutate(|s| {
            s.detail = None;
            s.user_rating = None;
        })
        .await;
    }

    /// Submits a rating for a movie
    ///
    /// Completes before claiming success. An accepted rating triggers a
    /// hybrid refresh; a refresh failure after an accepted rating is logged
    /// and the stale hybrid set is retained. A rejected rating surfaces
    /// `RatingFailed` and triggers no refresh.
    pub async fn submit_rating(&self, movie_id: u64, rating: u8) -> AppResult<()> {
        let user = self.current_user().await?;

        self.feedback.submit_rating(user.id, movie_id, rating).await?;

        self.mutate(|s| s.user_rating = Some(rating)).await;

        if let Err(e) = self.refresh_hybrid().await {
            tracing::warn!(user_id = user.id, error = %e, "Post-rating hybrid refresh failed");
        }

        Ok(())
    }

    /// Ends the session, clearing all dependent state
    ///
    /// Bumps both fetch epochs so responses still in flight for the old
    /// session are dropped when they land.
    pub async fn logout(&self) {
        self.search_epoch.fetch_add(1, Ordering::SeqCst);
        self.hybrid_epoch.fetch_add(1, Ordering::SeqCst);
        self.mutate(|s| *s = SessionState::default()).await;
        tracing::info!("Session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        HybridRecommendations, LoginResponse, RawRecommendation, SignupResponse, TmdbMovie,
    };
    use crate::services::providers::{MockMovieMetadataProvider, MockRecommenderBackend};

    fn test_config() -> Config {
        Config {
            backend_url: "http://127.0.0.1:8000".to_string(),
            tmdb_api_key: "test_key".to_string(),
            tmdb_api_url: "http://tmdb.test".to_string(),
            poster_base_url: "https://img.test/w500".to_string(),
            profile_base_url: "https://img.test/w200".to_string(),
            poster_placeholder_url: "https://placeholder.test/poster".to_string(),
            profile_placeholder_url: "https://placeholder.test/actor".to_string(),
        }
    }

    fn machine(
        backend: MockRecommenderBackend,
        metadata: MockMovieMetadataProvider,
    ) -> SessionStateMachine {
        SessionStateMachine::new(Arc::new(backend), Arc::new(metadata), &test_config())
    }

    fn metadata_always_ok() -> MockMovieMetadataProvider {
        let mut metadata = MockMovieMetadataProvider::new();
        metadata.expect_movie().returning(|id| {
            Ok(TmdbMovie {
                id,
                title: "Some Movie".to_string(),
                overview: None,
                vote_average: None,
                release_date: None,
                poster_path: Some(format!("/poster-{}.jpg", id)),
                credits: None,
            })
        });
        metadata
    }

    fn hybrid_response() -> HybridRecommendations {
        HybridRecommendations {
            reason: "Trending Now".to_string(),
            recommendations: vec![RawRecommendation {
                id: 27205,
                title: "Inception".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_signup_enters_onboarding_never_active() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_signup()
            .returning(|_, _| Ok(SignupResponse { user_id: 42 }));
        backend.expect_recommend_hybrid().times(0);

        let machine = machine(backend, MockMovieMetadataProvider::new());
        machine.submit_signup("a@b.com", "x").await.unwrap();

        let state = machine.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Onboarding);
        assert_eq!(state.session.user.as_ref().unwrap().id, 42);
        assert_eq!(state.session.user.as_ref().unwrap().email, "a@b.com");
    }

    #[tokio::test]
    async fn test_rejected_signup_stays_unauthenticated() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_signup().returning(|_, _| {
            Err(AppError::ExternalApi("Backend signup returned status 409".to_string()))
        });

        let machine = machine(backend, MockMovieMetadataProvider::new());
        let result = machine.submit_signup("a@b.com", "x").await;

        assert!(matches!(result, Err(AppError::Auth(_))));
        let state = machine.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Unauthenticated);
        assert!(state.session.user.is_none());
    }

    #[tokio::test]
    async fn test_login_without_genres_enters_onboarding() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 3,
                genres: None,
            })
        });
        backend.expect_recommend_hybrid().times(0);

        let machine = machine(backend, MockMovieMetadataProvider::new());
        machine.submit_login("new@b.com", "x").await.unwrap();

        assert_eq!(
            machine.snapshot().await.session.status,
            SessionStatus::Onboarding
        );
    }

    #[tokio::test]
    async fn test_login_with_genres_activates_and_fetches_hybrid_once() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action,Drama".to_string()),
            })
        });
        backend
            .expect_recommend_hybrid()
            .withf(|user_id| *user_id == 7)
            .times(1)
            .returning(|_| Ok(hybrid_response()));

        let machine = machine(backend, metadata_always_ok());
        machine.submit_login("a@b.com", "x").await.unwrap();

        let state = machine.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Active);
        let hybrid = state.hybrid.unwrap();
        assert_eq!(hybrid.reason, "Trending Now");
        assert_eq!(hybrid.items.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_stays_unauthenticated() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Err(AppError::ExternalApi("Backend login returned status 401".to_string()))
        });
        backend.expect_recommend_hybrid().times(0);

        let machine = machine(backend, MockMovieMetadataProvider::new());
        let result = machine.submit_login("a@b.com", "wrong").await;

        assert!(matches!(result, Err(AppError::Auth(_))));
        assert_eq!(
            machine.snapshot().await.session.status,
            SessionStatus::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_failed_initial_hybrid_fetch_does_not_undo_login() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });
        backend
            .expect_recommend_hybrid()
            .returning(|_| Err(AppError::ExternalApi("connection refused".to_string())));

        let machine = machine(backend, MockMovieMetadataProvider::new());
        machine.submit_login("a@b.com", "x").await.unwrap();

        let state = machine.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Active);
        assert!(state.hybrid.is_none());
    }

    #[tokio::test]
    async fn test_empty_genre_selection_is_rejected() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_signup()
            .returning(|_, _| Ok(SignupResponse { user_id: 42 }));
        backend.expect_update_genres().times(0);

        let machine = machine(backend, MockMovieMetadataProvider::new());
        machine.submit_signup("a@b.com", "x").await.unwrap();

        let result = machine.submit_genres().await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(
            machine.snapshot().await.session.status,
            SessionStatus::Onboarding
        );
    }

    #[tokio::test]
    async fn test_submit_genres_sends_deduplicated_csv_and_activates() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_signup()
            .returning(|_, _| Ok(SignupResponse { user_id: 42 }));
        backend
            .expect_update_genres()
            .withf(|user_id, genres| *user_id == 42 && genres == "Action,Drama")
            .times(1)
            .returning(|_, _| Ok(()));
        backend
            .expect_recommend_hybrid()
            .times(1)
            .returning(|_| Ok(hybrid_response()));

        let machine = machine(backend, metadata_always_ok());
        machine.submit_signup("a@b.com", "x").await.unwrap();
        machine.toggle_genre("Action").await.unwrap();
        machine.toggle_genre("Drama").await.unwrap();
        // Toggling twice more leaves the selection unchanged
        machine.toggle_genre("Horror").await.unwrap();
        machine.toggle_genre("Horror").await.unwrap();
        machine.submit_genres().await.unwrap();

        let state = machine.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Active);
        // Selection is discarded once submitted
        assert!(state.genre_selection.is_empty());
        assert!(state.hybrid.is_some());
    }

    #[tokio::test]
    async fn test_failed_genre_submission_keeps_onboarding_and_selection() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_signup()
            .returning(|_, _| Ok(SignupResponse { user_id: 42 }));
        backend
            .expect_update_genres()
            .returning(|_, _| Err(AppError::ExternalApi("connection refused".to_string())));
        backend.expect_recommend_hybrid().times(0);

        let machine = machine(backend, MockMovieMetadataProvider::new());
        machine.submit_signup("a@b.com", "x").await.unwrap();
        machine.toggle_genre("Action").await.unwrap();

        assert!(machine.submit_genres().await.is_err());

        let state = machine.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Onboarding);
        assert!(state.genre_selection.contains("Action"));
    }

    #[tokio::test]
    async fn test_search_requires_active_session() {
        let machine = machine(
            MockRecommenderBackend::new(),
            MockMovieMetadataProvider::new(),
        );
        let result = machine.search("Matrix").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    async fn active_machine(mut backend: MockRecommenderBackend) -> SessionStateMachine {
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });

        let machine = machine(backend, metadata_always_ok());
        machine.submit_login("a@b.com", "x").await.unwrap();
        machine
    }

    #[tokio::test]
    async fn test_search_miss_retains_previous_results() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_recommend_hybrid()
            .returning(|_| Ok(hybrid_response()));
        let mut calls = 0;
        backend.expect_recommend().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(crate::models::SearchRecommendations {
                    recommendations: vec![RawRecommendation {
                        id: 603,
                        title: "The Matrix".to_string(),
                    }],
                })
            } else {
                Err(AppError::ExternalApi("Backend recommend returned status 404".to_string()))
            }
        });

        let machine = active_machine(backend).await;
        machine.search("Matrix").await.unwrap();

        let first = machine.snapshot().await.search_results.unwrap();
        assert_eq!(first.items[0].title, "The Matrix");

        let result = machine.search("Matrixx").await;
        assert!(matches!(result, Err(AppError::NoMatch(_))));

        let state = machine.snapshot().await;
        assert_eq!(state.search_results.unwrap(), first);
        assert!(!state.search_in_flight);
    }

    #[tokio::test]
    async fn test_open_movie_detail_failure_leaves_detail_closed() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_recommend_hybrid()
            .returning(|_| Ok(hybrid_response()));
        backend.expect_log_history().returning(|_, _| Ok(()));

        let mut metadata = metadata_always_ok();
        metadata
            .expect_movie_with_credits()
            .returning(|_| Err(AppError::ExternalApi("TMDB returned status 503".to_string())));

        let mut login_backend = backend;
        login_backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });

        let machine = SessionStateMachine::new(
            Arc::new(login_backend),
            Arc::new(metadata),
            &test_config(),
        );
        machine.submit_login("a@b.com", "x").await.unwrap();

        let result = machine.open_movie(603).await;
        assert!(matches!(result, Err(AppError::DetailUnavailable(_))));
        assert!(machine.snapshot().await.detail.is_none());
    }

    #[tokio::test]
    async fn test_open_movie_sets_detail_and_resets_rating() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_recommend_hybrid()
            .returning(|_| Ok(hybrid_response()));
        backend.expect_log_history().returning(|_, _| Ok(()));
        backend.expect_rate().returning(|_, _, _| Ok(()));

        let mut metadata = metadata_always_ok();
        metadata.expect_movie_with_credits().returning(|id| {
            Ok(TmdbMovie {
                id,
                title: "The Matrix".to_string(),
                overview: Some("A hacker discovers reality is simulated".to_string()),
                vote_average: Some(8.2),
                release_date: Some("1999-03-31".to_string()),
                poster_path: Some("/matrix.jpg".to_string()),
                credits: None,
            })
        });

        let mut login_backend = backend;
        login_backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });

        let machine = SessionStateMachine::new(
            Arc::new(login_backend),
            Arc::new(metadata),
            &test_config(),
        );
        machine.submit_login("a@b.com", "x").await.unwrap();

        machine.open_movie(603).await.unwrap();
        machine.submit_rating(603, 4).await.unwrap();
        assert_eq!(machine.snapshot().await.user_rating, Some(4));

        // Opening another movie resets the rating echo
        machine.open_movie(604).await.unwrap();
        let state = machine.snapshot().await;
        assert_eq!(state.detail.as_ref().unwrap().id, 604);
        assert!(state.user_rating.is_none());
    }

    #[tokio::test]
    async fn test_accepted_rating_triggers_exactly_one_refresh() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });
        backend
            .expect_rate()
            .withf(|user_id, movie_id, rating| *user_id == 7 && *movie_id == 603 && *rating == 5)
            .times(1)
            .returning(|_, _, _| Ok(()));
        // Once for login, once for the post-rating refresh
        backend
            .expect_recommend_hybrid()
            .times(2)
            .returning(|_| Ok(hybrid_response()));

        let machine = machine(backend, metadata_always_ok());
        machine.submit_login("a@b.com", "x").await.unwrap();
        machine.submit_rating(603, 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_rating_surfaces_failure_and_skips_refresh() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });
        backend.expect_rate().returning(|_, _, _| {
            Err(AppError::ExternalApi("Backend rate returned status 500".to_string()))
        });
        // Only the login-triggered fetch; no post-rating refresh
        backend
            .expect_recommend_hybrid()
            .times(1)
            .returning(|_| Ok(hybrid_response()));

        let machine = machine(backend, metadata_always_ok());
        machine.submit_login("a@b.com", "x").await.unwrap();

        let result = machine.submit_rating(603, 5).await;
        assert!(matches!(result, Err(AppError::RatingFailed(_))));
        assert!(machine.snapshot().await.user_rating.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });
        backend
            .expect_recommend_hybrid()
            .returning(|_| Ok(hybrid_response()));

        let machine = machine(backend, metadata_always_ok());
        machine.submit_login("a@b.com", "x").await.unwrap();
        assert!(machine.snapshot().await.hybrid.is_some());

        machine.logout().await;

        let state = machine.snapshot().await;
        assert_eq!(state, SessionState::default());
        assert_eq!(state.session.status, SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logged_out_state_is_reenterable() {
        let mut backend = MockRecommenderBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(LoginResponse {
                user_id: 7,
                genres: Some("Action".to_string()),
            })
        });
        backend
            .expect_recommend_hybrid()
            .returning(|_| Ok(hybrid_response()));

        let machine = machine(backend, metadata_always_ok());
        machine.submit_login("a@b.com", "x").await.unwrap();
        machine.logout().await;
        machine.submit_login("a@b.com", "x").await.unwrap();

        assert_eq!(
            machine.snapshot().await.session.status,
            SessionStatus::Active
        );
    }

    #[tokio::test]
    async fn test_toggle_genre_requires_onboarding() {
        let machine = machine(
            MockRecommenderBackend::new(),
            MockMovieMetadataProvider::new(),
        );
        let result = machine.toggle_genre("Action").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(machine.snapshot().await.genre_selection.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_genre_publishes_snapshot() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_signup()
            .returning(|_, _| Ok(SignupResponse { user_id: 42 }));

        let machine = machine(backend, MockMovieMetadataProvider::new());
        machine.submit_signup("a@b.com", "x").await.unwrap();

        let mut updates = machine.subscribe();
        machine.toggle_genre("Action").await.unwrap();

        updates.changed().await.unwrap();
        assert!(updates.borrow().genre_selection.contains("Action"));
    }

    #[tokio::test]
    async fn test_watch_channel_observes_transitions() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_signup()
            .returning(|_, _| Ok(SignupResponse { user_id: 42 }));

        let machine = machine(backend, MockMovieMetadataProvider::new());
        let mut updates = machine.subscribe();

        machine.submit_signup("a@b.com", "x").await.unwrap();

        updates.changed().await.unwrap();
        assert_eq!(
            updates.borrow().session.status,
            SessionStatus::Onboarding
        );
    }
}
