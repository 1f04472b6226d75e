use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    services::providers::RecommenderBackend,
};

/// Submits ratings and view-history events to the backend
///
/// History logging is fire-and-forget: failures are logged for diagnostics
/// and never reach the user. Rating submission is synchronous from the
/// caller's point of view and must complete before the UI may claim the
/// rating was saved.
#[derive(Clone)]
pub struct FeedbackSubmitter {
    backend: Arc<dyn RecommenderBackend>,
}

impl FeedbackSubmitter {
    pub fn new(backend: Arc<dyn RecommenderBackend>) -> Self {
        Self { backend }
    }

    /// Records that the user opened a movie. Returns immediately; the
    /// request runs in the background and a failure is swallowed so it can
    /// never block opening the detail view.
    pub fn log_view(&self, user_id: u64, movie_id: u64) {
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.log_history(user_id, movie_id).await {
                tracing::debug!(
                    user_id = user_id,
                    movie_id = movie_id,
                    error = %e,
                    "History logging skipped"
                );
            }
        });
    }

    /// Submits a 1-5 star rating. Completes with `RatingFailed` on backend
    /// rejection; the caller decides whether to refresh recommendations.
    pub async fn submit_rating(&self, user_id: u64, movie_id: u64, rating: u8) -> AppResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between 1 and 5, got {}",
                rating
            )));
        }

        self.backend
            .rate(user_id, movie_id, rating)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = user_id, movie_id = movie_id, error = %e, "Rating submission failed");
                AppError::RatingFailed(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockRecommenderBackend;
    use std::time::Duration;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_submit_rating_rejects_out_of_range() {
        let submitter = FeedbackSubmitter::new(Arc::new(MockRecommenderBackend::new()));
        assert!(matches!(
            submitter.submit_rating(7, 603, 0).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            submitter.submit_rating(7, 603, 6).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_rating_maps_backend_error_to_rating_failed() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_rate()
            .returning(|_, _, _| Err(AppError::ExternalApi("Backend rate returned status 500".to_string())));

        let submitter = FeedbackSubmitter::new(Arc::new(backend));
        let result = submitter.submit_rating(7, 603, 5).await;
        assert!(matches!(result, Err(AppError::RatingFailed(_))));
    }

    #[tokio::test]
    async fn test_submit_rating_passes_arguments_through() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_rate()
            .withf(|user_id, movie_id, rating| *user_id == 7 && *movie_id == 603 && *rating == 5)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let submitter = FeedbackSubmitter::new(Arc::new(backend));
        assert_ok!(submitter.submit_rating(7, 603, 5).await);
    }

    #[tokio::test]
    async fn test_log_view_swallows_failures() {
        let mut backend = MockRecommenderBackend::new();
        backend
            .expect_log_history()
            .returning(|_, _| Err(AppError::ExternalApi("connection refused".to_string())));

        let submitter = FeedbackSubmitter::new(Arc::new(backend));
        submitter.log_view(7, 603);

        // Give the background task a chance to run; the failure must not
        // propagate anywhere.
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
