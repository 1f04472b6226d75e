use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::MovieDetail,
    services::providers::MovieMetadataProvider,
};

/// Resolves bare recommendation records into display-ready ones
///
/// Poster lookup is total: a metadata outage or a missing poster path both
/// resolve to the configured placeholder URL, so a recommendation list can
/// always be rendered in full. Detail lookup is fallible and surfaces
/// `DetailUnavailable` instead.
///
/// Successfully resolved poster URLs are memoized for the lifetime of the
/// enricher to avoid redundant lookups within a session. Placeholder
/// results are not memoized, so a transient outage does not pin fallback
/// images until logout.
#[derive(Clone)]
pub struct MetadataEnricher {
    metadata: Arc<dyn MovieMetadataProvider>,
    poster_base_url: String,
    poster_placeholder_url: String,
    profile_base_url: String,
    profile_placeholder_url: String,
    poster_memo: Arc<RwLock<HashMap<u64, String>>>,
}

impl MetadataEnricher {
    pub fn new(metadata: Arc<dyn MovieMetadataProvider>, config: &Config) -> Self {
        Self {
            metadata,
            poster_base_url: config.poster_base_url.clone(),
            poster_placeholder_url: config.poster_placeholder_url.clone(),
            profile_base_url: config.profile_base_url.clone(),
            profile_placeholder_url: config.profile_placeholder_url.clone(),
            poster_memo: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolves the poster URL for one movie. Never fails.
    pub async fn enrich_one(&self, movie_id: u64) -> String {
        if let Some(url) = self.poster_memo.read().await.get(&movie_id) {
            return url.clone();
        }

        match self.metadata.movie(movie_id).await {
            Ok(movie) => match movie.poster_path {
                Some(path) => {
                    let url = format!("{}{}", self.poster_base_url, path);
                    self.poster_memo.write().await.insert(movie_id, url.clone());
                    url
                }
                None => {
                    tracing::debug!(movie_id = movie_id, "No poster path, using placeholder");
                    self.poster_placeholder_url.clone()
                }
            },
            Err(e) => {
                tracing::warn!(movie_id = movie_id, error = %e, "Poster lookup failed, using placeholder");
                self.poster_placeholder_url.clone()
            }
        }
    }

    /// Fetches the full detail record (synopsis, rating, release date, top
    /// cast) for the detail view
    pub async fn fetch_detail(&self, movie_id: u64) -> AppResult<MovieDetail> {
        let movie = self
            .metadata
            .movie_with_credits(movie_id)
            .await
            .map_err(|e| {
                tracing::warn!(movie_id = movie_id, error = %e, "Detail lookup failed");
                AppError::DetailUnavailable(e.to_string())
            })?;

        Ok(MovieDetail::from_tmdb(
            movie,
            &self.profile_base_url,
            &self.profile_placeholder_url,
        ))
    }

    /// The fallback poster URL, exposed for callers that must substitute a
    /// poster without a lookup (e.g. after a task join failure)
    pub fn poster_placeholder(&self) -> &str {
        &self.poster_placeholder_url
    }
}
