use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        RawRecommendation, RecommendationItem, RecommendationSet, RecommendationSource,
    },
    services::{enrichment::MetadataEnricher, providers::RecommenderBackend},
};

/// Orchestrates recommendation fetches and per-item enrichment
///
/// Fetches a bare recommendation list from the backend, then enriches every
/// item with poster data. Enrichment runs one task per item; results are
/// reassembled in the backend's original order regardless of completion
/// order, and a failed item resolves to a placeholder rather than aborting
/// the set.
#[derive(Clone)]
pub struct RecommendationAggregator {
    backend: Arc<dyn RecommenderBackend>,
    enricher: MetadataEnricher,
}

impl RecommendationAggregator {
    pub fn new(backend: Arc<dyn RecommenderBackend>, enricher: MetadataEnricher) -> Self {
        Self { backend, enricher }
    }

    /// Content-based recommendations for a title query
    ///
    /// Backend not-found or errors surface as `NoMatch`; the caller keeps
    /// any previously displayed set.
    pub async fn fetch_search_recommendations(
        &self,
        query: &str,
    ) -> AppResult<RecommendationSet> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response = self.backend.recommend(query).await.map_err(|e| {
            tracing::info!(query = %query, error = %e, "Search recommendation miss");
            AppError::NoMatch(format!("No recommendations found for \"{}\"", query))
        })?;

        let reason = format!("Similar to \"{}\"", query);
        Ok(self
            .enrich_all(response.recommendations, reason, RecommendationSource::Search)
            .await)
    }

    /// Personalized hybrid recommendations
    ///
    /// Best-effort: failures surface as `RecommendationsUnavailable` and
    /// the caller retains the previous hybrid set.
    pub async fn fetch_hybrid_recommendations(
        &self,
        user_id: u64,
    ) -> AppResult<RecommendationSet> {
        let response = self.backend.recommend_hybrid(user_id).await.map_err(|e| {
            tracing::warn!(user_id = user_id, error = %e, "Hybrid recommendation fetch failed");
            AppError::RecommendationsUnavailable(e.to_string())
        })?;

        Ok(self
            .enrich_all(
                response.recommendations,
                response.reason,
                RecommendationSource::Hybrid,
            )
            .await)
    }

    /// Enriches every record with a poster, preserving input order
    ///
    /// One task per item; tasks are awaited in input order so the assembled
    /// set matches the backend's ordering no matter when each lookup
    /// completes. A join failure degrades that item to the placeholder.
    async fn enrich_all(
        &self,
        records: Vec<RawRecommendation>,
        reason: String,
        source: RecommendationSource,
    ) -> RecommendationSet {
        let mut tasks = Vec::with_capacity(records.len());

        for record in records {
            let enricher = self.enricher.clone();
            let task =
                tokio::spawn(async move { enricher.enrich_one(record.id).await });
            tasks.push((record, task));
        }

        let mut items = Vec::with_capacity(tasks.len());
        for (record, task) in tasks {
            let poster_url = match task.await {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!(movie_id = record.id, error = %e, "Enrichment task join error");
                    self.enricher.poster_placeholder().to_string()
                }
            };
            items.push(RecommendationItem {
                id: record.id,
                title: record.title,
                poster_url,
            });
        }

        RecommendationSet {
            items,
            reason,
            source,
        }
    }
}
