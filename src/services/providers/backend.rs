/// Recommendation backend client
///
/// HTTP client for the recommendation backend's JSON API. The base URL is
/// configurable; the documented default is the loopback development
/// address. All non-2xx responses surface as `AppError::ExternalApi` with
/// the status and body attached.
use crate::{
    error::{AppError, AppResult},
    models::{
        HybridRecommendations, LoginResponse, SearchRecommendations, SignupResponse,
    },
    services::providers::RecommenderBackend,
};
use reqwest::{Client as HttpClient, Response};
use serde_json::json;

#[derive(Clone)]
pub struct HttpRecommenderBackend {
    http_client: HttpClient,
    base_url: String,
}

impl HttpRecommenderBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }

    async fn expect_success(response: Response, operation: &str) -> AppResult<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Backend {} returned status {}: {}",
                operation, status, body
            )));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl RecommenderBackend for HttpRecommenderBackend {
    async fn signup(&self, email: &str, password: &str) -> AppResult<SignupResponse> {
        let url = format!("{}/signup", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::expect_success(response, "signup").await?;
        Ok(response.json().await?)
    }

    async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let url = format!("{}/login", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::expect_success(response, "login").await?;
        Ok(response.json().await?)
    }

    async fn update_genres(&self, user_id: u64, genres: &str) -> AppResult<()> {
        let url = format!("{}/update_genres", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "user_id": user_id, "genres": genres }))
            .send()
            .await?;

        Self::expect_success(response, "update_genres").await?;

        tracing::info!(user_id = user_id, genres = %genres, "Genre selection persisted");
        Ok(())
    }

    async fn recommend(&self, title: &str) -> AppResult<SearchRecommendations> {
        let url = format!("{}/recommend/{}", self.base_url, title);
        let response = self.http_client.get(&url).send().await?;

        let response = Self::expect_success(response, "recommend").await?;
        let recommendations: SearchRecommendations = response.json().await?;

        tracing::info!(
            query = %title,
            results = recommendations.recommendations.len(),
            "Search recommendations fetched"
        );

        Ok(recommendations)
    }

    async fn recommend_hybrid(&self, user_id: u64) -> AppResult<HybridRecommendations> {
        let url = format!("{}/recommend_hybrid/{}", self.base_url, user_id);
        let response = self.http_client.get(&url).send().await?;

        let response = Self::expect_success(response, "recommend_hybrid").await?;
        let recommendations: HybridRecommendations = response.json().await?;

        tracing::info!(
            user_id = user_id,
            reason = %recommendations.reason,
            results = recommendations.recommendations.len(),
            "Hybrid recommendations fetched"
        );

        Ok(recommendations)
    }

    async fn log_history(&self, user_id: u64, movie_id: u64) -> AppResult<()> {
        let url = format!("{}/log_history", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "user_id": user_id, "movie_id": movie_id }))
            .send()
            .await?;

        Self::expect_success(response, "log_history").await?;
        Ok(())
    }

    async fn rate(&self, user_id: u64, movie_id: u64, rating: u8) -> AppResult<()> {
        let url = format!("{}/rate", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "user_id": user_id, "movie_id": movie_id, "rating": rating }))
            .send()
            .await?;

        Self::expect_success(response, "rate").await?;

        tracing::info!(user_id = user_id, movie_id = movie_id, rating = rating, "Rating submitted");
        Ok(())
    }
}
