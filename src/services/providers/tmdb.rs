/// TMDB metadata provider
///
/// Read-only lookups against the external metadata service. Authentication
/// is a query-string API key; cast data is pulled in the same request via
/// `append_to_response=credits` when the detail view needs it.
use crate::{
    error::{AppError, AppResult},
    models::TmdbMovie,
    services::providers::MovieMetadataProvider,
};
use reqwest::Client as HttpClient;

const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    async fn fetch_movie(&self, movie_id: u64, with_credits: bool) -> AppResult<TmdbMovie> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);

        let mut query = vec![
            ("api_key", self.api_key.as_str()),
            ("language", LANGUAGE),
        ];
        if with_credits {
            query.push(("append_to_response", "credits"));
        }

        let response = self.http_client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {} for movie {}: {}",
                status, movie_id, body
            )));
        }

        let movie: TmdbMovie = response.json().await?;

        tracing::debug!(
            movie_id = movie_id,
            with_credits = with_credits,
            has_poster = movie.poster_path.is_some(),
            "TMDB lookup completed"
        );

        Ok(movie)
    }
}

#[async_trait::async_trait]
impl MovieMetadataProvider for TmdbProvider {
    async fn movie(&self, movie_id: u64) -> AppResult<TmdbMovie> {
        self.fetch_movie(movie_id, false).await
    }

    async fn movie_with_credits(&self, movie_id: u64) -> AppResult<TmdbMovie> {
        self.fetch_movie(movie_id, true).await
    }
}
