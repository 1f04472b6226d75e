/// External service abstractions
///
/// The client core talks to two collaborators: the recommendation backend
/// (auth, genre persistence, recommendation lists, feedback ingestion) and
/// the TMDB metadata service (posters, synopsis, cast). Each sits behind a
/// trait so the session machinery can be exercised against mocks.
use crate::{
    error::AppResult,
    models::{
        HybridRecommendations, LoginResponse, SearchRecommendations, SignupResponse, TmdbMovie,
    },
};

pub mod backend;
pub mod tmdb;

pub use backend::HttpRecommenderBackend;
pub use tmdb::TmdbProvider;

/// Trait for the recommendation backend
///
/// Covers the full request/response contract of the backend collaborator.
/// The recommendation algorithm behind /recommend and /recommend_hybrid is
/// opaque to this crate; only the wire contract matters here.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommenderBackend: Send + Sync {
    /// Registers a new account. Fails on conflict (email taken) or
    /// validation errors.
    async fn signup(&self, email: &str, password: &str) -> AppResult<SignupResponse>;

    /// Authenticates an existing account. The response carries the stored
    /// genre selection, if any.
    async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse>;

    /// Persists the user's genre selection as a comma-joined label string
    async fn update_genres(&self, user_id: u64, genres: &str) -> AppResult<()>;

    /// Content-based recommendations for a title query. Errors (including
    /// 404) signal no match.
    async fn recommend(&self, title: &str) -> AppResult<SearchRecommendations>;

    /// Personalized hybrid recommendations with a reason label
    async fn recommend_hybrid(&self, user_id: u64) -> AppResult<HybridRecommendations>;

    /// Records that the user opened a movie. Best-effort on the server side
    /// as well as ours.
    async fn log_history(&self, user_id: u64, movie_id: u64) -> AppResult<()>;

    /// Submits a 1-5 star rating
    async fn rate(&self, user_id: u64, movie_id: u64, rating: u8) -> AppResult<()>;
}

/// Trait for the movie metadata service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieMetadataProvider: Send + Sync {
    /// Fetches base movie metadata (poster path, synopsis, rating, release
    /// date) for one movie id
    async fn movie(&self, movie_id: u64) -> AppResult<TmdbMovie>;

    /// Fetches movie metadata with credits appended, for the detail view
    async fn movie_with_credits(&self, movie_id: u64) -> AppResult<TmdbMovie>;
}
