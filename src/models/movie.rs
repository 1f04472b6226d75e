use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cast members shown on a detail view are capped at this many entries.
pub const MAX_CAST: usize = 5;

/// A single display-ready recommendation
///
/// Immutable once constructed: the aggregator builds these after enrichment
/// and they are never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    pub id: u64,
    pub title: String,
    /// Always non-empty: a real poster URL or the configured placeholder
    pub poster_url: String,
}

/// Which endpoint a recommendation set came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Search,
    Hybrid,
}

/// An ordered, fully-enriched recommendation list
///
/// Replaced wholesale on each fetch; never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationSet {
    pub items: Vec<RecommendationItem>,
    /// Human-readable reason label, e.g. "Trending Now"
    pub reason: String,
    pub source: RecommendationSource,
}

/// A cast member on the detail view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub profile_url: String,
}

/// Detail data for one movie, fetched lazily when a user opens an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub vote_average: f64,
    pub release_date: Option<NaiveDate>,
    pub cast: Vec<CastMember>,
}

impl MovieDetail {
    /// Builds a detail record from a raw TMDB response, resolving actor
    /// profile images against the configured base URL or placeholder and
    /// keeping at most [`MAX_CAST`] cast members.
    pub fn from_tmdb(movie: TmdbMovie, profile_base: &str, profile_placeholder: &str) -> Self {
        let cast = movie
            .credits
            .map(|c| c.cast)
            .unwrap_or_default()
            .into_iter()
            .take(MAX_CAST)
            .map(|member| CastMember {
                id: member.id,
                name: member.name,
                profile_url: member
                    .profile_path
                    .map(|path| format!("{}{}", profile_base, path))
                    .unwrap_or_else(|| profile_placeholder.to_string()),
            })
            .collect();

        Self {
            id: movie.id,
            title: movie.title,
            overview: movie.overview.unwrap_or_default(),
            vote_average: movie.vote_average.unwrap_or(0.0),
            release_date: movie
                .release_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            cast,
        }
    }
}

// ============================================================================
// Recommendation backend wire types
// ============================================================================

/// Response from POST /signup
#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    pub user_id: u64,
}

/// Response from POST /login
///
/// `genres` absent or empty signals a first login (onboarding required).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user_id: u64,
    #[serde(default)]
    pub genres: Option<String>,
}

impl LoginResponse {
    /// Whether the backend already holds a genre selection for this user
    pub fn has_genres(&self) -> bool {
        self.genres.as_deref().is_some_and(|g| !g.trim().is_empty())
    }
}

/// A bare recommendation record, before enrichment
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RawRecommendation {
    pub id: u64,
    pub title: String,
}

/// Response from GET /recommend/{title}
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRecommendations {
    pub recommendations: Vec<RawRecommendation>,
}

/// Response from GET /recommend_hybrid/{user_id}
#[derive(Debug, Clone, Deserialize)]
pub struct HybridRecommendations {
    /// Reason label, e.g. "Trending Now" or "Because you liked Action"
    #[serde(rename = "type")]
    pub reason: String,
    pub recommendations: Vec<RawRecommendation>,
}

// ============================================================================
// TMDB wire types
// ============================================================================

/// Raw TMDB movie response from GET /movie/{id}
///
/// `credits` is only present when requested via `append_to_response=credits`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}
