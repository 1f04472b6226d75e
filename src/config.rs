use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Recommendation backend base URL
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL prefix joined with TMDB poster paths
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Base URL prefix joined with TMDB actor profile paths
    #[serde(default = "default_profile_base_url")]
    pub profile_base_url: String,

    /// Fallback poster image shown when no real poster can be resolved
    #[serde(default = "default_poster_placeholder_url")]
    pub poster_placeholder_url: String,

    /// Fallback actor image shown when a cast member has no profile photo
    #[serde(default = "default_profile_placeholder_url")]
    pub profile_placeholder_url: String,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_poster_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_profile_base_url() -> String {
    "https://image.tmdb.org/t/p/w200".to_string()
}

fn default_poster_placeholder_url() -> String {
    "https://via.placeholder.com/500x750?text=No+Image".to_string()
}

fn default_profile_placeholder_url() -> String {
    "https://via.placeholder.com/50x75?text=Actor".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
