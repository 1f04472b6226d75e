/// Application-level errors
///
/// Transport-layer variants (`HttpClient`, `ExternalApi`) are produced by the
/// provider clients; the session layer converts them into the user-facing
/// kinds before they reach a host application. Nothing escapes this enum.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("No matching movie: {0}")]
    NoMatch(String),

    #[error("Recommendations unavailable: {0}")]
    RecommendationsUnavailable(String),

    #[error("Movie details unavailable: {0}")]
    DetailUnavailable(String),

    #[error("Rating not saved: {0}")]
    RatingFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Whether this error belongs inline on the auth/search form rather than
    /// as a transient notice.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            AppError::Auth(_) | AppError::NoMatch(_) | AppError::InvalidInput(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
