use serde::{Deserialize, Serialize};

/// Genre labels offered during onboarding
pub const GENRE_CATALOG: [&str; 10] = [
    "Action",
    "Adventure",
    "Comedy",
    "Crime",
    "Drama",
    "Fantasy",
    "Horror",
    "Romance",
    "Sci-Fi",
    "Thriller",
];

/// Where the user is in the authentication flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Unauthenticated,
    Onboarding,
    Active,
}

/// The authenticated account, present once the backend accepts a
/// signup or login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAccount {
    pub id: u64,
    pub email: String,
}

/// The user's place in the auth flow plus their account identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub status: SessionStatus,
    pub user: Option<UserAccount>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            user: None,
        }
    }
}

/// The set of genres picked during onboarding
///
/// Duplicate-free; order is irrelevant but insertion order is kept for
/// stable display. Submitted once, then discarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreSelection {
    genres: Vec<String>,
}

impl GenreSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a genre if not already selected, removes it if it is
    pub fn toggle(&mut self, genre: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == genre) {
            self.genres.remove(pos);
        } else {
            self.genres.push(genre.to_string());
        }
    }

    pub fn contains(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.genres
    }

    /// Serializes the selection as the comma-joined string the backend's
    /// /update_genres endpoint expects
    pub fn as_csv(&self) -> String {
        self.genres.join(",")
    }

    pub fn clear(&mut self) {
        self.genres.clear();
    }
}
