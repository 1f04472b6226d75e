use serde::{Deserialize, Serialize};

use crate::models::{GenreSelection, MovieDetail, RecommendationSet, Session};

/// Everything a host needs to render the client
///
/// Snapshots of this struct flow out of the state machine through its watch
/// channel. All mutation happens inside the machine; hosts only observe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub session: Session,
    /// Only populated while `session.status` is `Onboarding`
    pub genre_selection: GenreSelection,
    /// The "Recommended For You" set, if one has been fetched
    pub hybrid: Option<RecommendationSet>,
    /// The latest successful search result set
    pub search_results: Option<RecommendationSet>,
    /// The currently open detail view, if any
    pub detail: Option<MovieDetail>,
    /// The user's rating for the currently open detail view
    pub user_rating: Option<u8>,
    /// Whether a search request is in flight, for spinner rendering
    pub search_in_flight: bool,
}
