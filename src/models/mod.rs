mod movie;
mod session;

pub use movie::{
    CastMember, HybridRecommendations, LoginResponse, MovieDetail, RawRecommendation,
    RecommendationItem, RecommendationSet, RecommendationSource, SearchRecommendations,
    SignupResponse, TmdbCastMember, TmdbCredits, TmdbMovie, MAX_CAST,
};
pub use session::{GenreSelection, Session, SessionStatus, UserAccount, GENRE_CATALOG};
