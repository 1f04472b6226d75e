//! Client core for a movie recommendation application
//!
//! Owns the session flow (authentication, genre onboarding, dashboard) and
//! the recommendation-enrichment pipeline: recommendation ids fetched from
//! the backend are enriched with poster and cast metadata from TMDB, with
//! per-item fault isolation so a metadata outage degrades to placeholder
//! images instead of empty lists. Rendering is the host's job; the host
//! drives [`session::SessionStateMachine`] and observes state snapshots
//! through its watch channel.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use session::{SessionState, SessionStateMachine};
