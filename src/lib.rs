//! Chess grading lookup
//!
//! Resolves free-form player queries (`Name` or `Name, Club`) against the
//! Chess Scotland grading database, which offers no API beyond a
//! CSRF-protected HTML search form.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{BatchResolution, GradingError, GradingService};
pub use domain::{ClubDirectory, ClubEntry, InvalidQuery, MatchKind, PlayerRecord, Query, QueryResult};
pub use infrastructure::{AppConfig, GradingBackend, RemoteGradingBackend};
