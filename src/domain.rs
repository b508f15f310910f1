//! Domain module - Core lookup logic and entities
//!
//! Query parsing, club resolution, search planning and the player/result
//! types. Nothing in here talks to the network.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod club_directory;
pub mod player;
pub mod query;
pub mod search_plan;

pub use club_directory::{ClubDirectory, ClubEntry};
pub use player::{merge_unique, InvalidQuery, MatchKind, PlayerRecord, QueryResult};
pub use query::Query;
pub use search_plan::{SearchParams, SearchPlan};
