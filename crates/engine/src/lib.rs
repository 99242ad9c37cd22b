//! Playkit Engine library.
//!
//! Bulk import of game content: parse a JSON document, validate artifact
//! metadata, resolve every cross-reference to an ID and write each game in
//! one transactional upsert.
//!
//! ## Structure
//!
//! - `use_cases/` - Import orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
