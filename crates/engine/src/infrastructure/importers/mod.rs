//! Content importers.
//!
//! This module parses game import documents into domain types and exports
//! them back into the same format.

mod game_payload;
mod game_payload_types;

pub use game_payload::{parse_games_from_json_payload, serialize_games, PayloadParseError};
