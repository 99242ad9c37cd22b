//! Game import use cases.
//!
//! Pipeline per game: parse, validate artifact metadata, build the ID map,
//! resolve step/variant/trigger references, then one gateway call.

mod error;
mod id_map;
mod import_games;
mod metadata;
mod payload;
mod refs;
mod trigger_refs;
mod trigger_registry;
mod types;

use std::sync::Arc;

pub use error::ImportError;
pub use id_map::{
    build_trigger_id_map, derive_entity_id, derive_game_id, entity_id, KindIds, TriggerIdMap,
    TriggerIdMapBuilder,
};
pub use import_games::ImportGames;
pub use metadata::{validate_artifact_metadata, MetadataReport, ValidArtifactMetadata};
pub use payload::{build_upsert_payload, PayloadBuild};
pub use refs::{resolve_ref, ResolvedRef};
pub use trigger_refs::{
    rewrite_all_trigger_refs, rewrite_trigger_refs, TriggerBatchRewrite, TriggerRewrite,
};
pub use types::{
    GameImportReport, GameImportStatus, ImportIssue, ImportReport, IssueLog, Severity,
};

/// Container for import use cases.
pub struct ImportUseCases {
    pub games: Arc<ImportGames>,
}

impl ImportUseCases {
    pub fn new(games: Arc<ImportGames>) -> Self {
        Self { games }
    }
}
