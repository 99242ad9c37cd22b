//! Repository port traits.

use async_trait::async_trait;
use playkit_domain::GameId;

use super::error::RepoError;
use super::types::{GameUpsertPayload, UpsertResponse};

// =============================================================================
// Game Content Gateway
// =============================================================================

/// Atomic bulk write of one resolved game.
///
/// `Err` means the gateway could not be reached or its answer could not be
/// read. A reachable gateway that refuses the write answers `Ok` with
/// `ok: false` and a code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameUpsertGateway: Send + Sync {
    async fn find_game_id(&self, game_key: &str) -> Result<Option<GameId>, RepoError>;
    async fn upsert_game(&self, payload: &GameUpsertPayload) -> Result<UpsertResponse, RepoError>;
}
