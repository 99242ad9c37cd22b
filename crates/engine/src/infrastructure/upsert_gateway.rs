//! SQLite-backed bulk upsert gateway.
//!
//! Every `upsert_game` call runs in one transaction: the game row and all of
//! its children are written together or not at all. Updates replace the
//! game's children wholesale (delete, then reinsert).

use std::sync::Arc;

use async_trait::async_trait;
use playkit_domain::GameId;
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use sqlx::Row;
use uuid::Uuid;

use crate::infrastructure::ports::{
    ClockPort, GameUpsertGateway, GameUpsertPayload, RepoError, UpsertCounts, UpsertResponse,
};

pub const CODE_GAME_EXISTS: &str = "GAME_EXISTS";
pub const CODE_GAME_NOT_FOUND: &str = "GAME_NOT_FOUND";
pub const CODE_DB_ERROR: &str = "DB_ERROR";

const SCHEMA: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS games (
        id TEXT PRIMARY KEY,
        game_key TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT,
        play_mode TEXT NOT NULL,
        status TEXT NOT NULL,
        import_run_id TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS game_phases (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL,
        phase_order INTEGER NOT NULL,
        phase_type TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        duration_seconds INTEGER,
        timer_visible INTEGER NOT NULL,
        auto_advance INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS game_steps (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL,
        phase_id TEXT,
        step_order INTEGER NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        duration_seconds INTEGER,
        leader_script TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS game_roles (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL,
        role_order INTEGER NOT NULL,
        name TEXT NOT NULL,
        public_description TEXT NOT NULL,
        private_instructions TEXT NOT NULL,
        min_count INTEGER NOT NULL,
        max_count INTEGER,
        assignment_strategy TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS game_artifacts (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL,
        artifact_order INTEGER NOT NULL,
        artifact_type TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        tags_json TEXT NOT NULL,
        metadata_json TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS game_artifact_variants (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL,
        artifact_id TEXT NOT NULL,
        variant_order INTEGER NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        visibility TEXT NOT NULL,
        visible_to_role_id TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS game_triggers (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        enabled INTEGER NOT NULL,
        condition_json TEXT NOT NULL,
        actions_json TEXT NOT NULL,
        delay_seconds INTEGER NOT NULL,
        execute_once INTEGER NOT NULL,
        sort_order INTEGER NOT NULL
    )
    "#,
];

/// Child tables, deleted in this order on update.
const CHILD_TABLES: [&str; 6] = [
    "game_triggers",
    "game_artifact_variants",
    "game_artifacts",
    "game_steps",
    "game_roles",
    "game_phases",
];

/// Why a write stopped before committing.
enum WriteFailure {
    /// The gateway refuses the write (business rule)
    Refused(UpsertResponse),
    Sql(sqlx::Error),
    Encode(serde_json::Error),
}

impl From<sqlx::Error> for WriteFailure {
    fn from(e: sqlx::Error) -> Self {
        WriteFailure::Sql(e)
    }
}

impl From<serde_json::Error> for WriteFailure {
    fn from(e: serde_json::Error) -> Self {
        WriteFailure::Encode(e)
    }
}

/// SQLite implementation of the bulk upsert gateway.
pub struct SqliteGameUpsertGateway {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteGameUpsertGateway {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        Self::with_pool(pool, clock).await
    }

    /// Use an existing pool; the schema is created if missing.
    pub async fn with_pool(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("schema", e))?;
        }

        Ok(Self { pool, clock })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn write_game(
        &self,
        conn: &mut SqliteConnection,
        payload: &GameUpsertPayload,
    ) -> Result<UpsertCounts, WriteFailure> {
        let game_id = payload.game_id.to_string();
        let game = &payload.game;
        let now = self.clock.now().to_rfc3339();

        if payload.is_update {
            let existing = sqlx::query("SELECT id FROM games WHERE id = ?")
                .bind(&game_id)
                .fetch_optional(&mut *conn)
                .await?;
            if existing.is_none() {
                return Err(WriteFailure::Refused(UpsertResponse::failure(
                    CODE_GAME_NOT_FOUND,
                    format!("Game {} ({}) does not exist", game.game_key, game_id),
                )));
            }

            for table in CHILD_TABLES {
                sqlx::query(&format!("DELETE FROM {} WHERE game_id = ?", table))
                    .bind(&game_id)
                    .execute(&mut *conn)
                    .await?;
            }

            sqlx::query(
                r#"
                UPDATE games
                SET game_key = ?, name = ?, description = ?, play_mode = ?, status = ?,
                    import_run_id = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&game.game_key)
            .bind(&game.name)
            .bind(&game.description)
            .bind(game.play_mode.as_str())
            .bind(game.status.as_str())
            .bind(payload.import_run_id.to_string())
            .bind(&now)
            .bind(&game_id)
            .execute(&mut *conn)
            .await?;
        } else {
            let existing = sqlx::query("SELECT id FROM games WHERE game_key = ? OR id = ?")
                .bind(&game.game_key)
                .bind(&game_id)
                .fetch_optional(&mut *conn)
                .await?;
            if existing.is_some() {
                return Err(WriteFailure::Refused(UpsertResponse::failure(
                    CODE_GAME_EXISTS,
                    format!("Game with key \"{}\" already exists", game.game_key),
                )));
            }

            sqlx::query(
                r#"
                INSERT INTO games (id, game_key, name, description, play_mode, status, import_run_id, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&game_id)
            .bind(&game.game_key)
            .bind(&game.name)
            .bind(&game.description)
            .bind(game.play_mode.as_str())
            .bind(game.status.as_str())
            .bind(payload.import_run_id.to_string())
            .bind(&now)
            .execute(&mut *conn)
            .await?;
        }

        let mut counts = UpsertCounts::default();

        for phase in &payload.phases {
            counts.phases += sqlx::query(
                r#"
                INSERT INTO game_phases (id, game_id, phase_order, phase_type, name, description,
                    duration_seconds, timer_visible, auto_advance)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(phase.id.to_string())
            .bind(&game_id)
            .bind(phase.order)
            .bind(phase.phase_type.as_str())
            .bind(&phase.name)
            .bind(&phase.description)
            .bind(phase.duration_seconds)
            .bind(phase.timer_visible)
            .bind(phase.auto_advance)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }

        for step in &payload.steps {
            counts.steps += sqlx::query(
                r#"
                INSERT INTO game_steps (id, game_id, phase_id, step_order, title, body,
                    duration_seconds, leader_script)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(step.id.to_string())
            .bind(&game_id)
            .bind(step.phase_id.map(|id| id.to_string()))
            .bind(step.order)
            .bind(&step.title)
            .bind(&step.body)
            .bind(step.duration_seconds)
            .bind(&step.leader_script)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }

        for role in &payload.roles {
            counts.roles += sqlx::query(
                r#"
                INSERT INTO game_roles (id, game_id, role_order, name, public_description,
                    private_instructions, min_count, max_count, assignment_strategy)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(role.id.to_string())
            .bind(&game_id)
            .bind(role.order)
            .bind(&role.name)
            .bind(&role.public_description)
            .bind(&role.private_instructions)
            .bind(role.min_count)
            .bind(role.max_count)
            .bind(role.assignment_strategy.as_str())
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }

        for artifact in &payload.artifacts {
            counts.artifacts += sqlx::query(
                r#"
                INSERT INTO game_artifacts (id, game_id, artifact_order, artifact_type, title,
                    description, tags_json, metadata_json)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(artifact.id.to_string())
            .bind(&game_id)
            .bind(artifact.order)
            .bind(artifact.artifact_type.as_str())
            .bind(&artifact.title)
            .bind(&artifact.description)
            .bind(serde_json::to_string(&artifact.tags)?)
            .bind(serde_json::to_string(&artifact.metadata)?)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }

        for variant in &payload.artifact_variants {
            counts.variants += sqlx::query(
                r#"
                INSERT INTO game_artifact_variants (id, game_id, artifact_id, variant_order, title,
                    body, visibility, visible_to_role_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(variant.id.to_string())
            .bind(&game_id)
            .bind(variant.artifact_id.to_string())
            .bind(variant.order)
            .bind(&variant.title)
            .bind(&variant.body)
            .bind(variant.visibility.as_str())
            .bind(variant.visible_to_role_id.map(|id| id.to_string()))
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }

        for trigger in &payload.triggers {
            counts.triggers += sqlx::query(
                r#"
                INSERT INTO game_triggers (id, game_id, name, description, enabled,
                    condition_json, actions_json, delay_seconds, execute_once, sort_order)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(trigger.id.to_string())
            .bind(&game_id)
            .bind(&trigger.name)
            .bind(&trigger.description)
            .bind(trigger.enabled)
            .bind(serde_json::to_string(&trigger.condition)?)
            .bind(serde_json::to_string(&trigger.actions)?)
            .bind(trigger.delay_seconds)
            .bind(trigger.execute_once)
            .bind(trigger.sort_order)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        }

        Ok(counts)
    }
}

#[async_trait]
impl GameUpsertGateway for SqliteGameUpsertGateway {
    async fn find_game_id(&self, game_key: &str) -> Result<Option<GameId>, RepoError> {
        let row = sqlx::query("SELECT id FROM games WHERE game_key = ?")
            .bind(game_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("find_game_id", e))?;

        match row {
            Some(row) => {
                let id: String = row.get("id");
                let uuid = Uuid::parse_str(&id).map_err(RepoError::serialization)?;
                Ok(Some(GameId::from_uuid(uuid)))
            }
            None => Ok(None),
        }
    }

    async fn upsert_game(&self, payload: &GameUpsertPayload) -> Result<UpsertResponse, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("upsert_game", e))?;

        let outcome = self.write_game(&mut *tx, payload).await;

        let failure = match outcome {
            Ok(counts) => match tx.commit().await {
                Ok(()) => return Ok(UpsertResponse::success(counts)),
                Err(e) => {
                    tracing::warn!(game_key = %payload.game.game_key, error = %e, "Commit failed");
                    return Ok(UpsertResponse::failure(CODE_DB_ERROR, e.to_string()));
                }
            },
            Err(failure) => failure,
        };

        if let Err(e) = tx.rollback().await {
            tracing::warn!(game_key = %payload.game.game_key, error = %e, "Rollback failed");
        }

        let response = match failure {
            WriteFailure::Refused(response) => response,
            WriteFailure::Sql(e) => {
                tracing::warn!(game_key = %payload.game.game_key, error = %e, "Upsert rolled back");
                UpsertResponse::failure(CODE_DB_ERROR, e.to_string())
            }
            WriteFailure::Encode(e) => {
                return Err(RepoError::serialization(e));
            }
        };

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        ArtifactRow, ArtifactVariantRow, GameRow, PhaseRow, ResolvedTrigger, RoleRow, StepRow,
    };
    use chrono::{TimeZone, Utc};
    use playkit_domain::{
        ArtifactId, ArtifactType, ArtifactVariantId, AssignmentStrategy, GameStatus, ImportRunId,
        PhaseId, PhaseType, PlayMode, RoleId, StepId, TriggerAction, TriggerCondition, TriggerId,
        Visibility,
    };
    use serde_json::Map;
    use sqlx::sqlite::SqlitePoolOptions;

    fn clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()))
    }

    async fn memory_gateway() -> SqliteGameUpsertGateway {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteGameUpsertGateway::with_pool(pool, clock()).await.unwrap()
    }

    /// Payload with the given sizes; variants are spread evenly over artifacts.
    fn payload(
        key: &str,
        phases: u32,
        steps: u32,
        artifacts: u32,
        variants_per_artifact: u32,
        triggers: u32,
    ) -> GameUpsertPayload {
        let phase_rows: Vec<PhaseRow> = (1..=phases)
            .map(|order| PhaseRow {
                id: PhaseId::new(),
                order,
                phase_type: PhaseType::Round,
                name: format!("Phase {}", order),
                description: String::new(),
                duration_seconds: Some(300),
                timer_visible: true,
                auto_advance: false,
            })
            .collect();
        let step_rows: Vec<StepRow> = (1..=steps)
            .map(|order| StepRow {
                id: StepId::new(),
                phase_id: phase_rows.first().map(|p| p.id),
                order,
                title: format!("Step {}", order),
                body: String::new(),
                duration_seconds: None,
                leader_script: None,
            })
            .collect();
        let role = RoleRow {
            id: RoleId::new(),
            order: 1,
            name: "Detective".to_string(),
            public_description: String::new(),
            private_instructions: String::new(),
            min_count: 1,
            max_count: Some(2),
            assignment_strategy: AssignmentStrategy::Random,
        };
        let artifact_rows: Vec<ArtifactRow> = (1..=artifacts)
            .map(|order| ArtifactRow {
                id: ArtifactId::new(),
                order,
                artifact_type: ArtifactType::Document,
                title: format!("Artifact {}", order),
                description: String::new(),
                tags: vec!["clue".to_string()],
                metadata: Map::new(),
            })
            .collect();
        let variant_rows: Vec<ArtifactVariantRow> = artifact_rows
            .iter()
            .flat_map(|artifact| {
                let artifact_id = artifact.id;
                let role_id = role.id;
                (1..=variants_per_artifact).map(move |order| ArtifactVariantRow {
                    id: ArtifactVariantId::new(),
                    artifact_id,
                    order,
                    title: format!("Variant {}", order),
                    body: String::new(),
                    visibility: if order == 1 { Visibility::Public } else { Visibility::RolePrivate },
                    visible_to_role_id: if order == 1 { None } else { Some(role_id) },
                })
            })
            .collect();
        let trigger_rows: Vec<ResolvedTrigger> = (0..triggers)
            .map(|index| ResolvedTrigger {
                id: TriggerId::new(),
                name: format!("Trigger {}", index),
                description: String::new(),
                enabled: true,
                condition: TriggerCondition::Manual,
                actions: vec![TriggerAction::RevealArtifact {
                    artifact_id: artifact_rows[index as usize % artifact_rows.len()].id,
                }],
                delay_seconds: 0,
                execute_once: false,
                sort_order: index as i32,
            })
            .collect();

        GameUpsertPayload {
            game_id: GameId::new(),
            is_update: false,
            import_run_id: ImportRunId::new(),
            game: GameRow {
                game_key: key.to_string(),
                name: "Escape the Lab".to_string(),
                description: None,
                play_mode: PlayMode::Facilitated,
                status: GameStatus::Draft,
            },
            phases: phase_rows,
            steps: step_rows,
            roles: vec![role],
            artifacts: artifact_rows,
            artifact_variants: variant_rows,
            triggers: trigger_rows,
        }
    }

    async fn count_rows(gateway: &SqliteGameUpsertGateway, table: &str) -> i64 {
        sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", table))
            .fetch_one(gateway.pool())
            .await
            .unwrap()
            .get("n")
    }

    #[tokio::test]
    async fn medium_payload_counts_match_input() {
        let gateway = memory_gateway().await;
        let payload = payload("medium", 20, 100, 500, 4, 100);

        let response = gateway.upsert_game(&payload).await.unwrap();

        assert!(response.ok, "{:?}", response.error);
        assert_eq!(response.counts, payload.expected_counts());
        assert_eq!(response.counts.phases, 20);
        assert_eq!(response.counts.steps, 100);
        assert_eq!(response.counts.artifacts, 500);
        assert_eq!(response.counts.variants, 2000);
        assert_eq!(response.counts.triggers, 100);
        assert_eq!(count_rows(&gateway, "game_artifact_variants").await, 2000);
    }

    #[tokio::test]
    async fn create_rejects_existing_game_key() {
        let gateway = memory_gateway().await;
        let first = payload("dup", 1, 1, 1, 1, 0);
        assert!(gateway.upsert_game(&first).await.unwrap().ok);

        let second = payload("dup", 2, 2, 2, 1, 0);
        let response = gateway.upsert_game(&second).await.unwrap();

        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some(CODE_GAME_EXISTS));
        assert_eq!(count_rows(&gateway, "game_phases").await, 1);
    }

    #[tokio::test]
    async fn update_of_missing_game_is_refused() {
        let gateway = memory_gateway().await;
        let mut update = payload("ghost", 1, 1, 1, 1, 0);
        update.is_update = true;

        let response = gateway.upsert_game(&update).await.unwrap();

        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some(CODE_GAME_NOT_FOUND));
        assert_eq!(count_rows(&gateway, "games").await, 0);
    }

    #[tokio::test]
    async fn update_replaces_children() {
        let gateway = memory_gateway().await;
        let original = payload("lab", 3, 6, 4, 2, 2);
        assert!(gateway.upsert_game(&original).await.unwrap().ok);

        let mut replacement = payload("lab", 2, 3, 1, 1, 1);
        replacement.game_id = original.game_id;
        replacement.is_update = true;
        let response = gateway.upsert_game(&replacement).await.unwrap();

        assert!(response.ok, "{:?}", response.error);
        assert_eq!(response.counts, replacement.expected_counts());
        assert_eq!(count_rows(&gateway, "game_phases").await, 2);
        assert_eq!(count_rows(&gateway, "game_steps").await, 3);
        assert_eq!(count_rows(&gateway, "game_artifact_variants").await, 1);
        assert_eq!(count_rows(&gateway, "games").await, 1);
    }

    #[tokio::test]
    async fn sql_failure_rolls_back_everything() {
        let gateway = memory_gateway().await;
        let mut broken = payload("broken", 2, 2, 2, 1, 0);
        broken.steps[1].id = broken.steps[0].id;

        let response = gateway.upsert_game(&broken).await.unwrap();

        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some(CODE_DB_ERROR));
        assert_eq!(count_rows(&gateway, "games").await, 0);
        assert_eq!(count_rows(&gateway, "game_phases").await, 0);
        assert_eq!(gateway.find_game_id("broken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn find_game_id_returns_stored_id() {
        let gateway = memory_gateway().await;
        let created = payload("findable", 1, 1, 1, 1, 1);
        gateway.upsert_game(&created).await.unwrap();

        assert_eq!(gateway.find_game_id("findable").await.unwrap(), Some(created.game_id));
        assert_eq!(gateway.find_game_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_backed_gateway_persists_between_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.db");
        let path = path.to_string_lossy().to_string();
        let created = payload("persisted", 2, 2, 2, 2, 1);

        {
            let gateway = SqliteGameUpsertGateway::new(&path, clock()).await.unwrap();
            assert!(gateway.upsert_game(&created).await.unwrap().ok);
            gateway.pool().close().await;
        }

        let reopened = SqliteGameUpsertGateway::new(&path, clock()).await.unwrap();
        assert_eq!(reopened.find_game_id("persisted").await.unwrap(), Some(created.game_id));
    }
}
