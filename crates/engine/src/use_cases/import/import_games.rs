//! Import games use case.
//!
//! Parses a document, builds one resolved payload per game and sends each
//! payload to the upsert gateway in a single call. A game with errors is
//! rejected on its own; the rest of the document still imports.

use std::sync::Arc;
use std::time::Instant;

use playkit_domain::{Game, GameId, ImportRunId};

use crate::infrastructure::app_settings::{ImportMode, ImportSettings};
use crate::infrastructure::importers::parse_games_from_json_payload;
use crate::infrastructure::ports::{ClockPort, GameUpsertGateway, RandomPort};

use super::error::ImportError;
use super::id_map::derive_game_id;
use super::payload::build_upsert_payload;
use super::types::{GameImportReport, GameImportStatus, ImportIssue, ImportReport};

pub struct ImportGames {
    gateway: Arc<dyn GameUpsertGateway>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    settings: ImportSettings,
}

impl ImportGames {
    pub fn new(
        gateway: Arc<dyn GameUpsertGateway>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            gateway,
            clock,
            random,
            settings,
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Import every game in `raw`.
    ///
    /// Returns `Err` only for problems that make the whole run meaningless:
    /// an unparseable document or a gateway transport failure. Per-game
    /// problems end up in the report.
    pub async fn execute(&self, raw: &str) -> Result<ImportReport, ImportError> {
        let games = parse_games_from_json_payload(raw)?;
        let import_run_id = ImportRunId::from_uuid(self.random.gen_uuid());
        let started_at = self.clock.now();

        tracing::info!(
            import_run_id = %import_run_id,
            games = games.len(),
            mode = %self.settings.mode,
            dry_run = self.settings.dry_run,
            "Starting game import"
        );

        let mut reports = Vec::with_capacity(games.len());
        for game in &games {
            reports.push(self.import_game(game, import_run_id).await?);
        }

        let report = ImportReport {
            import_run_id,
            mode: self.settings.mode,
            dry_run: self.settings.dry_run,
            started_at,
            games: reports,
        };

        tracing::info!(
            import_run_id = %import_run_id,
            imported = report.count(|s| matches!(s, GameImportStatus::Imported)),
            validated = report.count(|s| matches!(s, GameImportStatus::Validated)),
            failed = report.count(GameImportStatus::is_failure),
            "Game import finished"
        );
        Ok(report)
    }

    async fn import_game(
        &self,
        game: &Game,
        import_run_id: ImportRunId,
    ) -> Result<GameImportReport, ImportError> {
        let started = Instant::now();
        let (game_id, is_update) = self.target_for(game).await?;

        let build = build_upsert_payload(game, game_id, is_update, import_run_id);
        let mut report = GameImportReport {
            game_key: game.game_key.clone(),
            game_id,
            is_update,
            status: GameImportStatus::Rejected,
            counts: None,
            errors: build.errors,
            warnings: build.warnings,
            payload_bytes: None,
            elapsed_ms: None,
        };

        let Some(payload) = build.payload else {
            tracing::warn!(
                game_key = %game.game_key,
                errors = report.errors.len(),
                "Game rejected by import validation"
            );
            return Ok(report);
        };

        let payload_bytes = serde_json::to_vec(&payload)?.len();
        report.payload_bytes = Some(payload_bytes);
        if payload_bytes > self.settings.max_payload_bytes {
            tracing::warn!(
                game_key = %game.game_key,
                payload_bytes,
                max_payload_bytes = self.settings.max_payload_bytes,
                "Upsert payload exceeds size envelope; sending as one document"
            );
        }

        let expected = payload.expected_counts();
        if self.settings.dry_run {
            if self.settings.mode == ImportMode::Create
                && self.gateway.find_game_id(&game.game_key).await?.is_some()
            {
                tracing::warn!(game_key = %game.game_key, "Game already exists; create would be rejected");
                report.warnings.push(
                    ImportIssue::warning(
                        "game_key",
                        format!(
                            "Game \"{}\" already exists; a create import would be rejected with GAME_EXISTS",
                            game.game_key
                        ),
                    )
                    .labelled(&game.game_key),
                );
            }
            report.status = GameImportStatus::Validated;
            report.counts = Some(expected);
            report.elapsed_ms = Some(elapsed_ms(started));
            tracing::info!(game_key = %game.game_key, "Game validated (dry run)");
            return Ok(report);
        }

        let response = self.gateway.upsert_game(&payload).await?;
        report.elapsed_ms = Some(elapsed_ms(started));

        if response.ok {
            if response.counts != expected {
                tracing::warn!(
                    game_key = %game.game_key,
                    expected = ?expected,
                    written = ?response.counts,
                    "Gateway counts differ from payload"
                );
            }
            tracing::info!(
                game_key = %game.game_key,
                game_id = %game_id,
                is_update,
                steps = response.counts.steps,
                artifacts = response.counts.artifacts,
                variants = response.counts.variants,
                triggers = response.counts.triggers,
                elapsed_ms = report.elapsed_ms,
                "Game imported"
            );
            report.status = GameImportStatus::Imported;
            report.counts = Some(response.counts);
        } else {
            tracing::warn!(
                game_key = %game.game_key,
                code = response.code.as_deref().unwrap_or("unknown"),
                error = response.error.as_deref().unwrap_or(""),
                "Gateway rejected game"
            );
            report.status = GameImportStatus::GatewayRejected {
                error: response.error,
                code: response.code,
            };
        }
        Ok(report)
    }

    /// Game ID to write to, and whether the write replaces an existing game.
    async fn target_for(&self, game: &Game) -> Result<(GameId, bool), ImportError> {
        match self.settings.mode {
            ImportMode::Create => Ok((derive_game_id(&game.game_key), false)),
            ImportMode::Upsert => match self.gateway.find_game_id(&game.game_key).await? {
                Some(existing) => Ok((existing, true)),
                None => Ok((derive_game_id(&game.game_key), false)),
            },
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockClockPort, MockGameUpsertGateway, MockRandomPort, RepoError, UpsertResponse,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    const FIXTURE: &str = include_str!("../../infrastructure/importers/fixtures/escape_lab.json");

    fn use_case(gateway: MockGameUpsertGateway, settings: ImportSettings) -> (ImportGames, Uuid) {
        let run_id = Uuid::new_v4();
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        let mut random = MockRandomPort::new();
        random.expect_gen_uuid().returning(move || run_id);

        (
            ImportGames::new(Arc::new(gateway), Arc::new(clock), Arc::new(random), settings),
            run_id,
        )
    }

    fn accept_all(gateway: &mut MockGameUpsertGateway) {
        gateway
            .expect_upsert_game()
            .returning(|payload| Ok(UpsertResponse::success(payload.expected_counts())));
    }

    #[tokio::test]
    async fn create_mode_imports_fixture_game() {
        let mut gateway = MockGameUpsertGateway::new();
        gateway.expect_find_game_id().times(0);
        gateway
            .expect_upsert_game()
            .withf(|payload| {
                !payload.is_update
                    && payload.game_id == derive_game_id("escape-the-lab")
                    && payload.triggers.len() == 3
                    && payload.artifacts.len() == 4
            })
            .times(1)
            .returning(|payload| Ok(UpsertResponse::success(payload.expected_counts())));

        let (use_case, run_id) = use_case(gateway, ImportSettings::default());
        let report = use_case.execute(FIXTURE).await.unwrap();

        assert_eq!(report.import_run_id, ImportRunId::from_uuid(run_id));
        assert_eq!(report.games.len(), 1);
        let game = &report.games[0];
        assert_eq!(game.status, GameImportStatus::Imported);
        assert_eq!(game.game_key, "escape-the-lab");
        let counts = game.counts.unwrap();
        assert_eq!((counts.phases, counts.steps, counts.roles, counts.artifacts), (4, 4, 3, 4));
        assert_eq!(counts.triggers, 3);
        assert!(game.errors.is_empty(), "{:?}", game.errors);
        assert!(game.payload_bytes.unwrap() > 0);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn upsert_mode_reuses_existing_game_id() {
        let existing = GameId::new();
        let mut gateway = MockGameUpsertGateway::new();
        gateway
            .expect_find_game_id()
            .withf(|key: &str| key == "escape-the-lab")
            .returning(move |_| Ok(Some(existing)));
        gateway
            .expect_upsert_game()
            .withf(move |payload| payload.is_update && payload.game_id == existing)
            .times(1)
            .returning(|payload| Ok(UpsertResponse::success(payload.expected_counts())));

        let settings = ImportSettings {
            mode: ImportMode::Upsert,
            ..ImportSettings::default()
        };
        let (use_case, _) = use_case(gateway, settings);
        let report = use_case.execute(FIXTURE).await.unwrap();

        assert_eq!(report.games[0].game_id, existing);
        assert!(report.games[0].is_update);
        assert_eq!(report.games[0].status, GameImportStatus::Imported);
    }

    #[tokio::test]
    async fn upsert_mode_creates_missing_game() {
        let mut gateway = MockGameUpsertGateway::new();
        gateway.expect_find_game_id().returning(|_| Ok(None));
        gateway
            .expect_upsert_game()
            .withf(|payload| !payload.is_update)
            .times(1)
            .returning(|payload| Ok(UpsertResponse::success(payload.expected_counts())));

        let settings = ImportSettings {
            mode: ImportMode::Upsert,
            ..ImportSettings::default()
        };
        let (use_case, _) = use_case(gateway, settings);
        let report = use_case.execute(FIXTURE).await.unwrap();

        assert!(!report.games[0].is_update);
    }

    #[tokio::test]
    async fn dry_run_never_calls_gateway() {
        let mut gateway = MockGameUpsertGateway::new();
        gateway.expect_find_game_id().returning(|_| Ok(None));
        gateway.expect_upsert_game().times(0);

        let settings = ImportSettings {
            dry_run: true,
            ..ImportSettings::default()
        };
        let (use_case, _) = use_case(gateway, settings);
        let report = use_case.execute(FIXTURE).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.games[0].status, GameImportStatus::Validated);
        assert_eq!(report.games[0].counts.unwrap().artifacts, 4);
        assert!(report.games[0].warnings.iter().all(|w| w.column != "game_key"));
    }

    #[tokio::test]
    async fn dry_run_create_warns_about_existing_game() {
        let mut gateway = MockGameUpsertGateway::new();
        gateway
            .expect_find_game_id()
            .withf(|key: &str| key == "escape-the-lab")
            .times(1)
            .returning(|_| Ok(Some(GameId::new())));
        gateway.expect_upsert_game().times(0);

        let settings = ImportSettings {
            dry_run: true,
            ..ImportSettings::default()
        };
        let (use_case, _) = use_case(gateway, settings);
        let report = use_case.execute(FIXTURE).await.unwrap();

        let game = &report.games[0];
        assert_eq!(game.status, GameImportStatus::Validated);
        assert!(!game.is_update);
        let warning = game.warnings.iter().find(|w| w.column == "game_key").unwrap();
        assert!(warning.message.starts_with("[escape-the-lab] "), "{}", warning.message);
        assert!(warning.message.contains("GAME_EXISTS"));
    }

    #[tokio::test]
    async fn rejected_game_does_not_stop_the_rest() {
        let document = json!({
            "games": [
                {
                    "game_key": "broken",
                    "name": "Broken",
                    "triggers": [
                        {"name": "A", "condition": {"type": "step_started", "stepOrder": 9}},
                        {"name": "B", "condition": {"type": "teleport"}}
                    ]
                },
                {"game_key": "fine", "name": "Fine", "steps": [{"title": "Go"}]}
            ]
        });

        let mut gateway = MockGameUpsertGateway::new();
        gateway
            .expect_upsert_game()
            .withf(|payload| payload.game.game_key == "fine")
            .times(1)
            .returning(|payload| Ok(UpsertResponse::success(payload.expected_counts())));

        let (use_case, _) = use_case(gateway, ImportSettings::default());
        let report = use_case.execute(&document.to_string()).await.unwrap();

        assert!(report.has_failures());
        let broken = &report.games[0];
        assert_eq!(broken.status, GameImportStatus::Rejected);
        assert_eq!(broken.errors.len(), 2);
        assert!(broken.errors.iter().all(|e| e.message.starts_with("[broken] ")));
        assert_eq!(broken.counts, None);
        assert_eq!(report.games[1].status, GameImportStatus::Imported);
    }

    #[tokio::test]
    async fn gateway_rejection_is_passed_through() {
        let mut gateway = MockGameUpsertGateway::new();
        gateway
            .expect_upsert_game()
            .returning(|_| Ok(UpsertResponse::failure("GAME_EXISTS", "Game escape-the-lab already exists")));

        let (use_case, _) = use_case(gateway, ImportSettings::default());
        let report = use_case.execute(FIXTURE).await.unwrap();

        assert_eq!(
            report.games[0].status,
            GameImportStatus::GatewayRejected {
                error: Some("Game escape-the-lab already exists".to_string()),
                code: Some("GAME_EXISTS".to_string()),
            }
        );
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn oversize_payload_is_still_sent_once() {
        let mut gateway = MockGameUpsertGateway::new();
        gateway.expect_upsert_game().times(1).returning(|payload| {
            Ok(UpsertResponse::success(payload.expected_counts()))
        });

        let settings = ImportSettings {
            max_payload_bytes: 16,
            ..ImportSettings::default()
        };
        let (use_case, _) = use_case(gateway, settings);
        let report = use_case.execute(FIXTURE).await.unwrap();

        assert!(report.games[0].payload_bytes.unwrap() > 16);
        assert_eq!(report.games[0].status, GameImportStatus::Imported);
    }

    #[tokio::test]
    async fn transport_failure_aborts_the_run() {
        let mut gateway = MockGameUpsertGateway::new();
        gateway
            .expect_upsert_game()
            .returning(|_| Err(RepoError::database("upsert_game", "connection reset")));

        let (use_case, _) = use_case(gateway, ImportSettings::default());
        let result = use_case.execute(FIXTURE).await;

        assert!(matches!(result, Err(ImportError::Repo(_))));
    }

    #[tokio::test]
    async fn unparseable_document_is_fatal() {
        let mut gateway = MockGameUpsertGateway::new();
        accept_all(&mut gateway);

        let (use_case, _) = use_case(gateway, ImportSettings::default());
        let result = use_case.execute("{\"games\": [").await;

        assert!(matches!(result, Err(ImportError::Parse(_))));
    }
}
