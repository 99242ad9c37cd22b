//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    app_settings::ImportSettings,
    clock::{SystemClock, SystemRandom},
    ports::{ClockPort, GameUpsertGateway, RandomPort, RepoError},
    upsert_gateway::SqliteGameUpsertGateway,
};
use crate::use_cases;

/// Main application state.
pub struct App {
    pub settings: ImportSettings,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub import: use_cases::ImportUseCases,
}

impl App {
    /// Compose the app around any gateway implementation.
    pub fn new(
        settings: ImportSettings,
        gateway: Arc<dyn GameUpsertGateway>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let import_games = Arc::new(use_cases::import::ImportGames::new(
            gateway,
            clock,
            random,
            settings.clone(),
        ));

        Self {
            settings,
            use_cases: UseCases {
                import: use_cases::ImportUseCases::new(import_games),
            },
        }
    }

    /// Compose the app with system clock/random and the SQLite gateway at
    /// `settings.database_path`.
    pub async fn connect(settings: ImportSettings) -> Result<Self, RepoError> {
        let clock_port: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let random_port: Arc<dyn RandomPort> = Arc::new(SystemRandom::new());

        tracing::info!(path = %settings.database_path, "Opening import database");
        let gateway: Arc<dyn GameUpsertGateway> = Arc::new(
            SqliteGameUpsertGateway::new(&settings.database_path, clock_port.clone()).await?,
        );

        Ok(Self::new(settings, gateway, clock_port, random_port))
    }
}
