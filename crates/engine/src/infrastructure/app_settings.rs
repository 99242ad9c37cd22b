//! Import settings loaded from the environment.
//!
//! Supported environment variables:
//! - PLAYKIT_IMPORT_DB: SQLite database path (default `playkit.db`)
//! - PLAYKIT_IMPORT_MODE: `create` or `upsert` (default `create`)
//! - PLAYKIT_MAX_PAYLOAD_BYTES: payload size above which a warning is logged (default 4 MiB)
//! - PLAYKIT_DRY_RUN: validate only, never call the gateway (default false)
//!
//! Invalid values are logged and ignored so a typo never changes the
//! import behaviour silently.

use serde::{Deserialize, Serialize};

pub const DEFAULT_IMPORT_DB: &str = "playkit.db";
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// Import Mode
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Every game must be new; an existing `game_key` rejects the game.
    #[default]
    Create,
    /// Existing games are replaced in place, new ones are created.
    Upsert,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Create => "create",
            ImportMode::Upsert => "upsert",
        }
    }
}

impl std::fmt::Display for ImportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(ImportMode::Create),
            "upsert" | "update" => Ok(ImportMode::Upsert),
            other => Err(format!("unknown import mode: {}", other)),
        }
    }
}

// ============================================================================
// Import Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub database_path: String,
    pub mode: ImportMode,
    pub max_payload_bytes: usize,
    pub dry_run: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_IMPORT_DB.to_string(),
            mode: ImportMode::default(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            dry_run: false,
        }
    }
}

impl ImportSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup, starting from defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(path) = lookup("PLAYKIT_IMPORT_DB") {
            let path = path.trim();
            if path.is_empty() {
                tracing::warn!("PLAYKIT_IMPORT_DB is empty, ignoring");
            } else {
                settings.database_path = path.to_string();
            }
        }

        if let Some(val) = lookup("PLAYKIT_IMPORT_MODE") {
            match val.parse::<ImportMode>() {
                Ok(mode) => settings.mode = mode,
                Err(e) => tracing::warn!(val = %val, error = %e, "PLAYKIT_IMPORT_MODE invalid, ignoring"),
            }
        }

        if let Some(val) = lookup("PLAYKIT_MAX_PAYLOAD_BYTES") {
            match val.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => settings.max_payload_bytes = bytes,
                _ => tracing::warn!(
                    val = %val,
                    "PLAYKIT_MAX_PAYLOAD_BYTES is not a positive integer, ignoring"
                ),
            }
        }

        if let Some(val) = lookup("PLAYKIT_DRY_RUN") {
            match parse_flag(&val) {
                Some(flag) => settings.dry_run = flag,
                None => tracing::warn!(val = %val, "PLAYKIT_DRY_RUN is not a boolean, ignoring"),
            }
        }

        settings
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let settings = ImportSettings::from_lookup(|_| None);
        assert_eq!(settings, ImportSettings::default());
        assert_eq!(settings.max_payload_bytes, 4_194_304);
        assert_eq!(settings.mode, ImportMode::Create);
    }

    #[test]
    fn reads_every_variable() {
        let settings = ImportSettings::from_lookup(lookup_from(&[
            ("PLAYKIT_IMPORT_DB", "/tmp/games.db"),
            ("PLAYKIT_IMPORT_MODE", "Upsert"),
            ("PLAYKIT_MAX_PAYLOAD_BYTES", "1024"),
            ("PLAYKIT_DRY_RUN", "yes"),
        ]));

        assert_eq!(settings.database_path, "/tmp/games.db");
        assert_eq!(settings.mode, ImportMode::Upsert);
        assert_eq!(settings.max_payload_bytes, 1024);
        assert!(settings.dry_run);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let settings = ImportSettings::from_lookup(lookup_from(&[
            ("PLAYKIT_IMPORT_MODE", "merge"),
            ("PLAYKIT_MAX_PAYLOAD_BYTES", "0"),
            ("PLAYKIT_DRY_RUN", "maybe"),
        ]));

        assert_eq!(settings, ImportSettings::default());
    }

    #[test]
    fn import_mode_round_trips_through_display() {
        for mode in [ImportMode::Create, ImportMode::Upsert] {
            assert_eq!(mode.to_string().parse::<ImportMode>(), Ok(mode));
        }
    }
}
