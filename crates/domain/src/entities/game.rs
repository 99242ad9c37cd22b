//! Game entity - the root unit of a content import
//!
//! A game document is closed-world: phases, steps, roles, artifacts (with
//! their variants) and triggers only ever reference entities that live in
//! the same document.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::{Artifact, ArtifactVariant, Phase, Role, Step, Trigger};

/// A complete game as described by one import document.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    /// Unique slug identifying the game across imports
    pub game_key: String,
    pub name: String,
    pub description: Option<String>,
    pub play_mode: PlayMode,
    pub status: GameStatus,
    pub phases: Vec<Phase>,
    pub steps: Vec<Step>,
    pub roles: Vec<Role>,
    pub artifacts: Vec<Artifact>,
    pub triggers: Vec<Trigger>,
}

impl Game {
    pub fn new(game_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            game_key: game_key.into(),
            name: name.into(),
            description: None,
            play_mode: PlayMode::default(),
            status: GameStatus::default(),
            phases: Vec::new(),
            steps: Vec::new(),
            roles: Vec::new(),
            artifacts: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.play_mode = play_mode;
        self
    }

    pub fn with_status(mut self, status: GameStatus) -> Self {
        self.status = status;
        self
    }

    /// All variants across all artifacts, in document order, paired with
    /// the artifact that owns them.
    pub fn artifact_variants(&self) -> impl Iterator<Item = (&Artifact, &ArtifactVariant)> {
        self.artifacts
            .iter()
            .flat_map(|artifact| artifact.variants.iter().map(move |v| (artifact, v)))
    }

    pub fn variant_count(&self) -> usize {
        self.artifacts.iter().map(|a| a.variants.len()).sum()
    }

    /// Label used to prefix import messages for this game.
    pub fn label(&self) -> &str {
        &self.game_key
    }
}

/// How a game session is run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Plain step-by-step play without roles or artifacts
    #[default]
    Basic,
    /// A leader drives the session from a facilitator console
    Facilitated,
    /// Participants play on their own devices with roles and artifacts
    Participants,
}

impl PlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Facilitated => "facilitated",
            Self::Participants => "participants",
        }
    }
}

impl std::fmt::Display for PlayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "facilitated" => Ok(Self::Facilitated),
            "participants" => Ok(Self::Participants),
            _ => Err(DomainError::parse(format!("Unknown play mode: {}", s))),
        }
    }
}

/// Publication status of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(DomainError::parse(format!("Unknown game status: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Artifact, ArtifactVariant};

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Participants".parse::<PlayMode>().unwrap(), PlayMode::Participants);
        assert_eq!(" published ".parse::<GameStatus>().unwrap(), GameStatus::Published);
        assert!("solo".parse::<PlayMode>().is_err());
    }

    #[test]
    fn artifact_variants_flatten_in_document_order() {
        let mut game = Game::new("escape-room", "Escape Room");
        let mut first = Artifact::new(1, "document", "Letter");
        first.variants.push(ArtifactVariant::public(1, "Front"));
        first.variants.push(ArtifactVariant::public(2, "Back"));
        let mut second = Artifact::new(2, "keypad", "Door");
        second.variants.push(ArtifactVariant::public(1, "Panel"));
        game.artifacts = vec![first, second];

        let titles: Vec<_> = game
            .artifact_variants()
            .map(|(artifact, variant)| format!("{}:{}", artifact.order, variant.title))
            .collect();

        assert_eq!(titles, vec!["1:Front", "1:Back", "2:Panel"]);
        assert_eq!(game.variant_count(), 3);
    }
}
