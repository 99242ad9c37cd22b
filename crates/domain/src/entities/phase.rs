//! Phase entity - ordered containers that group the steps of a game

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::PhaseId;

/// An ordered section of a game (intro, rounds, finale).
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    /// Caller-provided ID; resolved IDs are assigned when the ID map is built
    pub id: Option<PhaseId>,
    /// Stable caller-supplied identifier for source-ID references
    pub source_id: Option<String>,
    /// 1-based position, contiguous within a game
    pub order: u32,
    pub phase_type: PhaseType,
    pub name: String,
    pub description: String,
    pub duration_seconds: Option<u32>,
    /// Whether participants see the countdown
    pub timer_visible: bool,
    /// Advance to the next phase when the timer runs out
    pub auto_advance: bool,
}

impl Phase {
    pub fn new(order: u32, name: impl Into<String>) -> Self {
        Self {
            id: None,
            source_id: None,
            order,
            phase_type: PhaseType::default(),
            name: name.into(),
            description: String::new(),
            duration_seconds: None,
            timer_visible: false,
            auto_advance: false,
        }
    }

    pub fn with_type(mut self, phase_type: PhaseType) -> Self {
        self.phase_type = phase_type;
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    Intro,
    #[default]
    Round,
    Finale,
    Break,
}

impl PhaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Round => "round",
            Self::Finale => "finale",
            Self::Break => "break",
        }
    }
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PhaseType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intro" => Ok(Self::Intro),
            "round" => Ok(Self::Round),
            "finale" => Ok(Self::Finale),
            "break" | "pause" => Ok(Self::Break),
            _ => Err(DomainError::parse(format!("Unknown phase type: {}", s))),
        }
    }
}
