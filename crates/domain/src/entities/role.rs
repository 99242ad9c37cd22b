//! Role entity - participant roles handed out at session start

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::RoleId;

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: Option<RoleId>,
    pub source_id: Option<String>,
    pub order: u32,
    pub name: String,
    /// Shown to every participant
    pub public_description: String,
    /// Shown only to participants holding this role
    pub private_instructions: String,
    pub min_count: u32,
    pub max_count: Option<u32>,
    pub assignment_strategy: AssignmentStrategy,
}

impl Role {
    pub fn new(order: u32, name: impl Into<String>) -> Self {
        Self {
            id: None,
            source_id: None,
            order,
            name: name.into(),
            public_description: String::new(),
            private_instructions: String::new(),
            min_count: 1,
            max_count: None,
            assignment_strategy: AssignmentStrategy::default(),
        }
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_counts(mut self, min_count: u32, max_count: Option<u32>) -> Self {
        self.min_count = min_count;
        self.max_count = max_count;
        self
    }

    /// Check the `min_count <= max_count` invariant.
    pub fn validate_counts(&self) -> Result<(), DomainError> {
        match self.max_count {
            Some(max) if max < self.min_count => Err(DomainError::constraint(format!(
                "max_count {} is below min_count {}",
                max, self.min_count
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    #[default]
    Random,
    LeaderPicks,
    PlayerPicks,
}

impl AssignmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::LeaderPicks => "leader_picks",
            Self::PlayerPicks => "player_picks",
        }
    }
}

impl std::fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "random" => Ok(Self::Random),
            "leader_picks" | "leaderpicks" | "leader" => Ok(Self::LeaderPicks),
            "player_picks" | "playerpicks" | "player" => Ok(Self::PlayerPicks),
            _ => Err(DomainError::parse(format!(
                "Unknown assignment strategy: {}",
                s
            ))),
        }
    }
}
