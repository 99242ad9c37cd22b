use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::schemas;
use super::ArtifactSchema;

/// Closed set of artifact types the importer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Document,
    Keypad,
    Riddle,
    HintContainer,
    Token,
    Card,
    Image,
    Audio,
}

impl ArtifactType {
    pub const ALL: [ArtifactType; 8] = [
        Self::Document,
        Self::Keypad,
        Self::Riddle,
        Self::HintContainer,
        Self::Token,
        Self::Card,
        Self::Image,
        Self::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Keypad => "keypad",
            Self::Riddle => "riddle",
            Self::HintContainer => "hint_container",
            Self::Token => "token",
            Self::Card => "card",
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    /// The schema that owns this type's metadata shape.
    pub fn schema(&self) -> &'static ArtifactSchema {
        match self {
            Self::Document => &schemas::DOCUMENT,
            Self::Keypad => &schemas::KEYPAD,
            Self::Riddle => &schemas::RIDDLE,
            Self::HintContainer => &schemas::HINT_CONTAINER,
            Self::Token => &schemas::TOKEN,
            Self::Card => &schemas::CARD,
            Self::Image => &schemas::IMAGE,
            Self::Audio => &schemas::AUDIO,
        }
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "document" => Ok(Self::Document),
            "keypad" => Ok(Self::Keypad),
            "riddle" => Ok(Self::Riddle),
            "hint_container" | "hintcontainer" => Ok(Self::HintContainer),
            "token" => Ok(Self::Token),
            "card" => Ok(Self::Card),
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            _ => Err(DomainError::parse(format!("Unknown artifact type: \"{}\"", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_as_str() {
        for artifact_type in ArtifactType::ALL {
            assert_eq!(artifact_type.as_str().parse::<ArtifactType>().unwrap(), artifact_type);
            assert_eq!(artifact_type.schema().artifact_type, artifact_type);
        }
    }

    #[test]
    fn accepts_kebab_case() {
        assert_eq!(
            "Hint-Container".parse::<ArtifactType>().unwrap(),
            ArtifactType::HintContainer
        );
    }

    #[test]
    fn unknown_type_is_a_parse_error() {
        let err = "hologram".parse::<ArtifactType>().unwrap_err();
        assert!(err.to_string().contains("Unknown artifact type: \"hologram\""));
    }
}
