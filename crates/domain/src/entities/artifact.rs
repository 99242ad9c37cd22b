//! Artifact entity - in-game objects with type-specific metadata
//!
//! The artifact type is kept as the raw input string. Whether the type is
//! known, and whether its metadata has the right shape, is decided by the
//! metadata schema registry so every artifact gets its own validation result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::ids::{ArtifactId, ArtifactVariantId};
use crate::value_objects::EntityRef;

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub id: Option<ArtifactId>,
    pub source_id: Option<String>,
    pub order: u32,
    pub artifact_type: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Free-form metadata whose shape depends on `artifact_type`
    pub metadata: Map<String, Value>,
    pub variants: Vec<ArtifactVariant>,
}

impl Artifact {
    pub fn new(order: u32, artifact_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            source_id: None,
            order,
            artifact_type: artifact_type.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            metadata: Map::new(),
            variants: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_variant(mut self, variant: ArtifactVariant) -> Self {
        self.variants.push(variant);
        self
    }
}

/// A visibility-scoped rendering of an artifact's content.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactVariant {
    pub id: Option<ArtifactVariantId>,
    /// 1-based position within the owning artifact
    pub order: u32,
    pub title: String,
    pub body: String,
    pub visibility: Visibility,
    /// Required when `visibility` is `RolePrivate`
    pub visible_to_role: Option<EntityRef>,
}

impl ArtifactVariant {
    pub fn public(order: u32, title: impl Into<String>) -> Self {
        Self {
            id: None,
            order,
            title: title.into(),
            body: String::new(),
            visibility: Visibility::Public,
            visible_to_role: None,
        }
    }

    pub fn role_private(order: u32, title: impl Into<String>, role: EntityRef) -> Self {
        Self {
            visibility: Visibility::RolePrivate,
            visible_to_role: Some(role),
            ..Self::public(order, title)
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    RolePrivate,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::RolePrivate => "role_private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "public" => Ok(Self::Public),
            "role_private" | "roleprivate" | "private" => Ok(Self::RolePrivate),
            _ => Err(DomainError::parse(format!("Unknown visibility: {}", s))),
        }
    }
}
