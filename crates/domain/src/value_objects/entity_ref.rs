//! Symbolic references between entities of one game document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity kinds that can be the target of an import-time reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Phase,
    Step,
    Role,
    Artifact,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Phase, Self::Step, Self::Role, Self::Artifact];

    /// Lowercase label used in messages and derived-ID namespaces.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phase => "phase",
            Self::Step => "step",
            Self::Role => "role",
            Self::Artifact => "artifact",
        }
    }

    /// Capitalized label for warnings that start with the kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Phase => "Phase",
            Self::Step => "Step",
            Self::Role => "Role",
            Self::Artifact => "Artifact",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to another entity in the same document.
///
/// `Order` points at the entity's 1-based `order`. `Id` carries either a
/// caller-supplied source ID or an already-resolved UUID; which one it is
/// gets decided at resolution time (source IDs win over UUID passthrough).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Order(u32),
    Id(String),
}

impl EntityRef {
    pub fn order(order: u32) -> Self {
        Self::Order(order)
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn as_order(&self) -> Option<u32> {
        match self {
            Self::Order(order) => Some(*order),
            Self::Id(_) => None,
        }
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Self::Order(_) => None,
            Self::Id(id) => Some(id),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(order) => write!(f, "order {}", order),
            Self::Id(id) => write!(f, "id \"{}\"", id),
        }
    }
}
