extern crate self as playkit_domain;

pub mod entities;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod value_objects;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    Artifact, ArtifactVariant, AssignmentStrategy, Game, GameStatus, Phase, PhaseType, PlayMode,
    Role, Step, Trigger, Visibility,
};

pub use error::DomainError;

// Re-export ID types
pub use ids::{
    ArtifactId, ArtifactVariantId, GameId, ImportRunId, PhaseId, RoleId, StepId, TriggerId,
};

// Re-export the metadata schema registry
pub use metadata::{
    normalize_and_validate, ArtifactSchema, ArtifactType, MetadataValidation,
    NormalizedArtifactMetadata,
};

pub use value_objects::{EntityKind, EntityRef, TriggerAction, TriggerCondition};
