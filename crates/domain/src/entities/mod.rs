//! Domain entities - Game content as described by an import document

mod artifact;
mod game;
mod phase;
mod role;
mod step;
mod trigger;

pub use artifact::{Artifact, ArtifactVariant, Visibility};
pub use game::{Game, GameStatus, PlayMode};
pub use phase::{Phase, PhaseType};
pub use role::{AssignmentStrategy, Role};
pub use step::Step;
pub use trigger::Trigger;
