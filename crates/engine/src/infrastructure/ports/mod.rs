//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - The bulk upsert gateway (could swap SQLite -> a remote content service)
//! - Clock/Random (for testing)

mod error;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::GameUpsertGateway;

// =============================================================================
// Types from types module (re-export for visibility)
// =============================================================================
pub use types::{
    ArtifactRow, ArtifactVariantRow, GameRow, GameUpsertPayload, PhaseRow, ResolvedTrigger,
    RoleRow, StepRow, UpsertCounts, UpsertResponse,
};

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use repos::MockGameUpsertGateway;
#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};
