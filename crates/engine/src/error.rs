//! Engine error types

use skycoord_roster::StoreError;
use thiserror::Error;

/// Errors surfaced by engine operations
///
/// Every variant aborts only the operation that raised it; the roster store
/// is left in its last valid state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Request names a mission id not present in the snapshot
    ///
    /// Pilot and drone lookups happen inside the store, so those surface as
    /// [`StoreError`] variants through the `Store` arm.
    #[error("Unknown mission: {0}")]
    UnknownMission(String),

    /// Mission priority does not justify preempting an active assignment
    #[error("Mission {mission_id} priority {priority} does not justify preemption")]
    PreemptionNotJustified {
        /// Blocked mission
        mission_id: String,
        /// Its priority
        priority: String,
    },

    /// No free pair and no lower-priority assignment can serve the mission
    #[error("No eligible or reassignable resource for mission {0}")]
    NoEligibleOrReassignableResource(String),

    /// Store-level failure (commit race, invariant violation, ...)
    #[error(transparent)]
    Store(#[from] StoreError),
}
