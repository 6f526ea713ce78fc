//! Assignment matching and conflict resolution engine for SkyCoord.
//!
//! Given a roster snapshot, this crate computes pilot/drone eligibility for
//! missions, detects double-bookings and capability mismatches, ranks
//! candidate pairs deterministically, and proposes priority-driven
//! reassignments when an urgent mission cannot be served from free capacity.
//! All mutations are committed through the roster store, never applied here.

pub mod conflict;
pub mod error;
pub mod matching;
pub mod reassign;
pub mod request;

pub use conflict::{
    detect, find_capability_mismatches, find_double_bookings, CapabilityMismatch, ConflictReport,
    DoubleBooking, ResourceKind,
};
pub use error::EngineError;
pub use matching::{assign, find_candidates, CandidatePair};
pub use reassign::{commit_proposal, plan_reassignment, ReassignmentPlan};
pub use request::{dispatch, Request, Response};
