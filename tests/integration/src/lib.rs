//! End-to-end integration tests for the SkyCoord coordination engine
//!
//! This test suite validates:
//! - The full assign workflow from candidate search to committed roster state
//! - Priority-driven reassignment proposals and their explicit commit
//! - Stale-snapshot races resolved at commit time
//! - Roster ingestion with row-level error recovery and write-back fidelity

pub mod test_utils;

#[cfg(test)]
mod assignment_flow_tests;

#[cfg(test)]
mod reassignment_tests;

#[cfg(test)]
mod roster_roundtrip_tests;
