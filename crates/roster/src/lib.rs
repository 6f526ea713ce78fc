//! Roster store and tabular storage adapters for SkyCoord.
//!
//! The store is the single writer for a coordination session: every state
//! change goes through [`store::RosterStore::apply`], which re-validates
//! preconditions and invariants at commit time and never commits a partial
//! mutation. Ingestion and egress speak the fixed-column tabular contract
//! used by the external spreadsheet source of truth.

pub mod egress;
pub mod ingest;
pub mod store;

pub use egress::{drones_to_csv, missions_to_csv, pilots_to_csv, write_roster};
pub use ingest::{
    load_drones, load_missions, load_pilots, parse_drones, parse_missions, parse_pilots,
    IngestError, RowError,
};
pub use store::{
    Applied, Mutation, NewDrone, NewMission, NewPilot, RosterSnapshot, RosterStore, StoreError,
};
