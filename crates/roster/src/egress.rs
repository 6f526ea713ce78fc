//! Whole-snapshot tabular write-back
//!
//! The external sheet is the source of truth and is always overwritten in
//! full, never patched per record. The caller serializes mutations before
//! invoking write-back, so two overlapping sessions cannot interleave rows.

#![warn(missing_docs)]

use crate::ingest::IngestError;
use crate::store::RosterSnapshot;
use skycoord_domain::{Drone, Mission, Pilot};
use std::path::Path;
use tracing::info;

/// Quote a cell when it contains a delimiter, quote, or newline
fn escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn assignment_cell(assignment: &Option<String>) -> String {
    assignment.clone().unwrap_or_else(|| "-".to_string())
}

/// Render the full pilot table
pub fn pilots_to_csv(pilots: &[Pilot]) -> String {
    let mut out = String::from("id,name,location,skills,status,current_assignment\n");
    for p in pilots {
        let skills = p
            .skills
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            escape(&p.id),
            escape(&p.name),
            escape(&p.location),
            escape(&skills),
            p.status,
            escape(&assignment_cell(&p.current_assignment)),
        ));
    }
    out
}

/// Render the full drone table
pub fn drones_to_csv(drones: &[Drone]) -> String {
    let mut out = String::from("id,model,capabilities,location,status,current_assignment\n");
    for d in drones {
        let capabilities = d
            .capabilities
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            escape(&d.id),
            escape(&d.model),
            escape(&capabilities),
            escape(&d.location),
            d.status,
            escape(&assignment_cell(&d.current_assignment)),
        ));
    }
    out
}

/// Render the full mission table
pub fn missions_to_csv(missions: &[Mission]) -> String {
    let mut out = String::from("id,type,location,start,end,priority,status\n");
    for m in missions {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            escape(&m.id),
            m.mission_type,
            escape(&m.location),
            m.window.start.format("%Y-%m-%d"),
            m.window.end.format("%Y-%m-%d"),
            m.priority,
            m.status,
        ));
    }
    out
}

/// Overwrite all three roster tables with the given snapshot
pub fn write_roster<P: AsRef<Path>>(
    snapshot: &RosterSnapshot,
    pilot_path: P,
    drone_path: P,
    mission_path: P,
) -> Result<(), IngestError> {
    std::fs::write(&pilot_path, pilots_to_csv(&snapshot.pilots))?;
    std::fs::write(&drone_path, drones_to_csv(&snapshot.drones))?;
    std::fs::write(&mission_path, missions_to_csv(&snapshot.missions))?;
    info!(
        pilots = snapshot.pilots.len(),
        drones = snapshot.drones.len(),
        missions = snapshot.missions.len(),
        "roster written back"
    );
    Ok(())
}
