use skycoord_core::Config;
use skycoord_roster::{
    load_drones, load_missions, load_pilots, RosterSnapshot, RosterStore, RowError,
};
use tokio::sync::Mutex;
use tracing::info;

pub struct AppState {
    pub config: Config,
    /// Single writer: every mutating request takes this lock for the whole
    /// dispatch-and-write-back critical section.
    pub store: Mutex<RosterStore>,
    pub load_warnings: Vec<RowError>,
}

impl AppState {
    pub fn load(config: Config) -> anyhow::Result<Self> {
        let (pilots, mut warnings) = load_pilots(&config.roster.pilot_csv)?;
        let (drones, drone_warnings) = load_drones(&config.roster.drone_csv)?;
        let (missions, mission_warnings) = load_missions(&config.roster.mission_csv)?;
        warnings.extend(drone_warnings);
        warnings.extend(mission_warnings);

        info!(
            pilots = pilots.len(),
            drones = drones.len(),
            missions = missions.len(),
            skipped_rows = warnings.len(),
            "roster loaded"
        );

        let store = RosterStore::from_snapshot(RosterSnapshot {
            pilots,
            drones,
            missions,
        });
        Ok(AppState {
            config,
            store: Mutex::new(store),
            load_warnings: warnings,
        })
    }
}
