use crate::unit::UnitType;

pub const BOARD_SIZE: usize = 10;
pub const NUM_UNITS: usize = 5;
pub const UNIT_TYPES: [UnitType; NUM_UNITS] = [
    UnitType::new("general", "General Wiggler", 5, "pink"),
    UnitType::new("fort", "Snow Fort", 4, "slate"),
    UnitType::new("sled", "Sled Team", 3, "amber"),
    UnitType::new("snowman", "Tactical Snowman", 3, "white"),
    UnitType::new("scout", "Scout Worm", 2, "green"),
];

/// Random placement gives up on a unit after this many samples.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Total number of unit segments in the active catalog.
pub const fn total_segments() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < NUM_UNITS {
        total += UNIT_TYPES[i].size();
        i += 1;
    }
    total
}

/// Convert a unit name string to the catalog entry carrying it. Returns
/// `None` if the name does not match any defined unit.
pub fn unit_type_by_name(name: &str) -> Option<&'static UnitType> {
    UNIT_TYPES.iter().find(|t| t.name() == name)
}

/// Runtime knobs for the async orchestrator.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Pause before the scripted opponent asks its oracle for a move.
    pub opponent_delay: std::time::Duration,
    /// Upper bound on a single oracle call before falling back to random.
    pub oracle_timeout: std::time::Duration,
}

#[cfg(feature = "std")]
impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            opponent_delay: std::time::Duration::from_millis(1500),
            oracle_timeout: std::time::Duration::from_secs(10),
        }
    }
}
