//! Executing units of work.
//!
//! A unit descends `depth` nested calls. If it has `fail` set, the bottom
//! call signals that fatal error. If it has `checkpoint_at` set, the call at
//! that level establishes an inner checkpoint, so the failure is recovered
//! there instead of at the unit boundary.

use tracing::{debug, info, warn};
use trap_core::{Outcome, establish_checkpoint, fatal};

use crate::config::UnitConfig;

/// How a unit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// Reached the bottom without a fatal error.
    Completed {
        /// Nested levels descended.
        levels: u32,
    },
    /// A fatal error was caught by the unit's own inner checkpoint.
    Recovered {
        /// Level of the checkpoint that resumed.
        level: u32,
        /// Signalled message.
        message: String,
    },
    /// A fatal error reached the unit boundary.
    Failed {
        /// Signalled message.
        message: String,
    },
}

impl UnitStatus {
    /// Whether the unit counts as failed.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, UnitStatus::Failed { .. })
    }
}

/// Report for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// Unit name.
    pub name: String,
    /// How it ended.
    pub status: UnitStatus,
}

/// Reports for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Per-unit reports, in run order.
    pub reports: Vec<UnitReport>,
}

impl RunSummary {
    /// Number of units that failed.
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Number of units recovered by an inner checkpoint.
    pub fn recovered(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, UnitStatus::Recovered { .. }))
            .count()
    }
}

/// Run one unit under its own checkpoint.
pub fn run_unit(unit: &UnitConfig) -> UnitReport {
    debug!(unit = %unit.name, depth = unit.depth, "running unit");
    let status = match establish_checkpoint(|| descend(unit, 0)) {
        Outcome::Established(status) => status,
        Outcome::Resumed(message) => UnitStatus::Failed { message },
    };

    match &status {
        UnitStatus::Completed { levels } => info!(unit = %unit.name, levels, "unit completed"),
        UnitStatus::Recovered { level, message } => {
            info!(unit = %unit.name, level, %message, "unit recovered at inner checkpoint")
        }
        UnitStatus::Failed { message } => warn!(unit = %unit.name, %message, "unit failed"),
    }

    UnitReport {
        name: unit.name.clone(),
        status,
    }
}

/// Run every unit in order.
pub fn run_units(units: &[UnitConfig]) -> RunSummary {
    RunSummary {
        reports: units.iter().map(run_unit).collect(),
    }
}

fn descend(unit: &UnitConfig, level: u32) -> UnitStatus {
    if unit.checkpoint_at == Some(level) {
        return match establish_checkpoint(|| step(unit, level)) {
            Outcome::Established(status) => status,
            Outcome::Resumed(message) => UnitStatus::Recovered { level, message },
        };
    }
    step(unit, level)
}

fn step(unit: &UnitConfig, level: u32) -> UnitStatus {
    if level < unit.depth {
        return descend(unit, level + 1);
    }
    if let Some(message) = &unit.fail {
        fatal!("{message}");
    }
    UnitStatus::Completed { levels: level }
}
