//! Per-run summary statistics derived from a trajectory.

use std::fmt;

use epinet_core::Trajectory;
use serde::{Deserialize, Serialize};

/// Headline numbers of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Largest infected count in the trajectory
    pub peak_infected: usize,
    /// Time at which the peak was first reached
    pub peak_time: f64,
    /// Infected count of the last record
    pub final_infected: usize,
    /// Number of applied events, excluding the initial record
    pub total_events: usize,
    /// Time of the last record
    pub final_time: f64,
}

impl RunSummary {
    /// Summarizes a trajectory. An empty trajectory gives all zeros.
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        let mut peak = (0usize, 0.0f64);
        for (i, point) in trajectory.iter().enumerate() {
            if i == 0 || point.infected > peak.0 {
                peak = (point.infected, point.time);
            }
        }

        let last = trajectory.last();
        Self {
            peak_infected: peak.0,
            peak_time: peak.1,
            final_infected: last.map_or(0, |p| p.infected),
            total_events: trajectory.event_count(),
            final_time: last.map_or(0.0, |p| p.time),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Peak infected: {} at t={:.6}",
            self.peak_infected, self.peak_time
        )?;
        writeln!(f, "Final infected: {}", self.final_infected)?;
        writeln!(f, "Total events: {}", self.total_events)?;
        write!(f, "Final time: {:.6}", self.final_time)
    }
}
