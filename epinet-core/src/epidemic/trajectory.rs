//! Recorded compartment counts over simulated time.

use serde::{Deserialize, Serialize};

/// Counts at one point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Simulated time of the record
    pub time: f64,
    /// Nodes not infected
    pub susceptible: usize,
    /// Nodes infected
    pub infected: usize,
}

/// Append-only sequence of trajectory points.
///
/// The first point is the initial state at time zero; one point follows
/// each applied event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a point.
    pub fn record(&mut self, time: f64, susceptible: usize, infected: usize) {
        debug_assert!(self.last().is_none_or(|p| p.time <= time));
        self.points.push(TrajectoryPoint {
            time,
            susceptible,
            infected,
        });
    }

    /// Returns all points.
    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the initial point.
    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    /// Returns the most recent point.
    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    /// Iterates over points in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryPoint> {
        self.points.iter()
    }

    /// Returns the recorded times.
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Returns the recorded infected counts.
    pub fn infected_counts(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.infected).collect()
    }

    /// Returns the number of events between the recorded points.
    pub fn event_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Consumes the trajectory, returning its points.
    pub fn into_points(self) -> Vec<TrajectoryPoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryPoint;
    type IntoIter = std::slice::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
