//! Centralized configuration for epidemic runs.
//!
//! Rates, horizon and seeding live here so that callers and the batch layer
//! share one validated description of a run.

use serde::{Deserialize, Serialize};

use crate::epidemic::SimulationError;

/// Parameters of one epidemic simulation run.
///
/// Rates are per unit of simulated time. A node at risk with `k` infected
/// neighbors is infected at rate `transmission_rate * k`; every infected
/// node recovers at rate `recovery_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Transmission rate per infected neighbor (τ)
    pub transmission_rate: f64,
    /// Recovery rate per infected node (γ)
    pub recovery_rate: f64,
    /// Maximum simulated time; events past it are never applied
    pub horizon: f64,
    /// Seed for the run's random source. `None` draws one from the OS.
    pub deterministic_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            transmission_rate: 0.3,
            recovery_rate: 0.1,
            horizon: 50.0,
            deterministic_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Creates a configuration with the given rates and horizon and no seed.
    pub fn new(transmission_rate: f64, recovery_rate: f64, horizon: f64) -> Self {
        Self {
            transmission_rate,
            recovery_rate,
            horizon,
            deterministic_seed: None,
        }
    }

    /// Creates a configuration for deterministic testing.
    pub fn deterministic_testing() -> Self {
        Self {
            deterministic_seed: Some(42), // Fixed seed for reproducible tests
            ..Self::default()
        }
    }

    /// Returns a copy with the given seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.deterministic_seed = Some(seed);
        self
    }

    /// Basic reproduction ratio τ/γ of a single infected contact.
    ///
    /// Infinite when recovery is disabled.
    pub fn transmission_ratio(&self) -> f64 {
        if self.recovery_rate == 0.0 {
            f64::INFINITY
        } else {
            self.transmission_rate / self.recovery_rate
        }
    }

    /// Checks rates and horizon.
    ///
    /// Zero rates are accepted: a zero transmission rate gives a pure
    /// recovery process and a zero recovery rate gives pure spreading.
    ///
    /// # Errors
    ///
    /// - `SimulationError::InvalidRate` - A rate is negative or not finite
    /// - `SimulationError::InvalidHorizon` - Horizon is not finite and positive
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (name, value) in [
            ("transmission_rate", self.transmission_rate),
            ("recovery_rate", self.recovery_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidRate { name, value });
            }
        }

        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(SimulationError::InvalidHorizon {
                horizon: self.horizon,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert_eq!(
            SimulationConfig::deterministic_testing().deterministic_seed,
            Some(42)
        );
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        let config = SimulationConfig::new(-0.1, 0.1, 10.0);
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidRate {
                name: "transmission_rate",
                ..
            })
        ));

        let config = SimulationConfig::new(0.1, f64::NAN, 10.0);
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidRate {
                name: "recovery_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_horizon() {
        for horizon in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let config = SimulationConfig::new(0.1, 0.1, horizon);
            assert!(matches!(
                config.validate(),
                Err(SimulationError::InvalidHorizon { .. })
            ));
        }
    }

    #[test]
    fn test_zero_rates_are_accepted() {
        assert!(SimulationConfig::new(0.0, 0.5, 1.0).validate().is_ok());
        assert!(SimulationConfig::new(1.0, 0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_transmission_ratio() {
        assert!((SimulationConfig::new(0.3, 0.1, 1.0).transmission_ratio() - 3.0).abs() < 1e-12);
        assert!(SimulationConfig::new(0.3, 0.0, 1.0).transmission_ratio().is_infinite());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"transmission_rate": 0.5, "deterministic_seed": 7}"#)
                .unwrap();
        assert_eq!(config.transmission_rate, 0.5);
        assert_eq!(config.recovery_rate, 0.1);
        assert_eq!(config.deterministic_seed, Some(7));
    }
}
