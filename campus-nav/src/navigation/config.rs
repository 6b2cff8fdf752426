//! Distance thresholds for the navigation tracker.

use thiserror::Error;

/// Distance to a step's end below which the next step becomes current.
pub const DEFAULT_STEP_ADVANCE_M: f64 = 50.0;

/// Distance to the final step's end below which the destination is reached.
pub const DEFAULT_ARRIVAL_M: f64 = 10.0;

/// Distance from both ends of the current step beyond which the user is
/// considered off route.
pub const DEFAULT_OFF_ROUTE_M: f64 = 100.0;

/// A threshold that is not a finite, positive distance.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{name} must be a positive distance, got {value}")]
pub struct InvalidThreshold {
    /// Field name, e.g. `off_route_m`.
    pub name: &'static str,
    pub value: f64,
}

/// Tracker thresholds, all in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    /// Advance when closer than this to the current step's end.
    pub step_advance_m: f64,

    /// Arrive when closer than this to the last step's end.
    pub arrival_m: f64,

    /// Off route when farther than this from both step endpoints.
    pub off_route_m: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            step_advance_m: DEFAULT_STEP_ADVANCE_M,
            arrival_m: DEFAULT_ARRIVAL_M,
            off_route_m: DEFAULT_OFF_ROUTE_M,
        }
    }
}

impl TrackerConfig {
    /// Set the step advance threshold.
    pub fn with_step_advance_m(mut self, meters: f64) -> Self {
        self.step_advance_m = meters;
        self
    }

    /// Set the arrival threshold.
    pub fn with_arrival_m(mut self, meters: f64) -> Self {
        self.arrival_m = meters;
        self
    }

    /// Set the off-route threshold.
    pub fn with_off_route_m(mut self, meters: f64) -> Self {
        self.off_route_m = meters;
        self
    }

    /// Check that every threshold is a finite, positive distance.
    pub fn validate(&self) -> Result<(), InvalidThreshold> {
        for (name, value) in [
            ("step_advance_m", self.step_advance_m),
            ("arrival_m", self.arrival_m),
            ("off_route_m", self.off_route_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(InvalidThreshold { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.step_advance_m, 50.0);
        assert_eq!(config.arrival_m, 10.0);
        assert_eq!(config.off_route_m, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = TrackerConfig::default()
            .with_step_advance_m(30.0)
            .with_arrival_m(5.0)
            .with_off_route_m(150.0);
        assert_eq!(config.step_advance_m, 30.0);
        assert_eq!(config.arrival_m, 5.0);
        assert_eq!(config.off_route_m, 150.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(TrackerConfig::default()
            .with_arrival_m(0.0)
            .validate()
            .is_err());
        let err = TrackerConfig::default()
            .with_off_route_m(f64::INFINITY)
            .validate()
            .unwrap_err();
        assert_eq!(err.name, "off_route_m");
        assert_eq!(err.to_string(), "off_route_m must be a positive distance, got inf");

        let err = TrackerConfig::default()
            .with_step_advance_m(f64::NAN)
            .validate()
            .unwrap_err();
        assert_eq!(err.name, "step_advance_m");
    }
}
