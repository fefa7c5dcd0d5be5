use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    controller::{ByteEnvelopePolicy, IdentityPolicy, LevelPolicy, RtksController},
    error::{Result, RtksError},
};

/// A controller whose policy was picked at runtime.
pub type DynController = RtksController<Box<dyn LevelPolicy + Send>>;

/// How the sparsity ladder is described in a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LadderConfig {
    Explicit {
        levels: Vec<f64>,
    },
    Geometric {
        densest: f64,
        sparsest: f64,
        steps: usize,
    },
}

impl LadderConfig {
    /// Resolves the ladder into its list of fractions, densest first.
    pub fn resolve(&self) -> Result<Vec<f64>> {
        match self {
            Self::Explicit { levels } => Ok(levels.clone()),
            Self::Geometric {
                densest,
                sparsest,
                steps,
            } => geometric_ladder(*densest, *sparsest, *steps),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyConfig {
    #[default]
    Identity,
    ByteEnvelope,
}

/// Configuration for an `RtksController`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub ladder: LadderConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl ControllerConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Builds the controller described by this configuration.
    ///
    /// # Returns
    /// A new controller or an `InvalidConfig` error if the ladder can't be built.
    pub fn build(&self) -> Result<DynController> {
        let levels = self.ladder.resolve()?;

        let policy: Box<dyn LevelPolicy + Send> = match self.policy {
            PolicyConfig::Identity => Box::new(IdentityPolicy),
            PolicyConfig::ByteEnvelope => Box::new(ByteEnvelopePolicy),
        };

        RtksController::with_policy(levels, policy)
    }
}

/// Upper bound on the amount of rungs a geometric ladder may have.
pub const MAX_LADDER_STEPS: usize = 1024;

/// Builds a ladder of `steps` fractions from `densest` down to `sparsest`,
/// where consecutive fractions share the same ratio.
///
/// # Arguments
/// * `densest` - The first fraction, in `(0, 1]`.
/// * `sparsest` - The last fraction, in `(0, densest]`.
/// * `steps` - The amount of levels, at most `MAX_LADDER_STEPS`.
///
/// # Returns
/// The ladder or an `InvalidConfig` error if the bounds or `steps` are unusable.
pub fn geometric_ladder(densest: f64, sparsest: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(RtksError::InvalidConfig(
            "geometric ladder needs at least one step".into(),
        ));
    }

    if steps > MAX_LADDER_STEPS {
        return Err(RtksError::InvalidConfig(format!(
            "geometric ladder can have at most {MAX_LADDER_STEPS} steps, got {steps}"
        )));
    }

    if !(densest.is_finite() && sparsest.is_finite()) {
        return Err(RtksError::InvalidConfig(
            "geometric ladder bounds must be finite".into(),
        ));
    }

    if !(0.0 < sparsest && sparsest <= densest && densest <= 1.0) {
        return Err(RtksError::InvalidConfig(format!(
            "geometric ladder bounds must satisfy 0 < sparsest <= densest <= 1, got densest={densest} sparsest={sparsest}"
        )));
    }

    if steps == 1 {
        return Ok(vec![densest]);
    }

    let ratio = (sparsest / densest).powf(1.0 / (steps - 1) as f64);
    let mut levels: Vec<f64> = (0..steps).map(|i| densest * ratio.powf(i as f64)).collect();

    // Pin the last rung so rounding never leaves it off the requested bound.
    levels[steps - 1] = sparsest;
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn geometric_ladder_has_constant_ratio() {
        let levels = geometric_ladder(1.0, 0.125, 4).unwrap();

        assert_eq!(levels.len(), 4);
        for (got, expected) in levels.iter().zip([1.0, 0.5, 0.25, 0.125]) {
            assert!((got - expected).abs() < EPS);
        }
    }

    #[test]
    fn geometric_ladder_hits_bounds() {
        let levels = geometric_ladder(1.0, 0.05, 6).unwrap();

        assert_eq!(levels[0], 1.0);
        assert_eq!(levels[5], 0.05);
        assert!(levels.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn geometric_ladder_single_step() {
        assert_eq!(geometric_ladder(0.8, 0.1, 1).unwrap(), vec![0.8]);
    }

    #[test]
    fn geometric_ladder_rejects_bad_input() {
        assert!(geometric_ladder(1.0, 0.1, 0).is_err());
        assert!(geometric_ladder(1.0, 0.0, 3).is_err());
        assert!(geometric_ladder(0.1, 1.0, 3).is_err());
        assert!(geometric_ladder(1.5, 0.1, 3).is_err());
        assert!(geometric_ladder(f64::NAN, 0.1, 3).is_err());
    }

    #[test]
    fn geometric_ladder_caps_steps() {
        assert_eq!(geometric_ladder(1.0, 0.01, MAX_LADDER_STEPS).unwrap().len(), MAX_LADDER_STEPS);

        let err = geometric_ladder(1.0, 0.01, MAX_LADDER_STEPS + 1).unwrap_err();
        assert!(matches!(err, RtksError::InvalidConfig(_)));

        let json = r#"{ "ladder": { "kind": "geometric", "densest": 1.0, "sparsest": 0.5, "steps": 4294967296 } }"#;
        let config = ControllerConfig::from_json_str(json).unwrap();
        assert!(matches!(config.build(), Err(RtksError::InvalidConfig(_))));
    }

    #[test]
    fn parses_explicit_ladder_with_default_policy() {
        let json = r#"{ "ladder": { "kind": "explicit", "levels": [1.0, 0.2, 0.5] } }"#;
        let config = ControllerConfig::from_json_str(json).unwrap();

        assert_eq!(config.policy, PolicyConfig::Identity);

        let controller = config.build().unwrap();
        assert_eq!(controller.levels(), &[1.0, 0.2, 0.5]);
        assert_eq!(controller.apply_envelope(0, 0, 0, &[100, 50, 10]), 0);
    }

    #[test]
    fn parses_geometric_ladder_with_envelope_policy() {
        let json = r#"{
            "ladder": { "kind": "geometric", "densest": 1.0, "sparsest": 0.25, "steps": 3 },
            "policy": "byte_envelope"
        }"#;
        let config = ControllerConfig::from_json_str(json).unwrap();
        let controller = config.build().unwrap();

        assert_eq!(controller.levels().len(), 3);
        assert_eq!(controller.apply_envelope(0, 0, 60, &[100, 50, 10]), 1);
    }

    #[test]
    fn empty_explicit_ladder_fails_to_build() {
        let json = r#"{ "ladder": { "kind": "explicit", "levels": [] } }"#;
        let config = ControllerConfig::from_json_str(json).unwrap();

        assert!(matches!(config.build(), Err(RtksError::InvalidConfig(_))));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = ControllerConfig::from_json_str("{ \"ladder\": 3 }").unwrap_err();
        assert!(matches!(err, RtksError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ControllerConfig::from_json_file("/nonexistent/rtks.json").unwrap_err();
        assert!(matches!(err, RtksError::Io(_)));
    }
}
