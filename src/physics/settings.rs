//! Simulation tunables.

use std::f32::consts::PI;

use glam::Vec2;

use crate::error::SettingsError;

/// How two fixtures' friction or restitution coefficients combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MixRule {
    /// `sqrt(a * b)`
    GeometricMean,
    Average,
    Multiply,
    Min,
    Max,
}

impl MixRule {
    /// Combined coefficient, never negative.
    pub fn mix(self, a: f32, b: f32) -> f32 {
        let (a, b) = (a.max(0.0), b.max(0.0));
        match self {
            MixRule::GeometricMean => (a * b).sqrt(),
            MixRule::Average => (a + b) * 0.5,
            MixRule::Multiply => a * b,
            MixRule::Min => a.min(b),
            MixRule::Max => a.max(b),
        }
    }
}

/// Configuration owned by a [`super::PhysicsWorld`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Gravity acceleration. Default: (0, -9.8).
    pub gravity: Vec2,
    /// Fixed timestep in seconds. Default: 1/60.
    pub fixed_timestep: f64,
    /// Maximum fixed steps per [`super::PhysicsWorld::step`] call. Default: 4.
    pub max_substeps: u32,

    /// Velocity solver passes per step. Default: 10.
    pub velocity_iterations: usize,
    /// Position solver passes per step. Default: 10.
    pub position_iterations: usize,

    /// Carry accumulated impulses over between steps. Default: true.
    pub warm_starting: bool,
    /// Largest distance between two proximity-matched contact points for
    /// them to be treated as the same contact. Default: 0.01.
    pub warm_start_distance: f32,
    /// Approach speed above which restitution is applied. Default: 1.0.
    pub restitution_velocity: f32,
    pub friction_mixing: MixRule,
    pub restitution_mixing: MixRule,

    /// Allowed penetration (slop). Default: 0.005.
    pub linear_tolerance: f32,
    /// Allowed joint angle error. Default: 2 degrees.
    pub angular_tolerance: f32,
    /// Cap on a single position correction. Default: 0.2.
    pub max_linear_correction: f32,
    /// Cap on a single angular position correction. Default: 8 degrees.
    pub max_angular_correction: f32,
    /// Fraction of the position error fixed per position iteration. Default: 0.2.
    pub baumgarte: f32,

    /// Largest translation per step. Default: 2.0.
    pub max_translation: f32,
    /// Largest rotation per step. Default: pi / 2.
    pub max_rotation: f32,

    /// Margin added to every fixture's bounding box in the broad phase. Default: 0.2.
    pub aabb_expansion: f32,

    pub gjk_max_iterations: usize,
    pub gjk_distance_epsilon: f32,
    pub epa_max_iterations: usize,
    pub epa_epsilon: f32,

    /// Largest condition estimate of a two-point contact system solved as a
    /// block. Default: 1000.
    pub max_condition: f32,

    /// Linear speed below which a body may fall asleep. Default: 0.01.
    pub sleep_linear_velocity: f32,
    /// Angular speed below which a body may fall asleep. Default: 2 degrees/s.
    pub sleep_angular_velocity: f32,
    /// Time an island must stay slow before sleeping. Default: 0.5 s.
    pub sleep_time: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.8),
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 4,
            velocity_iterations: 10,
            position_iterations: 10,
            warm_starting: true,
            warm_start_distance: 0.01,
            restitution_velocity: 1.0,
            friction_mixing: MixRule::GeometricMean,
            restitution_mixing: MixRule::Max,
            linear_tolerance: 0.005,
            angular_tolerance: 2.0_f32.to_radians(),
            max_linear_correction: 0.2,
            max_angular_correction: 8.0_f32.to_radians(),
            baumgarte: 0.2,
            max_translation: 2.0,
            max_rotation: 0.5 * PI,
            aabb_expansion: 0.2,
            gjk_max_iterations: 30,
            gjk_distance_epsilon: 1e-5,
            epa_max_iterations: 64,
            epa_epsilon: 1e-6,
            max_condition: 1000.0,
            sleep_linear_velocity: 0.01,
            sleep_angular_velocity: 2.0_f32.to_radians(),
            sleep_time: 0.5,
        }
    }
}

impl Settings {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.fixed_timestep > 0.0 && self.fixed_timestep.is_finite()) {
            return Err(SettingsError::NonPositive {
                name: "fixed_timestep",
                value: self.fixed_timestep,
            });
        }
        for (name, value) in [
            ("max_substeps", self.max_substeps as usize),
            ("velocity_iterations", self.velocity_iterations),
            ("gjk_max_iterations", self.gjk_max_iterations),
            ("epa_max_iterations", self.epa_max_iterations),
        ] {
            if value == 0 {
                return Err(SettingsError::ZeroIterations { name });
            }
        }
        for (name, value) in [
            ("max_linear_correction", self.max_linear_correction),
            ("max_angular_correction", self.max_angular_correction),
            ("max_translation", self.max_translation),
            ("max_rotation", self.max_rotation),
            ("gjk_distance_epsilon", self.gjk_distance_epsilon),
            ("epa_epsilon", self.epa_epsilon),
            ("max_condition", self.max_condition),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SettingsError::NonPositive {
                    name,
                    value: value as f64,
                });
            }
        }
        for (name, value) in [
            ("warm_start_distance", self.warm_start_distance),
            ("restitution_velocity", self.restitution_velocity),
            ("linear_tolerance", self.linear_tolerance),
            ("angular_tolerance", self.angular_tolerance),
            ("aabb_expansion", self.aabb_expansion),
            ("sleep_linear_velocity", self.sleep_linear_velocity),
            ("sleep_angular_velocity", self.sleep_angular_velocity),
            ("sleep_time", self.sleep_time),
        ] {
            if value < 0.0 || value.is_nan() {
                return Err(SettingsError::Negative {
                    name,
                    value: value as f64,
                });
            }
        }
        if !(self.baumgarte > 0.0 && self.baumgarte <= 1.0) {
            return Err(SettingsError::Baumgarte(self.baumgarte));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn dt(&self) -> f32 {
        self.fixed_timestep as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.velocity_iterations, 10);
        assert_eq!(settings.position_iterations, 10);
        assert_eq!(settings.max_substeps, 4);
        assert!((settings.fixed_timestep - 1.0 / 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_bad_values() {
        let settings = Settings {
            fixed_timestep: 0.0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NonPositive {
                name: "fixed_timestep",
                ..
            })
        ));

        let settings = Settings {
            velocity_iterations: 0,
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ZeroIterations {
                name: "velocity_iterations"
            })
        );

        let settings = Settings {
            linear_tolerance: -0.1,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Negative { .. })
        ));

        let settings = Settings {
            baumgarte: 1.5,
            ..Settings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::Baumgarte(1.5)));
    }

    #[test]
    fn test_mix_rules() {
        assert!((MixRule::GeometricMean.mix(0.4, 0.9) - 0.6).abs() < 1e-6);
        assert_eq!(MixRule::Max.mix(0.2, 0.5), 0.5);
        assert_eq!(MixRule::Min.mix(0.2, 0.5), 0.2);
        assert!((MixRule::Average.mix(0.2, 0.5) - 0.35).abs() < 1e-6);
        assert_eq!(MixRule::Multiply.mix(-1.0, 0.5), 0.0);
    }
}
