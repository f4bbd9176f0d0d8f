//! The scalar wave model contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::types::{OrbitalVelocity, Spectrum};

/// One tag per operation of [`ScalarWaveModel`].
///
/// Used to say *which* capability a model lacks when it answers
/// [`ModelError::Unimplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SetParameters,
    Elevation,
    DynamicPressure,
    OrbitalVelocity,
    Spectrum,
    AngularFrequenciesForRao,
    DirectionsForRao,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::SetParameters,
        Capability::Elevation,
        Capability::DynamicPressure,
        Capability::OrbitalVelocity,
        Capability::Spectrum,
        Capability::AngularFrequenciesForRao,
        Capability::DirectionsForRao,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::SetParameters => "set_parameters",
            Capability::Elevation => "elevation",
            Capability::DynamicPressure => "dynamic_pressure",
            Capability::OrbitalVelocity => "orbital_velocity",
            Capability::Spectrum => "spectrum",
            Capability::AngularFrequenciesForRao => "angular_frequencies_for_rao",
            Capability::DirectionsForRao => "directions_for_rao",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A wave model answering one point at one instant.
///
/// Coordinates are in meters in the Earth-fixed North-East-Down frame
/// (X towards North, Y towards East, Z downwards); `t` is simulation time in
/// seconds. Vectorization over grids is done by the servicer, not the model.
///
/// Every provided method answers [`ModelError::Unimplemented`] with its own
/// [`Capability`] tag, so a model only overrides what it supports and callers
/// can tell "not supported" apart from "computation failed".
pub trait ScalarWaveModel: Send + Sync {
    /// Configure the model from a YAML document. May be empty.
    ///
    /// Replaces the whole configuration. On error the previous configuration
    /// must still be in effect.
    fn set_parameters(&mut self, parameters: &str) -> ModelResult<()> {
        let _ = parameters;
        Err(ModelError::Unimplemented(Capability::SetParameters))
    }

    /// Free surface height along Z (oriented downwards), in meters.
    fn elevation(&self, x: f64, y: f64, t: f64) -> ModelResult<f64> {
        let _ = (x, y, t);
        Err(ModelError::Unimplemented(Capability::Elevation))
    }

    /// Dynamic pressure at (x, y, z, t), in Pascal.
    fn dynamic_pressure(&self, x: f64, y: f64, z: f64, t: f64) -> ModelResult<f64> {
        let _ = (x, y, z, t);
        Err(ModelError::Unimplemented(Capability::DynamicPressure))
    }

    /// Velocity of the wave particles relative to the ground, in m/s.
    fn orbital_velocity(&self, x: f64, y: f64, z: f64, t: f64) -> ModelResult<OrbitalVelocity> {
        let _ = (x, y, z, t);
        Err(ModelError::Unimplemented(Capability::OrbitalVelocity))
    }

    /// Linearized directional spectrum at (x, y, t).
    fn spectrum(&self, x: f64, y: f64, t: f64) -> ModelResult<Spectrum> {
        let _ = (x, y, t);
        Err(ModelError::Unimplemented(Capability::Spectrum))
    }

    /// Angular frequencies (rad/s) the spectrum is discretized at.
    fn angular_frequencies_for_rao(&self) -> ModelResult<Vec<f64>> {
        Err(ModelError::Unimplemented(Capability::AngularFrequenciesForRao))
    }

    /// Incidences (rad) the directional spreading is discretized at.
    /// 0 is for waves coming from the North, pi/2 from the East.
    fn directions_for_rao(&self) -> ModelResult<Vec<f64>> {
        Err(ModelError::Unimplemented(Capability::DirectionsForRao))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl ScalarWaveModel for Bare {}

    #[test]
    fn test_bare_model_reports_every_capability_as_unimplemented() {
        let mut model = Bare;

        assert_eq!(
            model.set_parameters(""),
            Err(ModelError::Unimplemented(Capability::SetParameters))
        );
        assert_eq!(
            model.elevation(0.0, 0.0, 0.0),
            Err(ModelError::Unimplemented(Capability::Elevation))
        );
        assert_eq!(
            model.dynamic_pressure(0.0, 0.0, 0.0, 0.0),
            Err(ModelError::Unimplemented(Capability::DynamicPressure))
        );
        assert_eq!(
            model.orbital_velocity(0.0, 0.0, 0.0, 0.0),
            Err(ModelError::Unimplemented(Capability::OrbitalVelocity))
        );
        assert_eq!(
            model.spectrum(0.0, 0.0, 0.0),
            Err(ModelError::Unimplemented(Capability::Spectrum))
        );
        assert_eq!(
            model.angular_frequencies_for_rao(),
            Err(ModelError::Unimplemented(Capability::AngularFrequenciesForRao))
        );
        assert_eq!(
            model.directions_for_rao(),
            Err(ModelError::Unimplemented(Capability::DirectionsForRao))
        );
    }

    #[test]
    fn test_capability_names_are_unique() {
        let mut names: Vec<_> = Capability::ALL.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Capability::ALL.len());
    }
}
