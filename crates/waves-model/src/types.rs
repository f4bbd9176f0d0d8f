//! Value types returned by wave models.

use serde::{Deserialize, Serialize};

/// Orbital velocity of a wave particle, projected on the NED axes (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrbitalVelocity {
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl OrbitalVelocity {
    pub fn new(vx: f64, vy: f64, vz: f64) -> Self {
        Self { vx, vy, vz }
    }
}

/// Discretized directional wave spectrum.
///
/// `si`, `omega` and `k` are indexed by frequency; `dj`, `psi` and `phase`
/// by direction. `phase[i][j]` is the (time invariant) random phase of the
/// component at direction `i` and frequency `j`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spectrum {
    /// Spectral density for each omega (s m^2/rad).
    pub si: Vec<f64>,
    /// Spatial spreading for each psi (1/rad).
    pub dj: Vec<f64>,
    /// Angular frequencies (rad/s).
    pub omega: Vec<f64>,
    /// Directions between 0 and 2pi (rad).
    pub psi: Vec<f64>,
    /// Wave number for each frequency (rad/m).
    pub k: Vec<f64>,
    /// Random phases, one row per direction, one column per frequency (rad).
    pub phase: Vec<Vec<f64>>,
}

impl Spectrum {
    /// Check the length invariants between the parallel sequences.
    pub fn validate(&self) -> Result<(), String> {
        let frequencies = self.omega.len();
        let directions = self.psi.len();

        if self.si.len() != frequencies || self.k.len() != frequencies {
            return Err(format!(
                "spectrum has {} frequencies but {} densities and {} wave numbers",
                frequencies,
                self.si.len(),
                self.k.len()
            ));
        }
        if self.dj.len() != directions || self.phase.len() != directions {
            return Err(format!(
                "spectrum has {} directions but {} spreading values and {} phase rows",
                directions,
                self.dj.len(),
                self.phase.len()
            ));
        }
        if let Some((row, phases)) = self
            .phase
            .iter()
            .enumerate()
            .find(|(_, phases)| phases.len() != frequencies)
        {
            return Err(format!(
                "phase row {} has {} entries, expected {}",
                row,
                phases.len(),
                frequencies
            ));
        }
        Ok(())
    }
}

/// The frequency/direction grid a model was discretized on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RaoSupport {
    pub angular_frequencies: Vec<f64>,
    pub directions: Vec<f64>,
}
