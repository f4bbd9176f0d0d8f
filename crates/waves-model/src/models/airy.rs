use tracing::debug;

use crate::error::{ModelError, ModelResult, ParameterError};
use crate::model::ScalarWaveModel;
use crate::parameters::ParameterDocument;
use crate::types::{OrbitalVelocity, Spectrum};

const DEFAULT_RHO: f64 = 1026.0;
const DEFAULT_G: f64 = 9.81;

/// Parameters of a regular (single component) Airy wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiryParameters {
    /// Amplitude (m).
    pub amplitude: f64,
    /// Angular frequency (rad/s).
    pub omega: f64,
    /// Direction the waves propagate to, from North towards East (rad).
    pub psi: f64,
    /// Phase (rad).
    pub phase: f64,
    /// Water density (kg/m^3).
    pub rho: f64,
    /// Gravity (m/s^2).
    pub g: f64,
}

impl AiryParameters {
    /// Read parameters from a YAML document.
    ///
    /// Required: `amplitude`, `omega`, `psi`. Optional: `phase` (0),
    /// `rho` (1026), `g` (9.81).
    pub fn from_document(document: &ParameterDocument) -> Result<Self, ParameterError> {
        let parameters = Self {
            amplitude: document.required_f64("amplitude")?,
            omega: document.required_f64("omega")?,
            psi: document.required_f64("psi")?,
            phase: document.optional_f64("phase", 0.0)?,
            rho: document.optional_f64("rho", DEFAULT_RHO)?,
            g: document.optional_f64("g", DEFAULT_G)?,
        };
        parameters.validate()?;
        Ok(parameters)
    }

    fn validate(&self) -> Result<(), ParameterError> {
        if !(self.amplitude >= 0.0 && self.amplitude.is_finite()) {
            return Err(ParameterError::out_of_range("amplitude", "must be finite and >= 0"));
        }
        if !(self.omega > 0.0 && self.omega.is_finite()) {
            return Err(ParameterError::out_of_range("omega", "must be finite and > 0"));
        }
        if !self.psi.is_finite() {
            return Err(ParameterError::out_of_range("psi", "must be finite"));
        }
        if !self.phase.is_finite() {
            return Err(ParameterError::out_of_range("phase", "must be finite"));
        }
        if !(self.rho > 0.0 && self.rho.is_finite()) {
            return Err(ParameterError::out_of_range("rho", "must be finite and > 0"));
        }
        if !(self.g > 0.0 && self.g.is_finite()) {
            return Err(ParameterError::out_of_range("g", "must be finite and > 0"));
        }
        Ok(())
    }

    /// Deep water wave number (rad/m).
    pub fn wave_number(&self) -> f64 {
        self.omega * self.omega / self.g
    }

    fn theta(&self, x: f64, y: f64, t: f64) -> f64 {
        self.wave_number() * (x * self.psi.cos() + y * self.psi.sin()) - self.omega * t
            + self.phase
    }

    fn attenuation(&self, z: f64) -> f64 {
        (-self.wave_number() * z).exp()
    }
}

/// Linear deep-water wave with a single frequency and direction.
///
/// Elevation follows the Z-down convention: a crest is a negative `z`.
#[derive(Debug, Clone, Default)]
pub struct AiryModel {
    parameters: Option<AiryParameters>,
}

impl AiryModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self) -> Option<&AiryParameters> {
        self.parameters.as_ref()
    }

    fn configured(&self) -> ModelResult<&AiryParameters> {
        self.parameters.as_ref().ok_or_else(|| {
            ModelError::computation("model has not been configured: call set_parameters first")
        })
    }
}

fn ensure_finite(coordinates: &[f64]) -> ModelResult<()> {
    if coordinates.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::computation(format!(
            "non-finite coordinate in {:?}",
            coordinates
        )))
    }
}

impl ScalarWaveModel for AiryModel {
    fn set_parameters(&mut self, parameters: &str) -> ModelResult<()> {
        let document = ParameterDocument::parse(parameters)?;
        let parsed = AiryParameters::from_document(&document)?;
        debug!(
            amplitude = parsed.amplitude,
            omega = parsed.omega,
            psi = parsed.psi,
            "configured airy wave"
        );
        self.parameters = Some(parsed);
        Ok(())
    }

    fn elevation(&self, x: f64, y: f64, t: f64) -> ModelResult<f64> {
        let p = self.configured()?;
        ensure_finite(&[x, y, t])?;
        Ok(-p.amplitude * p.theta(x, y, t).sin())
    }

    fn dynamic_pressure(&self, x: f64, y: f64, z: f64, t: f64) -> ModelResult<f64> {
        let p = self.configured()?;
        ensure_finite(&[x, y, z, t])?;
        Ok(p.rho * p.g * p.amplitude * p.attenuation(z) * p.theta(x, y, t).sin())
    }

    fn orbital_velocity(&self, x: f64, y: f64, z: f64, t: f64) -> ModelResult<OrbitalVelocity> {
        let p = self.configured()?;
        ensure_finite(&[x, y, z, t])?;
        let theta = p.theta(x, y, t);
        let scale = p.amplitude * p.omega * p.attenuation(z);
        let horizontal = scale * theta.sin();
        Ok(OrbitalVelocity::new(
            horizontal * p.psi.cos(),
            horizontal * p.psi.sin(),
            scale * theta.cos(),
        ))
    }

    fn spectrum(&self, x: f64, y: f64, t: f64) -> ModelResult<Spectrum> {
        let p = self.configured()?;
        ensure_finite(&[x, y, t])?;
        Ok(Spectrum {
            si: vec![p.amplitude * p.amplitude / 2.0],
            dj: vec![1.0],
            omega: vec![p.omega],
            psi: vec![p.psi],
            k: vec![p.wave_number()],
            phase: vec![vec![p.phase]],
        })
    }

    fn angular_frequencies_for_rao(&self) -> ModelResult<Vec<f64>> {
        Ok(vec![self.configured()?.omega])
    }

    fn directions_for_rao(&self) -> ModelResult<Vec<f64>> {
        Ok(vec![self.configured()?.psi])
    }
}
