use crate::error::ModelResult;
use crate::model::ScalarWaveModel;
use crate::parameters::ParameterDocument;
use crate::types::OrbitalVelocity;

/// Trivial model for wiring and integration tests.
///
/// Answers closed-form functions of the coordinates so callers can check
/// positional alignment of batched results. Spectrum and RAO grids are left
/// unimplemented.
#[derive(Debug, Clone, Default)]
pub struct StubModel {
    parameters: ParameterDocument,
}

impl StubModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document from the last successful `set_parameters`.
    pub fn parameters(&self) -> &ParameterDocument {
        &self.parameters
    }
}

impl ScalarWaveModel for StubModel {
    fn set_parameters(&mut self, parameters: &str) -> ModelResult<()> {
        self.parameters = ParameterDocument::parse(parameters)?;
        Ok(())
    }

    fn elevation(&self, x: f64, y: f64, t: f64) -> ModelResult<f64> {
        Ok(x + y + t)
    }

    fn dynamic_pressure(&self, x: f64, y: f64, z: f64, t: f64) -> ModelResult<f64> {
        Ok(x + y + z + t)
    }

    fn orbital_velocity(&self, x: f64, y: f64, z: f64, _t: f64) -> ModelResult<OrbitalVelocity> {
        Ok(OrbitalVelocity::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::Capability;

    #[test]
    fn test_closed_forms() {
        let model = StubModel::new();
        assert_eq!(model.elevation(1.0, 2.0, 3.0), Ok(6.0));
        assert_eq!(model.dynamic_pressure(1.0, 2.0, 3.0, 4.0), Ok(10.0));
        assert_eq!(
            model.orbital_velocity(1.0, 2.0, 3.0, 4.0),
            Ok(OrbitalVelocity::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn test_spectrum_is_unimplemented() {
        let model = StubModel::new();
        assert_eq!(
            model.spectrum(0.0, 0.0, 0.0),
            Err(ModelError::Unimplemented(Capability::Spectrum))
        );
    }

    #[test]
    fn test_failed_configuration_keeps_previous_document() {
        let mut model = StubModel::new();
        model.set_parameters("{Hs: 5, Tp: 15, gamma: 1.2}").unwrap();

        let result = model.set_parameters("{Hs: [");
        assert!(matches!(result, Err(ModelError::Parse(_))));
        assert_eq!(model.parameters().required_f64("Tp"), Ok(15.0));
    }
}
