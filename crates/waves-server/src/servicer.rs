//! The grid adapter between batched requests and a scalar wave model.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rayon::prelude::*;
use tracing::{Span, info, info_span, warn};
use waves_model::{ModelError, ModelResult, OrbitalVelocity, ScalarWaveModel, Spectrum};

use crate::error::{RpcError, common_length};
use crate::protocol::{
    AngularFrequencies, Directions, DynamicPressuresResponse, OrbitalVelocitiesResponse,
    SetParameterRequest, SetParameterResponse, SpectrumRequest, SpectrumResponse, StatusCode,
    XYTGrid, XYZTGrid,
};

/// Vectorizes a [`ScalarWaveModel`] over grids.
///
/// The model is kept as an immutable snapshot. Queries clone the current
/// `Arc` and compute without holding any lock; `set_parameters` configures a
/// copy of the model and swaps it in only if configuration succeeded, so a
/// failed update never leaves a half-applied model behind and concurrent
/// queries see either the old or the new configuration.
pub struct WavesServicer<M> {
    model: RwLock<Arc<M>>,
    /// Serializes `set_parameters` calls.
    configure: Mutex<()>,
    span: Span,
}

impl<M> WavesServicer<M>
where
    M: ScalarWaveModel + Clone,
{
    pub fn new(model: M) -> Self {
        Self::with_span(model, info_span!("waves"))
    }

    /// Create a servicer logging inside `span`.
    pub fn with_span(model: M, span: Span) -> Self {
        Self {
            model: RwLock::new(Arc::new(model)),
            configure: Mutex::new(()),
            span,
        }
    }

    /// The model currently answering queries.
    pub fn snapshot(&self) -> Arc<M> {
        Arc::clone(&self.model.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn set_parameters(
        &self,
        request: &SetParameterRequest,
    ) -> Result<SetParameterResponse, RpcError> {
        let _span = self.span.enter();
        info!(parameters = %request.parameters, "Received parameters");

        let _writer = self.configure.lock().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = M::clone(&self.snapshot());
        if let Err(err) = candidate.set_parameters(&request.parameters) {
            let err = RpcError::from_configuration(err, &request.parameters);
            warn!(status = %err.status, "Rejected parameters: {}", err.message);
            return Err(err);
        }
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(candidate);

        Ok(SetParameterResponse {
            error_message: String::new(),
        })
    }

    pub fn elevations(&self, request: &XYTGrid) -> Result<XYZTGrid, RpcError> {
        let _span = self.span.enter();
        info!(points = request.x.len(), t = request.t, "Got elevation request");

        let n = common_length(&[("x", request.x.len()), ("y", request.y.len())])?;
        let model = self.snapshot();
        let t = request.t;
        let z = evaluate(n, |i| {
            let z = model.elevation(request.x[i], request.y[i], t)?;
            finite("elevation", i, z)
        })
        .map_err(RpcError::from_query)?;

        Ok(XYZTGrid {
            x: request.x.clone(),
            y: request.y.clone(),
            z,
            t,
        })
    }

    pub fn dynamic_pressures(
        &self,
        request: &XYZTGrid,
    ) -> Result<DynamicPressuresResponse, RpcError> {
        let _span = self.span.enter();
        info!(points = request.x.len(), t = request.t, "Got dynamic pressure request");

        let n = check_xyz(request)?;
        let model = self.snapshot();
        let t = request.t;
        let pdyn = evaluate(n, |i| {
            let pdyn = model.dynamic_pressure(request.x[i], request.y[i], request.z[i], t)?;
            finite("dynamic pressure", i, pdyn)
        })
        .map_err(RpcError::from_query)?;

        Ok(DynamicPressuresResponse {
            x: request.x.clone(),
            y: request.y.clone(),
            z: request.z.clone(),
            t,
            pdyn,
        })
    }

    pub fn orbital_velocities(
        &self,
        request: &XYZTGrid,
    ) -> Result<OrbitalVelocitiesResponse, RpcError> {
        let _span = self.span.enter();
        info!(points = request.x.len(), t = request.t, "Got orbital velocities request");

        let n = check_xyz(request)?;
        let model = self.snapshot();
        let t = request.t;
        let velocities = evaluate(n, |i| {
            let velocity = model.orbital_velocity(request.x[i], request.y[i], request.z[i], t)?;
            finite_velocity(i, velocity)
        })
        .map_err(RpcError::from_query)?;

        Ok(OrbitalVelocitiesResponse {
            x: request.x.clone(),
            y: request.y.clone(),
            z: request.z.clone(),
            t,
            vx: velocities.iter().map(|v| v.vx).collect(),
            vy: velocities.iter().map(|v| v.vy).collect(),
            vz: velocities.iter().map(|v| v.vz).collect(),
        })
    }

    pub fn spectrum(&self, request: &SpectrumRequest) -> Result<SpectrumResponse, RpcError> {
        let _span = self.span.enter();
        info!(x = request.x, y = request.y, t = request.t, "Got spectrum request");

        let spectrum = self
            .snapshot()
            .spectrum(request.x, request.y, request.t)
            .map_err(RpcError::from_query)?;
        spectrum.validate().map_err(|message| {
            RpcError::new(
                StatusCode::Unknown,
                format!("model returned an inconsistent spectrum: {}", message),
            )
        })?;
        finite_spectrum(&spectrum).map_err(RpcError::from_query)?;

        Ok(spectrum.into())
    }

    pub fn angular_frequencies_for_rao(&self) -> Result<AngularFrequencies, RpcError> {
        let _span = self.span.enter();
        info!("Got angular_frequencies_for_rao request");

        let omegas = self
            .snapshot()
            .angular_frequencies_for_rao()
            .and_then(|omegas| all_finite("angular frequency", &omegas).map(|()| omegas))
            .map_err(RpcError::from_query)?;
        Ok(AngularFrequencies { omegas })
    }

    pub fn directions_for_rao(&self) -> Result<Directions, RpcError> {
        let _span = self.span.enter();
        info!("Got directions_for_rao request");

        let psis = self
            .snapshot()
            .directions_for_rao()
            .and_then(|psis| all_finite("direction", &psis).map(|()| psis))
            .map_err(RpcError::from_query)?;
        Ok(Directions { psis })
    }
}

fn check_xyz(request: &XYZTGrid) -> Result<usize, RpcError> {
    Ok(common_length(&[
        ("x", request.x.len()),
        ("y", request.y.len()),
        ("z", request.z.len()),
    ])?)
}

/// NaN and infinities have no JSON representation.
fn finite(quantity: &str, index: usize, value: f64) -> ModelResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::computation(format!(
            "{} at index {} is not finite ({})",
            quantity, index, value
        )))
    }
}

fn all_finite(quantity: &str, values: &[f64]) -> ModelResult<()> {
    for (index, value) in values.iter().enumerate() {
        finite(quantity, index, *value)?;
    }
    Ok(())
}

fn finite_velocity(index: usize, velocity: OrbitalVelocity) -> ModelResult<OrbitalVelocity> {
    finite("vx", index, velocity.vx)?;
    finite("vy", index, velocity.vy)?;
    finite("vz", index, velocity.vz)?;
    Ok(velocity)
}

fn finite_spectrum(spectrum: &Spectrum) -> ModelResult<()> {
    all_finite("si", &spectrum.si)?;
    all_finite("dj", &spectrum.dj)?;
    all_finite("omega", &spectrum.omega)?;
    all_finite("psi", &spectrum.psi)?;
    all_finite("k", &spectrum.k)?;
    for (row, phases) in spectrum.phase.iter().enumerate() {
        all_finite(&format!("phase row {}", row), phases)?;
    }
    Ok(())
}

/// Evaluate `point` for every index in `0..n`, in parallel.
///
/// Results come back in index order. If any point fails, the failure with
/// the lowest index is returned and nothing else.
fn evaluate<T, F>(n: usize, point: F) -> ModelResult<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> ModelResult<T> + Send + Sync,
{
    let results: Vec<ModelResult<T>> = (0..n).into_par_iter().map(point).collect();
    results.into_iter().collect()
}
