//! Async client for the framed waves service.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs, UnixStream};
use tracing::debug;
use waves_model::{RaoSupport, Spectrum};

use crate::framing::{DEFAULT_MAX_FRAME_BYTES, read_message, write_message};
use crate::protocol::{
    AngularFrequencies, Directions, DynamicPressuresResponse, Empty, OrbitalVelocitiesResponse,
    SetParameterRequest, SetParameterResponse, SpectrumRequest, SpectrumResponse, StatusCode,
    WaveRequest, WaveResponse, XYTGrid, XYZTGrid, methods,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode a message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ClientError {
    /// The RPC status, if the server answered with an error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One connection to a waves server. Calls are sequential.
pub struct WavesClient<S = TcpStream> {
    stream: S,
    next_id: u64,
}

impl WavesClient<TcpStream> {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        Ok(Self::new(TcpStream::connect(addr).await?))
    }
}

impl WavesClient<UnixStream> {
    pub async fn connect_unix(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        Ok(Self::new(UnixStream::connect(path).await?))
    }
}

impl<S> WavesClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream, next_id: 1 }
    }

    /// Send one request and decode the payload of a successful answer.
    pub async fn call<Req, Resp>(
        &mut self,
        method: &str,
        request: &Req,
    ) -> Result<Resp, ClientError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let id = self.next_id;
        self.next_id += 1;

        let request = WaveRequest {
            id,
            method: method.to_string(),
            payload: serde_json::to_value(request)?,
        };
        debug!("Sending request: {} ({})", method, id);
        write_message(&mut self.stream, &request).await?;

        let response: WaveResponse = read_message(&mut self.stream, DEFAULT_MAX_FRAME_BYTES).await?;
        if response.id != id {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected response to request {}, got {}",
                id, response.id
            )));
        }
        if !response.is_ok() {
            return Err(ClientError::Status {
                status: response.status,
                message: response.message,
            });
        }

        let payload = response.payload.ok_or_else(|| {
            ClientError::UnexpectedResponse(format!("{} answered without a payload", method))
        })?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn set_parameters(&mut self, yaml: &str) -> Result<(), ClientError> {
        let request = SetParameterRequest {
            parameters: yaml.to_string(),
        };
        let _: SetParameterResponse = self.call(methods::SET_PARAMETERS, &request).await?;
        Ok(())
    }

    /// Elevations at `(x, y)` points, in input order.
    pub async fn elevations(
        &mut self,
        points: &[(f64, f64)],
        t: f64,
    ) -> Result<Vec<f64>, ClientError> {
        let response: XYZTGrid = self
            .call(methods::ELEVATIONS, &XYTGrid::from_points(points, t))
            .await?;
        Ok(response.z)
    }

    pub async fn dynamic_pressures(
        &mut self,
        points: &[(f64, f64, f64)],
        t: f64,
    ) -> Result<Vec<f64>, ClientError> {
        let response: DynamicPressuresResponse = self
            .call(methods::DYNAMIC_PRESSURES, &XYZTGrid::from_points(points, t))
            .await?;
        Ok(response.pdyn)
    }

    pub async fn orbital_velocities(
        &mut self,
        points: &[(f64, f64, f64)],
        t: f64,
    ) -> Result<OrbitalVelocitiesResponse, ClientError> {
        self.call(methods::ORBITAL_VELOCITIES, &XYZTGrid::from_points(points, t))
            .await
    }

    pub async fn spectrum(&mut self, x: f64, y: f64, t: f64) -> Result<Spectrum, ClientError> {
        let response: SpectrumResponse = self
            .call(methods::SPECTRUM, &SpectrumRequest { x, y, t })
            .await?;
        Ok(response.into())
    }

    pub async fn angular_frequencies_for_rao(&mut self) -> Result<Vec<f64>, ClientError> {
        let response: AngularFrequencies = self
            .call(methods::ANGULAR_FREQUENCIES_FOR_RAO, &Empty {})
            .await?;
        Ok(response.omegas)
    }

    pub async fn directions_for_rao(&mut self) -> Result<Vec<f64>, ClientError> {
        let response: Directions = self.call(methods::DIRECTIONS_FOR_RAO, &Empty {}).await?;
        Ok(response.psis)
    }

    /// Both axes of the RAO grid.
    pub async fn rao_support(&mut self) -> Result<RaoSupport, ClientError> {
        Ok(RaoSupport {
            angular_frequencies: self.angular_frequencies_for_rao().await?,
            directions: self.directions_for_rao().await?,
        })
    }
}
