//! Wire messages of the waves RPC surface.
//!
//! Every call travels in a [`WaveRequest`] envelope naming the method, and
//! comes back as a [`WaveResponse`] carrying a [`StatusCode`]. The typed
//! messages below are the payloads of each method. Absent fields take their
//! default value, so an empty object is an empty grid.

use std::fmt;

use serde::{Deserialize, Serialize};
use waves_model::Spectrum;

use crate::error::RpcError;

/// Method names, as used in [`WaveRequest::method`].
pub mod methods {
    pub const SET_PARAMETERS: &str = "set_parameters";
    pub const ELEVATIONS: &str = "elevations";
    pub const DYNAMIC_PRESSURES: &str = "dynamic_pressures";
    pub const ORBITAL_VELOCITIES: &str = "orbital_velocities";
    pub const SPECTRUM: &str = "spectrum";
    pub const ANGULAR_FREQUENCIES_FOR_RAO: &str = "angular_frequencies_for_rao";
    pub const DIRECTIONS_FOR_RAO: &str = "directions_for_rao";
}

/// Outcome of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Ok,
    /// Malformed request or parameters that could not be applied.
    InvalidArgument,
    /// The model (or the server) does not provide this method.
    Unimplemented,
    /// The server failed outside of the model.
    Internal,
    /// The model failed while computing.
    Unknown,
}

impl StatusCode {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call to the waves service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// The answer to a [`WaveRequest`].
///
/// `payload` is only present when `status` is [`StatusCode::Ok`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveResponse {
    pub id: u64,
    pub status: StatusCode,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl WaveResponse {
    pub fn ok(id: u64, payload: serde_json::Value) -> Self {
        Self {
            id,
            status: StatusCode::Ok,
            message: String::new(),
            payload: Some(payload),
        }
    }

    pub fn error(id: u64, error: RpcError) -> Self {
        Self {
            id,
            status: error.status,
            message: error.message,
            payload: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::Ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetParameterRequest {
    /// YAML document, may be empty.
    pub parameters: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetParameterResponse {
    /// Empty on success.
    pub error_message: String,
}

/// Horizontal points at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XYTGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub t: f64,
}

impl XYTGrid {
    pub fn from_points(points: &[(f64, f64)], t: f64) -> Self {
        Self {
            x: points.iter().map(|p| p.0).collect(),
            y: points.iter().map(|p| p.1).collect(),
            t,
        }
    }
}

/// Points at one instant, with depth. Also the elevations response, where
/// `z` holds the computed elevations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XYZTGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub t: f64,
}

impl XYZTGrid {
    pub fn from_points(points: &[(f64, f64, f64)], t: f64) -> Self {
        Self {
            x: points.iter().map(|p| p.0).collect(),
            y: points.iter().map(|p| p.1).collect(),
            z: points.iter().map(|p| p.2).collect(),
            t,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicPressuresResponse {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub t: f64,
    pub pdyn: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalVelocitiesResponse {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub t: f64,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub vz: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumRequest {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumResponse {
    pub si: Vec<f64>,
    pub dj: Vec<f64>,
    pub omega: Vec<f64>,
    pub psi: Vec<f64>,
    pub k: Vec<f64>,
    pub phase: Vec<Vec<f64>>,
}

impl From<Spectrum> for SpectrumResponse {
    fn from(spectrum: Spectrum) -> Self {
        Self {
            si: spectrum.si,
            dj: spectrum.dj,
            omega: spectrum.omega,
            psi: spectrum.psi,
            k: spectrum.k,
            phase: spectrum.phase,
        }
    }
}

impl From<SpectrumResponse> for Spectrum {
    fn from(response: SpectrumResponse) -> Self {
        Self {
            si: response.si,
            dj: response.dj,
            omega: response.omega,
            psi: response.psi,
            k: response.k,
            phase: response.phase,
        }
    }
}

/// Request of the methods that take no arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngularFrequencies {
    pub omegas: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directions {
    pub psis: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_in_grpc_style() {
        let json = serde_json::to_string(&StatusCode::InvalidArgument).unwrap();
        assert_eq!(json, "\"INVALID_ARGUMENT\"");
        assert_eq!(StatusCode::Unimplemented.to_string(), "UNIMPLEMENTED");
    }

    #[test]
    fn test_error_response_has_no_payload() {
        let response = WaveResponse::error(7, RpcError::unimplemented("nope"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "UNIMPLEMENTED");
        assert_eq!(json["message"], "nope");
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty_grid() {
        let grid: XYTGrid = serde_json::from_str("{}").unwrap();
        assert_eq!(grid, XYTGrid::default());

        let grid: XYZTGrid = serde_json::from_str(r#"{"x": [1.0], "t": 2.0}"#).unwrap();
        assert_eq!(grid.x, vec![1.0]);
        assert!(grid.y.is_empty());
        assert_eq!(grid.t, 2.0);
    }

    #[test]
    fn test_request_without_payload() {
        let request: WaveRequest =
            serde_json::from_str(r#"{"id": 3, "method": "directions_for_rao"}"#).unwrap();
        assert!(request.payload.is_null());
    }
}
