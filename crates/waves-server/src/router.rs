use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use waves_model::ScalarWaveModel;

use crate::error::RpcError;
use crate::protocol::{
    AngularFrequencies, Directions, DynamicPressuresResponse, Empty, OrbitalVelocitiesResponse,
    SetParameterRequest, SetParameterResponse, SpectrumRequest, SpectrumResponse, WaveRequest,
    WaveResponse, XYTGrid, XYZTGrid, methods,
};
use crate::servicer::WavesServicer;

/// Everything a connection needs to answer requests.
pub struct ServerState<M> {
    pub servicer: WavesServicer<M>,
    pub router: RequestRouter<M>,
}

impl<M> ServerState<M>
where
    M: ScalarWaveModel + Clone + 'static,
{
    pub fn new(servicer: WavesServicer<M>) -> Self {
        Self {
            servicer,
            router: RequestRouter::new(),
        }
    }

    pub fn dispatch(&self, request: &WaveRequest) -> WaveResponse {
        self.router.handle(request, &self.servicer)
    }
}

/// Handles one RPC method.
pub trait RequestHandler<M>: Send + Sync {
    /// The method this handler responds to (e.g. "elevations").
    fn method(&self) -> &'static str;

    /// Handle the request and produce a response.
    fn handle(&self, req: &WaveRequest, servicer: &WavesServicer<M>) -> WaveResponse;
}

/// Dispatches requests to handlers by method name.
pub struct RequestRouter<M> {
    handlers: IndexMap<&'static str, Box<dyn RequestHandler<M>>>,
}

impl<M> RequestRouter<M>
where
    M: ScalarWaveModel + Clone + 'static,
{
    /// Create a router with every method of the waves service.
    pub fn new() -> Self {
        let mut router = Self {
            handlers: IndexMap::new(),
        };

        router.register(Box::new(TypedHandler {
            method: methods::SET_PARAMETERS,
            call: set_parameters::<M>,
        }));
        router.register(Box::new(TypedHandler {
            method: methods::ELEVATIONS,
            call: elevations::<M>,
        }));
        router.register(Box::new(TypedHandler {
            method: methods::DYNAMIC_PRESSURES,
            call: dynamic_pressures::<M>,
        }));
        router.register(Box::new(TypedHandler {
            method: methods::ORBITAL_VELOCITIES,
            call: orbital_velocities::<M>,
        }));
        router.register(Box::new(TypedHandler {
            method: methods::SPECTRUM,
            call: spectrum::<M>,
        }));
        router.register(Box::new(TypedHandler {
            method: methods::ANGULAR_FREQUENCIES_FOR_RAO,
            call: angular_frequencies_for_rao::<M>,
        }));
        router.register(Box::new(TypedHandler {
            method: methods::DIRECTIONS_FOR_RAO,
            call: directions_for_rao::<M>,
        }));

        router
    }

    fn register(&mut self, handler: Box<dyn RequestHandler<M>>) {
        self.handlers.insert(handler.method(), handler);
    }

    /// Registered method names, in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn handle(&self, req: &WaveRequest, servicer: &WavesServicer<M>) -> WaveResponse {
        match self.handlers.get(req.method.as_str()) {
            Some(handler) => handler.handle(req, servicer),
            None => WaveResponse::error(
                req.id,
                RpcError::unimplemented(format!("unknown method: {}", req.method)),
            ),
        }
    }
}

impl<M> Default for RequestRouter<M>
where
    M: ScalarWaveModel + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handler Implementations
// ============================================================================

type Call<M, Req, Resp> = fn(&WavesServicer<M>, Req) -> Result<Resp, RpcError>;

/// Decodes the payload into `Req`, calls the servicer and encodes `Resp`.
struct TypedHandler<M, Req, Resp> {
    method: &'static str,
    call: Call<M, Req, Resp>,
}

impl<M, Req, Resp> RequestHandler<M> for TypedHandler<M, Req, Resp>
where
    Req: DeserializeOwned,
    Resp: Serialize,
{
    fn method(&self) -> &'static str {
        self.method
    }

    fn handle(&self, req: &WaveRequest, servicer: &WavesServicer<M>) -> WaveResponse {
        // A missing payload is an empty message.
        let payload = if req.payload.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            req.payload.clone()
        };

        let request: Req = match serde_json::from_value(payload) {
            Ok(request) => request,
            Err(e) => {
                return WaveResponse::error(
                    req.id,
                    RpcError::invalid_argument(format!(
                        "invalid payload for {}: {}",
                        self.method, e
                    )),
                );
            }
        };

        let response = match (self.call)(servicer, request) {
            Ok(response) => response,
            Err(e) => return WaveResponse::error(req.id, e),
        };

        match serde_json::to_value(response) {
            Ok(payload) => WaveResponse::ok(req.id, payload),
            Err(e) => WaveResponse::error(
                req.id,
                RpcError::internal(format!("Serialization error: {}", e)),
            ),
        }
    }
}

fn set_parameters<M: ScalarWaveModel + Clone>(
    servicer: &WavesServicer<M>,
    request: SetParameterRequest,
) -> Result<SetParameterResponse, RpcError> {
    servicer.set_parameters(&request)
}

fn elevations<M: ScalarWaveModel + Clone>(
    servicer: &WavesServicer<M>,
    request: XYTGrid,
) -> Result<XYZTGrid, RpcError> {
    servicer.elevations(&request)
}

fn dynamic_pressures<M: ScalarWaveModel + Clone>(
    servicer: &WavesServicer<M>,
    request: XYZTGrid,
) -> Result<DynamicPressuresResponse, RpcError> {
    servicer.dynamic_pressures(&request)
}

fn orbital_velocities<M: ScalarWaveModel + Clone>(
    servicer: &WavesServicer<M>,
    request: XYZTGrid,
) -> Result<OrbitalVelocitiesResponse, RpcError> {
    servicer.orbital_velocities(&request)
}

fn spectrum<M: ScalarWaveModel + Clone>(
    servicer: &WavesServicer<M>,
    request: SpectrumRequest,
) -> Result<SpectrumResponse, RpcError> {
    servicer.spectrum(&request)
}

fn angular_frequencies_for_rao<M: ScalarWaveModel + Clone>(
    servicer: &WavesServicer<M>,
    _: Empty,
) -> Result<AngularFrequencies, RpcError> {
    servicer.angular_frequencies_for_rao()
}

fn directions_for_rao<M: ScalarWaveModel + Clone>(
    servicer: &WavesServicer<M>,
    _: Empty,
) -> Result<Directions, RpcError> {
    servicer.directions_for_rao()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use waves_model::StubModel;

    use super::*;
    use crate::protocol::StatusCode;

    fn state() -> ServerState<StubModel> {
        ServerState::new(WavesServicer::new(StubModel::new()))
    }

    fn request(id: u64, method: &str, payload: serde_json::Value) -> WaveRequest {
        WaveRequest {
            id,
            method: method.to_string(),
            payload,
        }
    }

    #[test]
    fn test_all_methods_registered() {
        let methods: Vec<_> = state().router.methods().collect();
        assert_eq!(
            methods,
            [
                "set_parameters",
                "elevations",
                "dynamic_pressures",
                "orbital_velocities",
                "spectrum",
                "angular_frequencies_for_rao",
                "directions_for_rao",
            ]
        );
    }

    #[test]
    fn test_unknown_method() {
        let response = state().dispatch(&request(9, "teleport", json!({})));
        assert_eq!(response.id, 9);
        assert_eq!(response.status, StatusCode::Unimplemented);
        assert_eq!(response.message, "unknown method: teleport");
        assert!(response.payload.is_none());
    }

    #[test]
    fn test_elevations_round_trip() {
        let state = state();
        let response = state.dispatch(&request(
            1,
            "set_parameters",
            json!({"parameters": "{Hs: 5, Tp: 15, gamma: 1.2}"}),
        ));
        assert!(response.is_ok(), "{response:?}");
        assert_eq!(response.payload, Some(json!({"error_message": ""})));

        let response = state.dispatch(&request(
            2,
            "elevations",
            json!({"x": [1.0, 6.0], "y": [2.0, 5.0], "t": 3.0}),
        ));
        assert_eq!(response.id, 2);
        assert_eq!(
            response.payload,
            Some(json!({"x": [1.0, 6.0], "y": [2.0, 5.0], "z": [6.0, 14.0], "t": 3.0}))
        );
    }

    #[test]
    fn test_bad_payload_is_invalid_argument() {
        let response = state().dispatch(&request(3, "elevations", json!({"x": "north"})));
        assert_eq!(response.status, StatusCode::InvalidArgument);
        assert!(response.message.starts_with("invalid payload for elevations"));
    }

    #[test]
    fn test_methods_without_arguments_accept_missing_payload() {
        let response = state().dispatch(&request(4, "directions_for_rao", serde_json::Value::Null));
        assert_eq!(response.status, StatusCode::Unimplemented);
        assert_eq!(
            response.message,
            "directions_for_rao is not implemented in this model."
        );
    }

    #[test]
    fn test_mismatched_grid_has_no_payload() {
        let response = state().dispatch(&request(
            5,
            "orbital_velocities",
            json!({"x": [1.0, 2.0, 3.0], "y": [1.0, 2.0], "z": [0.0, 0.0, 0.0], "t": 0.0}),
        ));
        assert_eq!(response.status, StatusCode::InvalidArgument);
        assert!(response.payload.is_none());
    }
}
