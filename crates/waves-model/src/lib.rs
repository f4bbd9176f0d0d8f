//! Waves Model
//!
//! The scalar, point-wise contract every wave model implements, plus the
//! pieces a model needs around it: typed errors, YAML parameter documents,
//! fuzzy key suggestions and a couple of reference models.
//!
//! Batching, transport and error-to-status mapping live in `waves-server`.

pub mod error;
pub mod fuzzy;
pub mod model;
pub mod models;
pub mod parameters;
pub mod types;

pub use error::{ModelError, ModelResult, ParameterError};
pub use fuzzy::{closest_match, similarity, suggestion};
pub use model::{Capability, ScalarWaveModel};
pub use models::{AiryModel, StubModel};
pub use parameters::ParameterDocument;
pub use types::{OrbitalVelocity, RaoSupport, Spectrum};
