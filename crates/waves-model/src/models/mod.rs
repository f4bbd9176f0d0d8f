//! Reference wave models.

mod airy;
mod stub;

pub use airy::{AiryModel, AiryParameters};
pub use stub::StubModel;
