//! Language-model adapters. The pipeline speaks to the model through the
//! [`LanguageModel`] trait: one prompt in, free text out, exactly one
//! round trip. No conversation state lives on this side.

pub mod gemini;
pub mod traits;
pub(crate) mod util;

pub use gemini::GeminiModel;
pub use traits::{LanguageModel, MediaAttachment};
