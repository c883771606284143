//! Generation value objects.
//!
//! The text backend is opaque to the domain; these types describe what is
//! asked of it and what comes back.
//!
//! - [`message::ChatMessage`] — one role-tagged prompt message
//! - [`request::GenerationRequest`] — messages, stop sequences and overrides
//! - [`params::GenerationParams`] — default sampling parameters
//! - [`result::GenerationResult`] — generated text plus usage metrics

pub mod message;
pub mod params;
pub mod request;
pub mod result;
