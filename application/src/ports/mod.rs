//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod bar_observer;
pub mod inference_gateway;
pub mod transcript_store;
