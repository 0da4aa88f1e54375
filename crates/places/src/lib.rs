//! Places data consumed by the tour engine.
//!
//! Geocoding and nearby search are external services; this crate defines the
//! record types they produce, the traits the engine calls them through, and an
//! in-memory catalogue of sample properties.

pub mod poi;
pub mod sample;
pub mod service;

pub use poi::*;
pub use service::*;
