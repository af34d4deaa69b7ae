// src/core/mod.rs

//! Core data structures and types

// Declare modules within core
pub mod error;
pub mod wire;
pub mod state;

// Re-export public types for convenient access via `photonq::core::TypeName`
pub use error::PhotonError;
pub use wire::WireId;
pub use state::{DensityMatrix, Occupation};

pub mod constants;
pub use constants::photon_constants::{DEFAULT_DISPLAY_DIGITS, DEFAULT_TOLERANCE}; // Re-export
