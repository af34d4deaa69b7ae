//! Error handling logic

use std::fmt;

use super::wire::WireId;

/// Error types raised while configuring or running a photonic circuit.
///
/// Configuration problems surface synchronously when a component is built
/// or the input state is set. Exhaustion can only be detected once
/// probabilities exist, i.e. during or after a run.
#[derive(Debug, Clone, PartialEq, Eq)] // Eq useful for testing error variants
pub enum PhotonError {
    /// Invalid engine dimensions, occupation tuples, herald patterns or
    /// component parameters.
    Configuration {
        /// Configuration failure message
        message: String,
    },

    /// A wire index outside `1..=n_wires` was referenced.
    WireOutOfRange {
        /// Offending wire
        wire: WireId,
        /// WireOutOfRange failure message
        message: String,
    },

    /// The selected engine cannot express the requested component.
    UnsupportedOperation {
        /// UnsupportedOperation failure message
        message: String,
    },

    /// Post-selection left no surviving probability mass.
    Exhaustion {
        /// Exhaustion failure message
        message: String,
    },

    /// General error encountered during the simulation process itself.
    Simulation {
        /// Simulation failure message
        message: String,
    },
}

impl PhotonError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        PhotonError::Configuration { message: message.into() }
    }

    pub(crate) fn exhaustion(message: impl Into<String>) -> Self {
        PhotonError::Exhaustion { message: message.into() }
    }

    pub(crate) fn simulation(message: impl Into<String>) -> Self {
        PhotonError::Simulation { message: message.into() }
    }

    /// Returns the human-readable message carried by every variant.
    pub fn message(&self) -> &str {
        match self {
            PhotonError::Configuration { message }
            | PhotonError::WireOutOfRange { message, .. }
            | PhotonError::UnsupportedOperation { message }
            | PhotonError::Exhaustion { message }
            | PhotonError::Simulation { message } => message,
        }
    }
}

impl fmt::Display for PhotonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotonError::Configuration { message } => write!(f, "Configuration Error: {}", message),
            PhotonError::WireOutOfRange { wire, message } => write!(f, "Wire Out Of Range ({}): {}", wire, message),
            PhotonError::UnsupportedOperation { message } => write!(f, "Unsupported Operation: {}", message),
            PhotonError::Exhaustion { message } => write!(f, "Exhaustion: {}", message),
            PhotonError::Simulation { message } => write!(f, "Simulation Process Error: {}", message),
        }
    }
}

// Implement the standard Error trait to allow for easy integration with Rust error handling.
impl std::error::Error for PhotonError {}
