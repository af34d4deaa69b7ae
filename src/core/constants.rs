//! Numerical constants shared by both engines.

/// Default constants for simulation precision and parameter ranges
pub mod photon_constants {
    /// Magnitude below which matrix entries and probabilities are treated as zero.
    pub const DEFAULT_TOLERANCE: f64 = 1e-10;
    /// Significant digits kept when reporting output probabilities.
    pub const DEFAULT_DISPLAY_DIGITS: usize = 10;
    /// Beam splitter angle (degrees) used when none is given; 90 is balanced.
    pub const DEFAULT_BEAMSPLITTER_THETA: f64 = 90.0;
    /// Phase (degrees) used when none is given.
    pub const DEFAULT_PHASE: f64 = 180.0;
    /// Transmission used when none is given (lossless).
    pub const DEFAULT_ETA: f64 = 1.0;
    /// Upper bound of the beam splitter angle in degrees.
    pub const MAX_BEAMSPLITTER_THETA: f64 = 180.0;
    /// Upper bound of the phase in degrees.
    pub const MAX_PHASE: f64 = 360.0;
}
