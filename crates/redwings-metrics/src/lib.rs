//! # RedWings-Metrics
//!
//! Biomechanical metrics extraction from pose landmark sequences.
//!
//! ## Pipeline
//!
//! 1. **Geometry**: per-frame knee, hip and elbow angles (confidence gated)
//!    plus arm spread, stance width and a hip-midpoint center of mass
//! 2. **Smoothing**: gap filling and Savitzky-Golay filtering per angle series
//! 3. **Filtering**: knee/hip samples at or below the glitch floor are dropped
//!    from the statistics
//! 4. **Derivation**: left/right knee symmetry and frame-to-frame knee velocity
//! 5. **Phases**: ordered rule classification of every frame
//! 6. **Summary**: scalar statistics, rounded timeline and phase sequence
//!
//! Degenerate input never produces an error: an empty sequence yields an
//! empty summary and a sequence with no usable knee or hip angle yields a
//! summary whose `error` field is set.

pub mod aggregator;
pub mod phase;
pub mod smoothing;
pub mod statistics;
pub mod summary;

pub use aggregator::*;
pub use phase::*;
pub use smoothing::*;
pub use summary::*;
