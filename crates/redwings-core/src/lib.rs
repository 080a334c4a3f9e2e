//! # RedWings-Core
//!
//! Core types and geometry for turning pose-estimator landmark sequences
//! into biomechanical metrics.
//!
//! A [`Frame`] holds the 33 landmarks of the body model in the estimator's
//! fixed index order; a [`Sequence`] is the temporally ordered list of frames
//! for one subject. Joint angles are computed in 3D and gated on landmark
//! confidence, yielding an explicit [`AngleSample`] that is `None` when the
//! detector was not sure enough.

pub mod config;
pub mod error;
pub mod geometry;
pub mod types;

pub use config::*;
pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
