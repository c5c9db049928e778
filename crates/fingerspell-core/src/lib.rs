//! # Fingerspell-Core
//!
//! Core types and utilities shared by the fingerspelling recognizer.
//!
//! A hand is described by the 21 landmarks produced by an external hand
//! tracker. Everything downstream works on those points or on the
//! 18-dimensional [`FeatureVector`] derived from them.

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
