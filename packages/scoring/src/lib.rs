#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Attractiveness scoring and confidence rating.
//!
//! Both components are pure functions over the shared model types:
//! same inputs always yield the same outputs, with no hidden state or
//! randomness.

pub mod confidence;
pub mod score;

pub use confidence::rate_confidence;
pub use score::score_location;
