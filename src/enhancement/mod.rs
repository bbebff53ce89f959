//! Classical image enhancement
//!
//! A fixed, ordered chain of five filters (denoise, equalize, gamma,
//! sharpen, edges) whose output serves as the high-resolution target.

pub mod color;
pub mod params;
pub mod pipeline;
pub mod steps;

pub use params::EnhanceParams;
pub use pipeline::{enhance, EnhancementResult, Pipeline, StepTiming};
