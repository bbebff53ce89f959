//! Classical image enhancement, paired super-resolution dataset construction,
//! a small convolutional regressor trained on those pairs, and an
//! upload-and-view demo server for the trained model.

pub mod config;
pub mod dataset;
pub mod enhancement;
pub mod error;
pub mod model;
pub mod server;
pub mod visualize;

pub use dataset::{build_dataset, Dataset, DatasetConfig, SamplePair, Split};
pub use enhancement::{enhance, EnhanceParams, Pipeline};
pub use error::{EnhanceError, Result};
