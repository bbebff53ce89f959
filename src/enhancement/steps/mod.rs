//! Individual enhancement stages; `Pipeline` fixes their order

pub mod denoise;
pub mod edges;
pub mod equalize;
pub mod gamma;
pub mod sharpen;
