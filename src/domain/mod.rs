//! Domain models and ports: configuration, prompt shapes, provider seam.

pub mod models;
pub mod ports;
