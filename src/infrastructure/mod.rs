//! Infrastructure layer.
//!
//! Configuration loading and the composition root that wires configuration
//! and adapters into the application services.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Builds a [`PositionPipeline`](crate::application::PositionPipeline) from config
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
