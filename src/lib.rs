pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::adapters::SystemRunner;
pub use crate::config::{DeployConfig, EnvOverlay};
pub use crate::core::bootstrap::DatabaseBootstrap;
pub use crate::core::context::PipelineContext;
pub use crate::core::pipeline::{ProvisionPipeline, RunReport, Step};
pub use crate::core::steps::standard_pipeline;
pub use crate::utils::error::{DeployError, Result};
