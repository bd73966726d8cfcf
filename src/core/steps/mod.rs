pub mod dependencies;
pub mod environment;
pub mod migrations;
pub mod scaffold;
pub mod service;
pub mod static_files;

pub use dependencies::InstallDependencies;
pub use environment::PrepareEnvironment;
pub use migrations::{ApplyMigrations, MakeMigrations};
pub use scaffold::ScaffoldMigrations;
pub use service::RestartService;
pub use static_files::CollectStatic;

use crate::core::pipeline::ProvisionPipeline;

/// 標準部署流程，順序固定
pub fn standard_pipeline() -> ProvisionPipeline {
    ProvisionPipeline::new()
        .with_step(Box::new(PrepareEnvironment))
        .with_step(Box::new(InstallDependencies))
        .with_step(Box::new(ScaffoldMigrations))
        .with_step(Box::new(MakeMigrations))
        .with_step(Box::new(ApplyMigrations))
        .with_step(Box::new(CollectStatic))
        .with_step(Box::new(RestartService))
}
