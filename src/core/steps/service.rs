use crate::config::DeployConfig;
use crate::core::context::PipelineContext;
use crate::core::pipeline::Step;
use crate::domain::model::Invocation;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;

pub const NAME: &str = "restart-service";

/// 透過 process supervisor 重新啟動服務（通常需要 sudo）
pub struct RestartService;

fn restart_invocation(config: &DeployConfig) -> Result<Invocation> {
    let (program, args) = config
        .service
        .restart_command
        .split_first()
        .ok_or_else(|| DeployError::MissingConfigError {
            field: "service.restart_command".to_string(),
        })?;

    Ok(Invocation::new(program.clone())
        .args(args.iter().cloned())
        .arg(config.service_name()))
}

#[async_trait]
impl Step for RestartService {
    fn name(&self) -> &str {
        NAME
    }

    fn describe(&self, config: &DeployConfig) -> Vec<String> {
        match restart_invocation(config) {
            Ok(invocation) => vec![invocation.to_string()],
            Err(e) => vec![format!("(invalid: {})", e)],
        }
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<()> {
        let base = restart_invocation(context.config())?;
        let invocation = context
            .invocation(base.program)
            .args(base.args);
        context.run_checked(NAME, invocation).await?;
        tracing::info!("🔄 Service {} restarted", context.config().service_name());
        Ok(())
    }
}
