use crate::config::DeployConfig;
use crate::core::context::PipelineContext;
use crate::core::pipeline::Step;
use crate::domain::model::StepPolicy;
use crate::utils::error::Result;
use async_trait::async_trait;

pub const NAME: &str = "collect-static";

/// 收集靜態檔；失敗不影響整體部署結果
pub struct CollectStatic;

#[async_trait]
impl Step for CollectStatic {
    fn name(&self) -> &str {
        NAME
    }

    fn policy(&self) -> StepPolicy {
        StepPolicy::BestEffort
    }

    fn describe(&self, config: &DeployConfig) -> Vec<String> {
        vec![format!(
            "{} {} collectstatic --noinput (failure tolerated)",
            config.venv_python().display(),
            config.manage_script().display()
        )]
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<()> {
        let invocation = context.manage(["collectstatic", "--noinput"]);
        context.run_checked(NAME, invocation).await?;
        Ok(())
    }
}
