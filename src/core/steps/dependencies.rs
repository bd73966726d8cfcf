use crate::config::DeployConfig;
use crate::core::context::PipelineContext;
use crate::core::pipeline::Step;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;

pub const NAME: &str = "install-dependencies";

pub struct InstallDependencies;

#[async_trait]
impl Step for InstallDependencies {
    fn name(&self) -> &str {
        NAME
    }

    fn describe(&self, config: &DeployConfig) -> Vec<String> {
        let python = config.venv_python();
        vec![
            format!("{} -m pip install --upgrade pip", python.display()),
            format!(
                "{} -m pip install -r {}",
                python.display(),
                config.requirements_file().display()
            ),
        ]
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<()> {
        let requirements = context.config().requirements_file();
        if !requirements.is_file() {
            return Err(DeployError::MissingInput {
                path: requirements.display().to_string(),
            });
        }

        let python = context.config().venv_python().to_string_lossy().into_owned();

        let upgrade = context
            .invocation(python.clone())
            .args(["-m", "pip", "install", "--upgrade", "pip"]);
        context.run_checked(NAME, upgrade).await?;

        let install = context
            .invocation(python)
            .args(["-m", "pip", "install", "-r"])
            .arg(requirements.to_string_lossy());
        context.run_checked(NAME, install).await?;

        Ok(())
    }
}
