use crate::config::{DeployConfig, EnvOverlay};
use crate::core::context::PipelineContext;
use crate::core::pipeline::Step;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;

pub const NAME: &str = "prepare-environment";

/// 建立 venv（若不存在）並載入可選的環境覆蓋檔
pub struct PrepareEnvironment;

#[async_trait]
impl Step for PrepareEnvironment {
    fn name(&self) -> &str {
        NAME
    }

    fn describe(&self, config: &DeployConfig) -> Vec<String> {
        vec![
            format!(
                "{} -m venv {} (only if missing)",
                config.project.python,
                config.venv_dir().display()
            ),
            format!("load {} (only if present)", config.env_file().display()),
        ]
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<()> {
        let project_dir = context.config().project_dir();
        if !project_dir.is_dir() {
            return Err(DeployError::MissingInput {
                path: project_dir.display().to_string(),
            });
        }

        let venv = context.config().venv_dir();

        if venv.exists() {
            tracing::debug!("Virtual environment already present at {}", venv.display());
        } else {
            let invocation = context
                .invocation(context.config().project.python.clone())
                .args(["-m", "venv"])
                .arg(venv.to_string_lossy());
            context.run_checked(NAME, invocation).await?;
        }

        let env_file = context.config().env_file();
        match EnvOverlay::load_optional(&env_file)? {
            Some(overlay) => {
                // 只記錄變數名稱，值可能是密鑰
                tracing::info!(
                    "📄 Loaded {} variables from {}",
                    overlay.len(),
                    env_file.display()
                );
                tracing::debug!("Overlay keys: {}", overlay.keys().collect::<Vec<_>>().join(", "));
                context.set_overlay(overlay);
            }
            None => {
                tracing::info!("No environment overlay at {}, continuing", env_file.display());
            }
        }

        Ok(())
    }
}
