use crate::config::DeployConfig;
use crate::core::context::PipelineContext;
use crate::core::pipeline::Step;
use crate::utils::error::Result;
use async_trait::async_trait;

pub const MAKE_NAME: &str = "make-migrations";
pub const APPLY_NAME: &str = "migrate";

/// 逐一為每個 app 產生缺少的 migration
pub struct MakeMigrations;

/// 套用所有待執行的 migration。
///
/// `--fake-initial`：資料表已存在但沒有 migration 紀錄時，將初始 migration
/// 標記為已套用而不是重建資料表。
pub struct ApplyMigrations;

fn manage_line(config: &DeployConfig, args: &str) -> String {
    format!(
        "{} {} {}",
        config.venv_python().display(),
        config.manage_script().display(),
        args
    )
}

#[async_trait]
impl Step for MakeMigrations {
    fn name(&self) -> &str {
        MAKE_NAME
    }

    fn describe(&self, config: &DeployConfig) -> Vec<String> {
        config
            .app_labels()
            .iter()
            .map(|app| manage_line(config, &format!("makemigrations {} --noinput", app)))
            .collect()
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<()> {
        for app in context.config().app_labels() {
            let invocation = context.manage(["makemigrations", app.as_str(), "--noinput"]);
            let output = context.run_checked(MAKE_NAME, invocation).await?;
            if let Some(last) = output.stdout.lines().rev().find(|l| !l.trim().is_empty()) {
                tracing::info!("  {}: {}", app, last.trim());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Step for ApplyMigrations {
    fn name(&self) -> &str {
        APPLY_NAME
    }

    fn describe(&self, config: &DeployConfig) -> Vec<String> {
        vec![manage_line(config, "migrate --fake-initial --noinput")]
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<()> {
        let invocation = context.manage(["migrate", "--fake-initial", "--noinput"]);
        context.run_checked(APPLY_NAME, invocation).await?;
        Ok(())
    }
}
