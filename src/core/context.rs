use crate::config::{DeployConfig, EnvOverlay};
use crate::domain::model::{CommandOutput, Invocation};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DeployError, Result};
use std::ffi::OsString;
use std::sync::Arc;

/// 單次部署執行的共用狀態：配置、外部程式執行器與已載入的環境覆蓋
pub struct PipelineContext {
    pub execution_id: String,
    config: DeployConfig,
    runner: Arc<dyn CommandRunner>,
    overlay: EnvOverlay,
}

impl PipelineContext {
    pub fn new(execution_id: String, config: DeployConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            execution_id,
            config,
            runner,
            overlay: EnvOverlay::new(),
        }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn overlay(&self) -> &EnvOverlay {
        &self.overlay
    }

    pub fn set_overlay(&mut self, overlay: EnvOverlay) {
        self.overlay = overlay;
    }

    /// 在專案目錄執行，帶入覆蓋變數並啟用 venv（VIRTUAL_ENV 與 PATH）
    pub fn invocation(&self, program: impl Into<String>) -> Invocation {
        let venv = self.config.venv_dir();
        let bin = self.config.venv_bin_dir();
        let bin_display = bin.display().to_string();

        let path = match std::env::var_os("PATH") {
            Some(current) => {
                let mut paths = vec![bin];
                paths.extend(std::env::split_paths(&current));
                std::env::join_paths(paths).unwrap_or_else(|e| {
                    tracing::warn!(
                        "⚠️ Cannot put {} on PATH ({}); collaborators run without the venv bin directory",
                        bin_display,
                        e
                    );
                    OsString::from(&current)
                })
            }
            None => bin.into_os_string(),
        };

        Invocation::new(program)
            .current_dir(self.config.project_dir())
            .envs(self.overlay.iter())
            .envs([
                ("VIRTUAL_ENV".to_string(), venv.to_string_lossy().into_owned()),
                ("PATH".to_string(), path.to_string_lossy().into_owned()),
            ])
    }

    /// `<venv>/bin/python manage.py ...`
    pub fn manage<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invocation(self.config.venv_python().to_string_lossy())
            .arg(self.config.manage_script().to_string_lossy())
            .args(args)
    }

    /// 執行外部程式；非零結束碼轉為 CommandFailed
    pub async fn run_checked(&self, step: &str, invocation: Invocation) -> Result<CommandOutput> {
        tracing::info!("🔧 [{}] {}", step, invocation);
        let output = self.runner.run(&invocation).await?;

        if output.succeeded() {
            Ok(output)
        } else {
            Err(DeployError::CommandFailed {
                step: step.to_string(),
                program: invocation.to_string(),
                code: output.code,
                output: output.error_text(),
            })
        }
    }
}
