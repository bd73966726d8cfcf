use crate::domain::model::{CommandOutput, Invocation};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DeployError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// 在本機執行外部程式，擷取 stdout/stderr
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        tracing::debug!("▶️ {}", invocation);

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|source| DeployError::SpawnError {
                program: invocation.program.clone(),
                source,
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        for line in result.stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("  {}", line);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let output = SystemRunner::new()
            .run(&Invocation::new("echo").arg("hello"))
            .await
            .unwrap();
        assert!(output.succeeded());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let output = SystemRunner::new()
            .run(&Invocation::new("sh").args(["-c", "echo broken >&2; exit 3"]))
            .await
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.error_text(), "broken");
    }

    #[tokio::test]
    async fn test_run_passes_env_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let output = SystemRunner::new()
            .run(
                &Invocation::new("sh")
                    .args(["-c", "printf '%s:%s' \"$DEPLOY_MARK\" \"$(pwd)\""])
                    .envs([("DEPLOY_MARK", "on")])
                    .current_dir(dir.path()),
            )
            .await
            .unwrap();
        let canonical = dir.path().canonicalize().unwrap();
        assert_eq!(output.stdout, format!("on:{}", canonical.display()));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let result = SystemRunner::new()
            .run(&Invocation::new("nonexistent_command_xyz"))
            .await;
        assert!(matches!(result, Err(DeployError::SpawnError { .. })));
    }
}
