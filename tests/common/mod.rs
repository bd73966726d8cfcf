#![allow(dead_code)]

use async_trait::async_trait;
use site_deploy::core::{CommandOutput, CommandRunner, Invocation};
use site_deploy::{DeployConfig, DeployError, Result};
use std::path::Path;
use std::sync::Mutex;

/// 記錄所有呼叫；符合規則的呼叫回傳指定的失敗
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    failures: Vec<(String, i32)>,
    unspawnable: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 命令列包含 `needle` 的呼叫以 `code` 結束
    pub fn fail_when(mut self, needle: &str, code: i32) -> Self {
        self.failures.push((needle.to_string(), code));
        self
    }

    /// 命令列包含 `needle` 的呼叫無法啟動
    pub fn unspawnable_when(mut self, needle: &str) -> Self {
        self.unspawnable.push(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.command_lines().iter().any(|line| line.contains(needle))
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let line = invocation.to_string();

        if self.unspawnable.iter().any(|needle| line.contains(needle)) {
            return Err(DeployError::SpawnError {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }

        match self.failures.iter().find(|(needle, _)| line.contains(needle)) {
            Some((_, code)) => Ok(CommandOutput::failure(*code, format!("{} failed", line))),
            None => Ok(CommandOutput::success()),
        }
    }
}

/// 建立最小的專案目錄（含 requirements.txt）並回傳對應的配置
pub fn project_config(root: &Path) -> DeployConfig {
    std::fs::write(root.join("requirements.txt"), "Django>=4.2\n").unwrap();
    std::fs::write(root.join("manage.py"), "").unwrap();

    let mut config = DeployConfig::default();
    config.project.directory = root.to_path_buf();
    config.service.name = "peds_edu_test".to_string();
    config
}

/// 收集目錄下所有檔案與目錄的相對路徑（排序後）
pub fn snapshot(root: &Path) -> Vec<String> {
    fn walk(base: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let relative = path.strip_prefix(base).unwrap().display().to_string();
            if path.is_dir() {
                out.push(format!("{}/", relative));
                walk(base, &path, out);
            } else {
                let content = std::fs::read_to_string(&path).unwrap_or_default();
                out.push(format!("{} ({} bytes)", relative, content.len()));
            }
        }
    }

    let mut entries = Vec::new();
    walk(root, root, &mut entries);
    entries.sort();
    entries
}
