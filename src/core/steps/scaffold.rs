use crate::config::DeployConfig;
use crate::core::context::PipelineContext;
use crate::core::pipeline::Step;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub const NAME: &str = "scaffold";

/// 讓目錄成為可 import 的 Python package 的標記檔
pub const PACKAGE_MARKER: &str = "__init__.py";

/// 確保每個 app 都有 migrations/__init__.py，以及 static root 目錄
pub struct ScaffoldMigrations;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScaffoldResult {
    pub created_dirs: Vec<PathBuf>,
    pub created_markers: Vec<PathBuf>,
}

/// 建立缺少的目錄與標記檔；已存在的檔案內容不變
pub async fn ensure_layout(config: &DeployConfig) -> Result<ScaffoldResult> {
    let mut result = ScaffoldResult::default();

    for app in config.app_labels() {
        let migrations = config.migrations_dir(app);
        if ensure_dir(&migrations).await? {
            result.created_dirs.push(migrations.clone());
        }

        let marker = migrations.join(PACKAGE_MARKER);
        if touch(&marker).await? {
            result.created_markers.push(marker);
        }
    }

    let static_root = config.static_root();
    if ensure_dir(&static_root).await? {
        result.created_dirs.push(static_root);
    }

    Ok(result)
}

async fn ensure_dir(path: &Path) -> Result<bool> {
    if tokio::fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(false);
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(true)
}

async fn touch(path: &Path) -> Result<bool> {
    if tokio::fs::try_exists(path).await? {
        return Ok(false);
    }
    // append 模式，不截斷既有內容
    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    Ok(true)
}

#[async_trait]
impl Step for ScaffoldMigrations {
    fn name(&self) -> &str {
        NAME
    }

    fn describe(&self, config: &DeployConfig) -> Vec<String> {
        let mut actions: Vec<String> = config
            .app_labels()
            .iter()
            .map(|app| {
                let dir = config.migrations_dir(app);
                format!(
                    "ensure {}/ and {}",
                    dir.display(),
                    dir.join(PACKAGE_MARKER).display()
                )
            })
            .collect();
        actions.push(format!("ensure {}/", config.static_root().display()));
        actions
    }

    async fn run(&self, context: &mut PipelineContext) -> Result<()> {
        let result = ensure_layout(context.config()).await?;

        for dir in &result.created_dirs {
            tracing::info!("📁 Created {}", dir.display());
        }
        for marker in &result.created_markers {
            tracing::info!("📝 Created {}", marker.display());
        }
        if result.created_dirs.is_empty() && result.created_markers.is_empty() {
            tracing::debug!("Layout already complete");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &Path) -> DeployConfig {
        let mut config = DeployConfig::default();
        config.project.directory = dir.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_creates_missing_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());

        let result = ensure_layout(&config).await.unwrap();

        assert_eq!(result.created_markers.len(), 3);
        for app in ["accounts", "catalog", "sharing"] {
            assert!(dir.path().join(app).join("migrations").join(PACKAGE_MARKER).is_file());
        }
        assert!(dir.path().join("staticfiles").is_dir());
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());

        ensure_layout(&config).await.unwrap();
        let second = ensure_layout(&config).await.unwrap();

        assert_eq!(second, ScaffoldResult::default());
    }
}
