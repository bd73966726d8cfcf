mod common;

use common::{project_config, RecordingRunner};
use site_deploy::core::steps::scaffold::PACKAGE_MARKER;
use site_deploy::{standard_pipeline, PipelineContext};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

async fn run_pipeline(root: &Path) {
    let config = project_config(root);
    let runner = Arc::new(RecordingRunner::new());
    let mut context = PipelineContext::new("scaffold".to_string(), config, runner);
    standard_pipeline().execute_all(&mut context).await.unwrap();
}

fn marker(root: &Path, app: &str) -> std::path::PathBuf {
    root.join(app).join("migrations").join(PACKAGE_MARKER)
}

#[tokio::test]
async fn test_scaffold_from_absent_state() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    run_pipeline(root).await;

    for app in ["accounts", "catalog", "sharing"] {
        assert!(marker(root, app).is_file(), "{} marker missing", app);
    }
}

#[tokio::test]
async fn test_scaffold_from_partial_state() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    // accounts 已完整、catalog 只有目錄、sharing 完全沒有
    std::fs::create_dir_all(root.join("accounts/migrations")).unwrap();
    std::fs::write(marker(root, "accounts"), "# keep me\n").unwrap();
    std::fs::write(root.join("accounts/migrations/0002_emaillog.py"), "").unwrap();
    std::fs::create_dir_all(root.join("catalog/migrations")).unwrap();

    run_pipeline(root).await;

    for app in ["accounts", "catalog", "sharing"] {
        assert!(marker(root, app).is_file(), "{} marker missing", app);
    }
    assert_eq!(
        std::fs::read_to_string(marker(root, "accounts")).unwrap(),
        "# keep me\n"
    );
    assert!(root.join("accounts/migrations/0002_emaillog.py").is_file());
}

#[tokio::test]
async fn test_scaffold_from_full_state() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for app in ["accounts", "catalog", "sharing"] {
        std::fs::create_dir_all(root.join(app).join("migrations")).unwrap();
        std::fs::write(marker(root, app), format!("# {}\n", app)).unwrap();
    }

    run_pipeline(root).await;

    for app in ["accounts", "catalog", "sharing"] {
        assert_eq!(
            std::fs::read_to_string(marker(root, app)).unwrap(),
            format!("# {}\n", app)
        );
    }
}
