#[cfg(feature = "cli")]
pub mod cli;
pub mod overlay;

use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use overlay::EnvOverlay;

/// 未指定 --config 時在目前目錄尋找的設定檔名稱
pub const DEFAULT_CONFIG_FILE: &str = "deploy.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub project: ProjectConfig,
    pub apps: AppsConfig,
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub directory: PathBuf,
    /// 相對路徑以 directory 為基準
    pub venv: PathBuf,
    pub env_file: PathBuf,
    pub requirements: PathBuf,
    pub manage_script: PathBuf,
    pub python: String,
    pub static_root: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "peds_edu".to_string(),
            directory: PathBuf::from("/home/ubuntu/peds_edu"),
            venv: PathBuf::from("venv"),
            env_file: PathBuf::from(".env"),
            requirements: PathBuf::from("requirements.txt"),
            manage_script: PathBuf::from("manage.py"),
            python: "python3".to_string(),
            static_root: PathBuf::from("staticfiles"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    pub labels: Vec<String>,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            labels: vec![
                "accounts".to_string(),
                "catalog".to_string(),
                "sharing".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub restart_command: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "peds_edu".to_string(),
            restart_command: vec![
                "sudo".to_string(),
                "systemctl".to_string(),
                "restart".to_string(),
            ],
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// MySQL 帳號允許連線的來源主機（不是資料庫伺服器位址）
    pub host: Option<String>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("host", &self.host)
            .finish()
    }
}

impl DeployConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DeployError::MissingInput {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DeployError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 有指定路徑就必須存在；否則嘗試目前目錄的 deploy.toml，再退回內建預設值
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from_dir(explicit, Path::new("."))
    }

    /// 同 `load`，但在 `dir` 尋找 deploy.toml
    pub fn load_from_dir(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = dir.join(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    tracing::debug!("Using {} from working directory", DEFAULT_CONFIG_FILE);
                    Self::from_file(&fallback)
                } else {
                    tracing::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// 替換環境變數 (例如 ${DEPLOY_ROOT})，找不到的變數保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DeployError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project.directory.join(path)
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project.directory
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.resolve(&self.project.venv)
    }

    pub fn venv_bin_dir(&self) -> PathBuf {
        self.venv_dir().join("bin")
    }

    pub fn venv_python(&self) -> PathBuf {
        self.venv_bin_dir().join("python")
    }

    pub fn env_file(&self) -> PathBuf {
        self.resolve(&self.project.env_file)
    }

    pub fn requirements_file(&self) -> PathBuf {
        self.resolve(&self.project.requirements)
    }

    pub fn manage_script(&self) -> PathBuf {
        self.resolve(&self.project.manage_script)
    }

    pub fn static_root(&self) -> PathBuf {
        self.resolve(&self.project.static_root)
    }

    pub fn app_labels(&self) -> &[String] {
        &self.apps.labels
    }

    pub fn migrations_dir(&self, app: &str) -> PathBuf {
        self.project.directory.join(app).join("migrations")
    }

    pub fn service_name(&self) -> &str {
        &self.service.name
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("project.name", &self.project.name)?;
        validation::validate_path(
            "project.directory",
            &self.project.directory.to_string_lossy(),
        )?;
        validation::validate_path("project.venv", &self.project.venv.to_string_lossy())?;
        validation::validate_path("project.env_file", &self.project.env_file.to_string_lossy())?;
        validation::validate_path(
            "project.requirements",
            &self.project.requirements.to_string_lossy(),
        )?;
        validation::validate_path(
            "project.manage_script",
            &self.project.manage_script.to_string_lossy(),
        )?;
        validation::validate_path(
            "project.static_root",
            &self.project.static_root.to_string_lossy(),
        )?;
        validation::validate_non_empty_string("project.python", &self.project.python)?;

        if self.apps.labels.is_empty() {
            return Err(DeployError::ConfigValidationError {
                field: "apps.labels".to_string(),
                message: "At least one application module is required".to_string(),
            });
        }
        for label in &self.apps.labels {
            validation::validate_python_identifier("apps.labels", label)?;
        }
        validation::validate_unique("apps.labels", &self.apps.labels)?;

        validation::validate_non_empty_string("service.name", &self.service.name)?;
        if self.service.name.contains(char::is_whitespace) {
            return Err(DeployError::InvalidConfigValueError {
                field: "service.name".to_string(),
                value: self.service.name.clone(),
                reason: "Service name cannot contain whitespace".to_string(),
            });
        }
        match self.service.restart_command.first() {
            Some(program) => {
                validation::validate_non_empty_string("service.restart_command", program)?
            }
            None => {
                return Err(DeployError::MissingConfigError {
                    field: "service.restart_command".to_string(),
                })
            }
        }

        Ok(())
    }
}

impl Validate for DeployConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
