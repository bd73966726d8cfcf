//! 一次性的資料庫初始化 SQL（MySQL 語法）。
//!
//! 由操作人員在新環境手動執行，不在部署流程內。

use crate::config::{DeployConfig, EnvOverlay};
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::Path;

pub const PLACEHOLDER_PASSWORD: &str = "change-me";

/// 帳號允許連線的來源主機；DB_HOST 是資料庫伺服器位址，不可用於授權
pub const CLIENT_HOST_KEY: &str = "DB_CLIENT_HOST";

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseBootstrap {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
}

impl Default for DatabaseBootstrap {
    fn default() -> Self {
        Self {
            database: "peds_edu".to_string(),
            user: "peds_edu".to_string(),
            password: PLACEHOLDER_PASSWORD.to_string(),
            host: "localhost".to_string(),
        }
    }
}

impl fmt::Debug for DatabaseBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseBootstrap")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .finish()
    }
}

impl DatabaseBootstrap {
    /// 依序取值：[database] 設定 → 覆蓋檔 → 行程環境變數 → 預設值
    pub fn resolve(config: &DeployConfig, overlay: Option<&EnvOverlay>) -> Self {
        Self::resolve_with(config, overlay, |key| std::env::var(key).ok())
    }

    /// 同 `resolve`，但行程環境改由 `env` 查詢
    pub fn resolve_with<F>(config: &DeployConfig, overlay: Option<&EnvOverlay>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |configured: &Option<String>, key: &str, fallback: String| -> String {
            configured
                .clone()
                .or_else(|| overlay.and_then(|o| o.get(key)).map(str::to_string))
                .or_else(|| env(key))
                .unwrap_or(fallback)
        };

        Self {
            database: lookup(&config.database.name, "DB_NAME", defaults.database),
            user: lookup(&config.database.user, "DB_USER", defaults.user),
            password: lookup(&config.database.password, "DB_PASSWORD", defaults.password),
            host: lookup(&config.database.host, CLIENT_HOST_KEY, defaults.host),
        }
    }

    pub fn uses_placeholder_password(&self) -> bool {
        self.password == PLACEHOLDER_PASSWORD
    }

    /// 產生 SQL；名稱須先通過驗證
    pub fn render(&self) -> Result<String> {
        self.validate()?;

        let database = &self.database;
        let account = format!("'{}'@'{}'", self.user, self.host);
        let password = escape_string_literal(&self.password);

        Ok(format!(
            "CREATE DATABASE IF NOT EXISTS `{database}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;\n\
             CREATE USER IF NOT EXISTS {account} IDENTIFIED BY '{password}';\n\
             GRANT ALL PRIVILEGES ON `{database}`.* TO {account};\n\
             FLUSH PRIVILEGES;\n"
        ))
    }

    /// 產生 SQL 並寫入檔案，回傳寫入的內容
    pub fn write_to(&self, path: &Path) -> Result<String> {
        let sql = self.render()?;
        std::fs::write(path, &sql)?;
        Ok(sql)
    }
}

impl Validate for DatabaseBootstrap {
    fn validate(&self) -> Result<()> {
        validation::validate_pattern(
            "database.name",
            &self.database,
            r"[A-Za-z0-9_]+",
            "Only letters, digits and underscores are allowed",
        )?;
        validation::validate_max_length("database.name", &self.database, 64)?;

        validation::validate_pattern(
            "database.user",
            &self.user,
            r"[A-Za-z0-9_]+",
            "Only letters, digits and underscores are allowed",
        )?;
        validation::validate_max_length("database.user", &self.user, 32)?;

        validation::validate_non_empty_string("database.host", &self.host)?;
        if self.host.contains(|c: char| matches!(c, '\'' | '"' | '`' | '\\')) {
            return Err(DeployError::InvalidConfigValueError {
                field: "database.host".to_string(),
                value: self.host.clone(),
                reason: "Host cannot contain quotes or backslashes".to_string(),
            });
        }

        validation::validate_non_empty_string("database.password", &self.password)?;
        Ok(())
    }
}

fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}
