use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Overlay file {path} line {line}: {reason}")]
    OverlayParseError {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Required input not found: {path}")]
    MissingInput { path: String },

    #[error("Failed to start '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[{step}] '{program}' exited with {}: {output}", describe_code(.code))]
    CommandFailed {
        step: String,
        program: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<DeployError>,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Filesystem,
    ExternalTool,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DeployError {
    /// 取得最底層的錯誤（跳過 StepFailed 包裝）
    pub fn root(&self) -> &DeployError {
        match self {
            DeployError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            DeployError::ConfigValidationError { .. }
            | DeployError::InvalidConfigValueError { .. }
            | DeployError::MissingConfigError { .. }
            | DeployError::OverlayParseError { .. } => ErrorCategory::Configuration,
            DeployError::IoError(_) | DeployError::MissingInput { .. } => {
                ErrorCategory::Filesystem
            }
            DeployError::SpawnError { .. } | DeployError::CommandFailed { .. } => {
                ErrorCategory::ExternalTool
            }
            DeployError::StepFailed { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::ExternalTool => ErrorSeverity::High,
            ErrorCategory::Filesystem | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 失敗步驟的名稱（若有）
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            DeployError::StepFailed { step, .. } => Some(step),
            DeployError::CommandFailed { step, .. } => Some(step),
            _ => None,
        }
    }

    /// 行程結束碼：外部工具失敗時沿用其結束碼，其餘情況為 1
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            DeployError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.root() {
            DeployError::CommandFailed {
                step,
                program,
                output,
                ..
            } => {
                if output.is_empty() {
                    format!("Deployment stopped at '{}': {} failed", step, program)
                } else {
                    format!(
                        "Deployment stopped at '{}': {} failed\n{}",
                        step, program, output
                    )
                }
            }
            DeployError::SpawnError { program, .. } => {
                format!("Could not start '{}'", program)
            }
            DeployError::MissingInput { path } => format!("Missing file: {}", path),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            DeployError::ConfigValidationError { .. }
            | DeployError::InvalidConfigValueError { .. }
            | DeployError::MissingConfigError { .. } => {
                "Check deploy.toml against the documented sections and re-run"
            }
            DeployError::OverlayParseError { .. } => {
                "Fix the reported line in the environment overlay file (KEY=VALUE)"
            }
            DeployError::MissingInput { .. } => {
                "Make sure the project checkout is complete on this host"
            }
            DeployError::SpawnError { .. } => {
                "Make sure the program is installed and on PATH for the deploying user"
            }
            DeployError::CommandFailed { step, .. } if step == "restart-service" => {
                "Restarting the service needs elevated privilege; check sudo rights for the deploy user"
            }
            DeployError::CommandFailed { .. } => {
                "Inspect the tool output above; the pipeline is safe to re-run once fixed"
            }
            DeployError::IoError(_) => "Check permissions on the project directory",
            DeployError::StepFailed { .. } => "Re-run with --verbose for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;
