//! `.env` 風格的環境變數覆蓋檔。
//!
//! 檔案不存在不是錯誤；存在時每一行必須是 `KEY=VALUE`（可加 `export ` 前綴）。

use crate::utils::error::{DeployError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// 讀取覆蓋檔；檔案不存在時回傳 None
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string()).map(Some)
    }

    pub fn parse(content: &str, source: &str) -> Result<Self> {
        let line_re = Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$")
            .map_err(|e| DeployError::OverlayParseError {
                path: source.to_string(),
                line: 0,
                reason: e.to_string(),
            })?;

        let mut vars = BTreeMap::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let caps = line_re
                .captures(line)
                .ok_or_else(|| DeployError::OverlayParseError {
                    path: source.to_string(),
                    line: index + 1,
                    reason: if line.contains('=') {
                        "invalid variable name".to_string()
                    } else {
                        "expected KEY=VALUE".to_string()
                    },
                })?;

            let value = parse_value(&caps[2]).ok_or_else(|| DeployError::OverlayParseError {
                path: source.to_string(),
                line: index + 1,
                reason: "unterminated quoted value".to_string(),
            })?;

            vars.insert(caps[1].to_string(), value);
        }

        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn parse_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote) {
            let end = rest.find(quote)?;
            return Some(rest[..end].to_string());
        }
    }

    // 未加引號的值：` #` 之後視為註解
    let value = match raw.find(" #") {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    Some(value.trim_end().to_string())
}
