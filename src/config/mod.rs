// ==========================================
// 排程摄取服务 - 配置层
// ==========================================
// 职责: 监听目录、工作表名、去抖窗口、重试策略
// 来源: 宿主构造 / 环境变量,带固定默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ==========================================
// 默认值（与上游排程表写入节奏匹配）
// ==========================================

/// 默认工作表名
pub const DEFAULT_SHEET_NAME: &str = "COMBINED";

/// 默认数据文件扩展名
pub const DEFAULT_EXTENSION: &str = "xlsx";

/// 默认去抖窗口（毫秒）
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// 默认打开重试上限
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 100;

/// 默认重试间隔（毫秒）
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

// ==========================================
// 配置错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("缺少必需的环境变量: {0}")]
    MissingEnv(String),

    #[error("配置值格式错误 (key: {key}, value: {value})")]
    InvalidValue { key: String, value: String },
}

// ==========================================
// WatchConfig - 监听/摄取配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// 监听目录（必填,非递归）
    pub folder_path: PathBuf,

    /// 待读取的工作表名
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// 数据文件扩展名（不含点,大小写不敏感）
    #[serde(default = "default_extension")]
    pub extension: String,

    /// 去抖窗口（毫秒,前沿触发）
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// 打开重试上限（次）
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// 重试间隔（毫秒）
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_retry_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl WatchConfig {
    /// 以默认参数构造配置
    pub fn new(folder_path: impl Into<PathBuf>) -> Self {
        Self {
            folder_path: folder_path.into(),
            sheet_name: default_sheet_name(),
            extension: default_extension(),
            debounce_ms: default_debounce_ms(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }

    /// 从环境变量构造配置
    ///
    /// # 环境变量
    /// - SCHEDULE_WATCH_DIR: 监听目录（必填）
    /// - SCHEDULE_SHEET_NAME: 工作表名（默认 COMBINED）
    /// - SCHEDULE_DEBOUNCE_MS: 去抖窗口（默认 500）
    /// - SCHEDULE_RETRY_MAX_ATTEMPTS: 重试上限（默认 100）
    /// - SCHEDULE_RETRY_DELAY_MS: 重试间隔（默认 500）
    pub fn from_env() -> Result<Self, ConfigError> {
        let folder = std::env::var("SCHEDULE_WATCH_DIR")
            .map_err(|_| ConfigError::MissingEnv("SCHEDULE_WATCH_DIR".to_string()))?;

        let mut config = Self::new(folder);
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 将环境变量中的可选覆写应用到现有配置
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(sheet) = std::env::var("SCHEDULE_SHEET_NAME") {
            if !sheet.trim().is_empty() {
                self.sheet_name = sheet.trim().to_string();
            }
        }
        if let Some(v) = read_env_u64("SCHEDULE_DEBOUNCE_MS")? {
            self.debounce_ms = v;
        }
        if let Some(v) = read_env_u64("SCHEDULE_RETRY_MAX_ATTEMPTS")? {
            // 超出 u32 的值按格式错误处理,不做静默截断
            self.retry_max_attempts =
                u32::try_from(v).map_err(|_| ConfigError::InvalidValue {
                    key: "SCHEDULE_RETRY_MAX_ATTEMPTS".to_string(),
                    value: v.to_string(),
                })?;
        }
        if let Some(v) = read_env_u64("SCHEDULE_RETRY_DELAY_MS")? {
            self.retry_delay_ms = v;
        }
        Ok(())
    }

    /// 去抖窗口
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// 重试间隔
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// 重试上限（至少 1,避免配置为 0 时一次都不尝试）
    pub fn retry_ceiling(&self) -> u32 {
        self.retry_max_attempts.max(1)
    }
}

fn read_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}
