// ==========================================
// 排程摄取服务 - 变更探测层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 变更探测层错误类型
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("创建文件系统监听器失败: {0}")]
    WatcherInit(String),

    #[error("注册监听目录失败 (目录 {path}): {message}")]
    WatchRegister { path: String, message: String },
}

impl From<notify::Error> for DetectorError {
    fn from(err: notify::Error) -> Self {
        DetectorError::WatcherInit(err.to_string())
    }
}

/// Result 类型别名
pub type DetectorResult<T> = Result<T, DetectorError>;
