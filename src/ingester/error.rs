// ==========================================
// 排程摄取服务 - 摄取层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 锁定类（可重试） / 结构类（立即终止）
// ==========================================

use std::io::ErrorKind;
use thiserror::Error;

/// 摄取层错误类型
#[derive(Error, Debug)]
pub enum IngestError {
    // ===== 锁定类错误（唯一允许重试的类别）=====
    #[error("目标文件被其他进程占用: {0}")]
    FileLocked(String),

    #[error("打开文件重试超限 (文件 {path}, 共尝试 {attempts} 次)")]
    LockTimeout { path: String, attempts: u32 },

    // ===== 结构类错误（不重试,立即终止本次扫描）=====
    #[error("工作表不存在 (文件 {path}): {sheet}")]
    SheetMissing { sheet: String, path: String },

    #[error("工作簿解析失败 (文件 {path}): {message}")]
    WorkbookError { path: String, message: String },

    // ===== 目录级错误 =====
    #[error("目录读取失败 (目录 {path}): {message}")]
    DirReadError { path: String, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IngestError {
    /// 是否属于锁定类（可通过等待写入方释放后重试）
    pub fn is_lock_class(&self) -> bool {
        matches!(
            self,
            IngestError::FileLocked(_) | IngestError::LockTimeout { .. }
        )
    }

    /// 错误类别标签（用于结构化日志）
    pub fn reason_class(&self) -> &'static str {
        match self {
            IngestError::FileLocked(_) => "file-locked",
            IngestError::LockTimeout { .. } => "lock-timeout",
            IngestError::SheetMissing { .. } => "missing-sheet",
            IngestError::WorkbookError { .. } => "workbook-error",
            IngestError::DirReadError { .. } => "dir-read-error",
            IngestError::Other(_) => "internal",
        }
    }
}

/// IO 错误是否属于文件占用/争用
///
/// Windows 下写入方独占保存时返回共享冲突（os error 32/33）,
/// 其他平台一般表现为 PermissionDenied / WouldBlock。
pub fn is_lock_io(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::PermissionDenied | ErrorKind::WouldBlock)
        || matches!(err.raw_os_error(), Some(32) | Some(33))
}

/// Result 类型别名
pub type IngestResult<T> = Result<T, IngestError>;
