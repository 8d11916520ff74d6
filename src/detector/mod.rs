// ==========================================
// 排程摄取服务 - 变更探测层
// ==========================================
// 职责: 文件系统原始事件 → 去噪后的扫描信号
// 红线: 不读文件内容,不感知摄取层内部
// ==========================================

pub mod change_detector;
pub mod debounce;
pub mod error;

// 重导出核心类型
pub use change_detector::{ChangeDetector, ScanSignal};
pub use debounce::Debouncer;
pub use error::{DetectorError, DetectorResult};
