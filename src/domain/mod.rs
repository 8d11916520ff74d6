// ==========================================
// 排程摄取服务 - 领域模型层
// ==========================================
// 职责: 定义排产单元实体、批次结构、文件命名约定
// 红线: 不含文件访问逻辑,不含监听逻辑
// ==========================================

pub mod marker;
pub mod scheduled_unit;

// 重导出核心类型
pub use marker::{is_transient_artifact, TRANSIENT_PREFIX};
pub use scheduled_unit::{ScheduleBatch, ScheduledUnit};
