// ==========================================
// 排程摄取服务 - 核心库
// ==========================================
// 技术栈: Tokio + notify + calamine
// 系统定位: 排程表变更监听 + 排产单元数据管道
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 监听/摄取参数
pub mod config;

// 变更探测层 - 文件系统事件 → 扫描信号
pub mod detector;

// 摄取层 - 排程表定位/读取/解析
pub mod ingester;

// 管道层 - 信号消费 + 批次投递
pub mod pipeline;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::WatchConfig;
pub use detector::{ChangeDetector, Debouncer, ScanSignal};
pub use domain::{ScheduleBatch, ScheduledUnit};
pub use ingester::{IngestError, IngestResult, ScanOutcome, ScheduleIngester};
pub use pipeline::{BatchSink, ChannelSink, LogSink, ScheduleWatchService};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "排程摄取服务";
