// ==========================================
// 排程摄取服务 - 管道层
// ==========================================
// 职责: 把变更探测与摄取拼成完整管道,向宿主投递批次
// 约束: 同一目录同一时刻最多一次扫描在途,
//       在途期间最多挂起一个待扫信号
// ==========================================

pub mod service;
pub mod sink;

// 重导出核心类型
pub use service::ScheduleWatchService;
pub use sink::{BatchSink, ChannelSink, LogSink};
