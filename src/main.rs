// ==========================================
// 排程摄取服务 - 主入口
// ==========================================
// 用法: schedule-ingest [监听目录]
//       目录也可通过 SCHEDULE_WATCH_DIR 提供
// ==========================================

use schedule_ingest::pipeline::{LogSink, ScheduleWatchService};
use schedule_ingest::{logging, WatchConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", schedule_ingest::APP_NAME);
    tracing::info!("系统版本: {}", schedule_ingest::VERSION);
    tracing::info!("==================================================");

    // 目录优先取命令行参数,其余参数走环境变量
    let config = match std::env::args().nth(1) {
        Some(folder) => {
            let mut config = WatchConfig::new(folder);
            config.apply_env_overrides()?;
            config
        }
        None => WatchConfig::from_env()?,
    };

    tracing::info!("监听目录: {}", config.folder_path.display());
    tracing::info!("工作表: {}", config.sheet_name);

    let service = ScheduleWatchService::new(config, Arc::new(LogSink));
    service.start()?;

    // 启动时先做一次全量扫描,不等首个文件事件
    service.request_scan();

    tokio::signal::ctrl_c().await?;
    tracing::info!("收到退出信号,正在停止...");
    service.stop().await;
    tracing::info!("已退出");

    Ok(())
}
