// ==========================================
// 排程摄取服务 - 监听服务
// ==========================================
// 职责: 生命周期编排 - 启动探测器、消费扫描信号、
//       执行摄取、投递结果、优雅停机
// 并发模型: 信号通道容量 1 - 在途扫描期间最多挂起一个
//           待扫信号,多余信号丢弃（在途扫描读到的总是
//           文件最新稳定状态)
// ==========================================

use crate::config::WatchConfig;
use crate::detector::{ChangeDetector, DetectorResult, Debouncer, ScanSignal};
use crate::ingester::{ScanOutcome, ScheduleIngester};
use crate::pipeline::sink::BatchSink;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// 信号通道容量: 1 个在途 + 1 个挂起
const SIGNAL_CHANNEL_CAPACITY: usize = 1;

// ==========================================
// ScheduleWatchService - 监听服务
// ==========================================
pub struct ScheduleWatchService {
    config: WatchConfig,
    detector: Arc<ChangeDetector>,
    sink: Arc<dyn BatchSink>,
    signal_tx: mpsc::Sender<ScanSignal>,
    signal_rx: Mutex<Option<mpsc::Receiver<ScanSignal>>>,
    shutdown_tx: broadcast::Sender<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ScheduleWatchService {
    pub fn new(config: WatchConfig, sink: Arc<dyn BatchSink>) -> Self {
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
        let (shutdown_tx, _) = broadcast::channel(1);

        let detector = Arc::new(ChangeDetector::new(
            config.folder_path.clone(),
            Debouncer::new(config.debounce_window()),
            signal_tx.clone(),
        ));

        Self {
            config,
            detector,
            sink,
            signal_tx,
            signal_rx: Mutex::new(Some(signal_rx)),
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    /// 启动监听与消费任务（幂等: 已启动时直接返回）
    ///
    /// 启动失败（如目录不存在导致监听注册失败）可直接重试,
    /// 服务保持可启动状态。
    pub fn start(&self) -> DetectorResult<()> {
        let mut receiver_slot = self.signal_rx.lock().unwrap_or_else(|p| p.into_inner());
        if receiver_slot.is_none() {
            tracing::debug!("监听服务已启动,忽略重复启动");
            return Ok(());
        }

        // 先注册监听,成功后才取走接收端;
        // 失败时接收端留在原位,后续 start() 可以重试
        self.detector.start()?;

        let Some(signal_rx) = receiver_slot.take() else {
            return Ok(());
        };

        let handle = tokio::spawn(run_loop(
            signal_rx,
            ScheduleIngester::new(&self.config),
            self.config.folder_path.clone(),
            Arc::clone(&self.sink),
            self.shutdown_tx.subscribe(),
            self.shutdown_tx.subscribe(),
        ));
        *self.worker.lock().unwrap_or_else(|p| p.into_inner()) = Some(handle);

        tracing::info!(
            folder = %self.config.folder_path.display(),
            sheet = %self.config.sheet_name,
            "监听服务已启动"
        );
        Ok(())
    }

    /// 停止服务: 注销监听、打断在途重试、等待消费任务退出
    ///
    /// 可重复调用,也允许在 start() 之前调用。
    pub async fn stop(&self) {
        self.detector.stop();
        let _ = self.shutdown_tx.send(());

        let handle = self.worker.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!("消费任务退出异常: {}", e);
            }
            tracing::info!("监听服务已停止");
        }
    }

    /// 手动触发一次重扫描
    ///
    /// 走与文件系统事件相同的信号通道; 已有挂起信号时合并。
    pub fn request_scan(&self) -> bool {
        self.signal_tx.try_send(ScanSignal).is_ok()
    }

    /// 当前配置
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }
}

/// 消费循环: 一次信号 → 一次扫描 → 一次投递
async fn run_loop(
    mut signal_rx: mpsc::Receiver<ScanSignal>,
    ingester: ScheduleIngester,
    folder: std::path::PathBuf,
    sink: Arc<dyn BatchSink>,
    mut shutdown_rx: broadcast::Receiver<()>,
    mut ingest_shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            signal = signal_rx.recv() => {
                if signal.is_none() {
                    break;
                }
                let outcome = ingester.ingest(&folder, &mut ingest_shutdown_rx).await;
                if matches!(outcome, ScanOutcome::Cancelled) {
                    break;
                }
                sink.deliver(outcome).await;
            }
        }
    }
    tracing::debug!("信号消费任务退出");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::sink::ChannelSink;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stop_before_start_is_safe() {
        let dir = TempDir::new().unwrap();
        let (sink, _rx) = ChannelSink::new(4);
        let service = ScheduleWatchService::new(
            WatchConfig::new(dir.path()),
            Arc::new(sink),
        );
        service.stop().await;
        service.stop().await;
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (sink, _rx) = ChannelSink::new(4);
        let service = ScheduleWatchService::new(
            WatchConfig::new(dir.path()),
            Arc::new(sink),
        );

        service.start().unwrap();
        service.start().unwrap();
        service.stop().await;
    }

    #[tokio::test]
    async fn test_failed_start_can_be_retried() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not-yet-created");
        let (sink, mut rx) = ChannelSink::new(4);
        let service = ScheduleWatchService::new(
            WatchConfig::new(&missing),
            Arc::new(sink),
        );

        // 目录不存在,监听注册失败; 失败不得被当成"已启动"
        assert!(service.start().is_err());
        assert!(service.start().is_err());

        // 目录就位后重试成功,管道照常工作
        std::fs::create_dir(&missing).unwrap();
        service.start().unwrap();
        assert!(service.request_scan());

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("等待扫描结果超时")
            .expect("通道意外关闭");
        assert!(matches!(outcome, ScanOutcome::NoCandidate));

        service.stop().await;
    }

    #[tokio::test]
    async fn test_idle_stop_delivers_nothing_to_sink() {
        let dir = TempDir::new().unwrap();
        let (sink, mut rx) = ChannelSink::new(4);
        let service = ScheduleWatchService::new(
            WatchConfig::new(dir.path()),
            Arc::new(sink),
        );

        service.start().unwrap();
        service.stop().await;

        // 正常停机不向 Sink 投递任何结果（包括 Cancelled）
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_manual_scan_on_empty_folder_reports_no_candidate() {
        let dir = TempDir::new().unwrap();
        let (sink, mut rx) = ChannelSink::new(4);
        let service = ScheduleWatchService::new(
            WatchConfig::new(dir.path()),
            Arc::new(sink),
        );

        service.start().unwrap();
        assert!(service.request_scan());

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("等待扫描结果超时")
            .expect("通道意外关闭");
        assert!(matches!(outcome, ScanOutcome::NoCandidate));

        service.stop().await;
    }
}
