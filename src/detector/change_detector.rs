// ==========================================
// 排程摄取服务 - 变更探测器
// ==========================================
// 职责: 监听单个目录（非递归）,过滤临时工件与访问噪声,
//       去抖后向下游投递"重新扫描"信号
// 契约: 与摄取层的唯一约定是"发生了一次逻辑变更,现在重扫"
// ==========================================

use crate::detector::debounce::Debouncer;
use crate::detector::error::{DetectorError, DetectorResult};
use crate::domain::marker::is_transient_artifact;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// 扫描信号（无负载,只表示"现在重扫"）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSignal;

// ==========================================
// ChangeDetector - 变更探测器
// ==========================================
// 监听句柄与去抖状态由本组件独占,外部不可变更。
// start() 启动后幂等; stop() 可重复调用,也允许在
// start() 之前调用。
pub struct ChangeDetector {
    /// 监听目录
    folder: PathBuf,

    /// 去抖状态（探测器独占）
    debouncer: Arc<Debouncer>,

    /// 信号通道发送端（容量 1,见管道层）
    signal_tx: mpsc::Sender<ScanSignal>,

    /// notify 监听句柄。句柄被丢弃即注销 OS 级监听,
    /// 因此必须持有到 stop() 为止。
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl ChangeDetector {
    pub fn new(
        folder: impl Into<PathBuf>,
        debouncer: Debouncer,
        signal_tx: mpsc::Sender<ScanSignal>,
    ) -> Self {
        Self {
            folder: folder.into(),
            debouncer: Arc::new(debouncer),
            signal_tx,
            watcher: Mutex::new(None),
        }
    }

    /// 启动监听（幂等: 已启动时直接返回）
    pub fn start(&self) -> DetectorResult<()> {
        let mut guard = self
            .watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.is_some() {
            tracing::debug!(folder = %self.folder.display(), "变更探测器已在运行,忽略重复启动");
            return Ok(());
        }

        let debouncer = Arc::clone(&self.debouncer);
        let signal_tx = self.signal_tx.clone();
        let folder_label = self.folder.display().to_string();

        // notify 回调运行在监听线程上,通过 try_send 桥接到
        // tokio 信号通道,不在回调里做任何阻塞操作
        let handler = move |result: Result<notify::Event, notify::Error>| match result {
            Ok(event) => {
                if !is_relevant(&event) {
                    return;
                }
                if !debouncer.should_emit() {
                    tracing::trace!("去抖窗口内事件,丢弃");
                    return;
                }
                if signal_tx.try_send(ScanSignal).is_err() {
                    // 通道里已有待处理信号（或管道已停）,本次并入待扫
                    tracing::trace!("扫描信号已挂起,合并本次变更");
                }
            }
            Err(err) => {
                tracing::warn!(folder = %folder_label, "文件系统监听错误: {}", err);
            }
        };

        let mut watcher = RecommendedWatcher::new(handler, notify::Config::default())?;
        watcher
            .watch(&self.folder, RecursiveMode::NonRecursive)
            .map_err(|e| DetectorError::WatchRegister {
                path: self.folder.display().to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(folder = %self.folder.display(), "变更探测器已启动");
        *guard = Some(watcher);
        Ok(())
    }

    /// 停止监听并释放 OS 监听句柄
    ///
    /// 未启动或已停止时调用无副作用。
    pub fn stop(&self) {
        let mut guard = self
            .watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.take().is_some() {
            tracing::info!(folder = %self.folder.display(), "变更探测器已停止");
        }
    }

    /// 是否处于监听状态
    pub fn is_running(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }
}

impl Drop for ChangeDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 事件是否值得触发重扫描
///
/// - 纯访问类事件（读取）不代表内容变更,丢弃
/// - 所有受影响路径都是临时工件的事件丢弃
fn is_relevant(event: &notify::Event) -> bool {
    if event.kind.is_access() {
        return false;
    }
    event.paths.iter().any(|p| !is_transient_artifact(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind};
    use std::path::Path;
    use std::time::Duration;

    fn event_for(kind: EventKind, paths: &[&str]) -> notify::Event {
        let mut event = notify::Event::new(kind);
        for p in paths {
            event = event.add_path(Path::new(p).to_path_buf());
        }
        event
    }

    #[test]
    fn test_transient_only_event_is_irrelevant() {
        let event = event_for(
            EventKind::Create(CreateKind::File),
            &["/data/~$schedule.xlsx"],
        );
        assert!(!is_relevant(&event));
    }

    #[test]
    fn test_data_file_event_is_relevant() {
        let event = event_for(EventKind::Create(CreateKind::File), &["/data/schedule.xlsx"]);
        assert!(is_relevant(&event));
    }

    #[test]
    fn test_access_event_is_irrelevant() {
        let event = event_for(
            EventKind::Access(notify::event::AccessKind::Read),
            &["/data/schedule.xlsx"],
        );
        assert!(!is_relevant(&event));
    }

    #[tokio::test]
    async fn test_stop_before_start_is_safe() {
        let (tx, _rx) = mpsc::channel(1);
        let detector =
            ChangeDetector::new("/nonexistent", Debouncer::new(Duration::from_millis(500)), tx);
        detector.stop();
        detector.stop();
        assert!(!detector.is_running());
    }
}
