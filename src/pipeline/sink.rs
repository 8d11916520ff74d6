// ==========================================
// 排程摄取服务 - 批次投递 Sink
// ==========================================
// 职责: 定义宿主侧投递接缝,附带两个内置实现
// 语义: 每个稳定文件版本至少投递一次,跨批次去重由宿主负责
// ==========================================

use crate::ingester::ScanOutcome;
use async_trait::async_trait;
use tokio::sync::mpsc;

// ==========================================
// BatchSink - 宿主投递接口
// ==========================================
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// 接收一次扫描的结果
    ///
    /// 投递失败由实现自行消化,不得让管道任务崩溃。
    ///
    /// 经由 `ScheduleWatchService` 投递时只会出现
    /// `Batch` / `NoCandidate` / `Failed` 三种结果;
    /// `Cancelled` 表示停机中止,服务直接退出消费循环而不投递。
    /// 直接驱动 `ScheduleIngester` 的宿主仍可能收到 `Cancelled`。
    async fn deliver(&self, outcome: ScanOutcome);
}

// ==========================================
// LogSink - 结构化日志投递（参考行为）
// ==========================================
// 批次渲染为 JSON 文本写入日志,失败按错误类别记录。
pub struct LogSink;

#[async_trait]
impl BatchSink for LogSink {
    async fn deliver(&self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Batch(batch) => match serde_json::to_string(&batch.units) {
                Ok(json) => {
                    tracing::info!(
                        file = %batch.source_file.display(),
                        units = batch.units.len(),
                        rows_skipped = batch.rows_skipped,
                        "排程批次: {}",
                        json
                    );
                }
                Err(e) => {
                    tracing::warn!("批次序列化失败: {}", e);
                }
            },
            ScanOutcome::NoCandidate => {
                tracing::info!("本次扫描无数据文件");
            }
            ScanOutcome::Failed { error, attempts } => {
                tracing::warn!(
                    reason = error.reason_class(),
                    attempts,
                    "本次扫描失败: {}",
                    error
                );
            }
            ScanOutcome::Cancelled => {
                tracing::debug!("扫描因停机中止");
            }
        }
    }
}

// ==========================================
// ChannelSink - 通道投递（宿主程序 / 测试）
// ==========================================
pub struct ChannelSink {
    tx: mpsc::Sender<ScanOutcome>,
}

impl ChannelSink {
    /// 创建 Sink 与对应的接收端
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ScanOutcome>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl BatchSink for ChannelSink {
    async fn deliver(&self, outcome: ScanOutcome) {
        if self.tx.send(outcome).await.is_err() {
            // 接收端已关闭,丢弃结果但保持管道存活
            tracing::debug!("批次接收端已关闭");
        }
    }
}
