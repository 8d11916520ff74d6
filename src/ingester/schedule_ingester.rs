// ==========================================
// 排程摄取服务 - 摄取器
// ==========================================
// 职责: 编排一次扫描 - 定位文件 → 带重试打开解析 → 构造批次
// 策略: 固定次数上限 + 固定间隔,仅锁定类错误重试;
//       重试等待可被停机信号打断
// ==========================================

use crate::config::WatchConfig;
use crate::domain::{ScheduleBatch, ScheduledUnit};
use crate::ingester::error::IngestError;
use crate::ingester::file_locator::XlsxFileLocator;
use crate::ingester::row_mapper::PositionalRowMapper;
use crate::ingester::schedule_ingester_trait::{FileLocator, RowMapper, WorkbookReader};
use crate::ingester::workbook_reader::XlsxWorkbookReader;
use calamine::{Data, Range};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast;

// ==========================================
// ScanOutcome - 单次扫描结果
// ==========================================
// 每个扫描信号恰好产生一个结果,投递给宿主侧 Sink。
#[derive(Debug)]
pub enum ScanOutcome {
    /// 解析成功,得到完整批次
    Batch(ScheduleBatch),

    /// 目录内当前没有合格数据文件（软性无事可做）
    NoCandidate,

    /// 本次扫描终止性失败（管道继续存活,等待下个信号）
    Failed { error: IngestError, attempts: u32 },

    /// 停机信号打断了重试等待
    Cancelled,
}

// ==========================================
// ScheduleIngester - 排程摄取器
// ==========================================
pub struct ScheduleIngester {
    sheet_name: String,
    max_attempts: u32,
    retry_delay: Duration,
    locator: Box<dyn FileLocator>,
    reader: Box<dyn WorkbookReader>,
    mapper: Box<dyn RowMapper>,
}

impl ScheduleIngester {
    /// 按配置构造默认组件的摄取器
    pub fn new(config: &WatchConfig) -> Self {
        Self::with_components(
            config,
            Box::new(XlsxFileLocator::new(config.extension.clone())),
            Box::new(XlsxWorkbookReader),
            Box::new(PositionalRowMapper),
        )
    }

    /// 以显式组件构造（测试注入入口）
    pub fn with_components(
        config: &WatchConfig,
        locator: Box<dyn FileLocator>,
        reader: Box<dyn WorkbookReader>,
        mapper: Box<dyn RowMapper>,
    ) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            max_attempts: config.retry_ceiling(),
            retry_delay: config.retry_delay(),
            locator,
            reader,
            mapper,
        }
    }

    /// 执行一次扫描
    ///
    /// 同一目录同一时刻只允许一次扫描在途,由管道层的单任务
    /// 消费模型保证,此处不做并发防护。
    pub async fn ingest(
        &self,
        folder: &Path,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> ScanOutcome {
        let candidate = match self.locator.locate(folder) {
            Ok(Some(path)) => path,
            Ok(None) => {
                tracing::info!(folder = %folder.display(), "目录内无合格数据文件,等待下个信号");
                return ScanOutcome::NoCandidate;
            }
            Err(error) => {
                return ScanOutcome::Failed { error, attempts: 0 };
            }
        };

        tracing::debug!(file = %candidate.display(), sheet = %self.sheet_name, "开始解析排程表");

        for attempt in 1..=self.max_attempts {
            match self.reader.read_sheet(&candidate, &self.sheet_name) {
                Ok(range) => return self.build_batch(range, candidate),
                Err(error) if error.is_lock_class() && attempt < self.max_attempts => {
                    // 写入方尚未释放,等一拍再试; 停机优先
                    tracing::debug!(
                        file = %candidate.display(),
                        attempt,
                        max_attempts = self.max_attempts,
                        "文件被占用,稍后重试"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.retry_delay) => {}
                        _ = shutdown.recv() => {
                            tracing::debug!("停机信号打断重试等待");
                            return ScanOutcome::Cancelled;
                        }
                    }
                }
                Err(error) if error.is_lock_class() => {
                    // 重试次数耗尽
                    return ScanOutcome::Failed {
                        error: IngestError::LockTimeout {
                            path: candidate.display().to_string(),
                            attempts: self.max_attempts,
                        },
                        attempts: self.max_attempts,
                    };
                }
                Err(error) => {
                    // 结构类错误: 重试救不了,立即终止本次扫描
                    return ScanOutcome::Failed {
                        error,
                        attempts: attempt,
                    };
                }
            }
        }

        // max_attempts 保证 >=1,循环必在上方返回
        ScanOutcome::Failed {
            error: IngestError::LockTimeout {
                path: candidate.display().to_string(),
                attempts: self.max_attempts,
            },
            attempts: self.max_attempts,
        }
    }

    /// 把工作表矩阵转换为批次
    ///
    /// 第 1 行是表头,数据行从第 2 行起; 主键空白的非空行
    /// 计入 rows_skipped,不视为错误。
    fn build_batch(&self, range: Range<Data>, source_file: PathBuf) -> ScanOutcome {
        let mut units: Vec<ScheduledUnit> = Vec::new();
        let mut rows_skipped = 0usize;

        // 表头行号从工作表实际起始行推算
        for (idx, row) in range.rows().enumerate().skip(1) {
            let row_number = idx + 1;
            match self.mapper.map_row(row, row_number) {
                Some(unit) => units.push(unit),
                None => {
                    if row.iter().any(|c| !matches!(c, Data::Empty)) {
                        rows_skipped += 1;
                    }
                }
            }
        }

        tracing::info!(
            file = %source_file.display(),
            units = units.len(),
            rows_skipped,
            "排程表解析完成"
        );

        ScanOutcome::Batch(ScheduleBatch {
            units,
            source_file,
            rows_skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingester::error::IngestResult;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    // ===== 测试替身 =====

    struct FixedLocator(PathBuf);

    impl FileLocator for FixedLocator {
        fn locate(&self, _folder: &Path) -> IngestResult<Option<PathBuf>> {
            Ok(Some(self.0.clone()))
        }
    }

    /// 前 N 次返回锁定错误,之后返回内存中的工作表
    struct LockingReader {
        fail_first: u32,
        calls: Arc<AtomicU32>,
        terminal: Option<fn(&Path) -> IngestError>,
    }

    impl WorkbookReader for LockingReader {
        fn read_sheet(&self, path: &Path, _sheet_name: &str) -> IngestResult<Range<Data>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.fail_first {
                return Err(IngestError::FileLocked(path.display().to_string()));
            }
            if let Some(make_err) = self.terminal {
                return Err(make_err(path));
            }
            Ok(sample_range())
        }
    }

    /// 内存工作表: 表头 + 一个完整数据行 + 一个主键空白行
    fn sample_range() -> Range<Data> {
        let mut range: Range<Data> = Range::new((0, 0), (2, 14));
        for col in 0..15u32 {
            range.set_value((0, col), Data::String(format!("H{}", col + 1)));
        }
        let row1 = [
            "2024-01-01",
            "2024-02-01",
            "A",
            "VS1",
            "WO1",
            "JOB1",
            "CUST1",
            "B1",
            "CH1",
            "IND1",
            "true",
            "2024-01-01",
            "Mon-1",
            "L1",
            "BN1",
        ];
        for (col, value) in row1.iter().enumerate() {
            range.set_value((1, col as u32), Data::String(value.to_string()));
        }
        // 主键空白的尾行
        range.set_value((2, 0), Data::String("2024-03-01".to_string()));
        range
    }

    fn test_config(max_attempts: u32) -> WatchConfig {
        let mut config = WatchConfig::new("/watched");
        config.retry_max_attempts = max_attempts;
        config.retry_delay_ms = 1;
        config
    }

    fn ingester_with_reader(max_attempts: u32, reader: LockingReader) -> ScheduleIngester {
        ScheduleIngester::with_components(
            &test_config(max_attempts),
            Box::new(FixedLocator(PathBuf::from("/watched/schedule.xlsx"))),
            Box::new(reader),
            Box::new(PositionalRowMapper),
        )
    }

    #[tokio::test]
    async fn test_success_after_transient_locks() {
        let calls = Arc::new(AtomicU32::new(0));
        let ingester = ingester_with_reader(
            5,
            LockingReader {
                fail_first: 3,
                calls: Arc::clone(&calls),
                terminal: None,
            },
        );
        let (_tx, mut shutdown) = broadcast::channel(1);

        let outcome = ingester.ingest(Path::new("/watched"), &mut shutdown).await;
        match outcome {
            ScanOutcome::Batch(batch) => {
                // 锁定 3 次后第 4 次成功,对外无失败痕迹
                assert_eq!(calls.load(Ordering::SeqCst), 4);
                assert_eq!(batch.units.len(), 1);
                assert_eq!(batch.units[0].job_number, "JOB1");
                assert_eq!(batch.rows_skipped, 1);
            }
            other => panic!("期望 Batch,实际 {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lock_timeout_after_ceiling() {
        let calls = Arc::new(AtomicU32::new(0));
        let ingester = ingester_with_reader(
            4,
            LockingReader {
                fail_first: u32::MAX,
                calls: Arc::clone(&calls),
                terminal: None,
            },
        );
        let (_tx, mut shutdown) = broadcast::channel(1);

        let outcome = ingester.ingest(Path::new("/watched"), &mut shutdown).await;
        match outcome {
            ScanOutcome::Failed { error, attempts } => {
                assert_eq!(attempts, 4);
                assert_eq!(calls.load(Ordering::SeqCst), 4);
                assert!(matches!(error, IngestError::LockTimeout { attempts: 4, .. }));
            }
            other => panic!("期望 Failed,实际 {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_sheet_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let ingester = ingester_with_reader(
            100,
            LockingReader {
                fail_first: 0,
                calls: Arc::clone(&calls),
                terminal: Some(|path| IngestError::SheetMissing {
                    sheet: "COMBINED".to_string(),
                    path: path.display().to_string(),
                }),
            },
        );
        let (_tx, mut shutdown) = broadcast::channel(1);

        let outcome = ingester.ingest(Path::new("/watched"), &mut shutdown).await;
        match outcome {
            ScanOutcome::Failed { error, attempts } => {
                // 结构类错误一次都不重试
                assert_eq!(attempts, 1);
                assert_eq!(calls.load(Ordering::SeqCst), 1);
                assert!(matches!(error, IngestError::SheetMissing { .. }));
            }
            other => panic!("期望 Failed,实际 {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_retry_wait() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut config = test_config(100);
        config.retry_delay_ms = 60_000; // 足够长,必须靠停机打断
        let ingester = ScheduleIngester::with_components(
            &config,
            Box::new(FixedLocator(PathBuf::from("/watched/schedule.xlsx"))),
            Box::new(LockingReader {
                fail_first: u32::MAX,
                calls,
                terminal: None,
            }),
            Box::new(PositionalRowMapper),
        );
        let (tx, mut shutdown) = broadcast::channel(1);

        let ingest = ingester.ingest(Path::new("/watched"), &mut shutdown);
        tokio::pin!(ingest);

        // 先让摄取进入重试等待,再发停机
        let outcome = tokio::select! {
            outcome = &mut ingest => outcome,
            _ = async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let _ = tx.send(());
                std::future::pending::<()>().await
            } => unreachable!(),
        };

        assert!(matches!(outcome, ScanOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_empty_folder_yields_no_candidate() {
        struct EmptyLocator;
        impl FileLocator for EmptyLocator {
            fn locate(&self, _folder: &Path) -> IngestResult<Option<PathBuf>> {
                Ok(None)
            }
        }

        let ingester = ScheduleIngester::with_components(
            &test_config(3),
            Box::new(EmptyLocator),
            Box::new(XlsxWorkbookReader),
            Box::new(PositionalRowMapper),
        );
        let (_tx, mut shutdown) = broadcast::channel(1);

        let outcome = ingester.ingest(Path::new("/watched"), &mut shutdown).await;
        assert!(matches!(outcome, ScanOutcome::NoCandidate));
    }
}
