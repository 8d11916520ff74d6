// ==========================================
// 排程摄取服务 - 摄取层
// ==========================================
// 职责: 收到扫描信号后定位数据文件、带重试打开、
//       解析工作表、构造排产单元批次
// 支持: Excel (.xlsx)
// ==========================================

// 模块声明
pub mod cell_cleaner;
pub mod error;
pub mod file_locator;
pub mod row_mapper;
pub mod schedule_ingester;
pub mod schedule_ingester_trait;
pub mod workbook_reader;

// 重导出核心类型
pub use error::{IngestError, IngestResult};
pub use file_locator::XlsxFileLocator;
pub use row_mapper::PositionalRowMapper;
pub use schedule_ingester::{ScanOutcome, ScheduleIngester};
pub use workbook_reader::XlsxWorkbookReader;

// 重导出 Trait 接口
pub use schedule_ingester_trait::{FileLocator, RowMapper, WorkbookReader};
