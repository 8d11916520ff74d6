// ==========================================
// 排程摄取服务 - 摄取层 Trait 接口
// ==========================================
// 职责: 定义文件定位 / 工作簿读取 / 行映射的接缝,
//       便于测试替换与实现演进
// ==========================================

use crate::domain::ScheduledUnit;
use crate::ingester::error::IngestResult;
use calamine::{Data, Range};
use std::path::{Path, PathBuf};

// ==========================================
// FileLocator - 数据文件定位
// ==========================================
/// 在监听目录内选出唯一合格的数据文件
///
/// # 返回
/// - Ok(Some(path)): 选中的数据文件
/// - Ok(None): 当前没有合格文件（软性无事可做,不是错误）
/// - Err: 目录不可读
pub trait FileLocator: Send + Sync {
    fn locate(&self, folder: &Path) -> IngestResult<Option<PathBuf>>;
}

// ==========================================
// WorkbookReader - 工作簿读取
// ==========================================
/// 打开工作簿并取出指定工作表的单元格矩阵
///
/// 单次尝试,不含重试; 重试策略由摄取器编排。
pub trait WorkbookReader: Send + Sync {
    fn read_sheet(&self, path: &Path, sheet_name: &str) -> IngestResult<Range<Data>>;
}

// ==========================================
// RowMapper - 行映射
// ==========================================
/// 把一行单元格按列位置契约映射为排产单元
///
/// # 返回
/// - Some(unit): 主键字段齐备,构造成功
/// - None: 主键字段空白,整行跳过（预期的数据稀疏,不是错误）
pub trait RowMapper: Send + Sync {
    fn map_row(&self, row: &[Data], row_number: usize) -> Option<ScheduledUnit>;
}
