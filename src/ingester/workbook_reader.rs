// ==========================================
// 排程摄取服务 - 工作簿读取器
// ==========================================
// 职责: 单次打开 Excel 工作簿并取出指定工作表
// 分类: 打开时的占用类 IO 错误 → 锁定类（交由上层重试）;
//       工作表缺失 / 格式损坏 → 结构类（立即终止）
// ==========================================

use crate::ingester::error::{is_lock_io, IngestError, IngestResult};
use crate::ingester::schedule_ingester_trait::WorkbookReader;
use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use std::path::Path;

pub struct XlsxWorkbookReader;

impl WorkbookReader for XlsxWorkbookReader {
    fn read_sheet(&self, path: &Path, sheet_name: &str) -> IngestResult<Range<Data>> {
        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e| classify_open_error(path, e))?;

        // 工作表缺失是结构性问题,单独分类,绝不重试
        if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
            return Err(IngestError::SheetMissing {
                sheet: sheet_name.to_string(),
                path: path.display().to_string(),
            });
        }

        workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IngestError::WorkbookError {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }
}

/// 打开失败的错误分类
///
/// 只有占用类 IO 错误归入锁定类; 坏压缩包、坏格式等
/// 一律按结构类处理,重试救不了坏文件。
fn classify_open_error(path: &Path, err: XlsxError) -> IngestError {
    match err {
        XlsxError::Io(io) if is_lock_io(&io) => IngestError::FileLocked(format!(
            "{} ({})",
            path.display(),
            io
        )),
        other => IngestError::WorkbookError {
            path: path.display().to_string(),
            message: other.to_string(),
        },
    }
}
