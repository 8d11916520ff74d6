// ==========================================
// 排程摄取服务 - 临时文件命名约定
// ==========================================
// 职责: 识别排程表编辑器产生的临时/锁定副本
// 约定: 文件名以 `~` 开头的条目一律不是数据文件
// ==========================================

use std::path::Path;

/// 临时文件前缀标记
///
/// 排程表由外部电子表格程序定期覆写,保存期间会在同目录
/// 产生 `~$xxx.xlsx` 之类的锁定/备份副本。这类条目既不能
/// 触发重扫描,也不能被当作数据文件选中。
pub const TRANSIENT_PREFIX: char = '~';

/// 判断路径是否为临时工件（按文件名前缀）
pub fn is_transient_artifact(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(TRANSIENT_PREFIX))
        .unwrap_or(false)
}
