// ==========================================
// 排程摄取服务 - 数据文件定位器
// ==========================================
// 职责: 在监听目录内选出唯一合格的数据文件
// 规则: 扩展名匹配 + 非临时工件; 多候选取修改时间最新者,
//       时间相同按文件名字典序取最后,保证确定性
// ==========================================

use crate::domain::marker::is_transient_artifact;
use crate::ingester::error::{IngestError, IngestResult};
use crate::ingester::schedule_ingester_trait::FileLocator;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub struct XlsxFileLocator {
    /// 数据文件扩展名（不含点,大小写不敏感）
    extension: String,
}

impl XlsxFileLocator {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl FileLocator for XlsxFileLocator {
    fn locate(&self, folder: &Path) -> IngestResult<Option<PathBuf>> {
        let entries = std::fs::read_dir(folder).map_err(|e| IngestError::DirReadError {
            path: folder.display().to_string(),
            message: e.to_string(),
        })?;

        // 候选 = (修改时间, 文件名, 路径)
        let mut best: Option<(SystemTime, String, PathBuf)> = None;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(folder = %folder.display(), "目录条目读取失败: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || is_transient_artifact(&path) || !self.matches_extension(&path) {
                continue;
            }

            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let name = entry.file_name().to_string_lossy().into_owned();

            let candidate = (modified, name, path);
            match &best {
                None => best = Some(candidate),
                Some(current) => {
                    // 最新修改优先; 平局按文件名保证确定性
                    if (candidate.0, &candidate.1) > (current.0, &current.1) {
                        best = Some(candidate);
                    }
                }
            }
        }

        Ok(best.map(|(_, _, path)| path))
    }
}
