// ==========================================
// 采购建议引擎 - 候选快照提供方接口
// ==========================================
// 职责: 把某个供应商的候选快照加载为 Vec<Candidate>
// 红线: 引擎本身不做 I/O，快照在运行前一次性加载
// ==========================================

use crate::domain::candidate::Candidate;
use crate::importer::csv_provider::CsvSnapshotProvider;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::json_provider::JsonSnapshotProvider;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// ==========================================
// CandidateSnapshotProvider Trait
// ==========================================
#[async_trait]
pub trait CandidateSnapshotProvider: Send + Sync {
    /// 加载供应商候选快照
    ///
    /// # 参数
    /// - `supplier_id`: 供应商标识；为空表示不按供应商过滤
    ///
    /// # 返回
    /// - Ok(Vec<Candidate>): 快照中的候选（保持文件顺序）
    /// - Err(ImportError): 文件/格式/字段错误
    async fn load(&self, supplier_id: &str) -> ImportResult<Vec<Candidate>>;
}

/// 按扩展名选择快照提供方
pub fn provider_for_path(path: impl AsRef<Path>) -> ImportResult<Box<dyn CandidateSnapshotProvider>> {
    let path: PathBuf = path.as_ref().to_path_buf();
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => Ok(Box::new(JsonSnapshotProvider::new(path))),
        "csv" => Ok(Box::new(CsvSnapshotProvider::new(path))),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

/// 读取快照文件（不存在时返回 FileNotFound）
pub(crate) async fn read_snapshot(path: &Path) -> ImportResult<String> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(tokio::fs::read_to_string(path).await?)
}
