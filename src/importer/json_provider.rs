// ==========================================
// 采购建议引擎 - JSON 快照提供方
// ==========================================
// 支持两种格式:
// 1) 候选数组: [ {..}, {..} ]
// 2) 带供应商信息: { "supplier_id": "S1", "candidates": [ .. ] }
// ==========================================

use crate::domain::candidate::Candidate;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::provider::{read_snapshot, CandidateSnapshotProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Bare(Vec<Candidate>),
    Tagged {
        #[serde(default)]
        supplier_id: Option<String>,
        candidates: Vec<Candidate>,
    },
}

pub struct JsonSnapshotProvider {
    path: PathBuf,
}

impl JsonSnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 解析快照内容
    pub fn parse(content: &str, supplier_id: &str) -> ImportResult<Vec<Candidate>> {
        let candidates = match serde_json::from_str::<SnapshotFile>(content)? {
            SnapshotFile::Bare(candidates) => candidates,
            SnapshotFile::Tagged { supplier_id: found, candidates } => {
                match found {
                    Some(found) if !supplier_id.is_empty() && found != supplier_id => {
                        return Err(ImportError::SupplierMismatch {
                            requested: supplier_id.to_string(),
                            found,
                        });
                    }
                    _ => candidates,
                }
            }
        };

        if let Some(idx) = candidates.iter().position(|c| c.product_id.trim().is_empty()) {
            return Err(ImportError::PrimaryKeyMissing(idx + 1));
        }
        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSnapshotProvider for JsonSnapshotProvider {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self, supplier_id: &str) -> ImportResult<Vec<Candidate>> {
        let content = read_snapshot(&self.path).await?;
        let candidates = Self::parse(&content, supplier_id)?;
        info!(count = candidates.len(), "JSON 快照加载完成");
        Ok(candidates)
    }
}
