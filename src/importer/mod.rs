// ==========================================
// 采购建议引擎 - 快照导入层
// ==========================================
// 职责: 外部候选快照 → Vec<Candidate>
// 支持: JSON, CSV
// ==========================================

// 模块声明
pub mod csv_provider;
pub mod error;
pub mod json_provider;
pub mod provider;

// 重导出核心类型
pub use csv_provider::CsvSnapshotProvider;
pub use error::{ImportError, ImportResult};
pub use json_provider::JsonSnapshotProvider;
pub use provider::{provider_for_path, CandidateSnapshotProvider};
