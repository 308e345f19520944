// ==========================================
// 采购建议引擎 - 核心库
// ==========================================
// 技术栈: Rust + rayon + rust_decimal
// 系统定位: 决策支持（给出建议与理由，不下单）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 过滤/评分/选品/解释
pub mod engine;

// 导入层 - 候选快照
pub mod importer;

// 配置层 - 单次运行配置
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    FilterReason, GoalKind, PricingBasis, UrgencyBand, VelocityTier, VolatilityPolicy,
};

// 领域实体
pub use domain::{
    Candidate, ConstraintSet, Goal, RunResult, Score, Selection, TierMix, UnitEconomics,
};

// 配置
pub use config::EngineConfig;

// 引擎
pub use engine::{
    EngineError, RunContext, RunControl, RunOrchestrator, RunRequest,
};

// 导入
pub use importer::{CandidateSnapshotProvider, ImportError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
