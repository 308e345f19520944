// ==========================================
// 采购建议引擎 - 引擎层
// ==========================================
// 职责: 过滤 / 评分 / 排序 / 选品 / 解释 / 编排
// 红线: 引擎不做 I/O；所有排除与未入选都必须输出原因
// ==========================================

pub mod control;
pub mod error;
pub mod explanation;
pub mod filter;
pub mod optimizer;
pub mod orchestrator;
pub mod ranking;
pub mod request;
pub mod scoring;
pub mod sizing;
pub mod tiers;

// 重导出核心引擎
pub use control::RunControl;
pub use error::{EngineError, EngineResult};
pub use explanation::ExplanationGenerator;
pub use filter::FilterEngine;
pub use optimizer::{
    BudgetFiller, OptimizationOutcome, Optimizer, Pick, ProfitTargetPlanner, RestockPlanner,
};
pub use orchestrator::{RunContext, RunOrchestrator};
pub use ranking::RankingSorter;
pub use request::RunRequest;
pub use scoring::{ScoredCandidate, ScoringEngine};
pub use sizing::QuantitySizer;
pub use tiers::assign_velocity_tiers;
