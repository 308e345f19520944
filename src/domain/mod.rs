// ==========================================
// 采购建议引擎 - 领域模型层
// ==========================================
// 职责: 定义候选快照、约束、目标、结果等实体
// 红线: 不含引擎逻辑，不含 I/O
// ==========================================

pub mod candidate;
pub mod constraint;
pub mod goal;
pub mod result;
pub mod types;

// 重导出核心类型
pub use candidate::{Candidate, ResolvedEconomics, UnitEconomics, DAYS_PER_MONTH};
pub use constraint::ConstraintSet;
pub use goal::{Goal, TierMix};
pub use result::{
    ExcludedCandidate, Explanation, FilterVerdict, Overshoot, RunCounts, RunResult, RunTotals,
    Score, Selection, Shortfall, UnselectedCandidate,
};
pub use types::{FilterReason, GoalKind, PricingBasis, UrgencyBand, VelocityTier, VolatilityPolicy};
