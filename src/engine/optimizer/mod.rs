// ==========================================
// 采购建议引擎 - 目标优化器
// ==========================================
// 职责: 按目标类型选择商品子集与数量
// 输入: 按综合分排序后的候选
// 输出: OptimizationOutcome（入选 / 未入选原因 / shortfall / overshoot）
// 红线: 单线程执行，每一步依赖累计状态；结果完全确定
// ==========================================

pub mod budget_filler;
pub mod profit_target;
pub mod restock;

use crate::config::EngineConfig;
use crate::domain::goal::Goal;
use crate::domain::result::{Overshoot, Shortfall};
use crate::domain::types::{UrgencyBand, VelocityTier};
use crate::engine::scoring::ScoredCandidate;
use crate::engine::sizing::QuantitySizer;
use rust_decimal::Decimal;
use tracing::{info, instrument};

pub use budget_filler::BudgetFiller;
pub use profit_target::ProfitTargetPlanner;
pub use restock::RestockPlanner;

// ==========================================
// Pick - 单个入选决策
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    /// 在排序列表中的位置
    pub rank: usize,
    pub quantity: u32,
    pub cost: Decimal,
    pub projected_profit: Decimal,
    pub velocity_tier: Option<VelocityTier>,
    pub urgency_band: Option<UrgencyBand>,
    /// 入选理由（追加到 why_recommended）
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl Pick {
    pub(crate) fn new(rank: usize, scored: &ScoredCandidate<'_>, packs: u32) -> Self {
        let quantity = packs * scored.pack_size();
        Self {
            rank,
            quantity,
            cost: scored.unit_cost * Decimal::from(quantity),
            projected_profit: scored.unit_profit * Decimal::from(quantity),
            velocity_tier: None,
            urgency_band: None,
            notes: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

// ==========================================
// OptimizationOutcome - 优化结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct OptimizationOutcome {
    /// 按首次加入顺序
    pub picks: Vec<Pick>,
    /// (rank, 未入选原因)
    pub skipped: Vec<(usize, String)>,
    pub shortfall: Option<Shortfall>,
    pub overshoot: Option<Overshoot>,
    pub warnings: Vec<String>,
}

impl OptimizationOutcome {
    pub fn total_cost(&self) -> Decimal {
        self.picks.iter().map(|p| p.cost).sum()
    }

    pub fn total_profit(&self) -> Decimal {
        self.picks.iter().map(|p| p.projected_profit).sum()
    }

    /// 未入选原因；没有显式记录的候选返回 None
    pub fn skip_reason(&self, rank: usize) -> Option<&str> {
        self.skipped
            .iter()
            .find(|(r, _)| *r == rank)
            .map(|(_, reason)| reason.as_str())
    }
}

/// 金额展示（两位小数）
pub(crate) fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

// ==========================================
// Optimizer - 目标分派（封闭枚举）
// ==========================================
pub struct Optimizer<'c> {
    config: &'c EngineConfig,
    sizer: QuantitySizer,
}

impl<'c> Optimizer<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config, sizer: QuantitySizer::new(&config.sizing) }
    }

    /// 按目标执行选品
    #[instrument(skip(self, ranked), fields(goal = %goal.kind(), candidates = ranked.len()))]
    pub fn optimize(&self, goal: &Goal, ranked: &[ScoredCandidate<'_>]) -> OptimizationOutcome {
        let outcome = match goal {
            Goal::MeetBudget { target_spend } => {
                BudgetFiller::new(&self.sizer).fill(ranked, *target_spend)
            }
            Goal::HitProfitTarget { target_profit, max_spend, tier_mix } => {
                ProfitTargetPlanner::new(&self.sizer, &self.config.tiers).plan(
                    ranked,
                    *target_profit,
                    *max_spend,
                    tier_mix,
                )
            }
            Goal::Restock { max_spend } => {
                RestockPlanner::new(&self.sizer, &self.config.restock).plan(ranked, *max_spend)
            }
        };

        info!(
            picks = outcome.picks.len(),
            total_cost = %outcome.total_cost(),
            total_profit = %outcome.total_profit(),
            shortfall = outcome.shortfall.is_some(),
            "选品完成"
        );

        outcome
    }
}
